//! Journal entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    /// Short journal code, used to derive DOIs for imported papers
    #[sea_orm(column_type = "Text")]
    pub code: String,

    #[sea_orm(column_type = "Text")]
    pub issn: String,

    pub status: JournalStatus,

    /// External WordPress site URL papers are synced from
    #[sea_orm(column_type = "Text", nullable)]
    pub wordpress_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,

    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::paper::Entity")]
    Papers,

    #[sea_orm(has_many = "super::database_application::Entity")]
    Applications,
}

impl Related<super::paper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Papers.def()
    }
}

impl Related<super::database_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
