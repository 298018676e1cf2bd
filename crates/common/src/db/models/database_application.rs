//! Database application entity
//!
//! A journal's formal request to be indexed by a named external database.
//! At most one application exists per (journal, database config) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "database_applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    // (journal_id, database_config_id) carries a composite unique index,
    // enforced by the schema and the repository upsert
    pub journal_id: Uuid,

    pub database_config_id: Uuid,

    pub status: ApplicationStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub submitted_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,

    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,

    #[sea_orm(string_value = "UNDER_REVIEW")]
    UnderReview,

    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,

    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl ApplicationStatus {
    /// Wire representation, matching the stored enum value
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal::Entity",
        from = "Column::JournalId",
        to = "super::journal::Column::Id"
    )]
    Journal,

    #[sea_orm(
        belongs_to = "super::database_config::Entity",
        from = "Column::DatabaseConfigId",
        to = "super::database_config::Column::Id"
    )]
    DatabaseConfig,
}

impl Related<super::journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl Related<super::database_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DatabaseConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
