//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub journal_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Comma-joined author names, order preserving
    #[sea_orm(column_type = "Text")]
    pub authors: String,

    #[sea_orm(column_type = "Text", unique)]
    pub doi: String,

    pub indexing_status: IndexingStatus,

    /// Scholar search URL recorded by the verifier when found
    #[sea_orm(column_type = "Text", nullable)]
    pub scholar_url: Option<String>,

    pub pub_date: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Whether a paper is known to be discoverable in an external citation index
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexingStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,

    #[sea_orm(string_value = "INDEXED")]
    Indexed,

    #[sea_orm(string_value = "NOT_INDEXED")]
    NotIndexed,

    #[sea_orm(string_value = "NOT_FOUND")]
    NotFound,
}

impl IndexingStatus {
    /// Wire representation, matching the stored enum value
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexingStatus::Pending => "PENDING",
            IndexingStatus::Indexed => "INDEXED",
            IndexingStatus::NotIndexed => "NOT_INDEXED",
            IndexingStatus::NotFound => "NOT_FOUND",
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
}

impl Related<super::journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
