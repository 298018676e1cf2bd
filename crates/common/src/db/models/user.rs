//! User entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub email: String,

    /// Compared by equality at login. Plaintext storage is a known
    /// limitation of the platform, kept for drop-in compatibility.
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(column_type = "Text")]
    pub display_name: String,

    pub role: UserRole,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,

    #[sea_orm(string_value = "JOURNAL_MANAGER")]
    JournalManager,

    #[sea_orm(string_value = "EDITOR")]
    Editor,

    #[sea_orm(string_value = "AUDITOR")]
    Auditor,

    #[sea_orm(string_value = "USER")]
    User,
}

impl UserRole {
    /// Wire representation, matching the stored enum value
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::JournalManager => "JOURNAL_MANAGER",
            UserRole::Editor => "EDITOR",
            UserRole::Auditor => "AUDITOR",
            UserRole::User => "USER",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::audit_log::Entity")]
    AuditLogs,
}

impl Related<super::audit_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
