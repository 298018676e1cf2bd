//! SeaORM entity models
//!
//! Database entities for the STM Index platform

mod audit_log;
mod database_application;
mod database_config;
mod journal;
mod paper;
mod reviewer;
mod user;

pub use journal::{
    Entity as JournalEntity,
    Model as Journal,
    ActiveModel as JournalActiveModel,
    Column as JournalColumn,
    JournalStatus,
};

pub use paper::{
    Entity as PaperEntity,
    Model as Paper,
    ActiveModel as PaperActiveModel,
    Column as PaperColumn,
    IndexingStatus,
};

pub use reviewer::{
    Entity as ReviewerEntity,
    Model as Reviewer,
    ActiveModel as ReviewerActiveModel,
    Column as ReviewerColumn,
};

pub use database_config::{
    Entity as DatabaseConfigEntity,
    Model as DatabaseConfig,
    ActiveModel as DatabaseConfigActiveModel,
    Column as DatabaseConfigColumn,
};

pub use database_application::{
    Entity as DatabaseApplicationEntity,
    Model as DatabaseApplication,
    ActiveModel as DatabaseApplicationActiveModel,
    Column as DatabaseApplicationColumn,
    ApplicationStatus,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    UserRole,
};

pub use audit_log::{
    Entity as AuditLogEntity,
    Model as AuditLog,
    ActiveModel as AuditLogActiveModel,
    Column as AuditLogColumn,
};
