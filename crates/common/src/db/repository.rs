//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling. All list queries are tenant-scoped;
//! tenant isolation lives here, not in the scoring core.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Fields for a new journal
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub name: String,
    pub code: String,
    pub issn: String,
    pub status: JournalStatus,
    pub wordpress_url: Option<String>,
}

/// Fields for a new paper
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub title: String,
    pub authors: String,
    pub doi: String,
    pub journal_id: Uuid,
    pub pub_date: DateTime<Utc>,
}

/// Fields for a new reviewer
#[derive(Debug, Clone)]
pub struct NewReviewer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub institution: Option<String>,
    pub expertise: String,
    pub rating: f64,
}

/// Partial reviewer update; unset fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct ReviewerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub institution: Option<Option<String>>,
    pub expertise: Option<String>,
    pub rating: Option<f64>,
}

/// Fields for a new indexing database configuration
#[derive(Debug, Clone)]
pub struct NewDatabaseConfig {
    pub name: String,
    pub enabled: bool,
    pub check_frequency: String,
}

/// Partial database config update
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfigUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub check_frequency: Option<String>,
}

/// Repository for data access operations
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Find user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Journal Operations
    // ========================================================================

    /// List journals for a tenant, most recently updated first
    pub async fn list_journals(&self, tenant_id: Uuid) -> Result<Vec<Journal>> {
        JournalEntity::find()
            .filter(JournalColumn::TenantId.eq(tenant_id))
            .order_by_desc(JournalColumn::UpdatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All journals across tenants, for scheduled background reports
    pub async fn all_journals(&self) -> Result<Vec<Journal>> {
        JournalEntity::find()
            .order_by_asc(JournalColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find journal by ID
    pub async fn find_journal_by_id(&self, id: Uuid) -> Result<Option<Journal>> {
        JournalEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a new journal
    pub async fn create_journal(&self, tenant_id: Uuid, input: NewJournal) -> Result<Journal> {
        let now = Utc::now();

        let journal = JournalActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name),
            code: Set(input.code),
            issn: Set(input.issn),
            status: Set(input.status),
            wordpress_url: Set(input.wordpress_url),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        journal.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Bump a journal's updated_at, recording a completed sync
    pub async fn touch_journal(&self, id: Uuid) -> Result<()> {
        let journal = JournalActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        journal.update(self.write_conn()).await?;
        Ok(())
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// List papers for a tenant with their journals, newest first
    pub async fn list_papers(&self, tenant_id: Uuid) -> Result<Vec<(Paper, Option<Journal>)>> {
        PaperEntity::find()
            .filter(PaperColumn::TenantId.eq(tenant_id))
            .order_by_desc(PaperColumn::CreatedAt)
            .find_also_related(JournalEntity)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers for a tenant ordered by publication date, newest first
    pub async fn list_papers_by_pub_date(&self, tenant_id: Uuid) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::TenantId.eq(tenant_id))
            .order_by_desc(PaperColumn::PubDate)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find paper by ID
    pub async fn find_paper_by_id(&self, id: Uuid) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find paper by DOI
    pub async fn find_paper_by_doi(&self, doi: &str) -> Result<Option<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::Doi.eq(doi))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Papers belonging to a journal
    pub async fn papers_for_journal(&self, journal_id: Uuid) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(PaperColumn::JournalId.eq(journal_id))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a new paper
    pub async fn create_paper(&self, tenant_id: Uuid, input: NewPaper) -> Result<Paper> {
        let now = Utc::now();

        let paper = PaperActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            journal_id: Set(input.journal_id),
            title: Set(input.title),
            authors: Set(input.authors),
            doi: Set(input.doi),
            indexing_status: Set(IndexingStatus::Pending),
            scholar_url: Set(None),
            pub_date: Set(input.pub_date.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        paper.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Insert or update a paper keyed by DOI (WordPress import path)
    pub async fn upsert_paper_by_doi(
        &self,
        tenant_id: Uuid,
        input: NewPaper,
    ) -> Result<Paper> {
        if let Some(existing) = self.find_paper_by_doi(&input.doi).await? {
            let paper = PaperActiveModel {
                id: Set(existing.id),
                title: Set(input.title),
                pub_date: Set(input.pub_date.into()),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            };
            paper.update(self.write_conn()).await.map_err(Into::into)
        } else {
            self.create_paper(tenant_id, input).await
        }
    }

    /// Record the outcome of a Scholar verification
    pub async fn update_paper_indexing(
        &self,
        id: Uuid,
        status: IndexingStatus,
        scholar_url: Option<String>,
    ) -> Result<Paper> {
        let paper = PaperActiveModel {
            id: Set(id),
            indexing_status: Set(status),
            scholar_url: Set(scholar_url),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        paper.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Papers due for Scholar verification: never indexed, or stale and
    /// not yet confirmed as indexed
    pub async fn verification_candidates(
        &self,
        stale_before: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .filter(
                Condition::any()
                    .add(PaperColumn::IndexingStatus.eq(IndexingStatus::NotIndexed))
                    .add(
                        Condition::all()
                            .add(PaperColumn::UpdatedAt.lt(stale_before))
                            .add(PaperColumn::IndexingStatus.ne(IndexingStatus::Indexed)),
                    ),
            )
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Reviewer Operations
    // ========================================================================

    /// List reviewers for a tenant, alphabetical by last name
    pub async fn list_reviewers(&self, tenant_id: Uuid) -> Result<Vec<Reviewer>> {
        ReviewerEntity::find()
            .filter(ReviewerColumn::TenantId.eq(tenant_id))
            .order_by_asc(ReviewerColumn::LastName)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find reviewer by ID
    pub async fn find_reviewer_by_id(&self, id: Uuid) -> Result<Option<Reviewer>> {
        ReviewerEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a new reviewer
    pub async fn create_reviewer(&self, tenant_id: Uuid, input: NewReviewer) -> Result<Reviewer> {
        let now = Utc::now();

        let reviewer = ReviewerActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            institution: Set(input.institution),
            expertise: Set(input.expertise),
            rating: Set(input.rating),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        reviewer.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Apply a partial update to a reviewer
    pub async fn update_reviewer(&self, id: Uuid, update: ReviewerUpdate) -> Result<Reviewer> {
        let mut reviewer = ReviewerActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            reviewer.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            reviewer.last_name = Set(last_name);
        }
        if let Some(email) = update.email {
            reviewer.email = Set(email);
        }
        if let Some(institution) = update.institution {
            reviewer.institution = Set(institution);
        }
        if let Some(expertise) = update.expertise {
            reviewer.expertise = Set(expertise);
        }
        if let Some(rating) = update.rating {
            reviewer.rating = Set(rating);
        }

        reviewer.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete reviewer by ID
    pub async fn delete_reviewer(&self, id: Uuid) -> Result<bool> {
        let result = ReviewerEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Database Config Operations
    // ========================================================================

    /// List database configs for a tenant, alphabetical
    pub async fn list_database_configs(
        &self,
        tenant_id: Uuid,
        enabled_only: bool,
    ) -> Result<Vec<DatabaseConfig>> {
        let mut query = DatabaseConfigEntity::find()
            .filter(DatabaseConfigColumn::TenantId.eq(tenant_id));

        if enabled_only {
            query = query.filter(DatabaseConfigColumn::Enabled.eq(true));
        }

        query
            .order_by_asc(DatabaseConfigColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find database config by ID
    pub async fn find_database_config_by_id(&self, id: Uuid) -> Result<Option<DatabaseConfig>> {
        DatabaseConfigEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a new database config
    pub async fn create_database_config(
        &self,
        tenant_id: Uuid,
        input: NewDatabaseConfig,
    ) -> Result<DatabaseConfig> {
        let now = Utc::now();

        let db_config = DatabaseConfigActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name),
            enabled: Set(input.enabled),
            check_frequency: Set(input.check_frequency),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        db_config.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Apply a partial update to a database config
    pub async fn update_database_config(
        &self,
        id: Uuid,
        update: DatabaseConfigUpdate,
    ) -> Result<DatabaseConfig> {
        let mut db_config = DatabaseConfigActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            db_config.name = Set(name);
        }
        if let Some(enabled) = update.enabled {
            db_config.enabled = Set(enabled);
        }
        if let Some(check_frequency) = update.check_frequency {
            db_config.check_frequency = Set(check_frequency);
        }

        db_config.update(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Database Application Operations
    // ========================================================================

    /// Applications for a journal with their database configs
    pub async fn applications_for_journal(
        &self,
        journal_id: Uuid,
    ) -> Result<Vec<(DatabaseApplication, Option<DatabaseConfig>)>> {
        DatabaseApplicationEntity::find()
            .filter(DatabaseApplicationColumn::JournalId.eq(journal_id))
            .find_also_related(DatabaseConfigEntity)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create or update the application for a (journal, database) pair
    pub async fn upsert_application(
        &self,
        tenant_id: Uuid,
        journal_id: Uuid,
        database_config_id: Uuid,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<DatabaseApplication> {
        let now = Utc::now();

        let existing = DatabaseApplicationEntity::find()
            .filter(DatabaseApplicationColumn::JournalId.eq(journal_id))
            .filter(DatabaseApplicationColumn::DatabaseConfigId.eq(database_config_id))
            .one(self.read_conn())
            .await?;

        if let Some(existing) = existing {
            let application = DatabaseApplicationActiveModel {
                id: Set(existing.id),
                status: Set(status),
                notes: Set(notes),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            application.update(self.write_conn()).await.map_err(Into::into)
        } else {
            let application = DatabaseApplicationActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                journal_id: Set(journal_id),
                database_config_id: Set(database_config_id),
                status: Set(status),
                notes: Set(notes),
                submitted_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            application.insert(self.write_conn()).await.map_err(Into::into)
        }
    }

    /// Count accepted applications against a database config
    pub async fn accepted_applications_for_config(&self, config_id: Uuid) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        DatabaseApplicationEntity::find()
            .filter(DatabaseApplicationColumn::DatabaseConfigId.eq(config_id))
            .filter(DatabaseApplicationColumn::Status.eq(ApplicationStatus::Accepted))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Audit Log Operations
    // ========================================================================

    /// Record an audit entry. Audit failures are logged and swallowed so
    /// they never fail the action being audited.
    pub async fn record_action(
        &self,
        action: &str,
        user_id: Option<Uuid>,
        tenant_id: Uuid,
        details: Option<String>,
    ) {
        let entry = AuditLogActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            action: Set(action.to_string()),
            user_id: Set(user_id),
            details: Set(details),
            timestamp: Set(Utc::now().into()),
        };

        if let Err(e) = entry.insert(self.write_conn()).await {
            tracing::warn!(error = %e, action, "Audit log write failed");
        }
    }

    /// List audit logs for a tenant, newest first
    pub async fn list_audit_logs(&self, tenant_id: Uuid) -> Result<Vec<(AuditLog, Option<User>)>> {
        AuditLogEntity::find()
            .filter(AuditLogColumn::TenantId.eq(tenant_id))
            .order_by_desc(AuditLogColumn::Timestamp)
            .find_also_related(UserEntity)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}
