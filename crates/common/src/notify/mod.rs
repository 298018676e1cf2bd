//! Tenant-scoped event notifications
//!
//! The notifier is an explicitly-injected interface: collaborators that emit
//! events receive a `Arc<dyn Notifier>` rather than reaching for process-wide
//! state. The default implementation writes structured log events; a live
//! dispatcher (websocket fan-out, message bus) can be swapped in without
//! touching callers.

use crate::db::models::IndexingStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a notification, mirrored in the client UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A tenant-scoped notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            data: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Dispatches tenant-scoped notifications
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, tenant_id: Uuid, notification: Notification);
}

/// Default notifier: structured log events only
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, tenant_id: Uuid, notification: Notification) {
        tracing::info!(
            tenant_id = %tenant_id,
            kind = ?notification.kind,
            title = %notification.title,
            message = %notification.message,
            "Notification dispatched"
        );
    }
}

/// Notify that a paper's Scholar verification completed
pub async fn emit_paper_verified(
    notifier: &dyn Notifier,
    tenant_id: Uuid,
    paper_id: Uuid,
    status: IndexingStatus,
) {
    let kind = if status == IndexingStatus::Indexed {
        NotificationKind::Success
    } else {
        NotificationKind::Warning
    };

    let notification = Notification::new(
        kind,
        "Paper Verification Complete",
        format!("Paper verification status: {}", status.as_str()),
    )
    .with_data(serde_json::json!({
        "paperId": paper_id,
        "status": status.as_str(),
    }));

    notifier.notify(tenant_id, notification).await;
}

/// Notify that a reviewer invitation went out
pub async fn emit_reviewer_invited(
    notifier: &dyn Notifier,
    tenant_id: Uuid,
    reviewer_email: &str,
    paper_title: &str,
) {
    let notification = Notification::new(
        NotificationKind::Info,
        "Reviewer Invited",
        format!("Invitation sent to {} for \"{}\"", reviewer_email, paper_title),
    )
    .with_data(serde_json::json!({
        "reviewerEmail": reviewer_email,
        "paperTitle": paper_title,
    }));

    notifier.notify(tenant_id, notification).await;
}

/// Notify that a database application changed
pub async fn emit_application_updated(
    notifier: &dyn Notifier,
    tenant_id: Uuid,
    journal_name: &str,
    database: &str,
    status: &str,
) {
    let notification = Notification::new(
        NotificationKind::Info,
        "Database Application Updated",
        format!("{} application to {}: {}", journal_name, database, status),
    )
    .with_data(serde_json::json!({
        "journalName": journal_name,
        "database": database,
        "status": status,
    }));

    notifier.notify(tenant_id, notification).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingNotifier {
        seen: Mutex<Vec<(Uuid, Notification)>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, tenant_id: Uuid, notification: Notification) {
            self.seen.lock().unwrap().push((tenant_id, notification));
        }
    }

    #[test]
    fn test_paper_verified_kind_follows_status() {
        let notifier = RecordingNotifier {
            seen: Mutex::new(Vec::new()),
        };
        let tenant = Uuid::new_v4();
        let paper = Uuid::new_v4();

        tokio_test::block_on(async {
            emit_paper_verified(&notifier, tenant, paper, IndexingStatus::Indexed).await;
            emit_paper_verified(&notifier, tenant, paper, IndexingStatus::NotFound).await;
        });

        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1.kind, NotificationKind::Success);
        assert_eq!(seen[1].1.kind, NotificationKind::Warning);
    }

    #[test]
    fn test_notification_serializes_type_field() {
        let n = Notification::new(NotificationKind::Info, "t", "m");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "info");
        assert!(json.get("data").is_none());
    }
}
