use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    JobId, NotificationId, NotificationStatus, RetryCount, SubscriptionId, UserId,
};
use crate::domain::user::Recipient;

/// Row of the notification queue. Unique per (user, subscription, job).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub id: NotificationId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub job_id: JobId,
    pub status: NotificationStatus,
    pub scheduled_for: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub retry_count: RetryCount,
    pub created_at: NaiveDateTime,
}

/// A PENDING entry to be inserted by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub job_id: JobId,
    /// UTC instant the entry becomes due.
    pub scheduled_for: NaiveDateTime,
}

/// A due entry joined with its recipient, as read by the delivery worker.
#[derive(Debug, Clone)]
pub struct DueNotification {
    pub entry: NotificationEntry,
    pub recipient: Recipient,
}
