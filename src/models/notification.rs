use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewNotification as DomainNewNotification, NotificationEntry as DomainNotificationEntry,
};
use crate::domain::types::{NotificationStatus, RetryCount, TypeConstraintError};

/// Diesel model representing the `notification_queue` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notification_queue)]
pub struct NotificationEntry {
    pub id: i32,
    pub user_id: i32,
    pub subscription_id: i32,
    pub job_id: i32,
    pub status: String,
    pub scheduled_for: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notification_queue)]
pub struct NewNotification {
    pub user_id: i32,
    pub subscription_id: i32,
    pub job_id: i32,
    pub status: &'static str,
    pub scheduled_for: NaiveDateTime,
    pub retry_count: i32,
    pub created_at: NaiveDateTime,
}

impl TryFrom<NotificationEntry> for DomainNotificationEntry {
    type Error = TypeConstraintError;

    fn try_from(entry: NotificationEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entry.id.try_into()?,
            user_id: entry.user_id.try_into()?,
            subscription_id: entry.subscription_id.try_into()?,
            job_id: entry.job_id.try_into()?,
            status: NotificationStatus::try_from(entry.status)?,
            scheduled_for: entry.scheduled_for,
            sent_at: entry.sent_at,
            error_message: entry.error_message,
            retry_count: RetryCount::new(entry.retry_count)?,
            created_at: entry.created_at,
        })
    }
}

impl NewNotification {
    pub fn from_domain(notification: &DomainNewNotification, now: NaiveDateTime) -> Self {
        Self {
            user_id: notification.user_id.get(),
            subscription_id: notification.subscription_id.get(),
            job_id: notification.job_id.get(),
            status: NotificationStatus::Pending.as_str(),
            scheduled_for: notification.scheduled_for,
            retry_count: 0,
            created_at: now,
        }
    }
}
