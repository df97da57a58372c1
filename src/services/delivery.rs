//! Notification delivery worker.
//!
//! Sends one digest per (user, subscription) group of due entries. A failed
//! group is marked FAILED with the error and its retry counter bumped; it is
//! never re-queued automatically.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::domain::notification::DueNotification;
use crate::domain::types::{JobId, NotificationId, SubscriptionId, UserId};
use crate::mailer::{DigestRenderer, Mailer};
use crate::models::config::DeliveryConfig;
use crate::repository::{JobReader, NotificationReader, NotificationWriter, SubscriptionReader};

use super::ServiceResult;

#[derive(Debug, Clone, Copy)]
pub struct DeliverySettings {
    pub batch_limit: i64,
    pub group_delay: Duration,
}

impl From<&DeliveryConfig> for DeliverySettings {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            batch_limit: config.batch_limit,
            group_delay: Duration::from_millis(config.group_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub groups: usize,
    /// Entries marked SENT.
    pub sent: usize,
    /// Entries marked FAILED.
    pub failed: usize,
}

type GroupKey = (UserId, SubscriptionId);

/// Groups entries by recipient and subscription, keeping first-seen order.
fn group_due(due: Vec<DueNotification>) -> Vec<(GroupKey, Vec<DueNotification>)> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<DueNotification>)> = Vec::new();
    for item in due {
        let key = (item.entry.user_id, item.entry.subscription_id);
        match positions.get(&key) {
            Some(&index) => groups[index].1.push(item),
            None => {
                positions.insert(key, groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

async fn send_digest<R, M>(
    repo: &R,
    mailer: &M,
    renderer: &DigestRenderer,
    (user_id, subscription_id): GroupKey,
    items: &[DueNotification],
) -> Result<(), String>
where
    R: JobReader + SubscriptionReader,
    M: Mailer + ?Sized,
{
    let subscription = repo
        .get_subscription_by_id(subscription_id, user_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("subscription {subscription_id} no longer exists"))?;

    let job_ids: Vec<JobId> = items.iter().map(|item| item.entry.job_id).collect();
    let jobs = repo.list_jobs_by_ids(&job_ids).map_err(|e| e.to_string())?;
    if jobs.is_empty() {
        return Err("matched jobs no longer exist".to_string());
    }

    let email = renderer
        .render(&items[0].recipient, subscription.name.as_str(), &jobs)
        .map_err(|e| e.to_string())?;
    mailer.send(&email).await.map_err(|e| e.to_string())
}

/// Delivers every PENDING entry due at `now`, up to the batch limit.
pub async fn deliver_due_notifications<R, M>(
    repo: &R,
    mailer: &M,
    renderer: &DigestRenderer,
    settings: &DeliverySettings,
    now: NaiveDateTime,
) -> ServiceResult<DeliveryReport>
where
    R: NotificationReader + NotificationWriter + JobReader + SubscriptionReader,
    M: Mailer + ?Sized,
{
    let due = repo.list_due_notifications(now, settings.batch_limit)?;
    let groups = group_due(due);
    let mut report = DeliveryReport {
        groups: groups.len(),
        ..DeliveryReport::default()
    };

    for (index, (key, items)) in groups.iter().enumerate() {
        if index > 0 && !settings.group_delay.is_zero() {
            tokio::time::sleep(settings.group_delay).await;
        }
        let ids: Vec<NotificationId> = items.iter().map(|item| item.entry.id).collect();

        match send_digest(repo, mailer, renderer, *key, items).await {
            Ok(()) => {
                repo.mark_notifications_sent(&ids, Utc::now().naive_utc())?;
                report.sent += ids.len();
            }
            Err(message) => {
                log::error!(
                    "Failed to deliver digest for subscription {} to user {}: {message}",
                    key.1,
                    key.0
                );
                repo.mark_notifications_failed(&ids, &message)?;
                report.failed += ids.len();
            }
        }
    }

    log::info!(
        "Delivered {} digests: {} entries sent, {} failed",
        report.groups,
        report.sent,
        report.failed
    );
    Ok(report)
}
