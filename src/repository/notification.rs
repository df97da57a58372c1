use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::notification::{DueNotification, NewNotification, NotificationEntry};
use crate::domain::types::{NotificationId, NotificationStatus};
use crate::domain::user::Recipient;
use crate::models::notification::{
    NewNotification as DbNewNotification, NotificationEntry as DbNotificationEntry,
};
use crate::models::user::User as DbUser;
use crate::repository::{
    DieselRepository, NotificationReader, NotificationWriter, RepositoryResult,
};

impl NotificationReader for DieselRepository {
    fn list_due_notifications(
        &self,
        now: NaiveDateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<DueNotification>> {
        use crate::schema::{notification_queue, users};

        let mut conn = self.conn()?;
        let mut due = Vec::new();

        loop {
            let remaining = limit - due.len() as i64;
            if remaining <= 0 {
                break;
            }

            let rows: Vec<(DbNotificationEntry, DbUser)> = notification_queue::table
                .inner_join(users::table)
                .filter(notification_queue::status.eq(NotificationStatus::Pending.as_str()))
                .filter(notification_queue::scheduled_for.le(now))
                .filter(users::is_banned.eq(false))
                .filter(users::email_notifications.eq(true))
                .order((
                    notification_queue::scheduled_for.asc(),
                    notification_queue::id.asc(),
                ))
                .limit(remaining)
                .select((DbNotificationEntry::as_select(), DbUser::as_select()))
                .load(&mut conn)?;

            if rows.is_empty() {
                break;
            }

            let mut rejected = 0;
            for (entry, user) in rows {
                let user_id = user.id;
                match Recipient::try_from(user) {
                    Ok(recipient) => {
                        let entry: NotificationEntry = entry.try_into()?;
                        due.push(DueNotification { entry, recipient });
                    }
                    // No deliverable address: fail the entry instead of returning it.
                    Err(e) => {
                        log::warn!("Failing notification {} for user {user_id}: {e}", entry.id);
                        diesel::update(notification_queue::table.find(entry.id))
                            .set((
                                notification_queue::status
                                    .eq(NotificationStatus::Failed.as_str()),
                                notification_queue::error_message
                                    .eq(Some(format!("invalid recipient address: {e}"))),
                                notification_queue::retry_count
                                    .eq(notification_queue::retry_count + 1),
                            ))
                            .execute(&mut conn)?;
                        rejected += 1;
                    }
                }
            }

            if rejected == 0 {
                break;
            }
        }

        Ok(due)
    }
}

impl NotificationWriter for DieselRepository {
    fn enqueue_notification(&self, notification: &NewNotification) -> RepositoryResult<bool> {
        use crate::schema::notification_queue;

        let mut conn = self.conn()?;
        let row = DbNewNotification::from_domain(notification, Utc::now().naive_utc());

        let affected = diesel::insert_into(notification_queue::table)
            .values(&row)
            .on_conflict((
                notification_queue::user_id,
                notification_queue::subscription_id,
                notification_queue::job_id,
            ))
            .do_nothing()
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    fn mark_notifications_sent(
        &self,
        ids: &[NotificationId],
        sent_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::notification_queue;

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let affected = diesel::update(
            notification_queue::table.filter(notification_queue::id.eq_any(raw_ids)),
        )
        .set((
            notification_queue::status.eq(NotificationStatus::Sent.as_str()),
            notification_queue::sent_at.eq(Some(sent_at)),
            notification_queue::error_message.eq(None::<String>),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn mark_notifications_failed(
        &self,
        ids: &[NotificationId],
        error_message: &str,
    ) -> RepositoryResult<usize> {
        use crate::schema::notification_queue;

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let affected = diesel::update(
            notification_queue::table.filter(notification_queue::id.eq_any(raw_ids)),
        )
        .set((
            notification_queue::status.eq(NotificationStatus::Failed.as_str()),
            notification_queue::error_message.eq(Some(error_message)),
            notification_queue::retry_count.eq(notification_queue::retry_count + 1),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
