use chrono::Utc;
use diesel::prelude::*;

use crate::domain::subscription::{NewSubscription, Subscription};
use crate::domain::types::{SubscriptionId, UserId};
use crate::models::subscription::{
    NewSubscription as DbNewSubscription, Subscription as DbSubscription,
};
use crate::repository::{
    DieselRepository, RepositoryResult, SubscriptionReader, SubscriptionWriter,
};

impl SubscriptionReader for DieselRepository {
    fn list_active_subscriptions(&self) -> RepositoryResult<Vec<Subscription>> {
        use crate::schema::{subscriptions, users};

        let mut conn = self.conn()?;

        let items = subscriptions::table
            .inner_join(users::table)
            .filter(subscriptions::is_active.eq(true))
            .filter(users::is_banned.eq(false))
            .filter(users::email_notifications.eq(true))
            .order(subscriptions::id.asc())
            .select(DbSubscription::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Subscription>, _>>()?;

        Ok(items)
    }

    fn list_user_subscriptions(&self, user_id: UserId) -> RepositoryResult<Vec<Subscription>> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;

        let items = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id.get()))
            .order(subscriptions::created_at.desc())
            .select(DbSubscription::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Subscription>, _>>()?;

        Ok(items)
    }

    fn get_subscription_by_id(
        &self,
        id: SubscriptionId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Subscription>> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;

        let subscription = subscriptions::table
            .filter(subscriptions::id.eq(id.get()))
            .filter(subscriptions::user_id.eq(user_id.get()))
            .select(DbSubscription::as_select())
            .first(&mut conn)
            .optional()?;

        let subscription = subscription.map(TryInto::try_into).transpose()?;
        Ok(subscription)
    }
}

impl SubscriptionWriter for DieselRepository {
    fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> RepositoryResult<SubscriptionId> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let row = DbNewSubscription::from_domain(subscription, now)?;

        let id: i32 = diesel::insert_into(subscriptions::table)
            .values((&row, subscriptions::created_at.eq(now)))
            .returning(subscriptions::id)
            .get_result(&mut conn)?;

        Ok(SubscriptionId::new(id)?)
    }

    fn update_subscription(
        &self,
        id: SubscriptionId,
        subscription: &NewSubscription,
    ) -> RepositoryResult<usize> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;
        let row = DbNewSubscription::from_domain(subscription, Utc::now().naive_utc())?;

        let affected = diesel::update(
            subscriptions::table
                .filter(subscriptions::id.eq(id.get()))
                .filter(subscriptions::user_id.eq(subscription.user_id.get())),
        )
        .set(&row)
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_subscription_active(
        &self,
        id: SubscriptionId,
        user_id: UserId,
        is_active: bool,
    ) -> RepositoryResult<usize> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            subscriptions::table
                .filter(subscriptions::id.eq(id.get()))
                .filter(subscriptions::user_id.eq(user_id.get())),
        )
        .set((
            subscriptions::is_active.eq(is_active),
            subscriptions::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_subscription(
        &self,
        id: SubscriptionId,
        user_id: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::subscriptions;

        let mut conn = self.conn()?;

        let affected = diesel::delete(
            subscriptions::table
                .filter(subscriptions::id.eq(id.get()))
                .filter(subscriptions::user_id.eq(user_id.get())),
        )
        .execute(&mut conn)?;

        Ok(affected)
    }
}
