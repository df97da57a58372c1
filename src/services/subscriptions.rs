//! Subscription management on behalf of an authenticated user.
//!
//! Every operation is scoped to the owner; touching someone else's
//! subscription is reported as [`ServiceError::NotFound`].

use crate::domain::subscription::Subscription;
use crate::domain::types::{SubscriptionId, UserId};
use crate::forms::subscriptions::SubscriptionFormPayload;
use crate::repository::{SubscriptionReader, SubscriptionWriter, TaxonomyReader};

use super::{ServiceError, ServiceResult};

fn ensure_category_exists<R: TaxonomyReader>(
    repo: &R,
    payload: &SubscriptionFormPayload,
) -> ServiceResult<()> {
    let Some(category_id) = payload.filters.category_id else {
        return Ok(());
    };
    match repo.get_category_by_id(category_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Form(format!("unknown category {category_id}"))),
    }
}

fn found(affected: usize) -> ServiceResult<()> {
    if affected == 0 {
        Err(ServiceError::NotFound)
    } else {
        Ok(())
    }
}

pub fn list_subscriptions<R>(user_id: UserId, repo: &R) -> ServiceResult<Vec<Subscription>>
where
    R: SubscriptionReader,
{
    Ok(repo.list_user_subscriptions(user_id)?)
}

pub fn get_subscription<R>(
    user_id: UserId,
    subscription_id: SubscriptionId,
    repo: &R,
) -> ServiceResult<Subscription>
where
    R: SubscriptionReader,
{
    repo.get_subscription_by_id(subscription_id, user_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_subscription<R>(
    user_id: UserId,
    payload: SubscriptionFormPayload,
    repo: &R,
) -> ServiceResult<SubscriptionId>
where
    R: SubscriptionWriter + TaxonomyReader,
{
    ensure_category_exists(repo, &payload)?;
    let subscription = payload.into_new_subscription(user_id);
    let id = repo.create_subscription(&subscription)?;
    log::info!("User {user_id} created subscription {id}");
    Ok(id)
}

/// Replaces every field of an existing subscription.
pub fn update_subscription<R>(
    user_id: UserId,
    subscription_id: SubscriptionId,
    payload: SubscriptionFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: SubscriptionWriter + TaxonomyReader,
{
    ensure_category_exists(repo, &payload)?;
    let subscription = payload.into_new_subscription(user_id);
    found(repo.update_subscription(subscription_id, &subscription)?)
}

/// Pauses or resumes a subscription without losing its criteria.
pub fn set_subscription_active<R>(
    user_id: UserId,
    subscription_id: SubscriptionId,
    is_active: bool,
    repo: &R,
) -> ServiceResult<()>
where
    R: SubscriptionWriter,
{
    found(repo.set_subscription_active(subscription_id, user_id, is_active)?)
}

pub fn delete_subscription<R>(
    user_id: UserId,
    subscription_id: SubscriptionId,
    repo: &R,
) -> ServiceResult<()>
where
    R: SubscriptionWriter,
{
    found(repo.delete_subscription(subscription_id, user_id)?)
}
