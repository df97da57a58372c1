use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::subscription::{
    NewSubscription as DomainNewSubscription, Subscription as DomainSubscription,
    SubscriptionFilters,
};
use crate::domain::types::{
    ExperienceLevel, NotificationFrequency, SalaryAmount, SubscriptionName, TypeConstraintError,
};

/// Diesel model representing the `subscriptions` table.
///
/// List-valued filters are stored as JSON arrays of their persisted text.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct Subscription {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_active: bool,
    pub frequency: String,
    pub keywords: String,
    pub job_types: String,
    pub remote_types: String,
    pub sources: String,
    pub salary_min: Option<i32>,
    pub category_id: Option<i32>,
    pub experience_level: Option<String>,
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Subscription`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(treat_none_as_null = true)]
pub struct NewSubscription {
    pub user_id: i32,
    pub name: String,
    pub is_active: bool,
    pub frequency: String,
    pub keywords: String,
    pub job_types: String,
    pub remote_types: String,
    pub sources: String,
    pub salary_min: Option<i32>,
    pub category_id: Option<i32>,
    pub experience_level: Option<String>,
    pub tags: String,
    pub updated_at: NaiveDateTime,
}

fn decode_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, TypeConstraintError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))
}

fn encode_list<T: Serialize>(items: &[T]) -> Result<String, TypeConstraintError> {
    serde_json::to_string(items).map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))
}

impl TryFrom<Subscription> for DomainSubscription {
    type Error = TypeConstraintError;

    fn try_from(subscription: Subscription) -> Result<Self, Self::Error> {
        Ok(Self {
            id: subscription.id.try_into()?,
            user_id: subscription.user_id.try_into()?,
            name: SubscriptionName::new(subscription.name)?,
            is_active: subscription.is_active,
            frequency: NotificationFrequency::try_from(subscription.frequency)?,
            filters: SubscriptionFilters {
                keywords: decode_list(&subscription.keywords)?,
                job_types: decode_list(&subscription.job_types)?,
                remote_types: decode_list(&subscription.remote_types)?,
                sources: decode_list(&subscription.sources)?,
                salary_min: subscription.salary_min.map(SalaryAmount::new).transpose()?,
                category_id: subscription.category_id.map(TryInto::try_into).transpose()?,
                experience_level: subscription
                    .experience_level
                    .map(ExperienceLevel::try_from)
                    .transpose()?,
            },
            tags: decode_list(&subscription.tags)?,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        })
    }
}

impl NewSubscription {
    pub fn from_domain(
        subscription: &DomainNewSubscription,
        now: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        let filters = &subscription.filters;
        Ok(Self {
            user_id: subscription.user_id.get(),
            name: subscription.name.as_str().to_string(),
            is_active: subscription.is_active,
            frequency: subscription.frequency.as_str().to_string(),
            keywords: encode_list(&filters.keywords)?,
            job_types: encode_list(&filters.job_types)?,
            remote_types: encode_list(&filters.remote_types)?,
            sources: encode_list(&filters.sources)?,
            salary_min: filters.salary_min.map(|amount| amount.get()),
            category_id: filters.category_id.map(|id| id.get()),
            experience_level: filters.experience_level.map(String::from),
            tags: encode_list(&subscription.tags)?,
            updated_at: now,
        })
    }
}
