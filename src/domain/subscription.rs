use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, EmploymentType, ExperienceLevel, JobSource, Keyword, NotificationFrequency,
    RemoteType, SalaryAmount, SkillName, SubscriptionId, SubscriptionName, UserId,
};

/// Optional criteria of a subscription. Empty lists and `None` mean "any".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionFilters {
    pub keywords: Vec<Keyword>,
    pub job_types: Vec<EmploymentType>,
    pub remote_types: Vec<RemoteType>,
    pub sources: Vec<JobSource>,
    pub salary_min: Option<SalaryAmount>,
    pub category_id: Option<CategoryId>,
    pub experience_level: Option<ExperienceLevel>,
}

/// A user's saved search with a delivery cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub name: SubscriptionName,
    pub is_active: bool,
    pub frequency: NotificationFrequency,
    pub filters: SubscriptionFilters,
    pub tags: Vec<SkillName>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert or fully replace a [`Subscription`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub name: SubscriptionName,
    pub is_active: bool,
    pub frequency: NotificationFrequency,
    pub filters: SubscriptionFilters,
    pub tags: Vec<SkillName>,
}
