use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::subscription::{NewSubscription, SubscriptionFilters};
use crate::domain::types::{
    CategoryId, EmploymentType, ExperienceLevel, JobSource, Keyword, NotificationFrequency,
    RemoteType, SalaryAmount, SkillName, SubscriptionName, TypeConstraintError, UserId,
};

fn default_true() -> bool {
    true
}

/// Raw subscription input, used for both creation and full replacement.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscriptionForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub frequency: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub job_types: Vec<String>,
    #[serde(default)]
    pub remote_types: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    pub experience_level: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFormPayload {
    pub name: SubscriptionName,
    pub is_active: bool,
    pub frequency: NotificationFrequency,
    pub filters: SubscriptionFilters,
    pub tags: Vec<SkillName>,
}

impl SubscriptionFormPayload {
    pub fn into_new_subscription(self, user_id: UserId) -> NewSubscription {
        NewSubscription {
            user_id,
            name: self.name,
            is_active: self.is_active,
            frequency: self.frequency,
            filters: self.filters,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionFormError {
    #[error("Subscription form validation failed: {0}")]
    Validation(String),
    #[error("Subscription form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for SubscriptionFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SubscriptionFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Parses every non-blank entry, dropping case-insensitive repeats.
fn parse_list<T, F>(values: Vec<String>, parse: F) -> Result<Vec<T>, TypeConstraintError>
where
    T: PartialEq,
    F: Fn(&str) -> Result<T, TypeConstraintError>,
{
    let mut parsed = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        parsed.push(parse(trimmed)?);
    }
    Ok(parsed)
}

impl TryFrom<SubscriptionForm> for SubscriptionFormPayload {
    type Error = SubscriptionFormError;

    fn try_from(value: SubscriptionForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let filters = SubscriptionFilters {
            keywords: parse_list(value.keywords, |v| Keyword::new(v))?,
            job_types: parse_list(value.job_types, |v| EmploymentType::try_from(v))?,
            remote_types: parse_list(value.remote_types, |v| RemoteType::try_from(v))?,
            sources: parse_list(value.sources, |v| JobSource::try_from(v))?,
            salary_min: value.salary_min.map(SalaryAmount::new).transpose()?,
            category_id: value.category_id.map(CategoryId::new).transpose()?,
            experience_level: value
                .experience_level
                .as_deref()
                .filter(|level| !level.trim().is_empty())
                .map(ExperienceLevel::try_from)
                .transpose()?,
        };

        Ok(Self {
            name: SubscriptionName::new(value.name)?,
            is_active: value.is_active,
            frequency: NotificationFrequency::try_from(value.frequency.as_str())?,
            filters,
            tags: parse_list(value.tags, |v| SkillName::new(v))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SubscriptionForm {
        SubscriptionForm {
            name: "Remote React".into(),
            is_active: true,
            frequency: "daily".into(),
            keywords: vec!["react".into(), " ".into(), "React".into()],
            job_types: vec!["full-time".into()],
            remote_types: vec![],
            sources: vec!["remote_ok".into()],
            salary_min: Some(80_000),
            category_id: None,
            experience_level: Some("senior".into()),
            tags: vec!["TypeScript".into()],
        }
    }

    #[test]
    fn parses_lenient_enum_values() {
        let payload = SubscriptionFormPayload::try_from(form()).unwrap();
        assert_eq!(payload.frequency, NotificationFrequency::Daily);
        assert_eq!(payload.filters.job_types, vec![EmploymentType::FullTime]);
        assert_eq!(payload.filters.sources, vec![JobSource::RemoteOk]);
        assert_eq!(payload.filters.experience_level, Some(ExperienceLevel::Senior));
        assert_eq!(payload.filters.keywords.len(), 1);
        assert_eq!(payload.tags[0].as_str(), "TypeScript");
    }

    #[test]
    fn rejects_missing_name() {
        let mut input = form();
        input.name = String::new();
        assert!(matches!(
            SubscriptionFormPayload::try_from(input),
            Err(SubscriptionFormError::Validation(_))
        ));

        let mut blank = form();
        blank.name = "   ".into();
        assert!(matches!(
            SubscriptionFormPayload::try_from(blank),
            Err(SubscriptionFormError::TypeConstraint(_))
        ));
    }

    #[test]
    fn rejects_unknown_enum_values_and_negative_salary() {
        let mut input = form();
        input.job_types = vec!["gig".into()];
        assert!(matches!(
            SubscriptionFormPayload::try_from(input),
            Err(SubscriptionFormError::TypeConstraint(_))
        ));

        let mut input = form();
        input.salary_min = Some(-1);
        assert!(matches!(
            SubscriptionFormPayload::try_from(input),
            Err(SubscriptionFormError::Validation(_))
        ));
    }

    #[test]
    fn caps_keyword_and_tag_counts() {
        let mut input = form();
        input.tags = (0..21).map(|i| format!("tag{i}")).collect();
        assert!(matches!(
            SubscriptionFormPayload::try_from(input),
            Err(SubscriptionFormError::Validation(_))
        ));
    }
}
