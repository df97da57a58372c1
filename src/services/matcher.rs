//! Subscription matcher.

use crate::domain::job::JobPosting;
use crate::domain::subscription::Subscription;
use crate::domain::types::{JobId, NotificationFrequency, SubscriptionId, UserId};
use crate::repository::{JobReader, SubscriptionReader};

use super::ServiceResult;

/// A (subscription, job) pair that satisfied every criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub frequency: NotificationFrequency,
    pub job_id: JobId,
}

/// Whether `job` satisfies every criterion set on `subscription`.
///
/// Criteria combine with AND. Keywords and tags are each satisfied by any
/// single hit. Unset criteria always pass.
pub fn matches(subscription: &Subscription, job: &JobPosting) -> bool {
    let filters = &subscription.filters;

    if !filters.job_types.is_empty() && !filters.job_types.contains(&job.employment_type) {
        return false;
    }
    if !filters.remote_types.is_empty() && !filters.remote_types.contains(&job.remote_type) {
        return false;
    }
    if !filters.sources.is_empty() && !filters.sources.contains(&job.source) {
        return false;
    }
    if let Some(min) = filters.salary_min
        && !job.salary_min.is_some_and(|salary| salary >= min)
    {
        return false;
    }
    if filters.category_id.is_some() && job.category_id != filters.category_id {
        return false;
    }
    if filters.experience_level.is_some() && job.experience_level != filters.experience_level {
        return false;
    }

    if !filters.keywords.is_empty() {
        let haystack = format!("{}\n{}\n{}", job.title, job.description, job.company_name)
            .to_lowercase();
        let hit = filters
            .keywords
            .iter()
            .any(|keyword| haystack.contains(&keyword.to_lowercase()));
        if !hit {
            return false;
        }
    }

    if !subscription.tags.is_empty() {
        let hit = subscription.tags.iter().any(|tag| {
            job.skills
                .iter()
                .any(|skill| skill.as_str().eq_ignore_ascii_case(tag.as_str()))
        });
        if !hit {
            return false;
        }
    }

    true
}

/// Every matching pair over the cross product of subscriptions and jobs.
pub fn match_jobs(subscriptions: &[Subscription], jobs: &[JobPosting]) -> Vec<MatchedPair> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.is_active)
        .flat_map(|subscription| {
            jobs.iter()
                .filter(move |job| matches(subscription, job))
                .map(move |job| MatchedPair {
                    subscription_id: subscription.id,
                    user_id: subscription.user_id,
                    frequency: subscription.frequency,
                    job_id: job.id,
                })
        })
        .collect()
}

/// Loads the new postings and eligible subscriptions and matches them.
pub fn match_new_jobs<R>(repo: &R, job_ids: &[JobId]) -> ServiceResult<Vec<MatchedPair>>
where
    R: JobReader + SubscriptionReader,
{
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }
    let jobs = repo.list_jobs_by_ids(job_ids)?;
    let subscriptions = repo.list_active_subscriptions()?;
    let pairs = match_jobs(&subscriptions, &jobs);
    log::info!(
        "Matched {} jobs against {} subscriptions: {} pairs",
        jobs.len(),
        subscriptions.len(),
        pairs.len()
    );
    Ok(pairs)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{NaiveDateTime, Utc};

    use super::*;
    use crate::domain::subscription::SubscriptionFilters;
    use crate::domain::types::{
        ApplyMethod, CategoryId, CompanyName, EmploymentType, ExperienceLevel, JobSource,
        JobStatus, JobTitle, Keyword, RemoteType, SalaryAmount, SkillName, SourceUrl,
        SubscriptionName,
    };

    pub(crate) fn job(id: i32) -> JobPosting {
        let now: NaiveDateTime = Utc::now().naive_utc();
        JobPosting {
            id: JobId::new(id).unwrap(),
            title: JobTitle::new("Senior React Developer").unwrap(),
            company_name: CompanyName::new("Acme Remote").unwrap(),
            company_logo: None,
            company_website: None,
            employment_type: EmploymentType::FullTime,
            remote_type: RemoteType::FullyRemote,
            location: None,
            description: "Build our dashboard.".into(),
            requirements: None,
            apply_method: ApplyMethod::new("https://acme.dev/apply").unwrap(),
            source: JobSource::RemoteOk,
            source_url: SourceUrl::new(format!("https://remoteok.com/remote-jobs/{id}")).unwrap(),
            status: JobStatus::Published,
            category_id: None,
            experience_level: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            published_at: now,
            created_at: now,
            updated_at: now,
            skills: vec![],
        }
    }

    pub(crate) fn subscription(id: i32, user: i32) -> Subscription {
        let now = Utc::now().naive_utc();
        Subscription {
            id: SubscriptionId::new(id).unwrap(),
            user_id: UserId::new(user).unwrap(),
            name: SubscriptionName::new("Frontend").unwrap(),
            is_active: true,
            frequency: NotificationFrequency::Daily,
            filters: SubscriptionFilters::default(),
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn skills(names: &[&str]) -> Vec<SkillName> {
        names.iter().map(|n| SkillName::new(*n).unwrap()).collect()
    }

    #[test]
    fn job_type_and_salary_are_conjunctive() {
        let mut sub = subscription(1, 1);
        sub.filters.job_types = vec![EmploymentType::FullTime];
        sub.filters.salary_min = Some(SalaryAmount::new(80_000).unwrap());

        let mut contract = job(1);
        contract.employment_type = EmploymentType::Contract;
        contract.salary_min = Some(SalaryAmount::new(200_000).unwrap());
        assert!(!matches(&sub, &contract));

        let mut full_time = job(2);
        full_time.salary_min = Some(SalaryAmount::new(90_000).unwrap());
        assert!(matches(&sub, &full_time));

        let unpaid = job(3);
        assert!(!matches(&sub, &unpaid), "salary filter requires a known salary");
    }

    #[test]
    fn tags_need_one_common_element() {
        let mut sub = subscription(1, 1);
        sub.tags = skills(&["React", "TypeScript"]);

        let mut with_b = job(1);
        with_b.skills = skills(&["TypeScript"]);
        assert!(matches(&sub, &with_b));

        let mut with_c = job(2);
        with_c.skills = skills(&["Rust"]);
        assert!(!matches(&sub, &with_c));

        let mut lower = job(3);
        lower.skills = skills(&["typescript"]);
        assert!(matches(&sub, &lower));
    }

    #[test]
    fn keywords_search_title_description_and_company() {
        let mut sub = subscription(1, 1);
        sub.filters.keywords = vec![
            Keyword::new("golang").unwrap(),
            Keyword::new("ACME").unwrap(),
        ];
        assert!(matches(&sub, &job(1)));

        sub.filters.keywords = vec![Keyword::new("golang").unwrap()];
        assert!(!matches(&sub, &job(1)));
    }

    #[test]
    fn exact_criteria_compare_by_equality() {
        let mut sub = subscription(1, 1);
        sub.filters.category_id = Some(CategoryId::new(6).unwrap());
        sub.filters.experience_level = Some(ExperienceLevel::Senior);
        sub.filters.sources = vec![JobSource::RemoteOk];
        sub.filters.remote_types = vec![RemoteType::FullyRemote];

        let mut hit = job(1);
        hit.category_id = Some(CategoryId::new(6).unwrap());
        hit.experience_level = Some(ExperienceLevel::Senior);
        assert!(matches(&sub, &hit));

        let mut other_category = hit.clone();
        other_category.category_id = Some(CategoryId::new(2).unwrap());
        assert!(!matches(&sub, &other_category));

        let mut other_source = hit.clone();
        other_source.source = JobSource::V2ex;
        assert!(!matches(&sub, &other_source));

        let mut hybrid = hit;
        hybrid.remote_type = RemoteType::Hybrid;
        assert!(!matches(&sub, &hybrid));
    }

    #[test]
    fn empty_subscription_matches_everything() {
        let sub = subscription(1, 1);
        let mut odd = job(1);
        odd.employment_type = EmploymentType::Internship;
        odd.remote_type = RemoteType::Occasional;
        assert!(matches(&sub, &odd));
    }

    #[test]
    fn match_jobs_skips_paused_subscriptions() {
        let active = subscription(1, 1);
        let mut paused = subscription(2, 2);
        paused.is_active = false;

        let pairs = match_jobs(&[active, paused], &[job(10), job(11)]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.subscription_id.get() == 1));
        assert_eq!(pairs[0].job_id.get(), 10);
        assert_eq!(pairs[0].frequency, NotificationFrequency::Daily);
    }
}
