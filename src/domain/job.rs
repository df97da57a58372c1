use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ApplyMethod, CategoryId, CompanyName, EmploymentType, ExperienceLevel, JobId, JobSource,
    JobStatus, JobTitle, LogoUrl, RemoteType, SalaryAmount, SkillName, SourceUrl, WebsiteUrl,
};

/// Canonical job posting every source adapter converges on.
///
/// `source_url` is the idempotency key: two postings with the same source URL
/// are the same entity and only one row may ever exist for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: JobTitle,
    pub company_name: CompanyName,
    pub company_logo: Option<LogoUrl>,
    pub company_website: Option<WebsiteUrl>,
    pub employment_type: EmploymentType,
    pub remote_type: RemoteType,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_method: ApplyMethod,
    pub source: JobSource,
    pub source_url: SourceUrl,
    pub status: JobStatus,
    pub category_id: Option<CategoryId>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_min: Option<SalaryAmount>,
    pub salary_max: Option<SalaryAmount>,
    pub currency: Option<String>,
    pub published_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Skill names associated with the posting; these double as its tags.
    pub skills: Vec<SkillName>,
}

/// Information required to persist a new [`JobPosting`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewJobPosting {
    pub title: JobTitle,
    pub company_name: CompanyName,
    pub company_logo: Option<LogoUrl>,
    pub company_website: Option<WebsiteUrl>,
    pub employment_type: EmploymentType,
    pub remote_type: RemoteType,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_method: ApplyMethod,
    pub source: JobSource,
    pub source_url: SourceUrl,
    pub status: JobStatus,
    pub category_id: Option<CategoryId>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_min: Option<SalaryAmount>,
    pub salary_max: Option<SalaryAmount>,
    pub currency: Option<String>,
    pub published_at: NaiveDateTime,
}
