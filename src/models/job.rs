use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::job::{JobPosting as DomainJobPosting, NewJobPosting as DomainNewJobPosting};
use crate::domain::types::{
    ApplyMethod, CompanyName, EmploymentType, ExperienceLevel, JobSource, JobStatus, JobTitle,
    LogoUrl, RemoteType, SalaryAmount, SkillName, SourceUrl, TypeConstraintError, WebsiteUrl,
};

/// Diesel model representing a row in the `job_postings` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::job_postings)]
pub struct JobPosting {
    pub id: i32,
    pub title: String,
    pub company_name: String,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub employment_type: String,
    pub remote_type: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub apply_method: String,
    pub source: String,
    pub source_url: String,
    pub status: String,
    pub category_id: Option<i32>,
    pub experience_level: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub published_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`JobPosting`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::job_postings)]
pub struct NewJobPosting<'a> {
    pub title: &'a str,
    pub company_name: &'a str,
    pub company_logo: Option<&'a str>,
    pub company_website: Option<&'a str>,
    pub employment_type: &'static str,
    pub remote_type: &'static str,
    pub location: Option<&'a str>,
    pub description: &'a str,
    pub requirements: Option<&'a str>,
    pub apply_method: &'a str,
    pub source: &'static str,
    pub source_url: &'a str,
    pub status: &'static str,
    pub category_id: Option<i32>,
    pub experience_level: Option<&'static str>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<&'a str>,
    pub published_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JobPosting {
    /// Convert the row into a domain posting carrying the given skill names.
    pub fn into_domain(self, skills: Vec<String>) -> Result<DomainJobPosting, TypeConstraintError> {
        Ok(DomainJobPosting {
            id: self.id.try_into()?,
            title: JobTitle::new(self.title)?,
            company_name: CompanyName::new(self.company_name)?,
            company_logo: self.company_logo.map(LogoUrl::new).transpose()?,
            company_website: self.company_website.map(WebsiteUrl::new).transpose()?,
            employment_type: EmploymentType::try_from(self.employment_type)?,
            remote_type: RemoteType::try_from(self.remote_type)?,
            location: self.location,
            description: self.description,
            requirements: self.requirements,
            apply_method: ApplyMethod::new(self.apply_method)?,
            source: JobSource::try_from(self.source)?,
            source_url: SourceUrl::new(self.source_url)?,
            status: JobStatus::try_from(self.status)?,
            category_id: self.category_id.map(TryInto::try_into).transpose()?,
            experience_level: self
                .experience_level
                .map(ExperienceLevel::try_from)
                .transpose()?,
            salary_min: self.salary_min.map(SalaryAmount::new).transpose()?,
            salary_max: self.salary_max.map(SalaryAmount::new).transpose()?,
            currency: self.currency,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            skills: skills
                .into_iter()
                .map(SkillName::new)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl TryFrom<JobPosting> for DomainJobPosting {
    type Error = TypeConstraintError;

    fn try_from(job: JobPosting) -> Result<Self, Self::Error> {
        job.into_domain(Vec::new())
    }
}

impl<'a> NewJobPosting<'a> {
    /// Borrow a domain posting for insertion, stamping `created_at`/`updated_at`.
    pub fn from_domain(job: &'a DomainNewJobPosting, now: NaiveDateTime) -> Self {
        Self {
            title: job.title.as_str(),
            company_name: job.company_name.as_str(),
            company_logo: job.company_logo.as_ref().map(|url| url.as_str()),
            company_website: job.company_website.as_ref().map(|url| url.as_str()),
            employment_type: job.employment_type.as_str(),
            remote_type: job.remote_type.as_str(),
            location: job.location.as_deref(),
            description: &job.description,
            requirements: job.requirements.as_deref(),
            apply_method: job.apply_method.as_str(),
            source: job.source.as_str(),
            source_url: job.source_url.as_str(),
            status: job.status.as_str(),
            category_id: job.category_id.map(|id| id.get()),
            experience_level: job.experience_level.map(|level| level.as_str()),
            salary_min: job.salary_min.map(|amount| amount.get()),
            salary_max: job.salary_max.map(|amount| amount.get()),
            currency: job.currency.as_deref(),
            published_at: job.published_at,
            created_at: now,
            updated_at: now,
        }
    }
}
