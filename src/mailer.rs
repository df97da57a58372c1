//! Outbound email: the provider seam and digest rendering.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::job::JobPosting;
use crate::domain::types::EmailAddress;
use crate::domain::user::Recipient;
use crate::models::config::{MailConfig, MailTransport};

const DIGEST_TEMPLATE: &str = "digest.html";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("send task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to render digest: {0}")]
    Template(#[from] tera::Error),
}

/// A fully rendered message ready to hand to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: EmailAddress,
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// External mail provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Sends through an SMTP relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from: Mailbox = config.from.parse()?;
        let credentials = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let transport = SmtpTransport::relay(&config.smtp_host)?
            .credentials(credentials)
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let to = Mailbox::new(email.to_name.clone(), email.to.as_str().parse::<Address>()?);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))?;

        // The SMTP transport is blocking.
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        Ok(())
    }
}

/// Writes digests to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        log::info!(
            "Email to {}: {}\n{}",
            email.to,
            email.subject,
            email.text_body
        );
        Ok(())
    }
}

/// Builds the mailer selected by `mail.transport`.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    Ok(match config.transport {
        MailTransport::Smtp => Arc::new(SmtpMailer::new(config)?),
        MailTransport::Log => Arc::new(LogMailer),
    })
}

#[derive(Debug, Serialize)]
struct DigestJob {
    title: String,
    company: String,
    location: Option<String>,
    employment_type: &'static str,
    salary: Option<String>,
    url: String,
}

fn salary_label(job: &JobPosting) -> Option<String> {
    let currency = job.currency.as_deref().unwrap_or("");
    let label = match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if min != max => format!("{}-{}", min.get(), max.get()),
        (Some(amount), _) | (None, Some(amount)) => amount.get().to_string(),
        (None, None) => return None,
    };
    Some(format!("{label} {currency}").trim_end().to_string())
}

/// Renders digest emails from the embedded template.
pub struct DigestRenderer {
    tera: Tera,
    site_url: String,
}

impl DigestRenderer {
    pub fn new(site_url: impl Into<String>) -> Result<Self, MailError> {
        let mut tera = Tera::default();
        tera.add_raw_template(DIGEST_TEMPLATE, include_str!("../templates/digest.html"))?;
        Ok(Self {
            tera,
            site_url: site_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn subject(job_count: usize, subscription_name: &str) -> String {
        format!("{job_count} new jobs for \"{subscription_name}\"")
    }

    fn job_url(&self, job: &JobPosting) -> String {
        format!("{}/jobs/{}", self.site_url, job.id.get())
    }

    /// One digest listing every job matched for a subscription.
    pub fn render(
        &self,
        recipient: &Recipient,
        subscription_name: &str,
        jobs: &[JobPosting],
    ) -> Result<OutgoingEmail, MailError> {
        let subject = Self::subject(jobs.len(), subscription_name);
        let items: Vec<DigestJob> = jobs
            .iter()
            .map(|job| DigestJob {
                title: job.title.to_string(),
                company: job.company_name.to_string(),
                location: job.location.clone(),
                employment_type: job.employment_type.as_str(),
                salary: salary_label(job),
                url: self.job_url(job),
            })
            .collect();
        let manage_url = format!("{}/subscriptions", self.site_url);

        let mut context = Context::new();
        context.insert("subject", &subject);
        context.insert("recipient_name", &recipient.name);
        context.insert("subscription_name", subscription_name);
        context.insert("jobs", &items);
        context.insert("manage_url", &manage_url);
        let html_body = self.tera.render(DIGEST_TEMPLATE, &context)?;

        let mut text_body = format!("New jobs for \"{subscription_name}\":\n\n");
        for item in &items {
            text_body.push_str(&format!("- {} at {}\n  {}\n", item.title, item.company, item.url));
        }
        text_body.push_str(&format!("\nManage your subscriptions: {manage_url}\n"));

        Ok(OutgoingEmail {
            to: recipient.email.clone(),
            to_name: recipient.name.clone(),
            subject,
            html_body,
            text_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{SalaryAmount, UserId};
    use crate::services::matcher::tests::job;

    fn recipient() -> Recipient {
        Recipient {
            user_id: UserId::new(1).unwrap(),
            email: EmailAddress::new("dev@example.com").unwrap(),
            name: Some("Ada".into()),
        }
    }

    #[test]
    fn renders_every_job_with_links() {
        let renderer = DigestRenderer::new("https://jobs.example.com/").unwrap();
        let mut first = job(1);
        first.salary_min = Some(SalaryAmount::new(90_000).unwrap());
        first.salary_max = Some(SalaryAmount::new(120_000).unwrap());
        first.currency = Some("USD".into());
        let second = job(2);

        let email = renderer
            .render(&recipient(), "Frontend", &[first, second])
            .unwrap();

        assert_eq!(email.subject, "2 new jobs for \"Frontend\"");
        assert_eq!(email.to.as_str(), "dev@example.com");
        assert!(email.html_body.contains("Hi Ada"));
        assert!(email.html_body.contains("https://jobs.example.com/jobs/1"));
        assert!(email.html_body.contains("https://jobs.example.com/jobs/2"));
        assert!(email.html_body.contains("90000-120000 USD"));
        assert!(email.text_body.contains("- Senior React Developer at Acme Remote"));
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let renderer = DigestRenderer::new("https://jobs.example.com").unwrap();
        let email = renderer.render(&recipient(), "Rust", &[job(3)]).unwrap();
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
