//! Helpers for integration tests.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use jobfeed::db::{DbPool, establish_connection_pool};
use jobfeed::domain::job::NewJobPosting;
use jobfeed::domain::types::{
    ApplyMethod, CompanyName, EmploymentType, JobSource, JobStatus, JobTitle, RemoteType,
    SourceUrl, UserId,
};
use jobfeed::schema::users;
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Users come from the identity provider; tests insert them directly.
    pub fn insert_user(&self, email: &str, is_banned: bool, email_notifications: bool) -> UserId {
        let mut conn = self.pool.get().expect("should acquire DB connection");
        let id: i32 = diesel::insert_into(users::table)
            .values((
                users::email.eq(email),
                users::is_banned.eq(is_banned),
                users::email_notifications.eq(email_notifications),
            ))
            .returning(users::id)
            .get_result(&mut conn)
            .expect("should insert user");
        UserId::new(id).expect("valid user id")
    }
}

/// A minimal PUBLISHED posting.
pub fn new_job(source_url: &str, published_at: NaiveDateTime) -> NewJobPosting {
    NewJobPosting {
        title: JobTitle::new("Senior React Developer").expect("valid title"),
        company_name: CompanyName::new("Acme").expect("valid company"),
        company_logo: None,
        company_website: None,
        employment_type: EmploymentType::FullTime,
        remote_type: RemoteType::FullyRemote,
        location: None,
        description: "Remote React work".to_string(),
        requirements: None,
        apply_method: ApplyMethod::new(source_url).expect("valid apply method"),
        source: JobSource::RemoteOk,
        source_url: SourceUrl::new(source_url).expect("valid source url"),
        status: JobStatus::Published,
        category_id: None,
        experience_level: None,
        salary_min: None,
        salary_max: None,
        currency: None,
        published_at,
    }
}
