//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values, enumerations and numeric constraints are enforced
//! at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Email validation failed.
    #[error("{0} must be a valid email address")]
    InvalidEmail(&'static str),
    /// A string did not name any variant of an enumeration.
    #[error("unknown {0}: {1}")]
    UnknownVariant(&'static str, String),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new_for_field(value, "value")
    }

    /// Same as [`Self::new`] but with field-specific error context.
    pub fn new_for_field<S: Into<String>>(
        value: S,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, field).map(Self)
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new_for_field(value, $field)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned URL.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! non_negative_i32_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Constructs a value that must be zero or greater.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value >= 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NegativeNumber($field))
                }
            }

            /// Returns the raw `i32` value.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Generates a closed enumeration persisted as text.
///
/// Parsing is lenient about case and accepts `-` or spaces in place of `_`,
/// so `full-time`, `Full Time` and `FULL_TIME` all resolve to the same
/// variant.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:expr, {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// String representation used in persistence and on the wire.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                let normalized = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
                match normalized.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(TypeConstraintError::UnknownVariant($field, value.to_string())),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

id_newtype!(JobId, "Unique identifier for a job posting.", "job_id");
id_newtype!(CategoryId, "Unique identifier for a category.", "category_id");
id_newtype!(SkillId, "Unique identifier for a skill.", "skill_id");
id_newtype!(UserId, "Unique identifier for a user.", "user_id");
id_newtype!(
    SubscriptionId,
    "Unique identifier for a subscription.",
    "subscription_id"
);
id_newtype!(
    NotificationId,
    "Unique identifier for a notification queue entry.",
    "notification_id"
);
id_newtype!(CrawlLogId, "Unique identifier for a crawl log row.", "crawl_log_id");

non_empty_string_newtype!(JobTitle, "Job title enforcing non-empty values.", "title");
non_empty_string_newtype!(
    CompanyName,
    "Company name enforcing non-empty values.",
    "company name"
);
non_empty_string_newtype!(
    ApplyMethod,
    "Application URL or contact address.",
    "apply method"
);
non_empty_string_newtype!(
    CategorySlug,
    "Stable machine name of a category.",
    "category slug"
);
non_empty_string_newtype!(
    CategoryName,
    "Category display name enforcing non-empty values.",
    "category name"
);
non_empty_string_newtype!(SkillName, "Skill or tag name.", "skill name");
non_empty_string_newtype!(
    SubscriptionName,
    "Subscription name enforcing non-empty values.",
    "subscription name"
);
non_empty_string_newtype!(Keyword, "Subscription keyword.", "keyword");

url_string_newtype!(
    SourceUrl,
    "Canonical URL of a posting at its origin; the idempotency key.",
    "source url"
);
url_string_newtype!(LogoUrl, "Company logo URL.", "company logo");
url_string_newtype!(WebsiteUrl, "Company website URL.", "company website");

non_negative_i32_newtype!(SalaryAmount, "Non-negative yearly salary figure.", "salary");
non_negative_i32_newtype!(UsageCount, "Running association counter.", "usage count");
non_negative_i32_newtype!(RetryCount, "Number of failed delivery attempts.", "retry count");

/// Validated recipient email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trims and validates an email address.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "email")?;
        if !trimmed.as_str().validate_email() {
            return Err(TypeConstraintError::InvalidEmail("email"));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

text_enum!(
    /// Contract shape of a posting.
    EmploymentType, "employment type", {
        FullTime => "FULL_TIME",
        PartTime => "PART_TIME",
        Contract => "CONTRACT",
        Internship => "INTERNSHIP",
    }
);

text_enum!(
    /// How much of the work can be done remotely.
    RemoteType, "remote type", {
        FullyRemote => "FULLY_REMOTE",
        Hybrid => "HYBRID",
        Occasional => "OCCASIONAL",
    }
);

text_enum!(
    /// Publication lifecycle of a posting.
    JobStatus, "job status", {
        Draft => "DRAFT",
        Published => "PUBLISHED",
        Closed => "CLOSED",
    }
);

text_enum!(
    /// Seniority bucket.
    ExperienceLevel, "experience level", {
        Entry => "ENTRY",
        Mid => "MID",
        Senior => "SENIOR",
        Lead => "LEAD",
        Staff => "STAFF",
        Principal => "PRINCIPAL",
    }
);

text_enum!(
    /// Origin adapter of a posting.
    JobSource, "job source", {
        RemoteOk => "REMOTE_OK",
        Remotive => "REMOTIVE",
        Arbeitnow => "ARBEITNOW",
        Jobicy => "JOBICY",
        Himalayas => "HIMALAYAS",
        WorkingNomads => "WORKING_NOMADS",
        TheMuse => "THE_MUSE",
        WeWorkRemotely => "WE_WORK_REMOTELY",
        Jobspresso => "JOBSPRESSO",
        RealWorkFromAnywhere => "REAL_WORK_FROM_ANYWHERE",
        HackerNews => "HACKER_NEWS",
        V2ex => "V2EX",
    }
);

text_enum!(
    /// Outcome of one adapter run.
    CrawlStatus, "crawl status", {
        Success => "SUCCESS",
        Partial => "PARTIAL",
        Failed => "FAILED",
    }
);

text_enum!(
    /// What started an ingestion run.
    CrawlTrigger, "crawl trigger", {
        Scheduled => "SCHEDULED",
        Manual => "MANUAL",
    }
);

text_enum!(
    /// Delivery cadence of a subscription.
    NotificationFrequency, "frequency", {
        Immediate => "IMMEDIATE",
        Daily => "DAILY",
        Weekly => "WEEKLY",
    }
);

text_enum!(
    /// Lifecycle of a queued notification.
    NotificationStatus, "notification status", {
        Pending => "PENDING",
        Sent => "SENT",
        Failed => "FAILED",
    }
);

impl CrawlStatus {
    /// Derives the crawl outcome from item counters.
    pub fn from_counts(success_count: i32, fail_count: i32) -> Self {
        if fail_count == 0 {
            Self::Success
        } else if success_count > 0 {
            Self::Partial
        } else {
            Self::Failed
        }
    }
}
