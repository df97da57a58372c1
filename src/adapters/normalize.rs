//! Normalization helpers shared by source adapters.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

use crate::domain::types::{EmploymentType, ExperienceLevel, RemoteType};

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("valid regex")
});
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</?p(\s[^>]*)?>|</(div|li|ul|ol|h[1-6]|tr|blockquote)>|<li[^>]*>")
        .expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").expect("valid regex")
});
static SALARY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<c1>[$€£])?\s?(?P<a>\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(?P<ka>k)?\s*(?:-|–|—|to)\s*(?P<c2>[$€£])?\s?(?P<b>\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(?P<kb>k)?(?:\s*(?P<code>USD|EUR|GBP|CAD|AUD|CHF))?",
    )
    .expect("valid regex")
});

const ROLE_WORDS: &[&str] = &[
    "engineer",
    "developer",
    "programmer",
    "designer",
    "architect",
    "scientist",
    "analyst",
    "manager",
    "director",
    "lead",
    "head of",
    "devops",
    "sre",
    "cto",
    "researcher",
    "writer",
    "marketer",
    "recruiter",
    "specialist",
    "administrator",
    "consultant",
    "intern",
];

/// Removes markup, decodes entities and normalizes whitespace.
///
/// Block-level elements become line breaks and blank lines are dropped.
pub fn strip_html(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, " ");
    let with_breaks = BLOCK_BREAK.replace_all(&without_scripts, "\n");
    let without_tags = TAG.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&without_tags);

    decoded
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes named and numeric HTML entities in a single pass.
pub fn decode_entities(input: &str) -> String {
    ENTITY
        .replace_all(input, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or(body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "bull" => '•',
        "middot" => '·',
        "euro" => '€',
        "pound" => '£',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => return None,
    };
    Some(c)
}

/// Returns the trimmed value or a "missing field" reason.
pub fn required(value: Option<&str>, field: &str) -> Result<String, String> {
    non_blank(value).ok_or_else(|| format!("missing {field}"))
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims an optional string, turning blank values into `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Whether `haystack` contains `word` delimited by non-alphanumeric
/// characters. Both arguments are expected in lowercase.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Keyword containment used by classification and skill detection.
///
/// Terms of four characters or fewer need word boundaries so that `go`
/// does not match `good` and `rust` does not match `trust`.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.chars().count() <= 4 {
        contains_word(haystack, term)
    } else {
        haystack.contains(term)
    }
}

/// Parses structured employment labels such as `full_time` or `Contractor`.
pub fn employment_type_from_label(label: &str) -> Option<EmploymentType> {
    let key: String = label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    match key.as_str() {
        "fulltime" | "full" | "permanent" => Some(EmploymentType::FullTime),
        "parttime" | "part" => Some(EmploymentType::PartTime),
        "contract" | "contractor" | "freelance" | "freelancer" | "temporary" | "temp" => {
            Some(EmploymentType::Contract)
        }
        "internship" | "intern" | "trainee" => Some(EmploymentType::Internship),
        _ => None,
    }
}

/// Guesses the employment type from free text, defaulting to full time.
pub fn infer_employment_type(text: &str) -> EmploymentType {
    let lower = text.to_lowercase();
    if contains_word(&lower, "intern") || lower.contains("internship") {
        EmploymentType::Internship
    } else if ["contract", "contractor", "freelance", "freelancer"]
        .iter()
        .any(|w| contains_word(&lower, w))
    {
        EmploymentType::Contract
    } else if lower.contains("part-time") || lower.contains("part time") {
        EmploymentType::PartTime
    } else {
        EmploymentType::FullTime
    }
}

/// Guesses the remote arrangement from free text, defaulting to fully remote.
pub fn infer_remote_type(text: &str) -> RemoteType {
    let lower = text.to_lowercase();
    if lower.contains("hybrid") {
        RemoteType::Hybrid
    } else if ["partially remote", "partly remote", "remote-friendly", "remote friendly"]
        .iter()
        .any(|w| lower.contains(w))
    {
        RemoteType::Occasional
    } else if contains_word(&lower, "remote") {
        RemoteType::FullyRemote
    } else if ["onsite", "on-site", "in office", "in-office"]
        .iter()
        .any(|w| lower.contains(w))
    {
        RemoteType::Occasional
    } else {
        RemoteType::FullyRemote
    }
}

/// Guesses the seniority from a title or level label.
pub fn infer_experience_level(text: &str) -> Option<ExperienceLevel> {
    let lower = text.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| contains_word(&lower, w));
    if any(&["principal", "distinguished"]) {
        Some(ExperienceLevel::Principal)
    } else if any(&["staff"]) {
        Some(ExperienceLevel::Staff)
    } else if any(&["lead", "head of", "tech lead", "manager", "management", "executive"]) {
        Some(ExperienceLevel::Lead)
    } else if any(&["senior", "sr", "sr."]) {
        Some(ExperienceLevel::Senior)
    } else if any(&["junior", "jr", "entry", "entry-level", "graduate", "intern", "internship"]) {
        Some(ExperienceLevel::Entry)
    } else if any(&["mid", "mid-level", "intermediate"]) {
        Some(ExperienceLevel::Mid)
    } else {
        None
    }
}

/// A yearly salary range found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: i32,
    pub max: i32,
    pub currency: Option<String>,
}

/// Finds the first salary range such as `$120k - $150k` or
/// `120,000-150,000 USD`.
///
/// A match needs a currency marker or a `k` suffix and both bounds of at
/// least 1000, which keeps year spans and version numbers out.
pub fn parse_salary_range(text: &str) -> Option<SalaryRange> {
    SALARY_RANGE.captures_iter(text).find_map(|caps| {
        let symbol = caps.name("c1").or(caps.name("c2")).map(|m| m.as_str());
        let code = caps.name("code").map(|m| m.as_str().to_uppercase());
        let ka = caps.name("ka").is_some();
        let kb = caps.name("kb").is_some();
        if symbol.is_none() && code.is_none() && !ka && !kb {
            return None;
        }

        let a = parse_amount(caps.name("a")?.as_str())?;
        let b = parse_amount(caps.name("b")?.as_str())?;
        // "$120-150k" applies the suffix to both bounds.
        let a = if ka || (kb && a < 1000.0) { a * 1000.0 } else { a };
        let b = if kb || (ka && b < 1000.0) { b * 1000.0 } else { b };
        if a < 1000.0 || b < 1000.0 || a > b || b > f64::from(i32::MAX) {
            return None;
        }

        let currency = code.or_else(|| symbol.and_then(currency_from_symbol));
        Some(SalaryRange {
            min: a.round() as i32,
            max: b.round() as i32,
            currency,
        })
    })
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

fn currency_from_symbol(symbol: &str) -> Option<String> {
    match symbol {
        "$" => Some("USD".to_string()),
        "€" => Some("EUR".to_string()),
        "£" => Some("GBP".to_string()),
        _ => None,
    }
}

/// Header of a forum posting written as `Company | Role | Location | ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumHeader {
    pub company: String,
    pub title: String,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// Parses a pipe-separated posting header.
///
/// The first segment is the company. The role is the first later segment
/// that reads like a job title, falling back to the second segment.
pub fn parse_forum_header(line: &str) -> Option<ForumHeader> {
    let segments: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 2 {
        return None;
    }
    let company = segments[0];
    let rest = &segments[1..];

    let is_url = |s: &str| s.starts_with("http://") || s.starts_with("https://");
    let role_index = rest
        .iter()
        .position(|s| {
            let lower = s.to_lowercase();
            !is_url(s) && ROLE_WORDS.iter().any(|w| contains_term(&lower, w))
        })
        .or_else(|| rest.iter().position(|s| !is_url(s)))?;
    let title = rest[role_index];

    let location = rest
        .iter()
        .enumerate()
        .filter(|(i, s)| *i != role_index && !is_url(s))
        .map(|(_, s)| *s)
        .find(|s| {
            let lower = s.to_lowercase();
            ["remote", "onsite", "on-site", "hybrid"]
                .iter()
                .any(|w| lower.contains(w))
                || s.contains(',')
        })
        .map(str::to_string);
    let website = rest.iter().find(|s| is_url(s)).map(|s| s.to_string());

    Some(ForumHeader {
        company: company.to_string(),
        title: title.to_string(),
        location,
        website,
    })
}

/// Whether `published_at` lies within `days` before `now`.
///
/// Timestamps slightly in the future are tolerated to absorb clock skew
/// between sources.
pub fn is_recent(published_at: NaiveDateTime, now: NaiveDateTime, days: i64) -> bool {
    published_at >= now - Duration::days(days) && published_at <= now + Duration::days(1)
}

/// Parses the timestamp formats seen across sources, converting to UTC.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts Unix seconds to a UTC timestamp.
pub fn from_unix(seconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}
