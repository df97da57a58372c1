//! Keyword classifier for categories and skills.
//!
//! Category rules are an ordered list evaluated top to bottom; the first rule
//! with a keyword contained in the title or description wins. Specific
//! categories come before their generic parents so `react` is chosen over
//! `frontend` when a text mentions both. Keywords of four characters or
//! fewer only match whole words.

use std::collections::HashMap;

use crate::adapters::normalize::contains_term;
use crate::domain::taxonomy::Category;
use crate::domain::types::CategoryId;
use crate::repository::{RepositoryResult, TaxonomyReader};

/// One row of the category rule table.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub slug: &'static str,
    pub keywords: &'static [&'static str],
}

/// One entry of the skill vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct SkillRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

const fn rule(slug: &'static str, keywords: &'static [&'static str]) -> CategoryRule {
    CategoryRule { slug, keywords }
}

const fn skill(name: &'static str, keywords: &'static [&'static str]) -> SkillRule {
    SkillRule { name, keywords }
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    // Mobile frameworks before the languages they share names with.
    rule("react-native", &["react native", "react-native"]),
    rule("flutter", &["flutter", "dart"]),
    rule("ios", &["ios", "swiftui", "swift", "objective-c"]),
    rule("android", &["android", "kotlin", "jetpack compose"]),
    // Frontend frameworks.
    rule("react", &["react", "reactjs", "react.js", "next.js", "nextjs", "redux"]),
    rule("vue", &["vue", "vue.js", "vuejs", "nuxt"]),
    rule("angular", &["angular", "angularjs"]),
    // Backend languages.
    rule("rust", &["rust", "rustlang"]),
    rule("golang", &["golang", "go developer", "go engineer"]),
    rule("python", &["python", "django", "flask", "fastapi"]),
    rule("java", &["java", "spring boot", "jvm"]),
    rule("nodejs", &["node.js", "nodejs", "node", "express.js", "nestjs"]),
    rule("php", &["php", "laravel", "symfony", "wordpress"]),
    rule("ruby", &["ruby", "rails"]),
    rule("dotnet", &[".net", "asp.net", "dotnet", "c#"]),
    // Specialisms.
    rule("blockchain", &["blockchain", "web3", "solidity", "smart contract", "crypto"]),
    rule(
        "machine-learning",
        &[
            "machine learning",
            "deep learning",
            "ml engineer",
            "llm",
            "pytorch",
            "tensorflow",
            "nlp",
            "computer vision",
        ],
    ),
    rule(
        "data-engineering",
        &["data engineer", "etl", "airflow", "data pipeline", "snowflake", "dbt", "spark"],
    ),
    rule("data-science", &["data scientist", "data science"]),
    rule(
        "security",
        &["security engineer", "cybersecurity", "penetration test", "appsec", "infosec"],
    ),
    rule(
        "devops",
        &[
            "devops",
            "sre",
            "site reliability",
            "kubernetes",
            "terraform",
            "platform engineer",
            "infrastructure engineer",
            "cloud engineer",
        ],
    ),
    rule("qa", &["qa", "quality assurance", "test automation", "sdet", "tester"]),
    rule("game", &["game developer", "gameplay", "unreal engine", "unity3d", "game engine"]),
    // Generic engineering buckets.
    rule("fullstack", &["full stack", "full-stack", "fullstack"]),
    rule("mobile", &["mobile developer", "mobile engineer", "mobile app"]),
    rule(
        "frontend",
        &["frontend", "front-end", "front end", "javascript", "typescript", "css", "html"],
    ),
    rule(
        "backend",
        &["backend", "back-end", "back end", "api developer", "microservices"],
    ),
    // Non-engineering.
    rule(
        "ui-ux",
        &["ui/ux", "ux", "ui designer", "ux designer", "user experience", "figma"],
    ),
    rule("design", &["designer", "graphic design", "visual design", "illustrator"]),
    rule(
        "product-management",
        &["product manager", "product owner", "product management"],
    ),
    rule("product", &["head of product", "product lead"]),
    rule("data", &["data analyst", "analytics", "business intelligence"]),
    rule(
        "marketing",
        &["marketing", "seo", "growth marketer", "social media", "content strategist"],
    ),
    rule(
        "sales",
        &["sales", "account executive", "business development", "sdr"],
    ),
    rule(
        "customer-support",
        &[
            "customer support",
            "customer success",
            "customer service",
            "support specialist",
            "help desk",
        ],
    ),
    rule(
        "writing",
        &["copywriter", "technical writer", "content writer", "editor"],
    ),
    rule(
        "hr",
        &["recruiter", "talent acquisition", "human resources", "people operations", "hr"],
    ),
    rule(
        "finance",
        &["accountant", "bookkeeper", "finance", "financial analyst", "controller"],
    ),
    rule("development", &["developer", "engineer", "programmer", "software"]),
];

pub const SKILL_VOCABULARY: &[SkillRule] = &[
    skill("Rust", &["rust", "rustlang"]),
    skill("Go", &["golang", "go developer", "go engineer"]),
    skill("Python", &["python"]),
    skill("Java", &["java"]),
    skill("Kotlin", &["kotlin"]),
    skill("Swift", &["swift"]),
    skill("JavaScript", &["javascript"]),
    skill("TypeScript", &["typescript"]),
    skill("React", &["react", "reactjs", "react.js"]),
    skill("React Native", &["react native", "react-native"]),
    skill("Next.js", &["next.js", "nextjs"]),
    skill("Vue", &["vue", "vue.js", "vuejs"]),
    skill("Angular", &["angular"]),
    skill("Svelte", &["svelte"]),
    skill("Node.js", &["node.js", "nodejs"]),
    skill("Django", &["django"]),
    skill("Flask", &["flask"]),
    skill("FastAPI", &["fastapi"]),
    skill("Ruby", &["ruby"]),
    skill("Rails", &["rails"]),
    skill("PHP", &["php"]),
    skill("Laravel", &["laravel"]),
    skill("C#", &["c#"]),
    skill(".NET", &[".net", "dotnet"]),
    skill("C++", &["c++"]),
    skill("Scala", &["scala"]),
    skill("Elixir", &["elixir"]),
    skill("Haskell", &["haskell"]),
    skill("Flutter", &["flutter"]),
    skill("SQL", &["sql"]),
    skill("PostgreSQL", &["postgres", "postgresql"]),
    skill("MySQL", &["mysql"]),
    skill("MongoDB", &["mongodb"]),
    skill("Redis", &["redis"]),
    skill("Kafka", &["kafka"]),
    skill("GraphQL", &["graphql"]),
    skill("Docker", &["docker"]),
    skill("Kubernetes", &["kubernetes", "k8s"]),
    skill("Terraform", &["terraform"]),
    skill("AWS", &["aws", "amazon web services"]),
    skill("GCP", &["gcp", "google cloud"]),
    skill("Azure", &["azure"]),
    skill("Linux", &["linux"]),
    skill("Spark", &["spark"]),
    skill("Airflow", &["airflow"]),
    skill("TensorFlow", &["tensorflow"]),
    skill("PyTorch", &["pytorch"]),
    skill("Figma", &["figma"]),
    skill("Solidity", &["solidity"]),
];

fn matches_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_term(haystack, k))
}

fn searchable_text(title: &str, description: &str) -> String {
    format!("{title}\n{description}").to_lowercase()
}

/// Slug of the first rule matching the text, regardless of which categories exist.
pub fn classify_slug(title: &str, description: &str) -> Option<&'static str> {
    let text = searchable_text(title, description);
    CATEGORY_RULES
        .iter()
        .find(|rule| matches_any(&text, rule.keywords))
        .map(|rule| rule.slug)
}

/// Every vocabulary skill mentioned in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| matches_any(&lower, skill.keywords))
        .map(|skill| skill.name)
        .collect()
}

/// Rule table bound to the category ids of one database.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    ids_by_slug: HashMap<String, CategoryId>,
}

impl Classifier {
    pub fn new(categories: &[Category]) -> Self {
        Self {
            ids_by_slug: categories
                .iter()
                .map(|c| (c.slug.as_str().to_string(), c.id))
                .collect(),
        }
    }

    /// Reads the current taxonomy. Classifiers are built per run and never cached.
    pub fn load<R: TaxonomyReader>(repo: &R) -> RepositoryResult<Self> {
        Ok(Self::new(&repo.list_categories()?))
    }

    /// Category of the first matching rule whose slug exists in the taxonomy.
    pub fn classify(&self, title: &str, description: &str) -> Option<CategoryId> {
        let text = searchable_text(title, description);
        CATEGORY_RULES
            .iter()
            .filter(|rule| matches_any(&text, rule.keywords))
            .find_map(|rule| self.ids_by_slug.get(rule.slug).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CategoryName, CategorySlug, UsageCount};

    fn category(id: i32, slug: &str, parent: Option<i32>) -> Category {
        Category {
            id: CategoryId::new(id).unwrap(),
            slug: CategorySlug::new(slug).unwrap(),
            name: CategoryName::new(slug).unwrap(),
            parent_id: parent.map(|p| CategoryId::new(p).unwrap()),
            usage_count: UsageCount::new(0).unwrap(),
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(&[
            category(1, "development", None),
            category(2, "frontend", Some(1)),
            category(6, "react", Some(2)),
            category(9, "rust", Some(3)),
        ])
    }

    #[test]
    fn specific_rule_wins_over_generic_parent() {
        assert_eq!(
            classify_slug("Senior React Developer", "Frontend role, fully remote"),
            Some("react")
        );
        assert_eq!(
            classifier().classify("Senior React Developer", "Frontend role, fully remote"),
            Some(CategoryId::new(6).unwrap())
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier();
        let first = c.classify("Frontend Engineer", "CSS and accessibility");
        for _ in 0..5 {
            assert_eq!(c.classify("Frontend Engineer", "CSS and accessibility"), first);
        }
        assert_eq!(first, Some(CategoryId::new(2).unwrap()));
    }

    #[test]
    fn short_keywords_respect_word_boundaries() {
        assert_eq!(classify_slug("Trust & Safety Analyst", ""), None);
        assert_eq!(
            classifier().classify("Trust engineer", "build trust"),
            Some(CategoryId::new(1).unwrap())
        );
        assert_eq!(classify_slug("Java Developer", ""), Some("java"));
        assert_eq!(classify_slug("JavaScript Developer", ""), Some("frontend"));
        assert_ne!(classify_slug("Revenue Analyst", "grow revenue"), Some("vue"));
    }

    #[test]
    fn skips_rules_whose_category_is_missing() {
        // "python" matches first but is not seeded in this taxonomy.
        assert_eq!(
            classifier().classify("Python developer", "backend services"),
            Some(CategoryId::new(1).unwrap())
        );
    }

    #[test]
    fn unmatched_text_has_no_category() {
        assert_eq!(classifier().classify("Barista", "Coffee and smiles"), None);
    }

    #[test]
    fn extracts_every_mentioned_skill() {
        let skills = extract_skills("Rust + Tokio, PostgreSQL, Docker and k8s. Good Go-getter.");
        assert_eq!(skills, vec!["Rust", "PostgreSQL", "Docker", "Kubernetes"]);
    }
}
