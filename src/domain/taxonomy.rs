use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, CategorySlug, SkillId, SkillName, UsageCount};

/// Node of the hierarchical category taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: CategorySlug,
    pub name: CategoryName,
    pub parent_id: Option<CategoryId>,
    pub usage_count: UsageCount,
}

/// Entry of the flat skill vocabulary. Skills double as job tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: SkillName,
    pub usage_count: UsageCount,
}
