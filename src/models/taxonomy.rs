use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::taxonomy::{Category as DomainCategory, Skill as DomainSkill};
use crate::domain::types::{
    CategoryName, CategorySlug, SkillName, TypeConstraintError, UsageCount,
};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<i32>,
    pub usage_count: i32,
    pub created_at: NaiveDateTime,
}

/// Diesel model representing the `skills` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::skills)]
pub struct Skill {
    pub id: i32,
    pub name: String,
    pub usage_count: i32,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            slug: CategorySlug::new(category.slug)?,
            name: CategoryName::new(category.name)?,
            parent_id: category.parent_id.map(TryInto::try_into).transpose()?,
            usage_count: UsageCount::new(category.usage_count)?,
        })
    }
}

impl TryFrom<Skill> for DomainSkill {
    type Error = TypeConstraintError;

    fn try_from(skill: Skill) -> Result<Self, Self::Error> {
        Ok(Self {
            id: skill.id.try_into()?,
            name: SkillName::new(skill.name)?,
            usage_count: UsageCount::new(skill.usage_count)?,
        })
    }
}
