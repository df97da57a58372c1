use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::taxonomy::Category;
use crate::domain::types::{CategoryId, SkillId, SkillName};
use crate::models::taxonomy::Category as DbCategory;
use crate::repository::{DieselRepository, RepositoryResult, TaxonomyReader};

/// Insert a skill or bump the usage counter of the existing one.
pub(crate) fn upsert_skill(
    conn: &mut SqliteConnection,
    name: &SkillName,
) -> RepositoryResult<SkillId> {
    use crate::schema::skills;

    let id: i32 = diesel::insert_into(skills::table)
        .values((
            skills::name.eq(name.as_str()),
            skills::usage_count.eq(1),
            skills::created_at.eq(Utc::now().naive_utc()),
        ))
        .on_conflict(skills::name)
        .do_update()
        .set(skills::usage_count.eq(skills::usage_count + 1))
        .returning(skills::id)
        .get_result(conn)?;

    Ok(SkillId::new(id)?)
}

pub(crate) fn increment_category_usage(
    conn: &mut SqliteConnection,
    category_id: CategoryId,
) -> RepositoryResult<usize> {
    use crate::schema::categories;

    let affected = diesel::update(categories::table.filter(categories::id.eq(category_id.get())))
        .set(categories::usage_count.eq(categories::usage_count + 1))
        .execute(conn)?;

    Ok(affected)
}

impl TaxonomyReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .order(categories::id.asc())
            .select(DbCategory::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.get()))
            .select(DbCategory::as_select())
            .first(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }
}
