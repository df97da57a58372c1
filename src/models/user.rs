use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{EmailAddress, TypeConstraintError};
use crate::domain::user::Recipient;

/// Diesel model of the identity provider's `users` table. Read-only here.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub is_banned: bool,
    pub email_notifications: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<User> for Recipient {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: user.id.try_into()?,
            email: EmailAddress::new(user.email)?,
            name: user.name,
        })
    }
}
