use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, UserId};

/// Notification-eligible user as exposed by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub name: Option<String>,
}
