//! User domain types.
//!
//! Accounts live in the external identity provider. Lifeline only ever sees the
//! provider's user id and the email address.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
}
