//! User profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend row ID of a user. Plain integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The signed-in user's profile.
///
/// Owned by the identity provider and the backend; the client only displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub clerk_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// First and last name joined, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "clerkId": "user_2abc",
            "email": "ada@example.com",
            "firstName": first,
            "lastName": last,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user("Ada", "Lovelace").display_name(), "Ada Lovelace");
        assert_eq!(user("Ada", "").display_name(), "Ada");
        assert_eq!(user("", "").display_name(), "ada@example.com");
    }

    #[test]
    fn test_id_is_plain_number() {
        let id = user("a", "b").id;
        assert_eq!(id, UserId::new(3));
        assert_eq!(id.to_string(), "3");
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
    }
}
