use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Approval state. Only `Pending -> Approved` and `Pending -> Rejected` are legal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Approved) | (Status::Pending, Status::Rejected)
        )
    }
}

/// Persisted user record, stored verbatim under the users key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String, // plaintext; see password.rs
    pub role: Role,
    pub building: String,
    pub status: Status,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
    /// Fields written by other tools; kept as-is on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the stored collection. Entries that do not decode as a
/// `User` are carried through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredRecord {
    User(User),
    Unrecognised(Value),
}

impl StoredRecord {
    fn field(&self, name: &str) -> Option<&str> {
        match self {
            StoredRecord::User(u) => match name {
                "username" => Some(u.username.as_str()),
                "email" => u.email.as_deref(),
                _ => None,
            },
            StoredRecord::Unrecognised(v) => v.get(name).and_then(Value::as_str),
        }
    }
}

/// Ordered user collection as stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UserCollection(Vec<StoredRecord>);

impl UserCollection {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.0.iter().filter_map(|r| match r {
            StoredRecord::User(u) => Some(u),
            StoredRecord::Unrecognised(_) => None,
        })
    }

    pub fn users_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.0.iter_mut().filter_map(|r| match r {
            StoredRecord::User(u) => Some(u),
            StoredRecord::Unrecognised(_) => None,
        })
    }

    pub fn into_users(self) -> Vec<User> {
        self.0
            .into_iter()
            .filter_map(|r| match r {
                StoredRecord::User(u) => Some(u),
                StoredRecord::Unrecognised(_) => None,
            })
            .collect()
    }

    pub fn unrecognised_count(&self) -> usize {
        self.0
            .iter()
            .filter(|r| matches!(r, StoredRecord::Unrecognised(_)))
            .count()
    }

    /// Checks every entry, including ones that did not decode.
    pub fn has_username(&self, username: &str) -> bool {
        self.0.iter().any(|r| r.field("username") == Some(username))
    }

    /// Checks every entry, including ones that did not decode.
    pub fn has_email(&self, email: &str) -> bool {
        self.0.iter().any(|r| r.field("email") == Some(email))
    }

    pub fn push(&mut self, user: User) {
        self.0.push(StoredRecord::User(user));
    }
}

impl From<Vec<User>> for UserCollection {
    fn from(users: Vec<User>) -> Self {
        Self(users.into_iter().map(StoredRecord::User).collect())
    }
}
