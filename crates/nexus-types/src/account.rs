//! Account types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::NexusError;

/// Unique account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a new random account ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccountId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Class status that marks an account as a teacher
pub const TEACHER_CLASS_STATUS: &str = "Teacher";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Teaching staff
    Teacher,
    /// Student or any other account
    User,
}

impl Role {
    /// Derive the role from the class status submitted at sign-up.
    ///
    /// Only the exact value `"Teacher"` yields [`Role::Teacher`]; every other
    /// value (`"11th"`, `"12th"`, `"Dropper"`, empty, absent, unknown) is a
    /// plain user.
    pub fn from_class_status(class_status: Option<&str>) -> Self {
        match class_status {
            Some(TEACHER_CLASS_STATUS) => Self::Teacher,
            _ => Self::User,
        }
    }

    /// Storage name of the role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Self::Teacher),
            "user" => Ok(Self::User),
            _ => Err(NexusError::InvalidRole(s.to_string())),
        }
    }
}
