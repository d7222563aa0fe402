pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Represents roles of the campus portal.
///
/// Serialized lowercase on the wire; deserialization accepts any
/// casing and normalizes it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Student,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Student => "student",
        })
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "student" => Ok(Role::Student),
            _ => Err(serde::de::Error::unknown_variant(
                &value,
                &["admin", "staff", "student"],
            )),
        }
    }
}

/// Represents a user's metadata.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserMetadata {
    pub username: String,
    pub email: lettre::Address,
    pub first_name: String,
    pub last_name: String,
    pub phone: u64,
    pub department: String,
    pub role: Role,
}
