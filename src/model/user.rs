use sqlx::FromRow;
use uuid::Uuid;
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Identity supplied with a booking or contact form, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl UserContact {
    /// Trims the inputs; name and email must be non-empty afterwards.
    pub fn parse(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> AppResult<Self> {
        let name = trimmed(name);
        let email = trimmed(email);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if email.is_none() {
            missing.push("email");
        }

        match (name, email) {
            (Some(name), Some(email)) => Ok(Self {
                name,
                email,
                phone: trimmed(phone),
            }),
            _ => Err(AppError::validation("Name and email are required", missing)),
        }
    }
}

/// Trimmed copy of `value`, or `None` when nothing is left.
pub(crate) fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts a phone number sent either as a JSON string or a bare number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
