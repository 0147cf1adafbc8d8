use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::user::{lenient_string, trimmed, UserContact};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// Contact form body
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub contact: UserContact,
    pub subject: Option<String>,
    pub message: String,
}

impl NewContact {
    pub fn parse(request: ContactRequest) -> AppResult<Self> {
        let message = trimmed(request.message.as_deref());
        let contact = UserContact::parse(
            request.name.as_deref(),
            request.email.as_deref(),
            request.phone.as_deref(),
        );

        match (contact, message) {
            (Ok(contact), Some(message)) => Ok(Self {
                contact,
                subject: trimmed(request.subject.as_deref()),
                message,
            }),
            (Ok(_), None) => Err(AppError::validation("Message is required", vec!["message"])),
            (Err(AppError::Validation { mut fields, .. }), message) => {
                if message.is_none() {
                    fields.push("message");
                }
                Err(AppError::validation("Name, email and message are required", fields))
            }
            (Err(e), _) => Err(e),
        }
    }
}
