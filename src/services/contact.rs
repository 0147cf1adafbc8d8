use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::contact::{Contact, NewContact};
use crate::model::newsletter::Subscription;
use crate::model::user::trimmed;
use crate::services::booking::upsert_user;
use crate::store::BookingStore;

/// Stores a contact-form message, creating or refreshing its sender's user record.
pub async fn submit_contact(store: &dyn BookingStore, contact: NewContact) -> AppResult<Contact> {
    let user = upsert_user(store, &contact.contact).await?;
    let created = store.insert_contact(user.id, &contact).await?;
    info!(contact_id = %created.id, user_id = %user.id, "contact message stored");
    Ok(created)
}

pub async fn subscribe(store: &dyn BookingStore, email: Option<&str>) -> AppResult<Subscription> {
    let email = trimmed(email).ok_or_else(|| AppError::validation("Email is required", vec!["email"]))?;
    let subscription = store.subscribe(&email).await?;
    if let Subscription::Created(subscriber) = &subscription {
        info!(subscriber_id = %subscriber.id, "newsletter signup");
    }
    Ok(subscription)
}
