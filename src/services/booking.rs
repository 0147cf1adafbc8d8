//! Booking submission workflow:
//! validate → resolve targets → upsert user → guarded insert.

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::model::booking::{
    BookingCommand, BookingInsert, BookingKind, BookingReceipt, BookingTargets, NewBooking,
};
use crate::model::user::{User, UserContact};
use crate::store::BookingStore;

/// Looks up the id named by the form for the booking's kind.
///
/// An unknown name is not an error: the booking is then simply untargeted.
pub async fn resolve_targets(
    store: &dyn BookingStore,
    kind: Option<BookingKind>,
    name: Option<&str>,
) -> AppResult<BookingTargets> {
    let mut targets = BookingTargets::default();
    let (Some(kind), Some(name)) = (kind, name) else {
        return Ok(targets);
    };

    match kind {
        BookingKind::Program => targets.program_id = store.find_program_id(name).await?,
        BookingKind::Trainer => targets.trainer_id = store.find_trainer_id(name).await?,
        BookingKind::Pricing => targets.pricing_plan_id = store.find_pricing_plan_id(name).await?,
    }

    if targets.is_empty() {
        debug!(?kind, target_name = name, "no catalog entry matched, booking stays untargeted");
    }
    Ok(targets)
}

pub async fn upsert_user(store: &dyn BookingStore, contact: &UserContact) -> AppResult<User> {
    let user = store.upsert_user(contact).await?;
    debug!(user_id = %user.id, "user upserted");
    Ok(user)
}

/// Runs a validated submission through to a stored booking.
pub async fn submit_booking(store: &dyn BookingStore, command: BookingCommand) -> AppResult<BookingReceipt> {
    let targets = resolve_targets(store, command.kind, command.target_name.as_deref()).await?;
    let user = upsert_user(store, &command.contact).await?;

    let booking = NewBooking {
        user_id: user.id,
        targets,
        schedule: command.schedule,
    };

    match store.insert_booking(&booking).await? {
        BookingInsert::Created(created) => {
            info!(booking_id = %created.id, user_id = %user.id, ?targets, "booking created");
            Ok(BookingReceipt::from(&created))
        }
        BookingInsert::Duplicate => {
            info!(user_id = %user.id, ?targets, "duplicate booking refused");
            Err(AppError::Conflict)
        }
    }
}
