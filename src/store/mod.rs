//! Datastore abstraction.
//!
//! Handlers never see a connection pool directly: they receive an
//! `Arc<dyn BookingStore>` built in `main` (Postgres) or in tests (memory).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::model::booking::{Booking, BookingInsert, BookingStatus, NewBooking};
use crate::model::catalog::{PricingPlan, Program, Trainer};
use crate::model::contact::{Contact, NewContact};
use crate::model::newsletter::{Subscriber, Subscription};
use crate::model::user::{User, UserContact};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait BookingStore: Send + Sync {
    // ================================
    // Catalog lookups
    // ================================

    /// Id of the program named exactly `name`; the lowest id wins on duplicates.
    async fn find_program_id(&self, name: &str) -> AppResult<Option<i32>>;

    /// Id of the trainer named exactly `name`; the lowest id wins on duplicates.
    async fn find_trainer_id(&self, name: &str) -> AppResult<Option<i32>>;

    /// Id of the pricing plan named exactly `plan_name`; the lowest id wins on duplicates.
    async fn find_pricing_plan_id(&self, plan_name: &str) -> AppResult<Option<i32>>;

    async fn list_programs(&self) -> AppResult<Vec<Program>>;

    async fn list_trainers(&self) -> AppResult<Vec<Trainer>>;

    async fn list_pricing_plans(&self) -> AppResult<Vec<PricingPlan>>;

    // ================================
    // Users
    // ================================

    /// Creates the user or overwrites name and phone of the one holding `contact.email`.
    async fn upsert_user(&self, contact: &UserContact) -> AppResult<User>;

    // ================================
    // Bookings
    // ================================

    /// Inserts the booking unless the user already holds an active booking for
    /// one of its targets. Check and insert happen atomically.
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<BookingInsert>;

    /// All bookings, newest first.
    async fn list_bookings(&self) -> AppResult<Vec<Booking>>;

    /// Returns `None` for an unknown id and `AppError::Conflict` when
    /// re-activating would duplicate another active booking.
    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Option<Booking>>;

    // ================================
    // Contact form and newsletter
    // ================================

    async fn insert_contact(&self, user_id: Uuid, contact: &NewContact) -> AppResult<Contact>;

    async fn list_contacts(&self) -> AppResult<Vec<Contact>>;

    async fn subscribe(&self, email: &str) -> AppResult<Subscription>;

    async fn list_subscribers(&self) -> AppResult<Vec<Subscriber>>;
}
