use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::booking::{Booking, BookingInsert, BookingStatus, NewBooking};
use crate::model::catalog::{PricingPlan, Program, Trainer};
use crate::model::contact::{Contact, NewContact};
use crate::model::newsletter::{Subscriber, Subscription};
use crate::model::user::{User, UserContact};
use crate::store::BookingStore;

const BOOKING_COLUMNS: &str = "id, user_id, trainer_id, program_id, pricing_plan_id, \
     preferred_date, preferred_time, alternative_time, status, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates tables and the partial unique indexes that back the duplicate guard.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn first_id(&self, sql: &str, name: &str) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>(sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

// Row shape of `bookings`; status is stored as text.
#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    trainer_id: Option<i32>,
    program_id: Option<i32>,
    pricing_plan_id: Option<i32>,
    preferred_date: DateTime<Utc>,
    preferred_time: String,
    alternative_time: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(|_| {
            AppError::Persistence(sqlx::Error::Decode(
                format!("unknown booking status {:?}", row.status).into(),
            ))
        })?;

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            trainer_id: row.trainer_id,
            program_id: row.program_id,
            pricing_plan_id: row.pricing_plan_id,
            preferred_date: row.preferred_date,
            preferred_time: row.preferred_time,
            alternative_time: row.alternative_time,
            status,
            created_at: row.created_at,
        })
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl BookingStore for PgStore {
    async fn find_program_id(&self, name: &str) -> AppResult<Option<i32>> {
        self.first_id("SELECT id FROM programs WHERE name = $1 ORDER BY id ASC LIMIT 1", name)
            .await
    }

    async fn find_trainer_id(&self, name: &str) -> AppResult<Option<i32>> {
        self.first_id("SELECT id FROM trainers WHERE name = $1 ORDER BY id ASC LIMIT 1", name)
            .await
    }

    async fn find_pricing_plan_id(&self, plan_name: &str) -> AppResult<Option<i32>> {
        self.first_id(
            "SELECT id FROM pricing_plans WHERE plan_name = $1 ORDER BY id ASC LIMIT 1",
            plan_name,
        )
        .await
    }

    async fn list_programs(&self) -> AppResult<Vec<Program>> {
        let programs = sqlx::query_as::<_, Program>(
            "SELECT id, name, description, duration_weeks, price FROM programs ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(programs)
    }

    async fn list_trainers(&self) -> AppResult<Vec<Trainer>> {
        let trainers = sqlx::query_as::<_, Trainer>(
            "SELECT id, name, specialty, bio, image_url FROM trainers ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(trainers)
    }

    async fn list_pricing_plans(&self) -> AppResult<Vec<PricingPlan>> {
        let plans = sqlx::query_as::<_, PricingPlan>(
            "SELECT id, plan_name, price, duration_months, is_popular FROM pricing_plans ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    async fn upsert_user(&self, contact: &UserContact) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone
            RETURNING id, name, email, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<BookingInsert> {
        // The NOT EXISTS clause turns away known duplicates in the same statement;
        // the partial unique indexes catch concurrent submissions that slip past it.
        let sql = format!(
            r#"
            INSERT INTO bookings (
                id, user_id, trainer_id, program_id, pricing_plan_id,
                preferred_date, preferred_time, alternative_time, status
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, 'pending'
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE user_id = $2
                  AND status <> 'cancelled'
                  AND (trainer_id = $3 OR program_id = $4 OR pricing_plan_id = $5)
            )
            RETURNING {BOOKING_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(booking.user_id)
            .bind(booking.targets.trainer_id)
            .bind(booking.targets.program_id)
            .bind(booking.targets.pricing_plan_id)
            .bind(booking.schedule.preferred_date)
            .bind(&booking.schedule.preferred_time)
            .bind(&booking.schedule.alternative_time)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => Ok(BookingInsert::Created(row.try_into()?)),
            Ok(None) => Ok(BookingInsert::Duplicate),
            Err(e) if is_unique_violation(&e) => {
                warn!(user_id = %booking.user_id, "concurrent duplicate booking rejected by index");
                Ok(BookingInsert::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_bookings(&self) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "fetched bookings");
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Option<Booking>> {
        let result = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $1 WHERE id = $2 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => row.map(Booking::try_from).transpose(),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_contact(&self, user_id: Uuid, contact: &NewContact) -> AppResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, user_id, name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, email, phone, subject, message, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&contact.contact.name)
        .bind(&contact.contact.email)
        .bind(&contact.contact.phone)
        .bind(&contact.subject)
        .bind(&contact.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn list_contacts(&self) -> AppResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, user_id, name, email, phone, subject, message, created_at \
             FROM contacts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    async fn subscribe(&self, email: &str) -> AppResult<Subscription> {
        let created = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO newsletter_subscribers (id, email)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(subscriber) = created {
            return Ok(Subscription::Created(subscriber));
        }

        let existing = sqlx::query_as::<_, Subscriber>(
            "SELECT id, email, created_at FROM newsletter_subscribers WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(Subscription::AlreadySubscribed(existing))
    }

    async fn list_subscribers(&self) -> AppResult<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            "SELECT id, email, created_at FROM newsletter_subscribers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(subscribers)
    }
}
