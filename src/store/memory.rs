use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::booking::{Booking, BookingInsert, BookingStatus, NewBooking};
use crate::model::catalog::{PricingPlan, Program, Trainer};
use crate::model::contact::{Contact, NewContact};
use crate::model::newsletter::{Subscriber, Subscription};
use crate::model::user::{User, UserContact};
use crate::store::BookingStore;

/// In-process store with the same guarantees as [`super::PgStore`].
///
/// Every operation runs under a single lock, so the duplicate check and the
/// insert of a booking cannot interleave with another submission.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    programs: Vec<Program>,
    trainers: Vec<Trainer>,
    pricing_plans: Vec<PricingPlan>,
    bookings: Vec<Booking>,
    contacts: Vec<Contact>,
    subscribers: Vec<Subscriber>,
}

impl Tables {
    fn next_catalog_id(ids: impl Iterator<Item = i32>) -> i32 {
        ids.max().unwrap_or(0) + 1
    }
}

fn lowest_id<T>(rows: &[T], matches: impl Fn(&T) -> bool, id: impl Fn(&T) -> i32) -> Option<i32> {
    rows.iter().filter(|row| matches(row)).map(id).min()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_program(&self, name: &str, duration_weeks: i32, price: i32) -> Program {
        let mut tables = self.inner.lock().await;
        let program = Program {
            id: Tables::next_catalog_id(tables.programs.iter().map(|p| p.id)),
            name: name.to_string(),
            description: None,
            duration_weeks,
            price,
        };
        tables.programs.push(program.clone());
        program
    }

    pub async fn add_trainer(&self, name: &str, specialty: Option<&str>) -> Trainer {
        let mut tables = self.inner.lock().await;
        let trainer = Trainer {
            id: Tables::next_catalog_id(tables.trainers.iter().map(|t| t.id)),
            name: name.to_string(),
            specialty: specialty.map(str::to_string),
            bio: None,
            image_url: None,
        };
        tables.trainers.push(trainer.clone());
        trainer
    }

    pub async fn add_pricing_plan(&self, plan_name: &str, price: i32, duration_months: i32) -> PricingPlan {
        let mut tables = self.inner.lock().await;
        let plan = PricingPlan {
            id: Tables::next_catalog_id(tables.pricing_plans.iter().map(|p| p.id)),
            plan_name: plan_name.to_string(),
            price,
            duration_months,
            is_popular: false,
        };
        tables.pricing_plans.push(plan.clone());
        plan
    }

    pub async fn users(&self) -> Vec<User> {
        self.inner.lock().await.users.clone()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_program_id(&self, name: &str) -> AppResult<Option<i32>> {
        let tables = self.inner.lock().await;
        Ok(lowest_id(&tables.programs, |p| p.name == name, |p| p.id))
    }

    async fn find_trainer_id(&self, name: &str) -> AppResult<Option<i32>> {
        let tables = self.inner.lock().await;
        Ok(lowest_id(&tables.trainers, |t| t.name == name, |t| t.id))
    }

    async fn find_pricing_plan_id(&self, plan_name: &str) -> AppResult<Option<i32>> {
        let tables = self.inner.lock().await;
        Ok(lowest_id(&tables.pricing_plans, |p| p.plan_name == plan_name, |p| p.id))
    }

    async fn list_programs(&self) -> AppResult<Vec<Program>> {
        let mut programs = self.inner.lock().await.programs.clone();
        programs.sort_by_key(|p| p.id);
        Ok(programs)
    }

    async fn list_trainers(&self) -> AppResult<Vec<Trainer>> {
        let mut trainers = self.inner.lock().await.trainers.clone();
        trainers.sort_by_key(|t| t.id);
        Ok(trainers)
    }

    async fn list_pricing_plans(&self) -> AppResult<Vec<PricingPlan>> {
        let mut plans = self.inner.lock().await.pricing_plans.clone();
        plans.sort_by_key(|p| p.id);
        Ok(plans)
    }

    async fn upsert_user(&self, contact: &UserContact) -> AppResult<User> {
        let mut tables = self.inner.lock().await;

        if let Some(user) = tables.users.iter_mut().find(|u| u.email == contact.email) {
            user.name = contact.name.clone();
            user.phone = contact.phone.clone();
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<BookingInsert> {
        let mut tables = self.inner.lock().await;

        if tables
            .bookings
            .iter()
            .any(|existing| existing.blocks(booking.user_id, &booking.targets))
        {
            return Ok(BookingInsert::Duplicate);
        }

        let created = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            trainer_id: booking.targets.trainer_id,
            program_id: booking.targets.program_id,
            pricing_plan_id: booking.targets.pricing_plan_id,
            preferred_date: booking.schedule.preferred_date,
            preferred_time: booking.schedule.preferred_time.clone(),
            alternative_time: booking.schedule.alternative_time.clone(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        tables.bookings.push(created.clone());
        Ok(BookingInsert::Created(created))
    }

    async fn list_bookings(&self) -> AppResult<Vec<Booking>> {
        let mut bookings = self.inner.lock().await.bookings.clone();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Option<Booking>> {
        let mut tables = self.inner.lock().await;

        let Some(index) = tables.bookings.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let current = &tables.bookings[index];
        if status.is_active() && !current.status.is_active() {
            let (user_id, targets) = (current.user_id, current.targets());
            let clash = tables
                .bookings
                .iter()
                .any(|other| other.id != id && other.blocks(user_id, &targets));
            if clash {
                return Err(AppError::Conflict);
            }
        }

        tables.bookings[index].status = status;
        Ok(Some(tables.bookings[index].clone()))
    }

    async fn insert_contact(&self, user_id: Uuid, contact: &NewContact) -> AppResult<Contact> {
        let mut tables = self.inner.lock().await;
        let created = Contact {
            id: Uuid::new_v4(),
            user_id,
            name: contact.contact.name.clone(),
            email: contact.contact.email.clone(),
            phone: contact.contact.phone.clone(),
            subject: contact.subject.clone(),
            message: contact.message.clone(),
            created_at: Utc::now(),
        };
        tables.contacts.push(created.clone());
        Ok(created)
    }

    async fn list_contacts(&self) -> AppResult<Vec<Contact>> {
        let mut contacts = self.inner.lock().await.contacts.clone();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    async fn subscribe(&self, email: &str) -> AppResult<Subscription> {
        let mut tables = self.inner.lock().await;

        if let Some(existing) = tables.subscribers.iter().find(|s| s.email == email) {
            return Ok(Subscription::AlreadySubscribed(existing.clone()));
        }

        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.subscribers.push(subscriber.clone());
        Ok(Subscription::Created(subscriber))
    }

    async fn list_subscribers(&self) -> AppResult<Vec<Subscriber>> {
        let mut subscribers = self.inner.lock().await.subscribers.clone();
        subscribers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subscribers)
    }
}
