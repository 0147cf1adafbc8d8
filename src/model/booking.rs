use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::user::{lenient_string, trimmed, UserContact};

pub const DEFAULT_PREFERRED_TIME: &str = "Any";

/// What a booking is made for, from the `type` field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Program,
    Trainer,
    Pricing,
}

impl BookingKind {
    /// `None` for anything but the three known types; such bookings stay untargeted.
    pub fn from_form(value: &str) -> Option<Self> {
        match value {
            "program" => Some(BookingKind::Program),
            "trainer" => Some(BookingKind::Trainer),
            "pricing" => Some(BookingKind::Pricing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Active bookings hold their target for the user.
    pub fn is_active(&self) -> bool {
        *self != BookingStatus::Cancelled
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(AppError::validation(
                "Status must be one of pending, confirmed or cancelled",
                vec!["status"],
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub trainer_id: Option<i32>,
    pub program_id: Option<i32>,
    pub pricing_plan_id: Option<i32>,
    pub preferred_date: DateTime<Utc>,
    pub preferred_time: String,
    pub alternative_time: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// True when this booking prevents `user_id` from booking any of `targets` again.
    ///
    /// An empty target set never matches, so untargeted bookings can repeat.
    pub fn blocks(&self, user_id: Uuid, targets: &BookingTargets) -> bool {
        if self.user_id != user_id || !self.status.is_active() {
            return false;
        }
        same_id(self.program_id, targets.program_id)
            || same_id(self.trainer_id, targets.trainer_id)
            || same_id(self.pricing_plan_id, targets.pricing_plan_id)
    }

    pub fn targets(&self) -> BookingTargets {
        BookingTargets {
            program_id: self.program_id,
            trainer_id: self.trainer_id,
            pricing_plan_id: self.pricing_plan_id,
        }
    }
}

fn same_id(existing: Option<i32>, wanted: Option<i32>) -> bool {
    matches!((existing, wanted), (Some(a), Some(b)) if a == b)
}

/// Resolved foreign keys of a booking. Unresolved names stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingTargets {
    pub program_id: Option<i32>,
    pub trainer_id: Option<i32>,
    pub pricing_plan_id: Option<i32>,
}

impl BookingTargets {
    pub fn is_empty(&self) -> bool {
        self.program_id.is_none() && self.trainer_id.is_none() && self.pricing_plan_id.is_none()
    }
}

// Raw form body from the website. Everything is optional here; `BookingCommand::parse`
// decides what is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    pub program_name: Option<String>,
    pub trainer_name: Option<String>,
    pub plan_name: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub alternative_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSchedule {
    pub preferred_date: DateTime<Utc>,
    pub preferred_time: String,
    pub alternative_time: Option<String>,
}

/// A validated booking submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCommand {
    pub kind: Option<BookingKind>,
    pub contact: UserContact,
    /// Name of the program, trainer or plan, picked according to `kind`.
    pub target_name: Option<String>,
    pub schedule: BookingSchedule,
}

impl BookingCommand {
    pub fn parse(request: BookingRequest, now: DateTime<Utc>) -> AppResult<Self> {
        let contact = UserContact::parse(
            request.name.as_deref(),
            request.email.as_deref(),
            request.phone.as_deref(),
        )?;

        let kind = request.kind.as_deref().and_then(BookingKind::from_form);
        if let (None, Some(unknown)) = (kind, request.kind.as_deref()) {
            debug!(kind = unknown, "unrecognised booking type, booking stays untargeted");
        }

        // Names are looked up verbatim, so only an empty field counts as absent.
        let target_name = match kind {
            Some(BookingKind::Program) => request.program_name,
            Some(BookingKind::Trainer) => request.trainer_name,
            Some(BookingKind::Pricing) => request.plan_name,
            None => None,
        }
        .filter(|name| !name.is_empty());

        let schedule = BookingSchedule {
            preferred_date: parse_preferred_date(request.preferred_date.as_deref(), now)?,
            preferred_time: trimmed(request.preferred_time.as_deref())
                .unwrap_or_else(|| DEFAULT_PREFERRED_TIME.to_string()),
            alternative_time: trimmed(request.alternative_time.as_deref()),
        };

        Ok(Self {
            kind,
            contact,
            target_name,
            schedule,
        })
    }
}

/// Parses the preferred date of a booking.
///
/// Missing or blank means "tomorrow" (`now` + 24h). A bare `YYYY-MM-DD` is the
/// local midnight of that day. Anything else must be an RFC 3339 datetime (seconds
/// may be omitted), or a datetime without offset which is read as local time.
pub fn parse_preferred_date(raw: Option<&str>, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(now + Duration::hours(24));
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(local_to_utc(midnight));
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.with_timezone(&Utc));
    }

    // Browsers also send offsets without seconds, e.g. 2025-03-14T10:30Z.
    if let Ok(datetime) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%#z") {
        return Ok(datetime.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(local_to_utc(naive));
        }
    }

    Err(AppError::validation(
        "Preferred date must be YYYY-MM-DD or an ISO-8601 datetime",
        vec!["preferredDate"],
    ))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    // Inside a DST gap there is no local reading; fall back to UTC.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Everything the booking writer persists besides generated columns.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub targets: BookingTargets,
    pub schedule: BookingSchedule,
}

/// Outcome of the atomic guarded insert.
#[derive(Debug, Clone)]
pub enum BookingInsert {
    Created(Booking),
    Duplicate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingReceipt {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}
