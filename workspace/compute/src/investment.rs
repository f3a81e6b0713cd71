//! Investment status transitions and their timestamp side effects.

use chrono::{DateTime, Utc};
use model::entities::investment::{self, InvestmentStatus};
use sea_orm::Set;

/// Timestamps a transition into `status` must stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTimestamps {
    pub time_bought: Option<DateTime<Utc>>,
    pub time_sold: Option<DateTime<Utc>>,
}

pub fn status_timestamps(status: InvestmentStatus, now: DateTime<Utc>) -> StatusTimestamps {
    match status {
        InvestmentStatus::Active => StatusTimestamps {
            time_bought: Some(now),
            time_sold: None,
        },
        InvestmentStatus::Exited => StatusTimestamps {
            time_bought: None,
            time_sold: Some(now),
        },
        _ => StatusTimestamps::default(),
    }
}

/// Turn a loaded investment into an update that moves it to `status`.
///
/// Existing timestamps are left untouched unless the new status stamps them.
pub fn transition(
    existing: investment::Model,
    status: InvestmentStatus,
    now: DateTime<Utc>,
) -> investment::ActiveModel {
    let stamps = status_timestamps(status, now);
    let mut active: investment::ActiveModel = existing.into();

    active.status = Set(status);
    active.updated_at = Set(now);
    if let Some(bought) = stamps.time_bought {
        active.time_bought = Set(Some(bought));
    }
    if let Some(sold) = stamps.time_sold {
        active.time_sold = Set(Some(sold));
    }
    active
}
