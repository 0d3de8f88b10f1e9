use crate::date::is_same_day;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Number of days before the renewal date at which a reminder should be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderOffset(u32);

impl ReminderOffset {
    pub const fn days(days: u32) -> Self {
        Self(days)
    }

    pub fn days_before_renewal(&self) -> u32 {
        self.0
    }

    /// Human readable label, e.g. `7 days before renewal`
    pub fn label(&self) -> String {
        format!("{} days before renewal", self.0)
    }
}

impl Display for ReminderOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The offsets every renewal reminder workflow uses, steepest first
pub const REMINDER_OFFSETS: [ReminderOffset; 4] = [
    ReminderOffset::days(7),
    ReminderOffset::days(5),
    ReminderOffset::days(2),
    ReminderOffset::days(1),
];

/// A point in time at which a reminder should fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPoint {
    pub offset: ReminderOffset,
    pub remind_at: DateTime<Utc>,
}

impl TriggerPoint {
    pub fn new(renewal_date: DateTime<Utc>, offset: ReminderOffset) -> Self {
        Self {
            offset,
            remind_at: renewal_date - Duration::days(i64::from(offset.days_before_renewal())),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.remind_at.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerClass {
    /// The trigger day is already behind us
    Skipped,
    /// The trigger day is today
    DueNow,
    /// Has to be waited for
    Future,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTrigger {
    pub trigger: TriggerPoint,
    pub class: TriggerClass,
}

/// Computes the `TriggerPoint`s for a renewal date in the order of `offsets`
/// and classifies each of them relative to `now` by calendar day.
pub fn derive_triggers(
    renewal_date: DateTime<Utc>,
    now: DateTime<Utc>,
    offsets: &[ReminderOffset],
) -> Vec<ClassifiedTrigger> {
    offsets
        .iter()
        .map(|offset| {
            let trigger = TriggerPoint::new(renewal_date, *offset);
            let class = if is_same_day(&trigger.remind_at, &now) {
                TriggerClass::DueNow
            } else if trigger.remind_at < now {
                TriggerClass::Skipped
            } else {
                TriggerClass::Future
            };
            ClassifiedTrigger { trigger, class }
        })
        .collect()
}

/// The reminder schedule of a single workflow run. It is derived once when
/// the run starts and never recomputed, even if the renewal date changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "triggers", rename_all = "camelCase")]
pub enum ReminderSchedule {
    /// The renewal date had already passed when the run started
    Empty,
    Triggers(Vec<ClassifiedTrigger>),
}

impl ReminderSchedule {
    pub fn derive(
        renewal_date: DateTime<Utc>,
        now: DateTime<Utc>,
        offsets: &[ReminderOffset],
    ) -> Self {
        if renewal_date < now {
            return Self::Empty;
        }
        Self::Triggers(derive_triggers(renewal_date, now, offsets))
    }

    /// The triggers that still have to be dispatched, in schedule order
    pub fn pending(&self) -> Vec<&ClassifiedTrigger> {
        match self {
            Self::Empty => Vec::new(),
            Self::Triggers(triggers) => triggers
                .iter()
                .filter(|t| t.class != TriggerClass::Skipped)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// The pending triggers, each paired with the instant its reminder becomes
    /// overdue: the next pending trigger point, or the renewal date for the last one.
    /// A reminder that is only reached at or after that instant would be
    /// delivered after a later reminder should already have been, and is dropped.
    pub fn pending_with_deadlines(
        &self,
        renewal_date: DateTime<Utc>,
    ) -> Vec<(&ClassifiedTrigger, DateTime<Utc>)> {
        let pending = self.pending();
        pending
            .iter()
            .enumerate()
            .map(|(i, trigger)| {
                let overdue_at = pending
                    .get(i + 1)
                    .map(|next| next.trigger.remind_at)
                    .unwrap_or(renewal_date);
                (*trigger, overdue_at)
            })
            .collect()
    }
}
