pub mod date;
mod reminder;
mod reminder_event;
mod shared;
mod subscription;
mod user;
mod workflow;

pub use reminder::{
    derive_triggers, ClassifiedTrigger, ReminderOffset, ReminderSchedule, TriggerClass,
    TriggerPoint, REMINDER_OFFSETS,
};
pub use reminder_event::{ReminderEvent, DEFAULT_PAYMENT_METHOD_LABEL};
pub use shared::entity::{Entity, ID};
pub use subscription::{
    Category, Currency, Frequency, Ineligibility, PaymentMethod, Plan, Subscription,
    SubscriptionStatus,
};
pub use user::User;
pub use workflow::{
    Checkpoint, FailureKind, RunFailure, RunStatus, Step, WorkflowRun, WorkflowRunError,
};
