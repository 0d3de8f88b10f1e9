mod reminder_notifier;

pub use reminder_notifier::*;
