use super::IReminderNotifier;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use subtrack_domain::ReminderEvent;

/// Keeps every sent `ReminderEvent` in memory. Useful for testing.
pub struct InMemoryReminderNotifier {
    sent: Mutex<Vec<ReminderEvent>>,
    failing: AtomicBool,
}

impl InMemoryReminderNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing: AtomicBool::new(false),
        }
    }

    pub fn sent(&self) -> Vec<ReminderEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// While failing, every `send` returns an error and nothing is recorded
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for InMemoryReminderNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderNotifier for InMemoryReminderNotifier {
    async fn send(&self, event: &ReminderEvent) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!(
                "Unable to deliver {} reminder to {}",
                event.label,
                event.recipient_email
            ));
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}
