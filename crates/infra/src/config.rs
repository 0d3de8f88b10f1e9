use subtrack_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ReminderWebhookConfig {
    /// Endpoint receiving a POST for every renewal reminder
    pub url: String,
    /// Sent in the `subtrack-webhook-key` header so the receiver can verify the sender
    pub key: String,
    /// A webhook call taking longer than this fails the dispatch. Always below
    /// the orphan timeout, so a run waiting on the webhook is never reclaimed.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Where renewal reminders are delivered. When not set the reminders
    /// are only written to the log.
    pub reminder_webhook: Option<ReminderWebhookConfig>,
    /// How often the job scheduler looks for sleeping workflow runs
    /// that are due to be resumed.
    pub workflow_poll_interval_secs: u64,
    /// An unfinished workflow run that has not made progress for this long
    /// is considered abandoned and is picked up again by the job scheduler.
    pub workflow_orphan_timeout_secs: u64,
}

const DEFAULT_PORT: usize = 5000;
const DEFAULT_WORKFLOW_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_WORKFLOW_ORPHAN_TIMEOUT_SECS: u64 = 60 * 10;
const DEFAULT_REMINDER_WEBHOOK_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn new() -> Self {
        let port = match std::env::var("PORT") {
            Ok(port) => match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let workflow_orphan_timeout_secs = secs_from_env(
            "WORKFLOW_ORPHAN_TIMEOUT_SECS",
            DEFAULT_WORKFLOW_ORPHAN_TIMEOUT_SECS,
        );

        Self {
            port,
            reminder_webhook: Self::reminder_webhook_from_env(workflow_orphan_timeout_secs),
            workflow_poll_interval_secs: secs_from_env(
                "WORKFLOW_POLL_INTERVAL_SECS",
                DEFAULT_WORKFLOW_POLL_INTERVAL_SECS,
            ),
            workflow_orphan_timeout_secs,
        }
    }

    fn reminder_webhook_from_env(orphan_timeout_secs: u64) -> Option<ReminderWebhookConfig> {
        let url = match std::env::var("REMINDER_WEBHOOK_URL") {
            Ok(url) => url,
            Err(_) => {
                info!("Did not find REMINDER_WEBHOOK_URL environment variable. Reminders will only be logged.");
                return None;
            }
        };
        if !is_valid_webhook_url(&url) {
            warn!(
                "The given REMINDER_WEBHOOK_URL: {} is not a valid http(s) url. Reminders will only be logged.",
                url
            );
            return None;
        }

        let key = match std::env::var("REMINDER_WEBHOOK_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find REMINDER_WEBHOOK_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Secret key for reminder webhooks was generated and set to: {}", key);
                key
            }
        };

        let timeout_secs = webhook_timeout_secs(
            secs_from_env(
                "REMINDER_WEBHOOK_TIMEOUT_SECS",
                DEFAULT_REMINDER_WEBHOOK_TIMEOUT_SECS,
            ),
            orphan_timeout_secs,
        );

        Some(ReminderWebhookConfig {
            url,
            key,
            timeout_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn secs_from_env(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(secs) => match secs.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "The given {}: {} is not valid, falling back to: {}.",
                    name, secs, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Caps the webhook timeout at half of the orphan timeout
fn webhook_timeout_secs(requested: u64, orphan_timeout_secs: u64) -> u64 {
    let max = std::cmp::max(orphan_timeout_secs / 2, 1);
    if requested > max {
        warn!(
            "The given REMINDER_WEBHOOK_TIMEOUT_SECS: {} is too close to WORKFLOW_ORPHAN_TIMEOUT_SECS: {}, falling back to: {}.",
            requested, orphan_timeout_secs, max
        );
        return max;
    }
    requested
}

fn is_valid_webhook_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed_url) => ["https", "http"].contains(&parsed_url.scheme()),
        Err(_) => false,
    }
}
