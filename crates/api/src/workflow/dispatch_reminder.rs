use super::step_runner::{DurableContext, StepError};
use serde::{Deserialize, Serialize};
use subtrack_domain::{Ineligibility, ReminderEvent, ReminderOffset, Step, ID};
use subtrack_infra::SubtrackContext;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DispatchOutcome {
    Sent,
    /// The subscription stopped being eligible for reminders, nothing was sent
    Ineligible { reason: Ineligibility },
}

/// Sends the reminder for `offset` as a durable step. A reminder that was
/// already dispatched by an earlier execution of the run is not sent again.
pub async fn dispatch_reminder(
    durable: &mut DurableContext<'_>,
    subscription_id: &ID,
    offset: ReminderOffset,
) -> Result<DispatchOutcome, StepError> {
    let ctx = durable.ctx();
    durable
        .run_step(Step::Dispatch { offset }, || {
            send_reminder(ctx, subscription_id, offset)
        })
        .await
}

async fn send_reminder(
    ctx: &SubtrackContext,
    subscription_id: &ID,
    offset: ReminderOffset,
) -> Result<DispatchOutcome, StepError> {
    // The subscription may have been changed while the run was sleeping
    let subscription = ctx
        .repos
        .subscriptions
        .find(subscription_id)
        .await
        .ok_or_else(|| {
            StepError::NotFound(format!(
                "Subscription with id: {}, was not found.",
                subscription_id
            ))
        })?;
    let owner = ctx
        .repos
        .users
        .find(&subscription.user_id)
        .await
        .ok_or_else(|| {
            StepError::NotFound(format!(
                "The owner: {}, of subscription: {}, was not found.",
                subscription.user_id, subscription_id
            ))
        })?;

    if let Err(reason) = subscription.reminder_eligibility(ctx.sys.get_datetime()) {
        info!(
            "Subscription {} is no longer eligible for reminders: {:?}",
            subscription.id, reason
        );
        return Ok(DispatchOutcome::Ineligible { reason });
    }

    let event = ReminderEvent::new(&subscription, &owner, offset);
    ctx.notifier
        .send(&event)
        .await
        .map_err(|e| StepError::DispatchFailure(format!("{:?}", e)))?;

    info!(
        "Sent `{}` reminder for subscription {} to {}",
        event.label, subscription.id, event.recipient_email
    );
    Ok(DispatchOutcome::Sent)
}
