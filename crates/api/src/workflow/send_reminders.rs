use super::{
    dispatch_reminder::{dispatch_reminder, DispatchOutcome},
    step_runner::{DurableContext, StepError},
};
use serde::{Deserialize, Serialize};
use subtrack_domain::{
    Ineligibility, ReminderSchedule, Step, Subscription, SubscriptionStatus, TriggerClass, ID,
    REMINDER_OFFSETS,
};
use subtrack_infra::SubtrackContext;
use tracing::{info, warn};

/// What the reminder schedule looked like when the run started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum StartDecision {
    NotActive { status: SubscriptionStatus },
    Schedule { schedule: ReminderSchedule },
}

/// How a run of the reminder workflow ended
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// The subscription was not active when the run started
    NotActive,
    /// The renewal date had already passed when the run started
    ScheduleEmpty,
    /// The subscription stopped being eligible, the remaining reminders were dropped
    Ineligible { reason: Ineligibility, sent: usize },
    /// Every pending reminder of the schedule was handled. `stale` reminders
    /// were only reached once the next one was due and were dropped.
    Finished { sent: usize, stale: usize },
}

/// The renewal reminder workflow for one subscription.
///
/// Derives the reminder schedule once, then sleeps until each pending trigger
/// point and dispatches its reminder. This body is replayed from the start on
/// every resume, so everything that must not change between executions goes
/// through a durable step.
pub async fn send_renewal_reminders(
    durable: &mut DurableContext<'_>,
) -> Result<WorkflowOutcome, StepError> {
    let ctx = durable.ctx();
    let subscription_id = durable.run().subscription_id.clone();

    let subscription: Subscription = durable
        .run_step(Step::FetchSubscription, || {
            fetch_subscription(ctx, &subscription_id)
        })
        .await?;

    let decision = durable
        .run_step(Step::DeriveSchedule, || derive_schedule(ctx, &subscription))
        .await?;

    let schedule = match decision {
        StartDecision::NotActive { status } => {
            info!(
                "Subscription {} is {:?}, no reminders will be sent",
                subscription_id, status
            );
            return Ok(WorkflowOutcome::NotActive);
        }
        StartDecision::Schedule { schedule } => schedule,
    };
    if let ReminderSchedule::Empty = schedule {
        info!(
            "Renewal date {} of subscription {} has passed, no reminders will be sent",
            subscription.end_date, subscription_id
        );
        return Ok(WorkflowOutcome::ScheduleEmpty);
    }

    let mut sent = 0;
    let mut stale = 0;
    for (pending, overdue_at) in schedule.pending_with_deadlines(subscription.end_date) {
        let offset = pending.trigger.offset;
        let remind_at = pending.trigger.remind_at;

        // A dispatch recorded by an earlier execution is replayed as is
        if !durable.is_checkpointed(&Step::Dispatch { offset }) {
            let reached_at = match pending.class {
                TriggerClass::Future => {
                    durable
                        .sleep_until(Step::Sleep { offset }, remind_at.timestamp_millis())
                        .await?
                }
                _ => ctx.sys.get_timestamp_millis(),
            };

            if reached_at >= overdue_at.timestamp_millis() {
                warn!(
                    "Skipping overdue `{}` reminder of subscription {}, it was due {} but was only reached at {}",
                    offset.label(),
                    subscription_id,
                    remind_at,
                    reached_at
                );
                stale += 1;
                continue;
            }
        }

        match dispatch_reminder(durable, &subscription_id, offset).await? {
            DispatchOutcome::Sent => sent += 1,
            DispatchOutcome::Ineligible { reason } => {
                return Ok(WorkflowOutcome::Ineligible { reason, sent })
            }
        }
    }

    Ok(WorkflowOutcome::Finished { sent, stale })
}

async fn derive_schedule(
    ctx: &SubtrackContext,
    subscription: &Subscription,
) -> Result<StartDecision, StepError> {
    if !subscription.is_active() {
        return Ok(StartDecision::NotActive {
            status: subscription.status,
        });
    }
    let schedule = ReminderSchedule::derive(
        subscription.end_date,
        ctx.sys.get_datetime(),
        &REMINDER_OFFSETS,
    );
    Ok(StartDecision::Schedule { schedule })
}

async fn fetch_subscription(
    ctx: &SubtrackContext,
    subscription_id: &ID,
) -> Result<Subscription, StepError> {
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

    if ctx.repos.users.find(&subscription.user_id).await.is_none() {
        return Err(StepError::NotFound(format!(
            "The owner: {}, of subscription: {}, was not found.",
            subscription.user_id, subscription_id
        )));
    }

    Ok(subscription)
}
