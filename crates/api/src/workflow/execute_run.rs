use super::{
    send_reminders::send_renewal_reminders,
    step_runner::{DurableContext, StepError},
};
use subtrack_domain::{FailureKind, RunFailure, RunStatus, Step, WorkflowRun, ID};
use subtrack_infra::SubtrackContext;
use thiserror::Error;
use tracing::{error, info, info_span};
use tracing_futures::Instrument;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Workflow run {run_id} failed: {failure:?}")]
    Failed { run_id: ID, failure: RunFailure },
    #[error("Unable to store workflow run {run_id}: {message}")]
    Storage { run_id: ID, message: String },
}

/// Executes the reminder workflow of `run` until it completes, fails or goes
/// to sleep, and returns the stored state of the run afterwards.
///
/// A failed run is stored as `Failed` together with its `RunFailure`
/// before the failure is returned.
pub async fn execute_workflow_run(
    mut run: WorkflowRun,
    ctx: &SubtrackContext,
) -> Result<WorkflowRun, ExecutionError> {
    if run.status.is_terminal() || run.status == RunStatus::Sleeping {
        return Ok(run);
    }

    let now = ctx.sys.get_timestamp_millis();
    if run.status == RunStatus::Created {
        if let Err(e) = run.transition(RunStatus::Deriving, now) {
            return fail_run(run, StepError::from(e), None, ctx).await;
        }
        save_run(&run, ctx).await?;
    }

    let mut durable = DurableContext::new(run, ctx);
    let res = send_renewal_reminders(&mut durable).await;
    let (mut run, failed_step) = durable.finish();

    match res {
        Ok(outcome) => {
            info!("Workflow run {} completed: {:?}", run.id, outcome);
            if let Err(e) = run.complete(ctx.sys.get_timestamp_millis()) {
                return fail_run(run, StepError::from(e), None, ctx).await;
            }
            save_run(&run, ctx).await?;
            Ok(run)
        }
        // Already stored as sleeping by the step runner
        Err(StepError::Suspended { .. }) => Ok(run),
        Err(e) => fail_run(run, e, failed_step, ctx).await,
    }
}

async fn fail_run(
    mut run: WorkflowRun,
    e: StepError,
    failed_step: Option<Step>,
    ctx: &SubtrackContext,
) -> Result<WorkflowRun, ExecutionError> {
    let failure = e
        .into_failure(failed_step)
        .unwrap_or_else(|| RunFailure::new(FailureKind::Internal, "Unknown failure".into(), None));
    error!("Workflow run {} failed: {:?}", run.id, failure);

    if let Err(e) = run.fail(failure.clone(), ctx.sys.get_timestamp_millis()) {
        error!("Unable to mark workflow run {} as failed: {:?}", run.id, e);
    }
    save_run(&run, ctx).await?;

    Err(ExecutionError::Failed {
        run_id: run.id,
        failure,
    })
}

async fn save_run(run: &WorkflowRun, ctx: &SubtrackContext) -> Result<(), ExecutionError> {
    ctx.repos.workflow_runs.save(run).await.map_err(|e| {
        error!("Unable to store workflow run {}: {:?}", run.id, e);
        ExecutionError::Storage {
            run_id: run.id.clone(),
            message: e.to_string(),
        }
    })
}

/// Runs the workflow in the background until it completes, fails or sleeps
pub fn spawn_workflow_run(run: WorkflowRun, ctx: SubtrackContext) {
    let span = info_span!("Workflow run", run_id = %run.id, subscription_id = %run.subscription_id);
    actix_web::rt::spawn(
        async move {
            // Failures are stored on the run and logged by the executor
            let _ = execute_workflow_run(run, &ctx).await;
        }
        .instrument(span),
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::workflow::dispatch_reminder::DispatchOutcome;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;
    use subtrack_domain::{
        Category, Frequency, Plan, ReminderOffset, Subscription, SubscriptionStatus, User,
    };
    use subtrack_infra::{ISys, InMemoryReminderNotifier, StaticTimeSys};

    struct TestContext {
        ctx: SubtrackContext,
        sys: Arc<StaticTimeSys>,
        notifier: Arc<InMemoryReminderNotifier>,
        subscription: Subscription,
    }

    fn renewal() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    async fn setup(now: DateTime<Utc>) -> TestContext {
        let mut ctx = SubtrackContext::create_inmemory();
        let sys = Arc::new(StaticTimeSys::new(now.timestamp_millis()));
        let notifier = Arc::new(InMemoryReminderNotifier::new());
        ctx.sys = sys.clone();
        ctx.notifier = notifier.clone();

        let user = User::new("Jane".into(), "jane@example.com".into());
        ctx.repos.users.insert(&user).await.unwrap();
        let subscription = Subscription {
            id: Default::default(),
            user_id: user.id.clone(),
            name: "Netflix".into(),
            plan: Plan::Premium,
            category: Category::Streaming,
            start_date: Utc.with_ymd_and_hms(2024, 12, 10, 12, 0, 0).unwrap(),
            end_date: renewal(),
            status: SubscriptionStatus::Active,
            price: 15.99,
            currency: None,
            frequency: Frequency::Monthly,
            payment_method: None,
            description: None,
        };
        ctx.repos.subscriptions.insert(&subscription).await.unwrap();

        TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        }
    }

    async fn start_run(ctx: &SubtrackContext, subscription_id: &ID) -> WorkflowRun {
        let run = WorkflowRun::new(subscription_id.clone(), ctx.sys.get_timestamp_millis());
        ctx.repos.workflow_runs.insert(&run).await.unwrap();
        run
    }

    /// Moves the clock and resumes every due run, like the job scheduler does
    async fn resume_at(ctx: &SubtrackContext, sys: &StaticTimeSys, at: DateTime<Utc>) -> usize {
        sys.set_datetime(at);
        let now = at.timestamp_millis();
        let claimed = ctx.repos.workflow_runs.claim_due(now, -1).await.unwrap();
        let resumed = claimed.len();
        for run in claimed {
            let _ = execute_workflow_run(run, ctx).await;
        }
        resumed
    }

    fn sent_offsets(notifier: &InMemoryReminderNotifier) -> Vec<u32> {
        notifier
            .sent()
            .iter()
            .map(|e| e.offset.days_before_renewal())
            .collect()
    }

    #[actix_web::main]
    #[test]
    async fn sends_all_reminders_in_order() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(created).await;

        let run = start_run(&ctx, &subscription.id).await;
        let run = execute_workflow_run(run, &ctx).await.unwrap();
        assert_eq!(run.status, RunStatus::Sleeping);
        assert_eq!(
            run.wake_at,
            Some((renewal() - Duration::days(7)).timestamp_millis())
        );
        assert!(notifier.sent().is_empty());

        // Nothing is due before the first trigger point
        assert_eq!(
            resume_at(&ctx, &sys, renewal() - Duration::days(8)).await,
            0
        );

        for (days, expected_sent) in [(7, 1), (5, 2), (2, 3), (1, 4)].iter() {
            let at = renewal() - Duration::days(*days);
            assert_eq!(resume_at(&ctx, &sys, at).await, 1);
            assert_eq!(notifier.sent().len(), *expected_sent);
        }

        assert_eq!(sent_offsets(&notifier), vec![7, 5, 2, 1]);
        let sent = notifier.sent();
        for pair in sent.windows(2) {
            let first = pair[0].renewal_date - Duration::days(pair[0].offset.days_before_renewal().into());
            let second = pair[1].renewal_date - Duration::days(pair[1].offset.days_before_renewal().into());
            assert!(first < second);
        }
        assert_eq!(sent[0].recipient_email, "jane@example.com");
        assert_eq!(sent[0].payment_method, "your payment method");

        let run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        // Fetch, derive and one sleep plus one dispatch per trigger point
        assert_eq!(run.checkpoints.len(), 2 + 4 * 2);
    }

    #[actix_web::main]
    #[test]
    async fn dispatches_due_reminder_without_sleeping() {
        let TestContext {
            ctx,
            notifier,
            subscription,
            ..
        } = setup(renewal() - Duration::days(7)).await;

        let run = start_run(&ctx, &subscription.id).await;
        let run = execute_workflow_run(run, &ctx).await.unwrap();

        assert_eq!(sent_offsets(&notifier), vec![7]);
        assert_eq!(run.status, RunStatus::Sleeping);
        assert_eq!(
            run.wake_at,
            Some((renewal() - Duration::days(5)).timestamp_millis())
        );
        assert!(run
            .checkpoint(&Step::Sleep {
                offset: ReminderOffset::days(7)
            })
            .is_none());
    }

    #[actix_web::main]
    #[test]
    async fn skips_trigger_points_in_the_past() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(3)).await;

        let run = start_run(&ctx, &subscription.id).await;
        let run = execute_workflow_run(run, &ctx).await.unwrap();
        assert!(notifier.sent().is_empty());
        assert_eq!(
            run.wake_at,
            Some((renewal() - Duration::days(2)).timestamp_millis())
        );

        resume_at(&ctx, &sys, renewal() - Duration::days(2)).await;
        resume_at(&ctx, &sys, renewal() - Duration::days(1)).await;
        assert_eq!(sent_offsets(&notifier), vec![2, 1]);
    }

    #[actix_web::main]
    #[test]
    async fn completes_without_reminders_when_renewal_passed() {
        let TestContext {
            ctx,
            notifier,
            subscription,
            ..
        } = setup(renewal() + Duration::hours(1)).await;

        let run = start_run(&ctx, &subscription.id).await;
        let run = execute_workflow_run(run, &ctx).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(notifier.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn stops_when_subscription_is_cancelled_while_sleeping() {
        let TestContext {
            ctx,
            sys,
            notifier,
            mut subscription,
        } = setup(renewal() - Duration::days(9)).await;

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();
        resume_at(&ctx, &sys, renewal() - Duration::days(7)).await;
        assert_eq!(sent_offsets(&notifier), vec![7]);

        subscription.cancel();
        ctx.repos.subscriptions.save(&subscription).await.unwrap();

        resume_at(&ctx, &sys, renewal() - Duration::days(5)).await;
        let run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.failure.is_none());
        assert_eq!(sent_offsets(&notifier), vec![7]);

        let outcome = run
            .checkpoint(&Step::Dispatch {
                offset: ReminderOffset::days(5),
            })
            .map(|c| serde_json::from_value::<DispatchOutcome>(c.output.clone()).unwrap());
        assert!(matches!(outcome, Some(DispatchOutcome::Ineligible { .. })));
    }

    #[actix_web::main]
    #[test]
    async fn inactive_subscription_completes_immediately() {
        let TestContext {
            ctx,
            notifier,
            mut subscription,
            ..
        } = setup(renewal() - Duration::days(9)).await;
        subscription.status = SubscriptionStatus::Expired;
        ctx.repos.subscriptions.save(&subscription).await.unwrap();

        let run = start_run(&ctx, &subscription.id).await;
        let run = execute_workflow_run(run, &ctx).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(notifier.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn missing_subscription_fails_without_retry() {
        let TestContext { ctx, .. } = setup(renewal() - Duration::days(9)).await;

        let run = start_run(&ctx, &ID::default()).await;
        let res = execute_workflow_run(run.clone(), &ctx).await;
        assert!(matches!(res, Err(ExecutionError::Failed { .. })));

        let mut run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        let failure = run.failure.clone().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.step, Some(Step::FetchSubscription));
        assert!(!failure.retryable);
        assert!(run.retry(0).is_err());
    }

    #[actix_web::main]
    #[test]
    async fn owner_deleted_while_sleeping_fails_dispatch() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(9)).await;

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();
        ctx.repos.users.delete(&subscription.user_id).await.unwrap();

        resume_at(&ctx, &sys, renewal() - Duration::days(7)).await;
        let run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        let failure = run.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(
            failure.step,
            Some(Step::Dispatch {
                offset: ReminderOffset::days(7)
            })
        );
        assert!(notifier.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn retries_failed_dispatch() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(9)).await;

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();

        notifier.set_failing(true);
        resume_at(&ctx, &sys, renewal() - Duration::days(7)).await;
        let mut run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        let failure = run.failure.clone().unwrap();
        assert_eq!(failure.kind, FailureKind::DispatchFailure);
        assert!(failure.retryable);
        // The sleep succeeded and is kept, the failed dispatch is not
        assert!(run
            .checkpoint(&Step::Sleep {
                offset: ReminderOffset::days(7)
            })
            .is_some());
        assert!(run
            .checkpoint(&Step::Dispatch {
                offset: ReminderOffset::days(7)
            })
            .is_none());

        notifier.set_failing(false);
        run.retry(sys.get_timestamp_millis()).unwrap();
        ctx.repos.workflow_runs.save(&run).await.unwrap();
        let run = execute_workflow_run(run, &ctx).await.unwrap();

        assert_eq!(sent_offsets(&notifier), vec![7]);
        assert_eq!(run.status, RunStatus::Sleeping);
        assert!(run.failure.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn skips_stale_reminders_after_oversleeping() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(9)).await;

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();

        // The process was down from before the 7 day reminder until the 5 day one
        resume_at(&ctx, &sys, renewal() - Duration::days(5)).await;
        assert_eq!(sent_offsets(&notifier), vec![5]);

        let run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Sleeping);
        assert!(run
            .checkpoint(&Step::Dispatch {
                offset: ReminderOffset::days(7)
            })
            .is_none());
    }

    #[actix_web::main]
    #[test]
    async fn sends_reminders_when_woken_late_past_midnight() {
        let renewal = Utc.with_ymd_and_hms(2025, 1, 10, 23, 59, 30).unwrap();
        let TestContext {
            ctx,
            sys,
            notifier,
            mut subscription,
        } = setup(renewal - Duration::days(9)).await;
        subscription.end_date = renewal;
        ctx.repos.subscriptions.save(&subscription).await.unwrap();

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();

        // Every wake up happens a poll interval late, on the next calendar day
        for days in [7, 5, 2, 1].iter() {
            let at = renewal - Duration::days(*days) + Duration::seconds(60);
            assert_eq!(resume_at(&ctx, &sys, at).await, 1);
        }

        assert_eq!(sent_offsets(&notifier), vec![7, 5, 2, 1]);
        let run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[actix_web::main]
    #[test]
    async fn skips_due_reminder_reached_after_the_next_one() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(7)).await;

        notifier.set_failing(true);
        let run = start_run(&ctx, &subscription.id).await;
        assert!(execute_workflow_run(run.clone(), &ctx).await.is_err());
        notifier.set_failing(false);

        // Retried only once the 5 day reminder is due
        sys.set_datetime(renewal() - Duration::days(5));
        let mut run = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        run.retry(sys.get_timestamp_millis()).unwrap();
        ctx.repos.workflow_runs.save(&run).await.unwrap();
        let run = execute_workflow_run(run, &ctx).await.unwrap();

        assert_eq!(sent_offsets(&notifier), vec![5]);
        assert_eq!(run.status, RunStatus::Sleeping);
        assert_eq!(
            run.wake_at,
            Some((renewal() - Duration::days(2)).timestamp_millis())
        );
    }

    #[actix_web::main]
    #[test]
    async fn replays_completed_steps_after_orphaned_execution() {
        let TestContext {
            ctx,
            sys,
            notifier,
            subscription,
        } = setup(renewal() - Duration::days(7)).await;

        let run = start_run(&ctx, &subscription.id).await;
        execute_workflow_run(run.clone(), &ctx).await.unwrap();
        assert_eq!(sent_offsets(&notifier), vec![7]);

        // Pretend the process died after the dispatch but before the run went to sleep
        let mut stored = ctx.repos.workflow_runs.find(&run.id).await.unwrap();
        stored.status = RunStatus::Dispatching;
        stored.wake_at = None;
        ctx.repos.workflow_runs.save(&stored).await.unwrap();

        let now = sys.get_timestamp_millis();
        let claimed = ctx
            .repos
            .workflow_runs
            .claim_due(now, now)
            .await
            .unwrap();
        assert_eq!(claimed.len(), 1);
        let run = execute_workflow_run(claimed[0].clone(), &ctx).await.unwrap();

        // Not sent twice
        assert_eq!(sent_offsets(&notifier), vec![7]);
        assert_eq!(run.status, RunStatus::Sleeping);
    }
}
