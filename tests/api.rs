mod helpers;

use chrono::Duration;
use helpers::setup::{spawn_app, test_start_time, wait_for_run_status};
use subtrack_sdk::{
    Category, CreateSubscriptionInput, CreateUserInput, Currency, FailureKind, Frequency,
    PaymentMethod, Plan, RunStatus, StatusCode, Step, SubscriptionStatus, SubtrackSDK,
    UpdateSubscriptionInput, User, ID,
};

async fn create_user(sdk: &SubtrackSDK) -> User {
    sdk.user
        .create(CreateUserInput {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
        })
        .await
        .expect("Expected to create user")
        .user
}

fn subscription_input(user_id: &ID, renews_in_days: i64) -> CreateSubscriptionInput {
    CreateSubscriptionInput {
        user_id: user_id.clone(),
        name: "Netflix".into(),
        plan: Plan::Premium,
        category: Category::Streaming,
        start_date: None,
        end_date: test_start_time() + Duration::days(renews_in_days),
        price: 15.99,
        currency: Some(Currency::Usd),
        frequency: Frequency::Monthly,
        payment_method: Some(PaymentMethod::CreditCard),
        description: None,
    }
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let (_, sdk, _) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_create_and_get_user() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;
    assert_eq!(user.email, "jane@example.com");

    let res = sdk
        .user
        .get(user.id.clone())
        .await
        .expect("Expected to get user");
    assert_eq!(res.user.id, user.id);

    let res = sdk
        .user
        .create(CreateUserInput {
            name: "Jane Again".into(),
            email: "jane@example.com".into(),
        })
        .await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::CONFLICT));

    let res = sdk.user.get(ID::default()).await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::NOT_FOUND));
}

#[actix_web::main]
#[test]
async fn test_create_subscription_starts_reminder_workflow() {
    let (app, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    // Renews in exactly 7 days, so the first reminder is due right away
    let res = sdk
        .subscription
        .create(subscription_input(&user.id, 7))
        .await
        .expect("Expected to create subscription");
    assert_eq!(res.subscription.status, SubscriptionStatus::Active);

    let run = wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Sleeping).await;
    assert_eq!(
        run.wake_at,
        Some((test_start_time() + Duration::days(2)).timestamp_millis())
    );
    let completed_steps = run
        .completed_steps
        .iter()
        .map(|s| s.step.clone())
        .collect::<Vec<_>>();
    assert!(completed_steps.contains(&Step::FetchSubscription));
    assert!(completed_steps.contains(&Step::DeriveSchedule));

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].label, "7 days before renewal");
    assert_eq!(sent[0].recipient_email, "jane@example.com");
    assert_eq!(sent[0].payment_method, "Credit Card");

    let subscriptions = sdk
        .subscription
        .get_by_user(user.id.clone())
        .await
        .expect("Expected to list subscriptions")
        .subscriptions;
    assert_eq!(subscriptions.len(), 1);
}

#[actix_web::main]
#[test]
async fn test_sleeping_run_is_resumed_by_job_scheduler() {
    let (app, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let res = sdk
        .subscription
        .create(subscription_input(&user.id, 9))
        .await
        .expect("Expected to create subscription");
    let run = wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Sleeping).await;
    assert!(app.notifier.sent().is_empty());
    let wake_at = run.wake_at.expect("Expected sleeping run to have a wake time");

    app.sys.set_timestamp_millis(wake_at);
    let run = wait_for_run_status_change(&sdk, &res.workflow_run_id, wake_at).await;
    assert_eq!(run.status, RunStatus::Sleeping);
    assert_eq!(app.notifier.sent().len(), 1);
}

/// Waits until the run has been resumed and gone back to sleep with a later wake time
async fn wait_for_run_status_change(
    sdk: &SubtrackSDK,
    run_id: &ID,
    previous_wake_at: i64,
) -> subtrack_sdk::WorkflowRun {
    for _ in 0..50 {
        let run = sdk
            .workflow
            .get_run(run_id.clone())
            .await
            .expect("Expected to find workflow run")
            .workflow_run;
        if run.status == RunStatus::Sleeping && run.wake_at != Some(previous_wake_at) {
            return run;
        }
        actix_web::rt::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Workflow run was never resumed");
}

#[actix_web::main]
#[test]
async fn test_cancelled_subscription_receives_no_more_reminders() {
    let (app, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let res = sdk
        .subscription
        .create(subscription_input(&user.id, 9))
        .await
        .expect("Expected to create subscription");
    let run = wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Sleeping).await;

    let cancelled = sdk
        .subscription
        .cancel(res.subscription.id.clone())
        .await
        .expect("Expected to cancel subscription")
        .subscription;
    assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);

    app.sys
        .set_timestamp_millis(run.wake_at.expect("Expected wake time"));
    wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Completed).await;
    assert!(app.notifier.sent().is_empty());

    let res = sdk.subscription.cancel(res.subscription.id.clone()).await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::CONFLICT));
}

#[actix_web::main]
#[test]
async fn test_deleted_subscription_fails_its_workflow() {
    let (app, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let res = sdk
        .subscription
        .create(subscription_input(&user.id, 9))
        .await
        .expect("Expected to create subscription");
    let run = wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Sleeping).await;

    sdk.subscription
        .delete(res.subscription.id.clone())
        .await
        .expect("Expected to delete subscription");
    let subscriptions = sdk
        .subscription
        .get_by_user(user.id.clone())
        .await
        .expect("Expected to get subscriptions")
        .subscriptions;
    assert!(subscriptions.is_empty());

    app.sys
        .set_timestamp_millis(run.wake_at.expect("Expected wake time"));
    let run = wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Failed).await;
    let failure = run.failure.expect("Expected failed run to have a failure");
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert!(!failure.retryable);
    assert!(app.notifier.sent().is_empty());

    let res = sdk.subscription.delete(res.subscription.id.clone()).await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::NOT_FOUND));
}

#[actix_web::main]
#[test]
async fn test_update_subscription() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;
    let subscription = sdk
        .subscription
        .create(subscription_input(&user.id, 20))
        .await
        .expect("Expected to create subscription")
        .subscription;

    let updated = sdk
        .subscription
        .update(UpdateSubscriptionInput {
            subscription_id: subscription.id.clone(),
            price: Some(17.99),
            currency: Some(Currency::Eur),
            ..Default::default()
        })
        .await
        .expect("Expected to update subscription")
        .subscription;
    assert_eq!(updated.price, 17.99);
    assert_eq!(updated.currency, Some(Currency::Eur));
    assert_eq!(updated.end_date, subscription.end_date);

    let res = sdk
        .subscription
        .update(UpdateSubscriptionInput {
            subscription_id: subscription.id.clone(),
            price: Some(-1.0),
            ..Default::default()
        })
        .await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::BAD_REQUEST));
}

#[actix_web::main]
#[test]
async fn test_trigger_and_retry_workflow() {
    let (app, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;
    let res = sdk
        .subscription
        .create(subscription_input(&user.id, 7))
        .await
        .expect("Expected to create subscription");
    let subscription = res.subscription;
    wait_for_run_status(&sdk, &res.workflow_run_id, RunStatus::Sleeping).await;
    assert_eq!(app.notifier.sent().len(), 1);

    // A second run for the same subscription fails to deliver its first reminder
    app.notifier.set_failing(true);
    let run_id = sdk
        .workflow
        .trigger_reminders(subscription.id.clone())
        .await
        .expect("Expected to trigger workflow")
        .workflow_run_id;
    let run = wait_for_run_status(&sdk, &run_id, RunStatus::Failed).await;
    let failure = run.failure.expect("Expected failed run to have a failure");
    assert_eq!(failure.kind, FailureKind::DispatchFailure);
    assert!(failure.retryable);

    app.notifier.set_failing(false);
    sdk.workflow
        .retry_run(run_id.clone())
        .await
        .expect("Expected to retry workflow run");
    wait_for_run_status(&sdk, &run_id, RunStatus::Sleeping).await;
    assert_eq!(app.notifier.sent().len(), 2);

    let res = sdk.workflow.retry_run(run_id).await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::CONFLICT));

    let res = sdk.workflow.trigger_reminders(ID::default()).await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::NOT_FOUND));
}

#[actix_web::main]
#[test]
async fn test_rejects_invalid_subscriptions() {
    let (_, sdk, _) = spawn_app().await;
    let user = create_user(&sdk).await;

    let res = sdk
        .subscription
        .create(subscription_input(&ID::default(), 9))
        .await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::NOT_FOUND));

    let res = sdk
        .subscription
        .create(CreateSubscriptionInput {
            price: -5.0,
            ..subscription_input(&user.id, 9)
        })
        .await;
    assert_eq!(res.unwrap_err().status_code(), Some(StatusCode::BAD_REQUEST));
}
