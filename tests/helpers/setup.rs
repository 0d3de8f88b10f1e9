use actix_web::rt::time::sleep;
use chrono::{DateTime, TimeZone, Utc};
use std::{sync::Arc, time::Duration};
use subtrack_api::Application;
use subtrack_infra::{Config, InMemoryReminderNotifier, StaticTimeSys, SubtrackContext};
use subtrack_sdk::{RunStatus, SubtrackSDK, WorkflowRun, ID};

pub struct TestApp {
    pub config: Config,
    pub sys: Arc<StaticTimeSys>,
    pub notifier: Arc<InMemoryReminderNotifier>,
}

pub fn test_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, SubtrackSDK, String) {
    let mut ctx = SubtrackContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.workflow_poll_interval_secs = 1;

    let sys = Arc::new(StaticTimeSys::new(test_start_time().timestamp_millis()));
    let notifier = Arc::new(InMemoryReminderNotifier::new());
    ctx.sys = sys.clone();
    ctx.notifier = notifier.clone();

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp {
        config,
        sys,
        notifier,
    };
    let sdk = SubtrackSDK::new(address.clone());
    (app, sdk, address)
}

/// Polls the workflow run until it reaches `status`, runs execute in the background
pub async fn wait_for_run_status(sdk: &SubtrackSDK, run_id: &ID, status: RunStatus) -> WorkflowRun {
    let mut last_status = None;
    for _ in 0..50 {
        let run = sdk
            .workflow
            .get_run(run_id.clone())
            .await
            .expect("Expected to find workflow run")
            .workflow_run;
        if run.status == status {
            return run;
        }
        last_status = Some(run.status);
        sleep(Duration::from_millis(100)).await;
    }
    panic!(
        "Workflow run never reached {:?}, last status was {:?}",
        status, last_status
    );
}
