mod dispatch_reminder;
mod execute_run;
mod get_workflow_run;
pub mod resume_due_runs;
mod retry_workflow_run;
mod send_reminders;
mod step_runner;
pub mod trigger_reminder_workflow;

use actix_web::web;
use get_workflow_run::get_workflow_run_controller;
use retry_workflow_run::retry_workflow_run_controller;
use trigger_reminder_workflow::trigger_reminder_workflow_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/workflows/subscription/reminder",
        web::post().to(trigger_reminder_workflow_controller),
    );
    cfg.route(
        "/workflows/{run_id}",
        web::get().to(get_workflow_run_controller),
    );
    cfg.route(
        "/workflows/{run_id}/retry",
        web::post().to(retry_workflow_run_controller),
    );
}
