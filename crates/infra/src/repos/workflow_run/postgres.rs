use super::IWorkflowRunRepo;
use crate::repos::shared::serde_text::{from_text, to_text};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::convert::TryFrom;
use subtrack_domain::{Checkpoint, RunFailure, RunStatus, WorkflowRun, ID};
use tracing::error;

pub struct PostgresWorkflowRunRepo {
    pool: PgPool,
}

impl PostgresWorkflowRunRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkflowRunRaw {
    run_uid: Uuid,
    subscription_uid: Uuid,
    status: String,
    wake_at: Option<i64>,
    checkpoints: Json<Vec<Checkpoint>>,
    failure: Option<Json<RunFailure>>,
    created: i64,
    updated: i64,
}

impl TryFrom<WorkflowRunRaw> for WorkflowRun {
    type Error = anyhow::Error;

    fn try_from(raw: WorkflowRunRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.run_uid.into(),
            subscription_id: raw.subscription_uid.into(),
            status: from_text(raw.status)?,
            wake_at: raw.wake_at,
            checkpoints: raw.checkpoints.0,
            failure: raw.failure.map(|failure| failure.0),
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_run(raw: WorkflowRunRaw) -> Option<WorkflowRun> {
    let run_uid = raw.run_uid;
    WorkflowRun::try_from(raw)
        .map_err(|e| {
            error!("Stored workflow run {} could not be read. Err: {:?}", run_uid, e);
        })
        .ok()
}

#[async_trait::async_trait]
impl IWorkflowRunRepo for PostgresWorkflowRunRepo {
    async fn insert(&self, run: &WorkflowRun) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflow_runs
            (run_uid, subscription_uid, status, wake_at, checkpoints, failure, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*run.id.inner_ref())
        .bind(*run.subscription_id.inner_ref())
        .bind(to_text(&run.status)?)
        .bind(run.wake_at)
        .bind(Json(&run.checkpoints))
        .bind(run.failure.as_ref().map(Json))
        .bind(run.created)
        .bind(run.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, run: &WorkflowRun) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE workflow_runs
            SET status = $2,
                wake_at = $3,
                checkpoints = $4,
                failure = $5,
                updated = $6
            WHERE run_uid = $1
            "#,
        )
        .bind(*run.id.inner_ref())
        .bind(to_text(&run.status)?)
        .bind(run.wake_at)
        .bind(Json(&run.checkpoints))
        .bind(run.failure.as_ref().map(Json))
        .bind(run.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, run_id: &ID) -> Option<WorkflowRun> {
        sqlx::query_as::<_, WorkflowRunRaw>(
            r#"
            SELECT * FROM workflow_runs AS r
            WHERE r.run_uid = $1
            "#,
        )
        .bind(*run_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find workflow run {}. Err: {:?}", run_id, e);
            None
        })
        .and_then(into_run)
    }

    async fn find_by_subscription(&self, subscription_id: &ID) -> Vec<WorkflowRun> {
        sqlx::query_as::<_, WorkflowRunRaw>(
            r#"
            SELECT * FROM workflow_runs AS r
            WHERE r.subscription_uid = $1
            ORDER BY r.created
            "#,
        )
        .bind(*subscription_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find workflow runs for subscription {}. Err: {:?}",
                subscription_id, e
            );
            vec![]
        })
        .into_iter()
        .filter_map(into_run)
        .collect()
    }

    async fn claim_due(&self, now: i64, stale_before: i64) -> anyhow::Result<Vec<WorkflowRun>> {
        let unfinished = [
            RunStatus::Created,
            RunStatus::Deriving,
            RunStatus::Dispatching,
        ]
        .iter()
        .map(to_text)
        .collect::<anyhow::Result<Vec<_>>>()?;

        let runs = sqlx::query_as::<_, WorkflowRunRaw>(
            r#"
            UPDATE workflow_runs AS r
            SET status = CASE WHEN r.status = $2 THEN $1 ELSE r.status END,
                wake_at = NULL,
                updated = $3
            WHERE (r.status = $2 AND r.wake_at <= $3)
            OR (r.status = ANY($4) AND r.updated <= $5)
            RETURNING *
            "#,
        )
        .bind(to_text(&RunStatus::Dispatching)?)
        .bind(to_text(&RunStatus::Sleeping)?)
        .bind(now)
        .bind(unfinished)
        .bind(stale_before)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .filter_map(into_run)
        .collect();

        Ok(runs)
    }

    async fn claim_retry(&self, run_id: &ID, now: i64) -> anyhow::Result<Option<WorkflowRun>> {
        let run = sqlx::query_as::<_, WorkflowRunRaw>(
            r#"
            UPDATE workflow_runs AS r
            SET status = $2,
                failure = NULL,
                updated = $3
            WHERE r.run_uid = $1
            AND r.status = $4
            AND (r.failure->>'retryable')::boolean
            RETURNING *
            "#,
        )
        .bind(*run_id.inner_ref())
        .bind(to_text(&RunStatus::Created)?)
        .bind(now)
        .bind(to_text(&RunStatus::Failed)?)
        .fetch_optional(&self.pool)
        .await?
        .and_then(into_run);

        Ok(run)
    }
}
