use super::ISubscriptionRepo;
use crate::repos::shared::serde_text::{from_text, to_text};
use chrono::{DateTime, Utc};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use subtrack_domain::{Subscription, ID};
use tracing::error;

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    subscription_uid: Uuid,
    user_uid: Uuid,
    name: String,
    plan: String,
    category: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
    price: f64,
    currency: Option<String>,
    frequency: String,
    payment_method: Option<String>,
    description: Option<String>,
}

impl TryFrom<SubscriptionRaw> for Subscription {
    type Error = anyhow::Error;

    fn try_from(raw: SubscriptionRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.subscription_uid.into(),
            user_id: raw.user_uid.into(),
            name: raw.name,
            plan: from_text(raw.plan)?,
            category: from_text(raw.category)?,
            start_date: raw.start_date,
            end_date: raw.end_date,
            status: from_text(raw.status)?,
            price: raw.price,
            currency: raw.currency.map(from_text).transpose()?,
            frequency: from_text(raw.frequency)?,
            payment_method: raw.payment_method.map(from_text).transpose()?,
            description: raw.description,
        })
    }
}

fn into_subscription(raw: SubscriptionRaw) -> Option<Subscription> {
    let subscription_uid = raw.subscription_uid;
    Subscription::try_from(raw)
        .map_err(|e| {
            error!(
                "Stored subscription {} could not be read. Err: {:?}",
                subscription_uid, e
            );
        })
        .ok()
}

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
            (subscription_uid, user_uid, name, plan, category, start_date, end_date, status, price, currency, frequency, payment_method, description)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(*subscription.id.inner_ref())
        .bind(*subscription.user_id.inner_ref())
        .bind(&subscription.name)
        .bind(to_text(&subscription.plan)?)
        .bind(to_text(&subscription.category)?)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(to_text(&subscription.status)?)
        .bind(subscription.price)
        .bind(subscription.currency.as_ref().map(to_text).transpose()?)
        .bind(to_text(&subscription.frequency)?)
        .bind(subscription.payment_method.as_ref().map(to_text).transpose()?)
        .bind(&subscription.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET name = $2,
                plan = $3,
                category = $4,
                start_date = $5,
                end_date = $6,
                status = $7,
                price = $8,
                currency = $9,
                frequency = $10,
                payment_method = $11,
                description = $12
            WHERE subscription_uid = $1
            "#,
        )
        .bind(*subscription.id.inner_ref())
        .bind(&subscription.name)
        .bind(to_text(&subscription.plan)?)
        .bind(to_text(&subscription.category)?)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(to_text(&subscription.status)?)
        .bind(subscription.price)
        .bind(subscription.currency.as_ref().map(to_text).transpose()?)
        .bind(to_text(&subscription.frequency)?)
        .bind(subscription.payment_method.as_ref().map(to_text).transpose()?)
        .bind(&subscription.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, subscription_id: &ID) -> Option<Subscription> {
        sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            DELETE FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            RETURNING *
            "#,
        )
        .bind(*subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to delete subscription {}. Err: {:?}",
                subscription_id, e
            );
            None
        })
        .and_then(into_subscription)
    }

    async fn find(&self, subscription_id: &ID) -> Option<Subscription> {
        sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.subscription_uid = $1
            "#,
        )
        .bind(*subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find subscription {}. Err: {:?}", subscription_id, e);
            None
        })
        .and_then(into_subscription)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Subscription> {
        sqlx::query_as::<_, SubscriptionRaw>(
            r#"
            SELECT * FROM subscriptions AS s
            WHERE s.user_uid = $1
            ORDER BY s.end_date
            "#,
        )
        .bind(*user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find subscriptions for user {}. Err: {:?}",
                user_id, e
            );
            vec![]
        })
        .into_iter()
        .filter_map(into_subscription)
        .collect()
    }
}
