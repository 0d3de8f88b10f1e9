mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
pub use postgres::PostgresSubscriptionRepo;
use subtrack_domain::{Subscription, ID};

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn save(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn delete(&self, subscription_id: &ID) -> Option<Subscription>;
    async fn find(&self, subscription_id: &ID) -> Option<Subscription>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Subscription>;
}
