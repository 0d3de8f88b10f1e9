mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;
use subtrack_domain::{User, ID};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubtrackContext;

    #[tokio::test]
    async fn test_user_repo() {
        let ctx = SubtrackContext::create_inmemory();

        let mut user = User::new("Jane".into(), "jane@example.com".into());
        ctx.repos.users.insert(&user).await.expect("To insert user");

        user.name = "Jane Doe".into();
        ctx.repos.users.save(&user).await.expect("To save user");

        let found = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(found, user);
        assert_eq!(
            ctx.repos.users.find_by_email("jane@example.com").await,
            Some(user.clone())
        );

        assert!(ctx.repos.users.delete(&user.id).await.is_some());
        assert!(ctx.repos.users.find(&user.id).await.is_none());
        assert!(ctx.repos.users.delete(&user.id).await.is_none());
    }
}
