use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// The owner of `Subscription`s and the recipient of their renewal reminders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Default::default(),
            name,
            email,
        }
    }

    /// Very loose check, the mail transport is the one that really knows
    pub fn has_valid_email(&self) -> bool {
        match self.email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_validates_email() {
        let user = User::new("Jane".into(), "jane@example.com".into());
        assert!(user.has_valid_email());

        for email in &["", "jane", "@example.com", "jane@localhost"] {
            let user = User::new("Jane".into(), email.to_string());
            assert!(!user.has_valid_email(), "{} should be rejected", email);
        }
    }
}
