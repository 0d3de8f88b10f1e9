use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Premium,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Streaming,
    Software,
    Utilities,
    Education,
    Entertainment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Usd
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annually,
    OneTime,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
            Self::OneTime => "one-time",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::PayPal => "PayPal",
            Self::BankTransfer => "Bank Transfer",
            Self::Other => "Other",
        }
    }
}

/// Why a `Subscription` should no longer receive renewal reminders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum Ineligibility {
    NotActive { status: SubscriptionStatus },
    RenewalPassed { end_date: DateTime<Utc> },
}

/// A recurring payment owned by a `User`.
///
/// The `end_date` is the next renewal date and may be changed at any
/// time by the owner, which is why reminder workflows always re-read
/// the `Subscription` before notifying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub plan: Plan,
    pub category: Category,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub price: f64,
    pub currency: Option<Currency>,
    pub frequency: Frequency,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    pub fn renewal_passed(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }

    /// Checks if a renewal reminder is still allowed to be sent at `now`.
    pub fn reminder_eligibility(&self, now: DateTime<Utc>) -> Result<(), Ineligibility> {
        if !self.is_active() {
            return Err(Ineligibility::NotActive {
                status: self.status,
            });
        }
        if self.renewal_passed(now) {
            return Err(Ineligibility::RenewalPassed {
                end_date: self.end_date,
            });
        }
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.status = SubscriptionStatus::Cancelled;
    }
}

impl Entity for Subscription {
    fn id(&self) -> &ID {
        &self.id
    }
}
