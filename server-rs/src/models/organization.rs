use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(SubscriptionStatus::Trial),
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            other => Err(AppError::Internal(format!(
                "unknown subscription status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub owner_id: Uuid,
    pub subscription_status: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Tenant root. Everything else in the scheduling core hangs off an organization id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub subscription_status: SubscriptionStatus,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = AppError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            subscription_status: row.subscription_status.parse()?,
            id: row.id,
            slug: row.slug,
            name: row.name,
            owner_id: row.owner_id,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            stripe_customer_id: row.stripe_customer_id,
            created_at: row.created_at,
        })
    }
}
