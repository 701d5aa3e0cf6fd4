use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub archived_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub description: Option<String>,
    pub features: Vec<String>,
    #[serde(skip_serializing)]
    pub archived_at: Option<NaiveDateTime>,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn is_bookable(&self) -> bool {
        self.archived_at.is_none()
    }
}

impl TryFrom<ServiceRow> for Service {
    type Error = AppError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        if row.duration_minutes <= 0 {
            return Err(AppError::Validation(format!(
                "service {} has non-positive duration {}",
                row.id, row.duration_minutes
            )));
        }
        Ok(Self {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            duration_minutes: i64::from(row.duration_minutes),
            price_cents: row.price_cents,
            description: row.description,
            features: row.features,
            archived_at: row.archived_at,
        })
    }
}
