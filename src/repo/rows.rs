use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{PickupPoint, Product, Reception, User},
};

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, FromRow)]
pub(super) struct PickupPointRow {
    pub id: Uuid,
    pub city: String,
    pub registration_date: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub(super) struct ReceptionRow {
    pub id: Uuid,
    pub pvz_id: Uuid,
    pub date_time: OffsetDateTime,
    pub status: String,
}

#[derive(Debug, FromRow)]
pub(super) struct ProductRow {
    pub id: Uuid,
    pub reception_id: Uuid,
    pub date_time: OffsetDateTime,
    #[sqlx(rename = "type")]
    pub kind: String,
}

// Text columns are only written by this crate, so a value that fails to parse
// means the store was modified out of band.
fn corrupt(e: AppError) -> AppError {
    match e {
        AppError::Internal(e) => AppError::Internal(e),
        other => AppError::Internal(anyhow::anyhow!("corrupt row: {other}")),
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            role: r.role.parse().map_err(corrupt)?,
        })
    }
}

impl TryFrom<PickupPointRow> for PickupPoint {
    type Error = AppError;

    fn try_from(r: PickupPointRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            city: r.city.parse().map_err(corrupt)?,
            registration_date: r.registration_date,
        })
    }
}

impl TryFrom<ReceptionRow> for Reception {
    type Error = AppError;

    fn try_from(r: ReceptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            date_time: r.date_time,
            pvz_id: r.pvz_id,
            status: r.status.parse().map_err(corrupt)?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            date_time: r.date_time,
            kind: r.kind,
            reception_id: r.reception_id,
        }
    }
}
