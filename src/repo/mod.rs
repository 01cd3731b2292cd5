//! Persistence gateway.
//!
//! [`Repository`] is the only seam between the state machine and storage.
//! Implementations perform no business validation beyond the local city check;
//! they guarantee that opening and closing a reception are each a single
//! atomic statement.

#[cfg(test)]
pub mod memory;
pub mod postgres;
mod rows;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{PickupPoint, Product, Reception, Role, User},
};

pub use postgres::PgRepository;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User>;

    /// Fails with `NotFound` when no user has this email.
    async fn find_user_by_email(&self, email: &str) -> Result<User>;

    /// Fails with `Validation` for a city outside the supported set, without
    /// touching the store.
    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint>;

    /// Newest first. The date range applies only when both bounds are given.
    async fn list_pickup_points(
        &self,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PickupPoint>>;

    /// Fails with `Conflict` when the pickup point already has a reception in
    /// progress, including when a concurrent request wins the race.
    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception>;

    /// Fails with `NotFound` when nothing is in progress for the pickup point.
    async fn get_open_reception(&self, pvz_id: Uuid) -> Result<Reception>;

    /// Does not check that the reception is open.
    async fn add_product(&self, reception_id: Uuid, kind: &str) -> Result<Product>;

    /// Removes the newest product. Returns `false` when the reception had none.
    async fn delete_last_product(&self, reception_id: Uuid) -> Result<bool>;

    /// Fails with `Conflict` unless the reception was in progress.
    async fn close_reception(&self, reception_id: Uuid) -> Result<()>;
}
