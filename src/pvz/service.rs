//! Reception lifecycle.
//!
//! Per pickup point the state is either "no open reception" or "reception
//! open". Opening and closing are single atomic gateway calls; product changes
//! first resolve the open reception and then mutate it, without a transaction
//! spanning the two calls.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    events::ReceptionEvents,
    models::{PickupPoint, Principal, Product, Reception, ReceptionStatus},
    policy::{authorize, Operation},
    repo::Repository,
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 30;

/// Pickup-point listing parameters; `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(AppError::validation("startDate is after endDate"));
            }
        }
        Ok(())
    }

    pub fn offset(&self) -> Result<i64> {
        self.page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.limit))
            .filter(|offset| *offset >= 0)
            .ok_or_else(|| AppError::validation("page out of range"))
    }
}

#[derive(Clone)]
pub struct PvzService {
    repo: Arc<dyn Repository>,
    events: Arc<dyn ReceptionEvents>,
}

impl PvzService {
    pub fn new(repo: Arc<dyn Repository>, events: Arc<dyn ReceptionEvents>) -> Self {
        Self { repo, events }
    }

    fn authorize(&self, principal: &Principal, op: Operation) -> Result<()> {
        authorize(principal.role, op).map_err(|e| {
            warn!(user_id = %principal.id, role = %principal.role, ?op, "forbidden");
            e
        })
    }

    /// Maps a missing open reception to a validation failure.
    async fn require_open_reception(&self, pvz_id: Uuid) -> Result<Reception> {
        match self.repo.get_open_reception(pvz_id).await {
            Err(AppError::NotFound(_)) => Err(AppError::validation("no open reception")),
            other => other,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_pickup_point(&self, principal: &Principal, city: &str) -> Result<PickupPoint> {
        self.authorize(principal, Operation::CreatePickupPoint)?;
        let pvz = self.repo.create_pickup_point(city).await?;
        self.events.pickup_point_created(&pvz);
        Ok(pvz)
    }

    #[instrument(skip(self))]
    pub async fn list_pickup_points(
        &self,
        principal: &Principal,
        params: ListParams,
    ) -> Result<Vec<PickupPoint>> {
        self.authorize(principal, Operation::ListPickupPoints)?;
        params.validate()?;
        let offset = params.offset()?;
        self.repo
            .list_pickup_points(params.start, params.end, params.limit, offset)
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_reception(&self, principal: &Principal, pvz_id: Uuid) -> Result<Reception> {
        self.authorize(principal, Operation::OpenReception)?;
        let reception = self.repo.open_reception(pvz_id).await?;
        self.events.reception_opened(&reception);
        Ok(reception)
    }

    #[instrument(skip(self))]
    pub async fn add_product(
        &self,
        principal: &Principal,
        pvz_id: Uuid,
        kind: &str,
    ) -> Result<Product> {
        self.authorize(principal, Operation::AddProduct)?;
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(AppError::validation("product type must not be empty"));
        }
        let reception = self.require_open_reception(pvz_id).await?;
        let product = self.repo.add_product(reception.id, kind).await?;
        self.events.product_added(&product);
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_last_product(&self, principal: &Principal, pvz_id: Uuid) -> Result<()> {
        self.authorize(principal, Operation::DeleteLastProduct)?;
        let reception = self.require_open_reception(pvz_id).await?;
        if self.repo.delete_last_product(reception.id).await? {
            self.events.product_removed(reception.id);
        } else {
            debug!(reception_id = %reception.id, "no product to remove");
        }
        Ok(())
    }

    /// A pickup point without an open reception, or a close that lost a race
    /// to another request, is a `Conflict`.
    #[instrument(skip(self))]
    pub async fn close_last_reception(
        &self,
        principal: &Principal,
        pvz_id: Uuid,
    ) -> Result<Reception> {
        self.authorize(principal, Operation::CloseReception)?;
        let reception = match self.repo.get_open_reception(pvz_id).await {
            Ok(r) => r,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::conflict("no open reception to close"))
            }
            Err(e) => return Err(e),
        };
        self.repo.close_reception(reception.id).await.map_err(|e| {
            debug!(reception_id = %reception.id, error = %e, "close failed");
            e
        })?;
        let closed = Reception {
            status: ReceptionStatus::Closed,
            ..reception
        };
        self.events.reception_closed(&closed);
        Ok(closed)
    }
}
