use tracing::info;
use uuid::Uuid;

use crate::models::{PickupPoint, Product, Reception};

/// Observer notified by the reception state machine after each successful
/// transition.
pub trait ReceptionEvents: Send + Sync {
    fn pickup_point_created(&self, pvz: &PickupPoint);
    fn reception_opened(&self, reception: &Reception);
    fn product_added(&self, product: &Product);
    fn product_removed(&self, reception_id: Uuid);
    fn reception_closed(&self, reception: &Reception);
}

/// Emits every transition as a structured log line.
#[derive(Debug, Clone, Default)]
pub struct TracingEvents;

impl ReceptionEvents for TracingEvents {
    fn pickup_point_created(&self, pvz: &PickupPoint) {
        info!(pvz_id = %pvz.id, city = %pvz.city, "pickup point created");
    }

    fn reception_opened(&self, reception: &Reception) {
        info!(reception_id = %reception.id, pvz_id = %reception.pvz_id, "reception opened");
    }

    fn product_added(&self, product: &Product) {
        info!(
            product_id = %product.id,
            reception_id = %product.reception_id,
            kind = %product.kind,
            "product added"
        );
    }

    fn product_removed(&self, reception_id: Uuid) {
        info!(%reception_id, "last product removed");
    }

    fn reception_closed(&self, reception: &Reception) {
        info!(reception_id = %reception.id, pvz_id = %reception.pvz_id, "reception closed");
    }
}
