use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, Result},
    models::{City, PickupPoint, Product, Reception, ReceptionStatus, Role, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    pvz: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    // Insertion order doubles as the LIFO order for removals.
    products: Vec<Product>,
}

/// In-process [`Repository`] with the same constraint semantics as the
/// PostgreSQL adapter. Every call holds one lock, which plays the role of the
/// unique index and the conditional update.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pickup point with a chosen registration date.
    pub async fn insert_pickup_point_at(&self, city: City, at: OffsetDateTime) -> PickupPoint {
        let pvz = PickupPoint {
            id: Uuid::new_v4(),
            city,
            registration_date: at,
        };
        self.tables.lock().await.pvz.push(pvz.clone());
        pvz
    }

    pub async fn products_of(&self, reception_id: Uuid) -> Vec<Product> {
        self.tables
            .lock()
            .await
            .products
            .iter()
            .filter(|p| p.reception_id == reception_id)
            .cloned()
            .collect()
    }

    pub async fn open_receptions_of(&self, pvz_id: Uuid) -> usize {
        self.tables
            .lock()
            .await
            .receptions
            .iter()
            .filter(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::InProgress)
            .count()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.email == email) {
            return Err(AppError::conflict("email already registered"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        self.tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint> {
        let city: City = city.parse()?;
        Ok(self
            .insert_pickup_point_at(city, OffsetDateTime::now_utc())
            .await)
    }

    async fn list_pickup_points(
        &self,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PickupPoint>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<PickupPoint> = t
            .pvz
            .iter()
            .filter(|p| match (start, end) {
                (Some(s), Some(e)) => s <= p.registration_date && p.registration_date <= e,
                _ => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.registration_date
                .cmp(&a.registration_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception> {
        let mut t = self.tables.lock().await;
        if !t.pvz.iter().any(|p| p.id == pvz_id) {
            return Err(AppError::not_found("pickup point not found"));
        }
        if t
            .receptions
            .iter()
            .any(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::InProgress)
        {
            return Err(AppError::conflict("open reception exists"));
        }
        let rec = Reception {
            id: Uuid::new_v4(),
            date_time: OffsetDateTime::now_utc(),
            pvz_id,
            status: ReceptionStatus::InProgress,
        };
        t.receptions.push(rec.clone());
        Ok(rec)
    }

    async fn get_open_reception(&self, pvz_id: Uuid) -> Result<Reception> {
        self.tables
            .lock()
            .await
            .receptions
            .iter()
            .find(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::InProgress)
            .cloned()
            .ok_or_else(|| AppError::not_found("no open reception found"))
    }

    async fn add_product(&self, reception_id: Uuid, kind: &str) -> Result<Product> {
        let mut t = self.tables.lock().await;
        if !t.receptions.iter().any(|r| r.id == reception_id) {
            return Err(AppError::not_found("reception not found"));
        }
        let product = Product {
            id: Uuid::now_v7(),
            date_time: OffsetDateTime::now_utc(),
            kind: kind.to_string(),
            reception_id,
        };
        t.products.push(product.clone());
        Ok(product)
    }

    async fn delete_last_product(&self, reception_id: Uuid) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let pos = t
            .products
            .iter()
            .rposition(|p| p.reception_id == reception_id);
        Ok(pos.map(|pos| t.products.remove(pos)).is_some())
    }

    async fn close_reception(&self, reception_id: Uuid) -> Result<()> {
        let mut t = self.tables.lock().await;
        match t
            .receptions
            .iter_mut()
            .find(|r| r.id == reception_id && r.status == ReceptionStatus::InProgress)
        {
            Some(rec) => {
                rec.status = ReceptionStatus::Closed;
                Ok(())
            }
            None => Err(AppError::conflict("reception already closed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = MemoryRepository::new();
        repo.create_user("a@b", "h", Role::Employee).await.unwrap();
        assert!(matches!(
            repo.create_user("a@b", "h", Role::Moderator).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            repo.find_user_by_email("nobody@b").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_pickup_point_cannot_open() {
        let repo = MemoryRepository::new();
        assert!(matches!(
            repo.open_reception(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_last_removes_newest_only_for_that_reception() {
        let repo = MemoryRepository::new();
        let a = repo.create_pickup_point("Москва").await.unwrap();
        let b = repo.create_pickup_point("Казань").await.unwrap();
        let ra = repo.open_reception(a.id).await.unwrap();
        let rb = repo.open_reception(b.id).await.unwrap();

        let first = repo.add_product(ra.id, "одежда").await.unwrap();
        repo.add_product(rb.id, "обувь").await.unwrap();
        repo.add_product(ra.id, "электроника").await.unwrap();

        assert!(repo.delete_last_product(ra.id).await.unwrap());
        assert_eq!(repo.products_of(ra.id).await, vec![first]);
        assert_eq!(repo.products_of(rb.id).await.len(), 1);

        assert!(repo.delete_last_product(ra.id).await.unwrap());
        assert!(!repo.delete_last_product(ra.id).await.unwrap());
    }
}
