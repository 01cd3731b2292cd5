use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    rows::{PickupPointRow, ProductRow, ReceptionRow, UserRow},
    Repository,
};
use crate::{
    error::{AppError, Result},
    models::{City, PickupPoint, Product, Reception, Role, User},
};

/// [`Repository`] over a PostgreSQL pool.
///
/// Relies on the `reception_one_open_per_pvz` partial unique index from the
/// initial migration: the insert in [`Repository::open_reception`] is the
/// only guard against a second open reception.
#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<User> {
        let res = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => row.try_into(),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::conflict("email already registered"))
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;

        row.ok_or_else(|| AppError::not_found("user not found"))?
            .try_into()
    }

    async fn create_pickup_point(&self, city: &str) -> Result<PickupPoint> {
        let city: City = city.parse()?;
        let row = sqlx::query_as::<_, PickupPointRow>(
            r#"
            INSERT INTO pvz (id, city)
            VALUES ($1, $2)
            RETURNING id, city, registration_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(city.as_str())
        .fetch_one(&self.db)
        .await
        .context("create pvz")?;
        row.try_into()
    }

    async fn list_pickup_points(
        &self,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PickupPoint>> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (Some(s), Some(e)),
            _ => (None, None),
        };
        let rows = sqlx::query_as::<_, PickupPointRow>(
            r#"
            SELECT id, city, registration_date
            FROM pvz
            WHERE $1::timestamptz IS NULL
               OR registration_date BETWEEN $1 AND $2
            ORDER BY registration_date DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list pvz")?;

        rows.into_iter().map(PickupPoint::try_from).collect()
    }

    async fn open_reception(&self, pvz_id: Uuid) -> Result<Reception> {
        let res = sqlx::query_as::<_, ReceptionRow>(
            r#"
            INSERT INTO reception (id, pvz_id, status)
            VALUES ($1, $2, 'in_progress')
            RETURNING id, pvz_id, date_time, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(pvz_id)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => row.try_into(),
            Err(e) if is_unique_violation(&e) => {
                debug!(%pvz_id, "open reception lost to an existing one");
                Err(AppError::conflict("open reception exists"))
            }
            Err(e) if is_foreign_key_violation(&e) => {
                Err(AppError::not_found("pickup point not found"))
            }
            Err(e) => Err(anyhow::Error::new(e).context("open reception").into()),
        }
    }

    async fn get_open_reception(&self, pvz_id: Uuid) -> Result<Reception> {
        let row = sqlx::query_as::<_, ReceptionRow>(
            r#"
            SELECT id, pvz_id, date_time, status
            FROM reception
            WHERE pvz_id = $1 AND status = 'in_progress'
            "#,
        )
        .bind(pvz_id)
        .fetch_optional(&self.db)
        .await
        .context("get open reception")?;

        row.ok_or_else(|| AppError::not_found("no open reception found"))?
            .try_into()
    }

    async fn add_product(&self, reception_id: Uuid, kind: &str) -> Result<Product> {
        let res = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO product (id, reception_id, type)
            VALUES ($1, $2, $3)
            RETURNING id, reception_id, date_time, type
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reception_id)
        .bind(kind)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => Ok(row.into()),
            Err(e) if is_foreign_key_violation(&e) => {
                Err(AppError::not_found("reception not found"))
            }
            Err(e) => Err(anyhow::Error::new(e).context("add product").into()),
        }
    }

    async fn delete_last_product(&self, reception_id: Uuid) -> Result<bool> {
        // SKIP LOCKED lets concurrent removals each take a distinct product.
        let done = sqlx::query(
            r#"
            DELETE FROM product
            WHERE id = (
                SELECT id FROM product
                WHERE reception_id = $1
                ORDER BY date_time DESC, id DESC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            "#,
        )
        .bind(reception_id)
        .execute(&self.db)
        .await
        .context("delete last product")?;

        debug!(%reception_id, deleted = done.rows_affected(), "delete last product");
        Ok(done.rows_affected() > 0)
    }

    async fn close_reception(&self, reception_id: Uuid) -> Result<()> {
        let done = sqlx::query(
            r#"
            UPDATE reception
            SET status = 'closed'
            WHERE id = $1 AND status = 'in_progress'
            "#,
        )
        .bind(reception_id)
        .execute(&self.db)
        .await
        .context("close reception")?;

        if done.rows_affected() == 0 {
            return Err(AppError::conflict("reception already closed"));
        }
        Ok(())
    }
}
