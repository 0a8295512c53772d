//! Postgres-backed supplier store.
//!
//! The aggregate spans three tables (`supplier`, `manager`, `delivery`); see
//! `migrations/0001_create_suppliers.sql`. Writes run in one transaction,
//! reads run in a `READ ONLY` transaction.
//!
//! ## Error mapping
//!
//! | SQLx error | Code / constraint | StoreError |
//! |------------|-------------------|------------|
//! | Database (unique violation) | `23505` on `supplier_email_key` | `EmailTaken` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / PoolTimedOut | N/A | `Backend` |
//! | Other | N/A | `Backend` |
//!
//! Dropping a store future mid-transaction drops the transaction, which
//! rolls it back.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::{debug, field, instrument, Span};
use uuid::Uuid;

use supplyhub_core::{ExpectedVersion, SupplierId};
use supplyhub_suppliers::predicate::escape_like;
use supplyhub_suppliers::{
    Delivery, FetchPlan, Manager, NewSupplier, Supplier, SupplierParts, SupplierPredicate,
};

use super::r#trait::{StoreError, SupplierStore};
use crate::config::DatabaseConfig;

const SCHEMA: &str = include_str!("../../migrations/0001_create_suppliers.sql");

const EMAIL_CONSTRAINT: &str = "supplier_email_key";

const SELECT_SUPPLIER: &str = r#"
    SELECT
        s.id,
        s.version,
        s.name,
        s.email,
        s.username,
        s.created_at,
        s.updated_at,
        m.name AS manager_name,
        m.email AS manager_email,
        m.salary AS manager_salary
    FROM supplier s
    JOIN manager m ON m.supplier_id = s.id
"#;

/// Postgres-backed supplier store.
///
/// Uses the SQLx connection pool, so the store is cheap to clone and can be
/// shared across tasks.
#[derive(Debug, Clone)]
pub struct PostgresSupplierStore {
    pool: Arc<PgPool>,
}

impl PostgresSupplierStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool with the configured size, acquire timeout and statement timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| map_sqlx_error("parse_database_url", e))?
            .options([(
                "statement_timeout",
                config.statement_timeout.as_millis().to_string(),
            )]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool))
    }

    /// Create the supplier tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn begin_read(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_read_only", e))?;
        Ok(tx)
    }

    async fn begin_write(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }

    /// Run a supplier query built on [`SELECT_SUPPLIER`] and attach deliveries.
    async fn fetch_suppliers(
        &self,
        mut query: QueryBuilder<'_, Postgres>,
        fetch: FetchPlan,
    ) -> Result<Vec<Supplier>, StoreError> {
        let mut tx = self.begin_read().await?;

        let rows = query
            .build()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("select_suppliers", e))?;

        let mut suppliers = Vec::with_capacity(rows.len());
        for row in &rows {
            let row = SupplierRow::from_row(row).map_err(|e| {
                StoreError::Backend(format!("failed to deserialize supplier row: {e}"))
            })?;
            suppliers.push(row);
        }

        let mut deliveries = match fetch {
            FetchPlan::WithDeliveries if !suppliers.is_empty() => {
                let ids: Vec<Uuid> = suppliers.iter().map(|r| r.id).collect();
                load_deliveries(&mut tx, &ids).await?
            }
            _ => Vec::new(),
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let span = Span::current();
        span.record("count", suppliers.len());

        Ok(suppliers
            .into_iter()
            .map(|row| {
                let own = match fetch {
                    FetchPlan::WithDeliveries => Some(take_deliveries(&mut deliveries, row.id)),
                    FetchPlan::ManagerOnly => None,
                };
                row.into_supplier(own)
            })
            .collect())
    }
}

#[async_trait]
impl SupplierStore for PostgresSupplierStore {
    #[instrument(skip(self, supplier), fields(supplier_id = %id), err)]
    async fn insert(&self, id: SupplierId, supplier: NewSupplier) -> Result<Supplier, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;

        sqlx::query(
            r#"
            INSERT INTO supplier (id, version, name, email, username, created_at, updated_at)
            VALUES ($1, 0, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(supplier.name())
        .bind(supplier.email())
        .bind(supplier.username())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("insert_supplier", supplier.email(), e))?;

        let manager = supplier.manager();
        sqlx::query(
            r#"
            INSERT INTO manager (supplier_id, name, email, salary)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&manager.name)
        .bind(&manager.email)
        .bind(manager.salary)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_manager", e))?;

        if !supplier.deliveries().is_empty() {
            let mut query =
                QueryBuilder::<Postgres>::new("INSERT INTO delivery (supplier_id, idx, article) ");
            query.push_values(
                supplier.deliveries().iter().enumerate(),
                |mut b, (idx, delivery)| {
                    b.push_bind(*id.as_uuid())
                        .push_bind(idx as i32)
                        .push_bind(&delivery.article);
                },
            );
            query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_deliveries", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_write_error("commit_transaction", supplier.email(), e))?;

        Ok(supplier.into_supplier(id, now))
    }

    #[instrument(
        skip(self, supplier),
        fields(supplier_id = %supplier.id(), expected = ?expected),
        err
    )]
    async fn update(
        &self,
        supplier: &Supplier,
        expected: ExpectedVersion,
    ) -> Result<Supplier, StoreError> {
        let id = supplier.id();
        let mut tx = self.begin_write().await?;

        let row = sqlx::query("SELECT version FROM supplier WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_supplier", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound(id));
        };
        let actual: i64 = row
            .try_get("version")
            .map_err(|e| StoreError::Backend(format!("failed to read version: {e}")))?;
        let actual = actual as u64;

        if !expected.matches(actual) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::VersionConflict {
                expected: expected_value(expected, actual),
                actual,
            });
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE supplier
            SET name = $3, email = $4, version = version + 1, updated_at = $5
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(actual as i64)
        .bind(supplier.name())
        .bind(supplier.email())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("update_supplier", supplier.email(), e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::VersionConflict {
                expected: expected_value(expected, actual),
                actual: actual + 1,
            });
        }

        tx.commit()
            .await
            .map_err(|e| map_write_error("commit_transaction", supplier.email(), e))?;

        let mut updated = supplier.clone();
        updated.mark_persisted(actual + 1, now);
        Ok(updated)
    }

    #[instrument(skip(self), fields(supplier_id = %id, count = field::Empty), err)]
    async fn find_by_id(
        &self,
        id: SupplierId,
        fetch: FetchPlan,
    ) -> Result<Option<Supplier>, StoreError> {
        let mut query = QueryBuilder::new(SELECT_SUPPLIER);
        query.push(" WHERE s.id = ").push_bind(*id.as_uuid());
        Ok(self.fetch_suppliers(query, fetch).await?.into_iter().next())
    }

    #[instrument(skip(self), fields(count = field::Empty), err)]
    async fn find_all(&self) -> Result<Vec<Supplier>, StoreError> {
        let mut query = QueryBuilder::new(SELECT_SUPPLIER);
        query.push(" ORDER BY s.id");
        self.fetch_suppliers(query, FetchPlan::WithDeliveries).await
    }

    #[instrument(skip(self), fields(count = field::Empty), err)]
    async fn find_all_matching(
        &self,
        predicate: &SupplierPredicate,
    ) -> Result<Vec<Supplier>, StoreError> {
        let mut query = QueryBuilder::new(SELECT_SUPPLIER);
        query.push(" WHERE ");
        push_predicate(&mut query, predicate);
        query.push(" ORDER BY s.id");
        debug!(sql = query.sql(), "compiled supplier predicate");
        self.fetch_suppliers(query, FetchPlan::WithDeliveries).await
    }

    #[instrument(skip(self), err)]
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let mut tx = self.begin_read().await?;
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM supplier WHERE email = $1)")
                .bind(email)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("exists_by_email", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(exists)
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn delete(&self, id: SupplierId) -> Result<bool, StoreError> {
        // manager and delivery rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM supplier WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(count = field::Empty), err)]
    async fn find_by_name_substring(&self, needle: &str) -> Result<Vec<Supplier>, StoreError> {
        let mut query = QueryBuilder::new(SELECT_SUPPLIER);
        query
            .push(r" WHERE lower(s.name) LIKE lower(")
            .push_bind(format!("%{}%", escape_like(needle)))
            .push(r") ESCAPE '\' ORDER BY s.id");
        self.fetch_suppliers(query, FetchPlan::WithDeliveries).await
    }

    #[instrument(skip(self), fields(count = field::Empty), err)]
    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<Supplier>, StoreError> {
        let mut query = QueryBuilder::new(SELECT_SUPPLIER);
        query
            .push(r" WHERE lower(s.email) LIKE lower(")
            .push_bind(format!("{}%", escape_like(prefix)))
            .push(r") ESCAPE '\' ORDER BY s.id LIMIT 1");
        Ok(self
            .fetch_suppliers(query, FetchPlan::WithDeliveries)
            .await?
            .into_iter()
            .next())
    }

    #[instrument(skip(self), err)]
    async fn find_names_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut tx = self.begin_read().await?;
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT name
            FROM supplier
            WHERE lower(name) LIKE lower($1) ESCAPE '\'
            ORDER BY name
            "#,
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_names_by_prefix", e))?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(names)
    }
}

/// Append a predicate as a bound SQL condition.
fn push_predicate(query: &mut QueryBuilder<'_, Postgres>, predicate: &SupplierPredicate) {
    match predicate {
        SupplierPredicate::NameContains(needle) => {
            query
                .push(r"lower(s.name) LIKE lower(")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(r") ESCAPE '\'");
        }
        SupplierPredicate::EmailContains(needle) => {
            query
                .push(r"lower(s.email) LIKE lower(")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(r") ESCAPE '\'");
        }
        SupplierPredicate::AllOf(parts) if parts.is_empty() => {
            query.push("TRUE");
        }
        SupplierPredicate::AllOf(parts) => {
            query.push("(");
            for (idx, part) in parts.iter().enumerate() {
                if idx > 0 {
                    query.push(" AND ");
                }
                push_predicate(query, part);
            }
            query.push(")");
        }
    }
}

fn expected_value(expected: ExpectedVersion, actual: u64) -> u64 {
    match expected {
        ExpectedVersion::Exact(v) => v,
        ExpectedVersion::Any => actual,
    }
}

async fn load_deliveries(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<(Uuid, Delivery)>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT supplier_id, article
        FROM delivery
        WHERE supplier_id = ANY($1)
        ORDER BY supplier_id, idx
        "#,
    )
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("select_deliveries", e))?;

    let mut deliveries = Vec::with_capacity(rows.len());
    for row in rows {
        let supplier_id: Uuid = row
            .try_get("supplier_id")
            .map_err(|e| StoreError::Backend(format!("failed to read supplier_id: {e}")))?;
        let article: String = row
            .try_get("article")
            .map_err(|e| StoreError::Backend(format!("failed to read article: {e}")))?;
        deliveries.push((supplier_id, Delivery { article }));
    }
    Ok(deliveries)
}

/// Remove and return the deliveries of one supplier, preserving their order.
fn take_deliveries(all: &mut Vec<(Uuid, Delivery)>, supplier_id: Uuid) -> Vec<Delivery> {
    let mut own = Vec::new();
    all.retain(|(owner, delivery)| {
        if *owner == supplier_id {
            own.push(delivery.clone());
            false
        } else {
            true
        }
    });
    own
}

fn is_email_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(EMAIL_CONSTRAINT)
        }
        _ => false,
    }
}

/// Like [`map_sqlx_error`], but a unique violation on the email index becomes `EmailTaken`.
fn map_write_error(operation: &str, email: &str, err: sqlx::Error) -> StoreError {
    if is_email_violation(&err) {
        StoreError::EmailTaken(email.to_string())
    } else {
        map_sqlx_error(operation, err)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {operation}: {} (code {:?})",
            db_err.message(),
            db_err.code()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("timed out acquiring a connection in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

/// Supplier joined with its manager.
#[derive(Debug)]
struct SupplierRow {
    id: Uuid,
    version: i64,
    name: String,
    email: String,
    username: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    manager_name: String,
    manager_email: String,
    manager_salary: i64,
}

impl<'r> FromRow<'r, PgRow> for SupplierRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SupplierRow {
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            manager_name: row.try_get("manager_name")?,
            manager_email: row.try_get("manager_email")?,
            manager_salary: row.try_get("manager_salary")?,
        })
    }
}

impl SupplierRow {
    fn into_supplier(self, deliveries: Option<Vec<Delivery>>) -> Supplier {
        Supplier::hydrate(SupplierParts {
            id: SupplierId::from_uuid(self.id),
            version: self.version as u64,
            name: self.name,
            email: self.email,
            username: self.username,
            manager: Manager {
                name: self.manager_name,
                email: self.manager_email,
                salary: self.manager_salary,
            },
            deliveries,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
