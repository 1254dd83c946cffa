use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, SearchQuery};
use crate::repository::ProductRepository;

/// PostgreSQL implementation of ProductRepository using SeaORM
#[derive(Clone)]
pub struct PostgresProductRepository {
    db: DatabaseConnection,
}

impl PostgresProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: Uuid,
    sku: i64,
    name: String,
    quantity: i32,
    price: Decimal,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            quantity: row.quantity,
            price: row.price,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

const PRODUCT_COLUMNS: &str =
    "id, sku, name, quantity, price, description, image, created_at, updated_at";

/// `%value%` with LIKE metacharacters in `value` matched literally.
fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let sql = format!(
            r#"
            INSERT INTO products ({PRODUCT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.id.into(),
                product.sku.into(),
                product.name.into(),
                product.quantity.into(),
                product.price.into(),
                product.description.into(),
                product.image.into(),
                product.created_at.into(),
                product.updated_at.into(),
            ],
        );

        let row = ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProductError::Internal("Insert returned no row".to_string()))?;

        tracing::info!(product_id = %row.id, sku = row.sku, "Created product");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = ProductRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, limit: u64, offset: u64) -> ProductResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [(limit as i64).into(), (offset as i64).into()],
        );

        let rows = ProductRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> ProductResult<u64> {
        let stmt =
            Statement::from_string(DbBackend::Postgres, "SELECT COUNT(*) AS count FROM products");

        let row = CountRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map_or(0, |r| r.count as u64))
    }

    async fn search(&self, query: &SearchQuery) -> ProductResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE name LIKE $1 AND CAST(sku AS TEXT) LIKE $2
            ORDER BY created_at DESC, id DESC
            "#
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                contains_pattern(&query.name).into(),
                contains_pattern(&query.sku).into(),
            ],
        );

        let rows = ProductRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let sql = format!(
            r#"
            UPDATE products
            SET sku = $2, name = $3, quantity = $4, price = $5, description = $6,
                image = $7, updated_at = $8
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let id = product.id;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.id.into(),
                product.sku.into(),
                product.name.into(),
                product.quantity.into(),
                product.price.into(),
                product.description.into(),
                product.image.into(),
                product.updated_at.into(),
            ],
        );

        let row = ProductRow::find_by_statement(stmt).one(&self.db).await?;
        row.map(Into::into).ok_or(ProductError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM products WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}
