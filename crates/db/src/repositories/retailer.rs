use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use dairy_core::domain::sales::{Retailer, RetailerId};

use super::{conflict_on_unique, parse_decimal, RepositoryError, RetailerRepository};
use crate::DbPool;

pub struct SqlRetailerRepository {
    pool: DbPool,
}

impl SqlRetailerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn retailer_from_row(row: &SqliteRow) -> Result<Retailer, RepositoryError> {
    let total_sales: String = row.try_get("total_sales")?;
    Ok(Retailer {
        id: RetailerId(row.try_get("id")?),
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        total_sales: parse_decimal("total_sales", &total_sales)?,
    })
}

#[async_trait::async_trait]
impl RetailerRepository for SqlRetailerRepository {
    async fn list(&self) -> Result<Vec<Retailer>, RepositoryError> {
        let rows =
            sqlx::query("SELECT id, name, location, total_sales FROM retailers ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(retailer_from_row).collect()
    }

    async fn find_by_id(&self, id: &RetailerId) -> Result<Option<Retailer>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, location, total_sales FROM retailers WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(retailer_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Retailer>, RepositoryError> {
        let row =
            sqlx::query("SELECT id, name, location, total_sales FROM retailers WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(retailer_from_row).transpose()
    }

    async fn create(&self, retailer: Retailer) -> Result<Retailer, RepositoryError> {
        sqlx::query("INSERT INTO retailers (id, name, location, total_sales) VALUES (?, ?, ?, ?)")
            .bind(&retailer.id.0)
            .bind(&retailer.name)
            .bind(&retailer.location)
            .bind(retailer.total_sales.to_string())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                let name = &retailer.name;
                conflict_on_unique(error, || format!("retailer `{name}` already exists"))
            })?;
        Ok(retailer)
    }
}
