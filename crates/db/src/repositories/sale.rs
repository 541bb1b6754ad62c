use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use dairy_core::domain::sales::{plan_retailer_adjustments, RetailerAdjustment, Sale, SaleId};

use super::{
    conflict_on_unique, parse_decimal, retailer_not_found, sale_not_found, RepositoryError,
    SaleRepository,
};
use crate::DbPool;

pub struct SqlSaleRepository {
    pool: DbPool,
}

impl SqlSaleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn sale_from_row(row: &SqliteRow) -> Result<Sale, RepositoryError> {
    let amount: String = row.try_get("amount")?;
    Ok(Sale {
        id: SaleId(row.try_get("id")?),
        date: row.try_get("date")?,
        retailer: row.try_get("retailer")?,
        product: row.try_get("product")?,
        amount: parse_decimal("amount", &amount)?,
    })
}

async fn fetch_sale(
    conn: &mut SqliteConnection,
    id: &SaleId,
) -> Result<Option<Sale>, RepositoryError> {
    let row = sqlx::query("SELECT id, date, retailer, product, amount FROM sales WHERE id = ?")
        .bind(&id.0)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(sale_from_row).transpose()
}

async fn require_retailer(conn: &mut SqliteConnection, name: &str) -> Result<(), RepositoryError> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM retailers WHERE name = ?)")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    if exists == 1 {
        Ok(())
    } else {
        Err(retailer_not_found(name))
    }
}

async fn apply_adjustments(
    conn: &mut SqliteConnection,
    adjustments: &[RetailerAdjustment],
) -> Result<(), RepositoryError> {
    for adjustment in adjustments {
        let current: Option<String> =
            sqlx::query_scalar("SELECT total_sales FROM retailers WHERE name = ?")
                .bind(&adjustment.retailer)
                .fetch_optional(&mut *conn)
                .await?;
        let current = current.ok_or_else(|| retailer_not_found(&adjustment.retailer))?;
        let total = adjustment.apply(parse_decimal("total_sales", &current)?)?;

        sqlx::query("UPDATE retailers SET total_sales = ? WHERE name = ?")
            .bind(total.to_string())
            .bind(&adjustment.retailer)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl SaleRepository for SqlSaleRepository {
    async fn list(&self) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, date, retailer, product, amount FROM sales ORDER BY date DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sale_from_row).collect()
    }

    async fn find_by_id(&self, id: &SaleId) -> Result<Option<Sale>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    async fn create(&self, sale: Sale) -> Result<Sale, RepositoryError> {
        sale.validate()?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO sales (id, date, retailer, product, amount) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&sale.id.0)
        .bind(&sale.date)
        .bind(&sale.retailer)
        .bind(&sale.product)
        .bind(sale.amount.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|error| {
            conflict_on_unique(error, || format!("sale `{}` already exists", sale.id.0))
        })?;

        require_retailer(&mut tx, &sale.retailer).await?;
        let adjustments = plan_retailer_adjustments(None, Some(&sale));
        apply_adjustments(&mut tx, &adjustments).await?;

        tx.commit().await?;
        debug!(
            event_name = "sales.created",
            sale_id = %sale.id.0,
            retailer = %sale.retailer,
            amount = %sale.amount,
            "sale recorded"
        );
        Ok(sale)
    }

    async fn update(&self, sale: Sale) -> Result<Sale, RepositoryError> {
        sale.validate()?;
        let mut tx = self.pool.begin().await?;

        let previous =
            fetch_sale(&mut tx, &sale.id).await?.ok_or_else(|| sale_not_found(&sale.id))?;

        sqlx::query(
            "UPDATE sales SET date = ?, retailer = ?, product = ?, amount = ? WHERE id = ?",
        )
        .bind(&sale.date)
        .bind(&sale.retailer)
        .bind(&sale.product)
        .bind(sale.amount.to_string())
        .bind(&sale.id.0)
        .execute(&mut *tx)
        .await?;

        require_retailer(&mut tx, &sale.retailer).await?;
        let adjustments = plan_retailer_adjustments(Some(&previous), Some(&sale));
        apply_adjustments(&mut tx, &adjustments).await?;

        tx.commit().await?;
        debug!(
            event_name = "sales.updated",
            sale_id = %sale.id.0,
            adjustments = adjustments.len(),
            "sale updated"
        );
        Ok(sale)
    }

    async fn delete(&self, id: &SaleId) -> Result<Sale, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous = fetch_sale(&mut tx, id).await?.ok_or_else(|| sale_not_found(id))?;

        sqlx::query("DELETE FROM sales WHERE id = ?").bind(&id.0).execute(&mut *tx).await?;

        let adjustments = plan_retailer_adjustments(Some(&previous), None);
        apply_adjustments(&mut tx, &adjustments).await?;

        tx.commit().await?;
        debug!(event_name = "sales.deleted", sale_id = %id.0, "sale deleted");
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use dairy_core::domain::sales::{Retailer, RetailerId, Sale, SaleId};

    use super::SqlSaleRepository;
    use crate::repositories::{
        RepositoryError, RetailerRepository, SaleRepository, SqlRetailerRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let retailers = SqlRetailerRepository::new(pool.clone());
        for (id, name) in [("R-1", "FreshMart"), ("R-2", "DairyDepot")] {
            retailers
                .create(Retailer {
                    id: RetailerId(id.to_string()),
                    name: name.to_string(),
                    location: "Anand".to_string(),
                    total_sales: Decimal::ZERO,
                })
                .await
                .expect("create retailer");
        }
        pool
    }

    fn sale(id: &str, retailer: &str, amount: &str) -> Sale {
        Sale {
            id: SaleId(id.to_string()),
            date: "2025-06-26".to_string(),
            retailer: retailer.to_string(),
            product: "Toned Milk".to_string(),
            amount: Decimal::from_str(amount).expect("decimal"),
        }
    }

    async fn total(pool: &DbPool, name: &str) -> Decimal {
        SqlRetailerRepository::new(pool.clone())
            .find_by_name(name)
            .await
            .expect("find retailer")
            .expect("retailer exists")
            .total_sales
    }

    #[tokio::test]
    async fn creating_a_sale_adds_to_retailer_total() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());

        repo.create(sale("S-1", "FreshMart", "15000")).await.expect("create sale");

        assert_eq!(total(&pool, "FreshMart").await, Decimal::from(15_000));
        assert_eq!(total(&pool, "DairyDepot").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn update_and_delete_keep_total_consistent() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());

        repo.create(sale("S-1", "FreshMart", "1000")).await.expect("create");
        repo.create(sale("S-2", "FreshMart", "250.25")).await.expect("create");
        repo.update(sale("S-1", "FreshMart", "1500")).await.expect("update");
        assert_eq!(total(&pool, "FreshMart").await, Decimal::from_str("1750.25").expect("dec"));

        let deleted = repo.delete(&SaleId("S-1".to_string())).await.expect("delete");
        assert_eq!(deleted.amount, Decimal::from(1_500));
        assert_eq!(total(&pool, "FreshMart").await, Decimal::from_str("250.25").expect("dec"));
        assert_eq!(repo.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn changing_retailer_moves_the_amount() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());

        repo.create(sale("S-1", "FreshMart", "900")).await.expect("create");
        repo.update(sale("S-1", "DairyDepot", "800")).await.expect("update");

        assert_eq!(total(&pool, "FreshMart").await, Decimal::ZERO);
        assert_eq!(total(&pool, "DairyDepot").await, Decimal::from(800));
    }

    #[tokio::test]
    async fn unknown_retailer_on_create_writes_nothing() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());

        let error = repo.create(sale("S-1", "Nowhere Mart", "0")).await.expect_err("unknown");

        assert!(matches!(error, RepositoryError::NotFound(_)));
        assert!(repo.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn failed_update_rolls_back_sale_and_totals() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());
        let original = repo.create(sale("S-1", "FreshMart", "15000")).await.expect("create");

        let error =
            repo.update(sale("S-1", "Nowhere Mart", "20000")).await.expect_err("unknown retailer");

        assert!(matches!(error, RepositoryError::NotFound(_)));
        let stored = repo.find_by_id(&original.id).await.expect("find").expect("still stored");
        assert_eq!(stored, original);
        assert_eq!(total(&pool, "FreshMart").await, Decimal::from(15_000));
        assert_eq!(total(&pool, "DairyDepot").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected_before_writing() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());

        let error = repo.create(sale("S-1", "FreshMart", "-5")).await.expect_err("negative");

        assert!(matches!(error, RepositoryError::Domain(_)));
        assert_eq!(total(&pool, "FreshMart").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn total_overflow_fails_the_write_and_rolls_back() {
        let pool = setup().await;
        let repo = SqlSaleRepository::new(pool.clone());
        let max = Decimal::MAX.to_string();
        repo.create(sale("S-1", "FreshMart", &max)).await.expect("first sale fits");

        let error = repo.create(sale("S-2", "FreshMart", &max)).await.expect_err("overflow");

        assert!(matches!(error, RepositoryError::Domain(_)));
        assert_eq!(total(&pool, "FreshMart").await, Decimal::MAX);
        assert!(repo.find_by_id(&SaleId("S-2".to_string())).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn missing_sale_is_not_found() {
        let repo = SqlSaleRepository::new(setup().await);

        let update = repo.update(sale("S-404", "FreshMart", "10")).await;
        let delete = repo.delete(&SaleId("S-404".to_string())).await;

        assert!(matches!(update, Err(RepositoryError::NotFound(_))));
        assert!(matches!(delete, Err(RepositoryError::NotFound(_))));
    }
}
