use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use dairy_core::domain::sales::{
    plan_retailer_adjustments, Retailer, RetailerAdjustment, RetailerId, Sale, SaleId,
};
use dairy_core::metrics::MetricsSnapshot;

use super::{
    retailer_not_found, sale_not_found, MetricsDataSource, RepositoryError, RetailerRepository,
    SaleRepository,
};

#[derive(Default)]
pub struct InMemoryMetricsDataSource {
    snapshot: RwLock<MetricsSnapshot>,
}

impl InMemoryMetricsDataSource {
    pub fn new(snapshot: MetricsSnapshot) -> Self {
        Self { snapshot: RwLock::new(snapshot) }
    }

    pub async fn replace(&self, snapshot: MetricsSnapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait::async_trait]
impl MetricsDataSource for InMemoryMetricsDataSource {
    async fn load_snapshot(&self) -> Result<MetricsSnapshot, RepositoryError> {
        Ok(self.snapshot.read().await.clone())
    }
}

#[derive(Default)]
struct LedgerState {
    /// Keyed by retailer name, which is how sales reference retailers.
    retailers: BTreeMap<String, Retailer>,
    sales: BTreeMap<String, Sale>,
}

impl LedgerState {
    /// Totals after applying `adjustments`, or an error with nothing changed.
    fn adjusted_totals(
        &self,
        adjustments: &[RetailerAdjustment],
    ) -> Result<Vec<(String, Decimal)>, RepositoryError> {
        let mut staged: Vec<(String, Decimal)> = Vec::new();
        for adjustment in adjustments {
            let current = match staged.iter().find(|(name, _)| *name == adjustment.retailer) {
                Some((_, total)) => *total,
                None => self
                    .retailers
                    .get(&adjustment.retailer)
                    .map(|retailer| retailer.total_sales)
                    .ok_or_else(|| retailer_not_found(&adjustment.retailer))?,
            };
            staged.retain(|(name, _)| *name != adjustment.retailer);
            staged.push((adjustment.retailer.clone(), adjustment.apply(current)?));
        }
        Ok(staged)
    }

    fn commit_totals(&mut self, totals: Vec<(String, Decimal)>) {
        for (name, total) in totals {
            if let Some(retailer) = self.retailers.get_mut(&name) {
                retailer.total_sales = total;
            }
        }
    }
}

/// Retailers and sales kept together so a sale write and its total
/// adjustments happen under one lock.
#[derive(Default)]
pub struct InMemorySalesLedger {
    state: RwLock<LedgerState>,
}

#[async_trait::async_trait]
impl RetailerRepository for InMemorySalesLedger {
    async fn list(&self) -> Result<Vec<Retailer>, RepositoryError> {
        Ok(self.state.read().await.retailers.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &RetailerId) -> Result<Option<Retailer>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.retailers.values().find(|retailer| retailer.id == *id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Retailer>, RepositoryError> {
        Ok(self.state.read().await.retailers.get(name).cloned())
    }

    async fn create(&self, retailer: Retailer) -> Result<Retailer, RepositoryError> {
        let mut state = self.state.write().await;
        let duplicate = state.retailers.contains_key(&retailer.name)
            || state.retailers.values().any(|existing| existing.id == retailer.id);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "retailer `{}` already exists",
                retailer.name
            )));
        }
        state.retailers.insert(retailer.name.clone(), retailer.clone());
        Ok(retailer)
    }
}

#[async_trait::async_trait]
impl SaleRepository for InMemorySalesLedger {
    async fn list(&self) -> Result<Vec<Sale>, RepositoryError> {
        Ok(self.state.read().await.sales.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &SaleId) -> Result<Option<Sale>, RepositoryError> {
        Ok(self.state.read().await.sales.get(&id.0).cloned())
    }

    async fn create(&self, sale: Sale) -> Result<Sale, RepositoryError> {
        sale.validate()?;
        let mut state = self.state.write().await;
        if state.sales.contains_key(&sale.id.0) {
            return Err(RepositoryError::Conflict(format!("sale `{}` already exists", sale.id.0)));
        }
        if !state.retailers.contains_key(&sale.retailer) {
            return Err(retailer_not_found(&sale.retailer));
        }

        let totals = state.adjusted_totals(&plan_retailer_adjustments(None, Some(&sale)))?;
        state.commit_totals(totals);
        state.sales.insert(sale.id.0.clone(), sale.clone());
        Ok(sale)
    }

    async fn update(&self, sale: Sale) -> Result<Sale, RepositoryError> {
        sale.validate()?;
        let mut state = self.state.write().await;
        let previous =
            state.sales.get(&sale.id.0).cloned().ok_or_else(|| sale_not_found(&sale.id))?;
        if !state.retailers.contains_key(&sale.retailer) {
            return Err(retailer_not_found(&sale.retailer));
        }

        let totals =
            state.adjusted_totals(&plan_retailer_adjustments(Some(&previous), Some(&sale)))?;
        state.commit_totals(totals);
        state.sales.insert(sale.id.0.clone(), sale.clone());
        Ok(sale)
    }

    async fn delete(&self, id: &SaleId) -> Result<Sale, RepositoryError> {
        let mut state = self.state.write().await;
        let previous = state.sales.get(&id.0).cloned().ok_or_else(|| sale_not_found(id))?;

        let totals = state.adjusted_totals(&plan_retailer_adjustments(Some(&previous), None))?;
        state.commit_totals(totals);
        state.sales.remove(&id.0);
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use dairy_core::domain::sales::{Retailer, RetailerId, Sale, SaleId};
    use dairy_core::metrics::MetricsSnapshot;

    use crate::repositories::{
        InMemoryMetricsDataSource, InMemorySalesLedger, MetricsDataSource, RepositoryError,
        RetailerRepository, SaleRepository,
    };

    async fn ledger() -> InMemorySalesLedger {
        let ledger = InMemorySalesLedger::default();
        for (id, name) in [("R-1", "FreshMart"), ("R-2", "DairyDepot")] {
            RetailerRepository::create(
                &ledger,
                Retailer {
                    id: RetailerId(id.to_string()),
                    name: name.to_string(),
                    location: "Anand".to_string(),
                    total_sales: Decimal::ZERO,
                },
            )
            .await
            .expect("create retailer");
        }
        ledger
    }

    fn sale(retailer: &str, amount: i64) -> Sale {
        Sale {
            id: SaleId("S-1".to_string()),
            date: "2025-06-26".to_string(),
            retailer: retailer.to_string(),
            product: "Curd".to_string(),
            amount: Decimal::from(amount),
        }
    }

    async fn total(ledger: &InMemorySalesLedger, name: &str) -> Decimal {
        ledger.find_by_name(name).await.expect("find").expect("retailer").total_sales
    }

    #[tokio::test]
    async fn create_update_delete_round_trip_restores_total() {
        let ledger = ledger().await;

        SaleRepository::create(&ledger, sale("FreshMart", 15_000)).await.expect("create");
        assert_eq!(total(&ledger, "FreshMart").await, Decimal::from(15_000));

        ledger.update(sale("FreshMart", 12_000)).await.expect("update");
        assert_eq!(total(&ledger, "FreshMart").await, Decimal::from(12_000));

        ledger.delete(&SaleId("S-1".to_string())).await.expect("delete");
        assert_eq!(total(&ledger, "FreshMart").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn unknown_retailer_leaves_state_untouched() {
        let ledger = ledger().await;
        SaleRepository::create(&ledger, sale("FreshMart", 500)).await.expect("create");

        let error = ledger.update(sale("Nowhere Mart", 700)).await.expect_err("unknown");

        assert!(matches!(error, RepositoryError::NotFound(_)));
        assert_eq!(total(&ledger, "FreshMart").await, Decimal::from(500));
        let stored = SaleRepository::find_by_id(&ledger, &SaleId("S-1".to_string()))
            .await
            .expect("find")
            .expect("sale");
        assert_eq!(stored.retailer, "FreshMart");
    }

    #[tokio::test]
    async fn total_overflow_is_rejected_without_panicking() {
        let ledger = ledger().await;
        let mut first = sale("FreshMart", 0);
        first.amount = Decimal::MAX;
        let second = Sale { id: SaleId("S-2".to_string()), ..first.clone() };
        SaleRepository::create(&ledger, first).await.expect("first sale fits");

        let error = SaleRepository::create(&ledger, second).await.expect_err("overflow");

        assert!(matches!(error, RepositoryError::Domain(_)));
        assert_eq!(total(&ledger, "FreshMart").await, Decimal::MAX);
        assert_eq!(SaleRepository::list(&ledger).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn data_source_returns_current_snapshot() {
        let source = InMemoryMetricsDataSource::default();
        assert_eq!(source.load_snapshot().await.expect("load"), MetricsSnapshot::default());

        let snapshot = MetricsSnapshot { sales: vec![sale("FreshMart", 10)], ..Default::default() };
        source.replace(snapshot.clone()).await;

        assert_eq!(source.load_snapshot().await.expect("load"), snapshot);
    }
}
