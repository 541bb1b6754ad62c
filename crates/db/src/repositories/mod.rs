use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use dairy_core::domain::sales::{Retailer, RetailerId, Sale, SaleId};
use dairy_core::errors::{ApplicationError, DomainError};
use dairy_core::metrics::MetricsSnapshot;

pub mod memory;
pub mod retailer;
pub mod sale;
pub mod snapshot;

pub use memory::{InMemoryMetricsDataSource, InMemorySalesLedger};
pub use retailer::SqlRetailerRepository;
pub use sale::SqlSaleRepository;
pub use snapshot::SqlMetricsDataSource;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(message) => Self::NotFound(message),
            RepositoryError::Conflict(message) => {
                Self::Domain(DomainError::InvariantViolation(message))
            }
            RepositoryError::Domain(error) => Self::Domain(error),
            RepositoryError::Database(error) if is_unavailable(&error) => {
                Self::Persistence(error.to_string())
            }
            RepositoryError::Database(error) => Self::Integrity(error.to_string()),
            RepositoryError::Decode(message) => Self::Integrity(message),
        }
    }
}

/// Connection, pool and engine failures that a retry may clear. Row and
/// column decode failures are not among them.
fn is_unavailable(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Loads every collection the metrics calculator reads.
#[async_trait]
pub trait MetricsDataSource: Send + Sync {
    async fn load_snapshot(&self) -> Result<MetricsSnapshot, RepositoryError>;
}

#[async_trait]
pub trait RetailerRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Retailer>, RepositoryError>;
    async fn find_by_id(&self, id: &RetailerId) -> Result<Option<Retailer>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Retailer>, RepositoryError>;
    async fn create(&self, retailer: Retailer) -> Result<Retailer, RepositoryError>;
}

/// Sale writes that keep each retailer's running total in step.
///
/// Every write either commits the sale change together with all retailer
/// adjustments or leaves both untouched.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Sale>, RepositoryError>;
    async fn find_by_id(&self, id: &SaleId) -> Result<Option<Sale>, RepositoryError>;
    async fn create(&self, sale: Sale) -> Result<Sale, RepositoryError>;
    async fn update(&self, sale: Sale) -> Result<Sale, RepositoryError>;
    /// Removes the sale and returns it as it was stored.
    async fn delete(&self, id: &SaleId) -> Result<Sale, RepositoryError>;
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw.trim())
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}`: {error}")))
}

/// Maps unique-constraint failures onto [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(
    error: sqlx::Error,
    describe: impl FnOnce() -> String,
) -> RepositoryError {
    let unique = matches!(
        &error,
        sqlx::Error::Database(database) if database.is_unique_violation()
    );
    if unique {
        RepositoryError::Conflict(describe())
    } else {
        RepositoryError::Database(error)
    }
}

pub(crate) fn retailer_not_found(name: &str) -> RepositoryError {
    RepositoryError::NotFound(format!("retailer `{name}`"))
}

pub(crate) fn sale_not_found(id: &SaleId) -> RepositoryError {
    RepositoryError::NotFound(format!("sale `{}`", id.0))
}

#[cfg(test)]
mod tests {
    use dairy_core::errors::{ApplicationError, DomainError};

    use super::{parse_decimal, RepositoryError};

    #[test]
    fn decimal_text_is_parsed_exactly() {
        let parsed = parse_decimal("amount", " 15000.50 ").expect("decimal");
        assert_eq!(parsed.to_string(), "15000.50");
        assert!(matches!(parse_decimal("amount", "fifteen"), Err(RepositoryError::Decode(_))));
    }

    #[test]
    fn repository_errors_map_onto_application_errors() {
        let not_found = ApplicationError::from(RepositoryError::NotFound("sale `S-9`".to_string()));
        assert_eq!(not_found, ApplicationError::NotFound("sale `S-9`".to_string()));

        let domain = ApplicationError::from(RepositoryError::Domain(
            DomainError::InvariantViolation("negative".to_string()),
        ));
        assert!(matches!(domain, ApplicationError::Domain(_)));

        let decode = ApplicationError::from(RepositoryError::Decode("bad".to_string()));
        assert!(matches!(decode, ApplicationError::Integrity(_)));

        let closed = ApplicationError::from(RepositoryError::Database(sqlx::Error::PoolClosed));
        assert!(matches!(closed, ApplicationError::Persistence(_)));

        let column = ApplicationError::from(RepositoryError::Database(
            sqlx::Error::ColumnNotFound("total_sales".to_string()),
        ));
        assert!(matches!(column, ApplicationError::Integrity(_)));
    }
}
