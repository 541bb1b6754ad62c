pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;

pub use domain::collection::{MilkEntry, MilkShift, QualityGrade, QualityTest};
pub use domain::network::{Farmer, Supplier};
pub use domain::sales::{plan_retailer_adjustments, Retailer, RetailerAdjustment, Sale, SaleId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use metrics::{
    build_dashboard, DashboardReport, EfficiencyAssumptions, MetricsSnapshot, Period,
};
