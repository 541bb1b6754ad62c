//! Aggregate metrics over cooperative record collections.
//!
//! Every function here is pure: callers load a [`MetricsSnapshot`] (or the
//! individual collections) and get freshly computed values back. Nothing is
//! cached and empty collections resolve to fixed fallback values.

pub mod dashboard;
pub mod efficiency;
pub mod network;
pub mod period;
pub mod quality;
pub mod satisfaction;
pub mod sustainability;

use serde::{Deserialize, Serialize};

use crate::domain::collection::{MilkEntry, QualityTest};
use crate::domain::compliance::{Audit, Certification, ComplianceRecord};
use crate::domain::network::{Farmer, Supplier};
use crate::domain::processing::{
    MaintenanceRecord, ProcessingUnit, ProductionBatch, QualityCheck,
};
use crate::domain::sales::{Retailer, Sale};
use crate::domain::workforce::{Employee, EmployeePerformance, EmployeeSurvey};

pub use dashboard::{build_dashboard, DashboardReport};
pub use efficiency::{processing_efficiency, EfficiencyAssumptions};
pub use network::{network_growth, GrowthPoint};
pub use period::{bucket_ranges, filter_current, in_current_bucket, series, Period, SeriesBucket};
pub use quality::{quality_distribution, DistributionEntry};
pub use satisfaction::employee_satisfaction;
pub use sustainability::sustainability_index;

/// Every collection the calculator reads, as loaded by a data provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub farmers: Vec<Farmer>,
    pub suppliers: Vec<Supplier>,
    pub milk_entries: Vec<MilkEntry>,
    pub quality_tests: Vec<QualityTest>,
    pub sales: Vec<Sale>,
    pub retailers: Vec<Retailer>,
    pub employees: Vec<Employee>,
    pub surveys: Vec<EmployeeSurvey>,
    pub performance: Vec<EmployeePerformance>,
    pub compliance_records: Vec<ComplianceRecord>,
    pub certifications: Vec<Certification>,
    pub audits: Vec<Audit>,
    pub processing_units: Vec<ProcessingUnit>,
    pub production_batches: Vec<ProductionBatch>,
    pub quality_checks: Vec<QualityCheck>,
    pub maintenance_records: Vec<MaintenanceRecord>,
}

/// How a composite's final value is rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Integer,
    OneDecimal,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Integer => value.round(),
            Self::OneDecimal => (value * 10.0).round() / 10.0,
        }
    }
}

/// One weighted input of a composite score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentScore {
    pub name: &'static str,
    pub weight: f64,
    pub score: f64,
    /// True when the input collection was empty and the fallback was used.
    pub fallback: bool,
}

impl ComponentScore {
    pub fn measured(name: &'static str, weight: f64, score: f64) -> Self {
        Self { name, weight, score: clamp_percent(score), fallback: false }
    }

    pub fn fallback(name: &'static str, weight: f64, score: f64) -> Self {
        Self { name, weight, score, fallback: true }
    }

    /// Uses `measured` when present, the fallback otherwise.
    pub fn from_option(
        name: &'static str,
        weight: f64,
        measured: Option<f64>,
        fallback: f64,
    ) -> Self {
        match measured {
            Some(score) => Self::measured(name, weight, score),
            None => Self::fallback(name, weight, fallback),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositeScore {
    pub score: f64,
    pub components: Vec<ComponentScore>,
}

impl CompositeScore {
    /// Weighted sum of the components, clamped to 0-100 and rounded.
    pub fn weighted(components: Vec<ComponentScore>, rounding: Rounding) -> Self {
        let raw: f64 = components.iter().map(|component| component.score * component.weight).sum();
        Self { score: rounding.apply(clamp_percent(raw)), components }
    }
}

pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// `part / whole` as a percentage, `None` when `whole` is zero.
pub(crate) fn percent_of(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) =
        values.into_iter().fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
