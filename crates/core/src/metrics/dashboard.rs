use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::metrics::efficiency::{processing_efficiency, EfficiencyAssumptions};
use crate::metrics::network::{network_growth, GrowthPoint};
use crate::metrics::period::{filter_current, sum_current, Period};
use crate::metrics::quality::{quality_distribution, DistributionEntry};
use crate::metrics::satisfaction::employee_satisfaction;
use crate::metrics::sustainability::sustainability_index;
use crate::metrics::{CompositeScore, MetricsSnapshot};

/// Record counts behind a dashboard, for display next to the scores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub farmers: usize,
    pub suppliers: usize,
    pub retailers: usize,
    pub employees: usize,
    pub milk_entries_in_period: usize,
    pub sales_in_period: usize,
}

/// All aggregate metrics for one reference date and period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardReport {
    pub as_of: NaiveDate,
    pub period: Period,
    /// Litres collected in the current bucket of `period`.
    pub milk_collected: f64,
    /// Sales revenue in the current bucket of `period`.
    pub sales_total: f64,
    pub quality_distribution: Vec<DistributionEntry>,
    pub network_growth: Vec<GrowthPoint>,
    pub employee_satisfaction: CompositeScore,
    pub sustainability_index: CompositeScore,
    pub processing_efficiency: CompositeScore,
    pub counts: DashboardCounts,
}

pub fn build_dashboard(
    snapshot: &MetricsSnapshot,
    period: Period,
    today: NaiveDate,
    assumptions: &EfficiencyAssumptions,
) -> DashboardReport {
    let milk_collected =
        sum_current(&snapshot.milk_entries, period, today, |entry| entry.quantity);
    let sales_total = sum_current(&snapshot.sales, period, today, |sale| {
        sale.amount.to_f64().unwrap_or_default()
    });

    DashboardReport {
        as_of: today,
        period,
        milk_collected,
        sales_total,
        quality_distribution: quality_distribution(&snapshot.quality_tests),
        network_growth: network_growth(&snapshot.farmers, &snapshot.suppliers, today),
        employee_satisfaction: employee_satisfaction(
            &snapshot.employees,
            &snapshot.surveys,
            &snapshot.performance,
        ),
        sustainability_index: sustainability_index(
            &snapshot.compliance_records,
            &snapshot.certifications,
            &snapshot.audits,
            today,
        ),
        processing_efficiency: processing_efficiency(
            &snapshot.processing_units,
            &snapshot.production_batches,
            &snapshot.quality_checks,
            &snapshot.maintenance_records,
            assumptions,
        ),
        counts: DashboardCounts {
            farmers: snapshot.farmers.len(),
            suppliers: snapshot.suppliers.len(),
            retailers: snapshot.retailers.len(),
            employees: snapshot.employees.len(),
            milk_entries_in_period: filter_current(&snapshot.milk_entries, period, today).len(),
            sales_in_period: filter_current(&snapshot.sales, period, today).len(),
        },
    }
}
