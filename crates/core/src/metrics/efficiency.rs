//! Processing efficiency composite.
//!
//! The ratios here are estimates built on [`EfficiencyAssumptions`]: planned
//! output, downtime per maintenance visit and the energy baseline are policy
//! inputs, not measurements, and are configured rather than hardcoded.

use serde::{Deserialize, Serialize};

use crate::domain::processing::{
    MaintenanceRecord, ProcessingUnit, ProductionBatch, QualityCheck,
};
use crate::metrics::{percent_of, ComponentScore, CompositeScore, Rounding};

pub const EQUIPMENT_UPTIME_WEIGHT: f64 = 0.30;
pub const THROUGHPUT_WEIGHT: f64 = 0.25;
pub const QUALITY_RATE_WEIGHT: f64 = 0.20;
pub const WASTE_MINIMIZATION_WEIGHT: f64 = 0.15;
pub const ENERGY_EFFICIENCY_WEIGHT: f64 = 0.10;

pub const EQUIPMENT_UPTIME_FALLBACK: f64 = 95.0;
pub const THROUGHPUT_FALLBACK: f64 = 90.0;
pub const QUALITY_RATE_FALLBACK: f64 = 85.0;
pub const WASTE_MINIMIZATION_FALLBACK: f64 = 88.0;
pub const ENERGY_EFFICIENCY_FALLBACK: f64 = 82.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyAssumptions {
    /// Hours a unit is down for each maintenance record.
    pub downtime_hours_per_event: f64,
    /// Scheduled operating hours per unit over the reporting window.
    pub operating_hours_per_unit: f64,
    /// Output a batch is planned to produce.
    pub planned_output_per_batch: f64,
    /// Expected energy use per output unit.
    pub baseline_kwh_per_unit: f64,
}

impl Default for EfficiencyAssumptions {
    fn default() -> Self {
        Self {
            downtime_hours_per_event: 4.0,
            operating_hours_per_unit: 720.0,
            planned_output_per_batch: 1500.0,
            baseline_kwh_per_unit: 0.35,
        }
    }
}

pub fn processing_efficiency(
    units: &[ProcessingUnit],
    batches: &[ProductionBatch],
    checks: &[QualityCheck],
    maintenance: &[MaintenanceRecord],
    assumptions: &EfficiencyAssumptions,
) -> CompositeScore {
    CompositeScore::weighted(
        vec![
            ComponentScore::from_option(
                "equipment_uptime",
                EQUIPMENT_UPTIME_WEIGHT,
                equipment_uptime(units, maintenance, assumptions),
                EQUIPMENT_UPTIME_FALLBACK,
            ),
            ComponentScore::from_option(
                "throughput",
                THROUGHPUT_WEIGHT,
                throughput(batches, assumptions),
                THROUGHPUT_FALLBACK,
            ),
            ComponentScore::from_option(
                "quality_rate",
                QUALITY_RATE_WEIGHT,
                percent_of(checks.iter().filter(|check| check.passed).count(), checks.len()),
                QUALITY_RATE_FALLBACK,
            ),
            ComponentScore::from_option(
                "waste_minimization",
                WASTE_MINIMIZATION_WEIGHT,
                waste_minimization(batches),
                WASTE_MINIMIZATION_FALLBACK,
            ),
            ComponentScore::from_option(
                "energy_efficiency",
                ENERGY_EFFICIENCY_WEIGHT,
                energy_efficiency(batches, assumptions),
                ENERGY_EFFICIENCY_FALLBACK,
            ),
        ],
        Rounding::OneDecimal,
    )
}

fn equipment_uptime(
    units: &[ProcessingUnit],
    maintenance: &[MaintenanceRecord],
    assumptions: &EfficiencyAssumptions,
) -> Option<f64> {
    if maintenance.is_empty() {
        return None;
    }
    let scheduled_hours = units.len().max(1) as f64 * assumptions.operating_hours_per_unit;
    if scheduled_hours <= 0.0 {
        return None;
    }
    let downtime_hours = maintenance.len() as f64 * assumptions.downtime_hours_per_event;
    Some((1.0 - downtime_hours / scheduled_hours) * 100.0)
}

fn throughput(batches: &[ProductionBatch], assumptions: &EfficiencyAssumptions) -> Option<f64> {
    let planned = batches.len() as f64 * assumptions.planned_output_per_batch;
    if planned <= 0.0 {
        return None;
    }
    let actual: f64 = batches.iter().map(|batch| batch.output_units).sum();
    Some(actual / planned * 100.0)
}

fn waste_minimization(batches: &[ProductionBatch]) -> Option<f64> {
    let output: f64 = batches.iter().map(|batch| batch.output_units).sum();
    let waste: f64 = batches.iter().map(|batch| batch.waste_units).sum();
    let volume = output + waste;
    if batches.is_empty() || volume <= 0.0 {
        return None;
    }
    Some((1.0 - waste / volume) * 100.0)
}

fn energy_efficiency(
    batches: &[ProductionBatch],
    assumptions: &EfficiencyAssumptions,
) -> Option<f64> {
    let metered: Vec<(f64, f64)> = batches
        .iter()
        .filter_map(|batch| batch.energy_kwh.map(|energy| (batch.output_units, energy)))
        .collect();
    let energy: f64 = metered.iter().map(|(_, energy)| energy).sum();
    if metered.is_empty() || energy <= 0.0 {
        return None;
    }
    let output: f64 = metered.iter().map(|(output, _)| output).sum();
    Some(assumptions.baseline_kwh_per_unit * output / energy * 100.0)
}
