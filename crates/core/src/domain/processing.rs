use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingUnit {
    pub id: UnitId,
    pub name: String,
    pub capacity_litres: f64,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionBatch {
    pub id: BatchId,
    pub unit_id: UnitId,
    pub product: String,
    pub production_date: String,
    pub output_units: f64,
    pub waste_units: f64,
    pub energy_kwh: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub id: String,
    pub batch_id: BatchId,
    pub check_date: String,
    pub passed: bool,
}

/// A maintenance visit. Each record counts as one downtime event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub unit_id: UnitId,
    pub maintenance_date: String,
    pub description: String,
}

impl Dated for ProductionBatch {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.production_date)
    }
}

impl Dated for QualityCheck {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.check_date)
    }
}

impl Dated for MaintenanceRecord {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.maintenance_date)
    }
}
