use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarmerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farmer {
    pub id: FarmerId,
    pub name: String,
    pub join_date: String,
    pub status: String,
    pub cattle_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub join_date: String,
    pub status: String,
    pub supplier_type: String,
}

impl Dated for Farmer {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.join_date)
    }
}

impl Dated for Supplier {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.join_date)
    }
}
