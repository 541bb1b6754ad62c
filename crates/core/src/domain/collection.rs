use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};
use crate::domain::network::FarmerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MilkEntryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityTestId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl QualityGrade {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilkShift {
    Morning,
    Evening,
}

impl MilkShift {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "evening" => Some(Self::Evening),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }
}

/// One collection of milk from a farmer at a shift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilkEntry {
    pub id: MilkEntryId,
    pub farmer_id: FarmerId,
    pub date: String,
    /// Litres collected.
    pub quantity: f64,
    pub shift: MilkShift,
    pub quality: QualityGrade,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    pub id: QualityTestId,
    pub farmer_id: FarmerId,
    pub test_date: String,
    pub overall_grade: QualityGrade,
}

impl Dated for MilkEntry {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }
}

impl Dated for QualityTest {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.test_date)
    }
}
