use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};

pub const ENVIRONMENTAL_CATEGORY: &str = "environmental";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Pending,
}

impl ComplianceStatus {
    /// Unknown stored values are treated as still pending review.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "compliant" => Self::Compliant,
            "non_compliant" => Self::NonCompliant,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::Pending => "pending",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Active,
    Expired,
    Suspended,
    Pending,
}

impl CertificationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" | "valid" => Self::Active,
            "expired" => Self::Expired,
            "suspended" => Self::Suspended,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
            Self::Pending => "pending",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub id: String,
    pub category: String,
    pub requirement: String,
    pub status: ComplianceStatus,
    pub documents_complete: bool,
}

impl ComplianceRecord {
    pub fn is_environmental(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case(ENVIRONMENTAL_CATEGORY)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub status: CertificationStatus,
    pub expiry_date: String,
}

impl Certification {
    /// Active and not past its expiry date. An unreadable expiry never counts as valid.
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.status == CertificationStatus::Active
            && parse_record_date(&self.expiry_date).is_some_and(|expiry| expiry >= today)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: String,
    pub audit_date: String,
    pub auditor: String,
    /// Audit result on a 0-100 scale.
    pub score: f64,
}

impl Dated for Audit {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.audit_date)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Certification, CertificationStatus, ComplianceStatus};

    #[test]
    fn compliance_status_normalizes_separators() {
        assert_eq!(ComplianceStatus::parse("Non-Compliant"), ComplianceStatus::NonCompliant);
        assert_eq!(ComplianceStatus::parse("compliant"), ComplianceStatus::Compliant);
        assert_eq!(ComplianceStatus::parse("in review"), ComplianceStatus::Pending);
    }

    #[test]
    fn certification_validity_respects_expiry() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 26).expect("date");
        let mut cert = Certification {
            id: "C-1".to_string(),
            name: "ISO 22000".to_string(),
            status: CertificationStatus::Active,
            expiry_date: "2025-06-26".to_string(),
        };
        assert!(cert.is_valid_on(today));

        cert.expiry_date = "2025-06-25".to_string();
        assert!(!cert.is_valid_on(today));

        cert.expiry_date = "someday".to_string();
        assert!(!cert.is_valid_on(today));
    }
}
