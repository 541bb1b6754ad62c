use chrono::NaiveDate;

use crate::domain::compliance::{Audit, Certification, ComplianceRecord, ComplianceStatus};
use crate::metrics::{mean, percent_of, ComponentScore, CompositeScore, Rounding};

pub const COMPLIANCE_RATE_WEIGHT: f64 = 0.40;
pub const CERTIFICATION_STATUS_WEIGHT: f64 = 0.25;
pub const AUDIT_PERFORMANCE_WEIGHT: f64 = 0.20;
pub const ENVIRONMENTAL_COMPLIANCE_WEIGHT: f64 = 0.10;
pub const DOCUMENT_MANAGEMENT_WEIGHT: f64 = 0.05;

pub const COMPLIANCE_RATE_FALLBACK: f64 = 75.0;
pub const CERTIFICATION_STATUS_FALLBACK: f64 = 70.0;
pub const AUDIT_PERFORMANCE_FALLBACK: f64 = 80.0;
pub const ENVIRONMENTAL_COMPLIANCE_FALLBACK: f64 = 85.0;
pub const DOCUMENT_MANAGEMENT_FALLBACK: f64 = 90.0;

/// Sustainability index from compliance, certification and audit records.
pub fn sustainability_index(
    compliance: &[ComplianceRecord],
    certifications: &[Certification],
    audits: &[Audit],
    today: NaiveDate,
) -> CompositeScore {
    let compliant = |record: &&ComplianceRecord| record.status == ComplianceStatus::Compliant;

    let compliance_rate =
        percent_of(compliance.iter().filter(compliant).count(), compliance.len());

    let valid_certifications =
        certifications.iter().filter(|cert| cert.is_valid_on(today)).count();
    let certification_status = percent_of(valid_certifications, certifications.len());

    let audit_performance = mean(audits.iter().map(|audit| audit.score));

    let environmental: Vec<&ComplianceRecord> =
        compliance.iter().filter(|record| record.is_environmental()).collect();
    let environmental_compliance =
        percent_of(environmental.iter().copied().filter(compliant).count(), environmental.len());

    let documented = compliance.iter().filter(|record| record.documents_complete).count();
    let document_management = percent_of(documented, compliance.len());

    CompositeScore::weighted(
        vec![
            ComponentScore::from_option(
                "compliance_rate",
                COMPLIANCE_RATE_WEIGHT,
                compliance_rate,
                COMPLIANCE_RATE_FALLBACK,
            ),
            ComponentScore::from_option(
                "certification_status",
                CERTIFICATION_STATUS_WEIGHT,
                certification_status,
                CERTIFICATION_STATUS_FALLBACK,
            ),
            ComponentScore::from_option(
                "audit_performance",
                AUDIT_PERFORMANCE_WEIGHT,
                audit_performance,
                AUDIT_PERFORMANCE_FALLBACK,
            ),
            ComponentScore::from_option(
                "environmental_compliance",
                ENVIRONMENTAL_COMPLIANCE_WEIGHT,
                environmental_compliance,
                ENVIRONMENTAL_COMPLIANCE_FALLBACK,
            ),
            ComponentScore::from_option(
                "document_management",
                DOCUMENT_MANAGEMENT_WEIGHT,
                document_management,
                DOCUMENT_MANAGEMENT_FALLBACK,
            ),
        ],
        Rounding::Integer,
    )
}
