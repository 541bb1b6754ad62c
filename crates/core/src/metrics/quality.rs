use serde::Serialize;

use crate::domain::collection::{QualityGrade, QualityTest};

/// Grades shown in the distribution, in display order.
const DISTRIBUTION_GRADES: [(QualityGrade, &str); 4] = [
    (QualityGrade::APlus, "#10B981"),
    (QualityGrade::A, "#3B82F6"),
    (QualityGrade::B, "#F59E0B"),
    (QualityGrade::C, "#EF4444"),
];

pub const NO_DATA_LABEL: &str = "No Data";
const NO_DATA_COLOR: &str = "#9CA3AF";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub name: &'static str,
    pub value: u32,
    pub color: &'static str,
}

/// Percentage share of each grade among all tests.
///
/// Each share is rounded on its own, so totals of 99 or 101 are expected.
/// Grades with a zero share are left out; grades outside A+..C only count
/// toward the denominator.
pub fn quality_distribution(tests: &[QualityTest]) -> Vec<DistributionEntry> {
    if tests.is_empty() {
        return vec![DistributionEntry { name: NO_DATA_LABEL, value: 100, color: NO_DATA_COLOR }];
    }

    let total = tests.len() as f64;
    DISTRIBUTION_GRADES
        .iter()
        .map(|(grade, color)| {
            let count = tests.iter().filter(|test| test.overall_grade == *grade).count();
            let value = (count as f64 / total * 100.0).round() as u32;
            DistributionEntry { name: grade.as_str(), value, color: *color }
        })
        .filter(|entry| entry.value > 0)
        .collect()
}
