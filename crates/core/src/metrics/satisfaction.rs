//! Employee satisfaction composite.
//!
//! Each surveyed employee gets a weighted score from their latest survey, with
//! career growth blended with their latest performance review when one exists.
//! Employees without a survey count as [`UNSURVEYED_EMPLOYEE_SCORE`] on every
//! dimension, in the score and in the component breakdown alike, so the
//! weighted components reconcile with the score. The reported score is the
//! mean over employees, rounded to an integer.

use std::collections::HashMap;

use crate::domain::dates::Dated;
use crate::domain::workforce::{Employee, EmployeePerformance, EmployeeSurvey};
use crate::metrics::{clamp_percent, mean, ComponentScore, CompositeScore, Rounding};

pub const JOB_SATISFACTION_WEIGHT: f64 = 0.30;
pub const WORK_LIFE_BALANCE_WEIGHT: f64 = 0.25;
pub const COMPENSATION_WEIGHT: f64 = 0.20;
pub const CAREER_GROWTH_WEIGHT: f64 = 0.15;
pub const WORK_ENVIRONMENT_WEIGHT: f64 = 0.10;

pub const NO_EMPLOYEES_SCORE: f64 = 92.0;
pub const UNSURVEYED_EMPLOYEE_SCORE: f64 = 85.0;

/// The five dimensions for one employee, each on 0-100.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Dimensions {
    job_satisfaction: f64,
    work_life_balance: f64,
    compensation: f64,
    career_growth: f64,
    work_environment: f64,
}

impl Dimensions {
    fn uniform(score: f64) -> Self {
        Self {
            job_satisfaction: score,
            work_life_balance: score,
            compensation: score,
            career_growth: score,
            work_environment: score,
        }
    }

    fn from_records(survey: &EmployeeSurvey, review: Option<&EmployeePerformance>) -> Self {
        let survey_growth = rating_to_percent(survey.career_growth);
        let career_growth = match review {
            Some(review) => (survey_growth + clamp_percent(review.score)) / 2.0,
            None => survey_growth,
        };

        Self {
            job_satisfaction: rating_to_percent(survey.job_satisfaction),
            work_life_balance: rating_to_percent(survey.work_life_balance),
            compensation: rating_to_percent(survey.compensation),
            career_growth,
            work_environment: rating_to_percent(survey.work_environment),
        }
    }

    fn weighted(&self) -> f64 {
        self.job_satisfaction * JOB_SATISFACTION_WEIGHT
            + self.work_life_balance * WORK_LIFE_BALANCE_WEIGHT
            + self.compensation * COMPENSATION_WEIGHT
            + self.career_growth * CAREER_GROWTH_WEIGHT
            + self.work_environment * WORK_ENVIRONMENT_WEIGHT
    }
}

fn rating_to_percent(rating: f64) -> f64 {
    clamp_percent(rating * 10.0)
}

pub fn employee_satisfaction(
    employees: &[Employee],
    surveys: &[EmployeeSurvey],
    performance: &[EmployeePerformance],
) -> CompositeScore {
    if employees.is_empty() {
        return CompositeScore {
            score: NO_EMPLOYEES_SCORE,
            components: component_breakdown(&[], NO_EMPLOYEES_SCORE),
        };
    }

    let latest_surveys = latest_by_employee(surveys, |survey| survey.employee_id.0.as_str());
    let latest_reviews = latest_by_employee(performance, |review| review.employee_id.0.as_str());

    let mut any_surveyed = false;
    let mut all_dimensions = Vec::with_capacity(employees.len());
    let mut per_employee = Vec::with_capacity(employees.len());
    for employee in employees {
        let key = employee.id.0.as_str();
        match latest_surveys.get(key) {
            Some(survey) => {
                let dimensions =
                    Dimensions::from_records(survey, latest_reviews.get(key).copied());
                per_employee.push(dimensions.weighted());
                all_dimensions.push(dimensions);
                any_surveyed = true;
            }
            None => {
                per_employee.push(UNSURVEYED_EMPLOYEE_SCORE);
                all_dimensions.push(Dimensions::uniform(UNSURVEYED_EMPLOYEE_SCORE));
            }
        }
    }

    let score = mean(per_employee).unwrap_or(NO_EMPLOYEES_SCORE);
    let measured: &[Dimensions] = if any_surveyed { &all_dimensions } else { &[] };
    CompositeScore {
        score: Rounding::Integer.apply(clamp_percent(score)),
        components: component_breakdown(measured, UNSURVEYED_EMPLOYEE_SCORE),
    }
}

/// Mean of each dimension across employees; falls back when nobody was surveyed.
fn component_breakdown(surveyed: &[Dimensions], fallback: f64) -> Vec<ComponentScore> {
    let dimension = |pick: fn(&Dimensions) -> f64| mean(surveyed.iter().map(pick));
    vec![
        ComponentScore::from_option(
            "job_satisfaction",
            JOB_SATISFACTION_WEIGHT,
            dimension(|d| d.job_satisfaction),
            fallback,
        ),
        ComponentScore::from_option(
            "work_life_balance",
            WORK_LIFE_BALANCE_WEIGHT,
            dimension(|d| d.work_life_balance),
            fallback,
        ),
        ComponentScore::from_option(
            "compensation",
            COMPENSATION_WEIGHT,
            dimension(|d| d.compensation),
            fallback,
        ),
        ComponentScore::from_option(
            "career_growth",
            CAREER_GROWTH_WEIGHT,
            dimension(|d| d.career_growth),
            fallback,
        ),
        ComponentScore::from_option(
            "work_environment",
            WORK_ENVIRONMENT_WEIGHT,
            dimension(|d| d.work_environment),
            fallback,
        ),
    ]
}

/// Latest record per employee; undated records lose to dated ones.
fn latest_by_employee<'a, T: Dated>(
    records: &'a [T],
    employee_of: impl Fn(&'a T) -> &'a str,
) -> HashMap<&'a str, &'a T> {
    let mut latest: HashMap<&str, &T> = HashMap::new();
    for record in records {
        let key = employee_of(record);
        let newer = latest
            .get(key)
            .map_or(true, |current| record.record_date() >= current.record_date());
        if newer {
            latest.insert(key, record);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::{employee_satisfaction, NO_EMPLOYEES_SCORE};
    use crate::domain::workforce::{Employee, EmployeeId, EmployeePerformance, EmployeeSurvey};

    fn employee(id: &str) -> Employee {
        Employee {
            id: EmployeeId(id.to_string()),
            name: format!("Employee {id}"),
            department: "processing".to_string(),
            join_date: "2023-04-01".to_string(),
        }
    }

    fn survey(id: &str, date: &str, rating: f64) -> EmployeeSurvey {
        EmployeeSurvey {
            employee_id: EmployeeId(id.to_string()),
            survey_date: date.to_string(),
            job_satisfaction: rating,
            work_life_balance: rating,
            compensation: rating,
            career_growth: rating,
            work_environment: rating,
        }
    }

    #[test]
    fn empty_workforce_uses_flat_fallback() {
        let result = employee_satisfaction(&[], &[], &[]);
        assert_eq!(result.score, NO_EMPLOYEES_SCORE);
        assert!(result.components.iter().all(|component| component.fallback));
    }

    #[test]
    fn unsurveyed_employee_contributes_eighty_five() {
        let employees = vec![employee("E-1"), employee("E-2")];
        let surveys = vec![survey("E-1", "2025-05-01", 7.0)];

        let result = employee_satisfaction(&employees, &surveys, &[]);

        // E-1 scores 70, E-2 falls back to 85.
        assert_eq!(result.score, 78.0);
    }

    #[test]
    fn components_reconcile_with_score_when_some_are_unsurveyed() {
        let employees = vec![employee("E-1"), employee("E-2")];
        let surveys = vec![survey("E-1", "2025-05-01", 7.0)];

        let result = employee_satisfaction(&employees, &surveys, &[]);

        assert!(result.components.iter().all(|component| !component.fallback));
        assert!(result.components.iter().all(|component| (component.score - 77.5).abs() < 1e-9));
        let weighted: f64 =
            result.components.iter().map(|component| component.score * component.weight).sum();
        assert_eq!(weighted.round(), result.score);
    }

    #[test]
    fn nobody_surveyed_reports_fallback_components() {
        let employees = vec![employee("E-1"), employee("E-2")];

        let result = employee_satisfaction(&employees, &[], &[]);

        assert_eq!(result.score, 85.0);
        assert!(result.components.iter().all(|component| component.fallback));
        assert!(result.components.iter().all(|component| component.score == 85.0));
    }

    #[test]
    fn latest_survey_wins_and_review_blends_career_growth() {
        let employees = vec![employee("E-1")];
        let surveys = vec![survey("E-1", "2024-01-01", 2.0), survey("E-1", "2025-05-01", 8.0)];
        let reviews = vec![EmployeePerformance {
            employee_id: EmployeeId("E-1".to_string()),
            review_date: "2025-04-15".to_string(),
            score: 100.0,
        }];

        let result = employee_satisfaction(&employees, &surveys, &reviews);

        // 80 on four dimensions, career growth (80 + 100) / 2 = 90 at weight .15.
        assert_eq!(result.score, 82.0);
        let career = result
            .components
            .iter()
            .find(|component| component.name == "career_growth")
            .expect("career growth component");
        assert_eq!(career.score, 90.0);
    }

    #[test]
    fn out_of_range_ratings_are_clamped() {
        let employees = vec![employee("E-1")];
        let surveys = vec![survey("E-1", "2025-05-01", 42.0)];

        let result = employee_satisfaction(&employees, &surveys, &[]);
        assert_eq!(result.score, 100.0);

        let negative = vec![survey("E-1", "2025-05-01", -3.0)];
        assert_eq!(employee_satisfaction(&employees, &negative, &[]).score, 0.0);
    }
}
