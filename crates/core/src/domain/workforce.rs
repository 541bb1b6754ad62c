use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub join_date: String,
}

/// Survey answers, each on a 0-10 scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSurvey {
    pub employee_id: EmployeeId,
    pub survey_date: String,
    pub job_satisfaction: f64,
    pub work_life_balance: f64,
    pub compensation: f64,
    pub career_growth: f64,
    pub work_environment: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeePerformance {
    pub employee_id: EmployeeId,
    pub review_date: String,
    /// Review score on a 0-100 scale.
    pub score: f64,
}

impl Dated for Employee {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.join_date)
    }
}

impl Dated for EmployeeSurvey {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.survey_date)
    }
}

impl Dated for EmployeePerformance {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.review_date)
    }
}
