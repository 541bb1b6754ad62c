use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use dairy_core::domain::collection::{
    MilkEntry, MilkEntryId, MilkShift, QualityGrade, QualityTest, QualityTestId,
};
use dairy_core::domain::compliance::{
    Audit, Certification, CertificationStatus, ComplianceRecord, ComplianceStatus,
};
use dairy_core::domain::network::{Farmer, FarmerId, Supplier, SupplierId};
use dairy_core::domain::processing::{
    BatchId, MaintenanceRecord, ProcessingUnit, ProductionBatch, QualityCheck, UnitId,
};
use dairy_core::domain::workforce::{Employee, EmployeeId, EmployeePerformance, EmployeeSurvey};
use dairy_core::metrics::MetricsSnapshot;

use super::retailer::retailer_from_row;
use super::sale::sale_from_row;
use super::{MetricsDataSource, RepositoryError};
use crate::DbPool;

/// Reads every metrics input collection straight from SQLite.
pub struct SqlMetricsDataSource {
    pool: DbPool,
}

impl SqlMetricsDataSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load<T>(
        &self,
        sql: &str,
        decode: fn(&SqliteRow) -> Result<T, RepositoryError>,
    ) -> Result<Vec<T>, RepositoryError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode).collect()
    }
}

fn grade(column: &str, raw: &str) -> Result<QualityGrade, RepositoryError> {
    QualityGrade::parse(raw)
        .ok_or_else(|| RepositoryError::Decode(format!("{column}: unknown grade `{raw}`")))
}

fn farmer_from_row(row: &SqliteRow) -> Result<Farmer, RepositoryError> {
    let cattle_count: i64 = row.try_get("cattle_count")?;
    Ok(Farmer {
        id: FarmerId(row.try_get("id")?),
        name: row.try_get("name")?,
        join_date: row.try_get("join_date")?,
        status: row.try_get("status")?,
        cattle_count: u32::try_from(cattle_count).map_err(|_| {
            RepositoryError::Decode(format!("cattle_count out of range: {cattle_count}"))
        })?,
    })
}

fn supplier_from_row(row: &SqliteRow) -> Result<Supplier, RepositoryError> {
    Ok(Supplier {
        id: SupplierId(row.try_get("id")?),
        name: row.try_get("name")?,
        join_date: row.try_get("join_date")?,
        status: row.try_get("status")?,
        supplier_type: row.try_get("supplier_type")?,
    })
}

fn milk_entry_from_row(row: &SqliteRow) -> Result<MilkEntry, RepositoryError> {
    let shift: String = row.try_get("shift")?;
    let quality: String = row.try_get("quality")?;
    Ok(MilkEntry {
        id: MilkEntryId(row.try_get("id")?),
        farmer_id: FarmerId(row.try_get("farmer_id")?),
        date: row.try_get("date")?,
        quantity: row.try_get("quantity")?,
        shift: MilkShift::parse(&shift)
            .ok_or_else(|| RepositoryError::Decode(format!("shift: unknown shift `{shift}`")))?,
        quality: grade("quality", &quality)?,
    })
}

fn quality_test_from_row(row: &SqliteRow) -> Result<QualityTest, RepositoryError> {
    let overall_grade: String = row.try_get("overall_grade")?;
    Ok(QualityTest {
        id: QualityTestId(row.try_get("id")?),
        farmer_id: FarmerId(row.try_get("farmer_id")?),
        test_date: row.try_get("test_date")?,
        overall_grade: grade("overall_grade", &overall_grade)?,
    })
}

fn employee_from_row(row: &SqliteRow) -> Result<Employee, RepositoryError> {
    Ok(Employee {
        id: EmployeeId(row.try_get("id")?),
        name: row.try_get("name")?,
        department: row.try_get("department")?,
        join_date: row.try_get("join_date")?,
    })
}

fn survey_from_row(row: &SqliteRow) -> Result<EmployeeSurvey, RepositoryError> {
    Ok(EmployeeSurvey {
        employee_id: EmployeeId(row.try_get("employee_id")?),
        survey_date: row.try_get("survey_date")?,
        job_satisfaction: row.try_get("job_satisfaction")?,
        work_life_balance: row.try_get("work_life_balance")?,
        compensation: row.try_get("compensation")?,
        career_growth: row.try_get("career_growth")?,
        work_environment: row.try_get("work_environment")?,
    })
}

fn performance_from_row(row: &SqliteRow) -> Result<EmployeePerformance, RepositoryError> {
    Ok(EmployeePerformance {
        employee_id: EmployeeId(row.try_get("employee_id")?),
        review_date: row.try_get("review_date")?,
        score: row.try_get("score")?,
    })
}

fn compliance_from_row(row: &SqliteRow) -> Result<ComplianceRecord, RepositoryError> {
    let status: String = row.try_get("status")?;
    Ok(ComplianceRecord {
        id: row.try_get("id")?,
        category: row.try_get("category")?,
        requirement: row.try_get("requirement")?,
        status: ComplianceStatus::parse(&status),
        documents_complete: row.try_get("documents_complete")?,
    })
}

fn certification_from_row(row: &SqliteRow) -> Result<Certification, RepositoryError> {
    let status: String = row.try_get("status")?;
    Ok(Certification {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status: CertificationStatus::parse(&status),
        expiry_date: row.try_get("expiry_date")?,
    })
}

fn audit_from_row(row: &SqliteRow) -> Result<Audit, RepositoryError> {
    Ok(Audit {
        id: row.try_get("id")?,
        audit_date: row.try_get("audit_date")?,
        auditor: row.try_get("auditor")?,
        score: row.try_get("score")?,
    })
}

fn unit_from_row(row: &SqliteRow) -> Result<ProcessingUnit, RepositoryError> {
    Ok(ProcessingUnit {
        id: UnitId(row.try_get("id")?),
        name: row.try_get("name")?,
        capacity_litres: row.try_get("capacity_litres")?,
        status: row.try_get("status")?,
    })
}

fn batch_from_row(row: &SqliteRow) -> Result<ProductionBatch, RepositoryError> {
    Ok(ProductionBatch {
        id: BatchId(row.try_get("id")?),
        unit_id: UnitId(row.try_get("unit_id")?),
        product: row.try_get("product")?,
        production_date: row.try_get("production_date")?,
        output_units: row.try_get("output_units")?,
        waste_units: row.try_get("waste_units")?,
        energy_kwh: row.try_get("energy_kwh")?,
    })
}

fn quality_check_from_row(row: &SqliteRow) -> Result<QualityCheck, RepositoryError> {
    Ok(QualityCheck {
        id: row.try_get("id")?,
        batch_id: BatchId(row.try_get("batch_id")?),
        check_date: row.try_get("check_date")?,
        passed: row.try_get("passed")?,
    })
}

fn maintenance_from_row(row: &SqliteRow) -> Result<MaintenanceRecord, RepositoryError> {
    Ok(MaintenanceRecord {
        id: row.try_get("id")?,
        unit_id: UnitId(row.try_get("unit_id")?),
        maintenance_date: row.try_get("maintenance_date")?,
        description: row.try_get("description")?,
    })
}

#[async_trait::async_trait]
impl MetricsDataSource for SqlMetricsDataSource {
    async fn load_snapshot(&self) -> Result<MetricsSnapshot, RepositoryError> {
        Ok(MetricsSnapshot {
            farmers: self
                .load(
                    "SELECT id, name, join_date, status, cattle_count FROM farmers ORDER BY id",
                    farmer_from_row,
                )
                .await?,
            suppliers: self
                .load(
                    "SELECT id, name, join_date, status, supplier_type FROM suppliers ORDER BY id",
                    supplier_from_row,
                )
                .await?,
            milk_entries: self
                .load(
                    "SELECT id, farmer_id, date, quantity, shift, quality
                     FROM milk_entries ORDER BY date, id",
                    milk_entry_from_row,
                )
                .await?,
            quality_tests: self
                .load(
                    "SELECT id, farmer_id, test_date, overall_grade
                     FROM quality_tests ORDER BY test_date, id",
                    quality_test_from_row,
                )
                .await?,
            sales: self
                .load(
                    "SELECT id, date, retailer, product, amount FROM sales ORDER BY date, id",
                    sale_from_row,
                )
                .await?,
            retailers: self
                .load(
                    "SELECT id, name, location, total_sales FROM retailers ORDER BY name",
                    retailer_from_row,
                )
                .await?,
            employees: self
                .load(
                    "SELECT id, name, department, join_date FROM employees ORDER BY id",
                    employee_from_row,
                )
                .await?,
            surveys: self
                .load(
                    "SELECT employee_id, survey_date, job_satisfaction, work_life_balance,
                            compensation, career_growth, work_environment
                     FROM employee_surveys ORDER BY survey_date, id",
                    survey_from_row,
                )
                .await?,
            performance: self
                .load(
                    "SELECT employee_id, review_date, score
                     FROM employee_performance ORDER BY review_date, id",
                    performance_from_row,
                )
                .await?,
            compliance_records: self
                .load(
                    "SELECT id, category, requirement, status, documents_complete
                     FROM compliance_records ORDER BY id",
                    compliance_from_row,
                )
                .await?,
            certifications: self
                .load(
                    "SELECT id, name, status, expiry_date FROM certifications ORDER BY id",
                    certification_from_row,
                )
                .await?,
            audits: self
                .load(
                    "SELECT id, audit_date, auditor, score FROM audits ORDER BY audit_date, id",
                    audit_from_row,
                )
                .await?,
            processing_units: self
                .load(
                    "SELECT id, name, capacity_litres, status FROM processing_units ORDER BY id",
                    unit_from_row,
                )
                .await?,
            production_batches: self
                .load(
                    "SELECT id, unit_id, product, production_date, output_units, waste_units,
                            energy_kwh
                     FROM production_batches ORDER BY production_date, id",
                    batch_from_row,
                )
                .await?,
            quality_checks: self
                .load(
                    "SELECT id, batch_id, check_date, passed FROM quality_checks ORDER BY id",
                    quality_check_from_row,
                )
                .await?,
            maintenance_records: self
                .load(
                    "SELECT id, unit_id, maintenance_date, description
                     FROM maintenance_records ORDER BY maintenance_date, id",
                    maintenance_from_row,
                )
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use dairy_core::metrics::MetricsSnapshot;

    use super::SqlMetricsDataSource;
    use crate::repositories::{MetricsDataSource, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn empty_database_loads_empty_snapshot() {
        let source = SqlMetricsDataSource::new(setup().await);
        let snapshot = source.load_snapshot().await.expect("snapshot");
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[tokio::test]
    async fn rows_decode_into_domain_records() {
        let pool = setup().await;
        sqlx::query(
            "INSERT INTO farmers (id, name, join_date, status, cattle_count)
             VALUES ('F-1', 'Ramesh Patel', '2025-01-15', 'active', 14);
             INSERT INTO quality_tests (id, farmer_id, test_date, overall_grade)
             VALUES ('QT-1', 'F-1', '2025-06-20', 'A+');
             INSERT INTO milk_entries (id, farmer_id, date, quantity, shift, quality)
             VALUES ('M-1', 'F-1', '2025-06-26', 42.5, 'evening', 'B');
             INSERT INTO processing_units (id, name) VALUES ('PU-1', 'Pasteurizer');
             INSERT INTO production_batches
                 (id, unit_id, product, production_date, output_units, waste_units, energy_kwh)
             VALUES ('B-1', 'PU-1', 'Paneer', '2025-06-20', 1400, 60, NULL);
             INSERT INTO quality_checks (id, batch_id, check_date, passed)
             VALUES ('QC-1', 'B-1', '2025-06-20', 1);
             INSERT INTO compliance_records (id, category, requirement, status, documents_complete)
             VALUES ('CR-1', 'environmental', 'Effluent permit', 'non-compliant', 1);",
        )
        .execute(&pool)
        .await
        .expect("insert rows");

        let snapshot = SqlMetricsDataSource::new(pool).load_snapshot().await.expect("snapshot");

        assert_eq!(snapshot.farmers[0].cattle_count, 14);
        assert_eq!(snapshot.quality_tests[0].overall_grade.as_str(), "A+");
        assert_eq!(snapshot.milk_entries[0].quantity, 42.5);
        assert_eq!(snapshot.milk_entries[0].shift.as_str(), "evening");
        assert_eq!(snapshot.production_batches[0].energy_kwh, None);
        assert!(snapshot.quality_checks[0].passed);
        assert_eq!(snapshot.compliance_records[0].status.as_str(), "non_compliant");
    }

    #[tokio::test]
    async fn unknown_grade_is_a_decode_error() {
        let pool = setup().await;
        sqlx::query(
            "INSERT INTO farmers (id, name, join_date) VALUES ('F-1', 'Ramesh Patel', '2025-01-15');
             INSERT INTO quality_tests (id, farmer_id, test_date, overall_grade)
             VALUES ('QT-1', 'F-1', '2025-06-20', 'Z');",
        )
        .execute(&pool)
        .await
        .expect("insert rows");

        let result = SqlMetricsDataSource::new(pool).load_snapshot().await;
        assert!(matches!(result, Err(RepositoryError::Decode(_))));
    }
}
