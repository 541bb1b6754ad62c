use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Row, SqliteConnection};
use tracing::info;

use dairy_core::domain::sales::{Sale, SaleId};

use crate::connection::DbPool;
use crate::repositories::{parse_decimal, RepositoryError, SaleRepository, SqlSaleRepository};

/// Every seeded row id starts with this prefix so `clean` can find them.
pub const SEED_PREFIX: &str = "seed-";

const FARMERS: &[(&str, &str, u64, i64)] = &[
    ("seed-farmer-1", "Ramesh Patel", 420, 14),
    ("seed-farmer-2", "Savita Desai", 300, 9),
    ("seed-farmer-3", "Harish Chaudhary", 170, 22),
    ("seed-farmer-4", "Meena Rabari", 120, 6),
    ("seed-farmer-5", "Jignesh Solanki", 55, 11),
    ("seed-farmer-6", "Kanta Parmar", 8, 4),
];

const SUPPLIERS: &[(&str, &str, u64, &str)] = &[
    ("seed-supplier-1", "Amul Feeds", 510, "feed"),
    ("seed-supplier-2", "Kaira Vet Services", 200, "veterinary"),
    ("seed-supplier-3", "Gujarat Packaging", 40, "packaging"),
];

const GRADE_CYCLE: &[&str] = &["A+", "A", "A", "B", "A+", "C", "B", "A"];

const EMPLOYEES: &[(&str, &str, &str, u64)] = &[
    ("seed-employee-1", "Anita Shah", "processing", 900),
    ("seed-employee-2", "Vikram Joshi", "quality", 600),
    ("seed-employee-3", "Pooja Nair", "logistics", 300),
    ("seed-employee-4", "Ravi Thakor", "processing", 30),
];

/// (employee, days ago, job, balance, compensation, growth, environment)
const SURVEYS: &[(&str, u64, f64, f64, f64, f64, f64)] = &[
    ("seed-employee-1", 200, 6.0, 6.0, 5.0, 6.0, 7.0),
    ("seed-employee-1", 20, 8.0, 7.5, 7.0, 8.0, 9.0),
    ("seed-employee-2", 25, 9.0, 8.0, 7.0, 7.0, 8.5),
    ("seed-employee-3", 15, 7.0, 6.5, 6.0, 7.5, 8.0),
];

const PERFORMANCE: &[(&str, u64, f64)] =
    &[("seed-employee-1", 60, 92.0), ("seed-employee-2", 45, 84.0)];

/// (id, category, requirement, status, documents complete)
const COMPLIANCE: &[(&str, &str, &str, &str, bool)] = &[
    ("seed-compliance-1", "environmental", "Effluent treatment permit", "compliant", true),
    ("seed-compliance-2", "environmental", "Groundwater extraction log", "non_compliant", false),
    ("seed-compliance-3", "food_safety", "FSSAI license renewal", "compliant", true),
    ("seed-compliance-4", "food_safety", "Cold chain temperature logs", "compliant", true),
    ("seed-compliance-5", "labour", "Shift hour register", "pending", false),
];

/// (id, name, status, days until expiry; negative means already expired)
const CERTIFICATIONS: &[(&str, &str, &str, i64)] = &[
    ("seed-cert-1", "ISO 22000", "active", 240),
    ("seed-cert-2", "Organic Dairy", "active", -15),
    ("seed-cert-3", "HACCP", "active", 90),
];

const AUDITS: &[(&str, u64, &str, f64)] = &[
    ("seed-audit-1", 150, "State Dairy Board", 88.0),
    ("seed-audit-2", 35, "FSSAI", 81.0),
];

const UNITS: &[(&str, &str, f64)] = &[
    ("seed-unit-1", "Pasteurizer Line A", 8000.0),
    ("seed-unit-2", "Paneer Press", 2500.0),
];

/// (id, unit, product, days ago, output, waste, energy)
const BATCHES: &[(&str, &str, &str, u64, f64, f64, Option<f64>)] = &[
    ("seed-batch-1", "seed-unit-1", "Toned Milk", 12, 1480.0, 40.0, Some(510.0)),
    ("seed-batch-2", "seed-unit-1", "Toned Milk", 5, 1390.0, 55.0, Some(500.0)),
    ("seed-batch-3", "seed-unit-2", "Paneer", 9, 1210.0, 95.0, Some(460.0)),
    ("seed-batch-4", "seed-unit-2", "Paneer", 2, 1320.0, 70.0, None),
];

const QUALITY_CHECKS: &[(&str, &str, bool)] = &[
    ("seed-check-1", "seed-batch-1", true),
    ("seed-check-2", "seed-batch-2", true),
    ("seed-check-3", "seed-batch-3", false),
    ("seed-check-4", "seed-batch-4", true),
];

const MAINTENANCE: &[(&str, &str, u64, &str)] = &[
    ("seed-maintenance-1", "seed-unit-1", 28, "Homogenizer valve replacement"),
    ("seed-maintenance-2", "seed-unit-1", 6, "Plate heat exchanger cleaning"),
    ("seed-maintenance-3", "seed-unit-2", 14, "Hydraulic press seal"),
];

const RETAILERS: &[(&str, &str, &str)] = &[
    ("seed-retailer-1", "FreshMart", "Anand"),
    ("seed-retailer-2", "DairyDepot", "Vadodara"),
    ("seed-retailer-3", "Milky Way Stores", "Nadiad"),
];

/// (id, days ago, retailer, product, amount)
const SALES: &[(&str, u64, &str, &str, &str)] = &[
    ("seed-sale-1", 0, "FreshMart", "Toned Milk", "15000"),
    ("seed-sale-2", 1, "DairyDepot", "Paneer", "8200.50"),
    ("seed-sale-3", 3, "Milky Way Stores", "Curd", "4300"),
    ("seed-sale-4", 10, "FreshMart", "Ghee", "12750.75"),
    ("seed-sale-5", 40, "DairyDepot", "Toned Milk", "9900"),
    ("seed-sale-6", 100, "Milky Way Stores", "Butter", "6100.25"),
];

/// Days of milk collection seeded for the first three farmers.
const MILK_DAYS: u64 = 14;
const MILK_FARMERS: usize = 3;

/// Seeded tables with the number of rows each should hold.
fn expected_counts() -> Vec<(&'static str, usize)> {
    vec![
        ("farmers", FARMERS.len()),
        ("suppliers", SUPPLIERS.len()),
        ("milk_entries", MILK_DAYS as usize * MILK_FARMERS * 2),
        ("quality_tests", GRADE_CYCLE.len()),
        ("employees", EMPLOYEES.len()),
        ("compliance_records", COMPLIANCE.len()),
        ("certifications", CERTIFICATIONS.len()),
        ("audits", AUDITS.len()),
        ("processing_units", UNITS.len()),
        ("production_batches", BATCHES.len()),
        ("quality_checks", QUALITY_CHECKS.len()),
        ("maintenance_records", MAINTENANCE.len()),
        ("retailers", RETAILERS.len()),
        ("sales", SALES.len()),
    ]
}

fn days_before(as_of: NaiveDate, days: u64) -> String {
    as_of.checked_sub_days(Days::new(days)).unwrap_or(as_of).format("%Y-%m-%d").to_string()
}

fn days_after(as_of: NaiveDate, days: i64) -> String {
    let shifted = if days >= 0 {
        as_of.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        as_of.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(as_of).format("%Y-%m-%d").to_string()
}

/// Deterministic demo cooperative covering every metric input.
///
/// Dates are laid out relative to `as_of` so every period bucket has data
/// whenever the dataset is loaded.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    pub async fn load(pool: &DbPool, as_of: NaiveDate) -> Result<SeedResult, RepositoryError> {
        Self::clean(pool).await?;

        let mut tx = pool.begin().await?;
        insert_network(&mut tx, as_of).await?;
        insert_collection(&mut tx, as_of).await?;
        insert_workforce(&mut tx, as_of).await?;
        insert_compliance(&mut tx, as_of).await?;
        insert_processing(&mut tx, as_of).await?;
        for (id, name, location) in RETAILERS {
            sqlx::query(
                "INSERT INTO retailers (id, name, location, total_sales) VALUES (?, ?, ?, '0')",
            )
            .bind(id)
            .bind(name)
            .bind(location)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        let sales = SqlSaleRepository::new(pool.clone());
        for (id, days, retailer, product, amount) in SALES {
            sales
                .create(Sale {
                    id: SaleId((*id).to_string()),
                    date: days_before(as_of, *days),
                    retailer: (*retailer).to_string(),
                    product: (*product).to_string(),
                    amount: parse_decimal("amount", amount)?,
                })
                .await?;
        }

        let result = SeedResult { as_of, tables_seeded: expected_counts() };
        info!(
            event_name = "seed.loaded",
            as_of = %as_of,
            rows = result.total_rows(),
            "demo cooperative dataset loaded"
        );
        Ok(result)
    }

    /// Checks seeded row counts and that every retailer total matches its sales.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();
        let pattern = format!("{SEED_PREFIX}%");

        for (table, expected) in expected_counts() {
            let count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table} WHERE id LIKE ?1"))
                    .bind(&pattern)
                    .fetch_one(pool)
                    .await?;
            checks.push((table, usize::try_from(count).ok() == Some(expected)));
        }

        let rows = sqlx::query("SELECT name, total_sales FROM retailers").fetch_all(pool).await?;
        let mut totals_consistent = true;
        for row in rows {
            let name: String = row.try_get("name")?;
            let stored: String = row.try_get("total_sales")?;
            let amounts: Vec<String> =
                sqlx::query_scalar("SELECT amount FROM sales WHERE retailer = ?1")
                    .bind(&name)
                    .fetch_all(pool)
                    .await?;
            let mut expected = Decimal::ZERO;
            for amount in &amounts {
                expected += parse_decimal("amount", amount)?;
            }
            totals_consistent &= parse_decimal("total_sales", &stored)? == expected;
        }
        checks.push(("retailer-totals", totals_consistent));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes seeded rows. Seeded sales are deleted through the sale ledger so
    /// retailer totals stay consistent.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let pattern = format!("{SEED_PREFIX}%");
        let seeded_sales: Vec<String> =
            sqlx::query_scalar("SELECT id FROM sales WHERE id LIKE ?1 ORDER BY id")
                .bind(&pattern)
                .fetch_all(pool)
                .await?;
        let sales = SqlSaleRepository::new(pool.clone());
        for id in seeded_sales {
            sales.delete(&SaleId(id)).await?;
        }

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM employee_surveys WHERE employee_id LIKE ?1")
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM employee_performance WHERE employee_id LIKE ?1")
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
        for table in [
            "maintenance_records",
            "quality_checks",
            "production_batches",
            "processing_units",
            "audits",
            "certifications",
            "compliance_records",
            "employees",
            "quality_tests",
            "milk_entries",
            "suppliers",
            "farmers",
            "retailers",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE id LIKE ?1"))
                .bind(&pattern)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert_network(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> Result<(), RepositoryError> {
    for (id, name, days, cattle) in FARMERS {
        sqlx::query(
            "INSERT INTO farmers (id, name, join_date, status, cattle_count)
             VALUES (?, ?, ?, 'active', ?)",
        )
        .bind(id)
        .bind(name)
        .bind(days_before(as_of, *days))
        .bind(cattle)
        .execute(&mut *conn)
        .await?;
    }
    for (id, name, days, supplier_type) in SUPPLIERS {
        sqlx::query(
            "INSERT INTO suppliers (id, name, join_date, status, supplier_type)
             VALUES (?, ?, ?, 'active', ?)",
        )
        .bind(id)
        .bind(name)
        .bind(days_before(as_of, *days))
        .bind(supplier_type)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_collection(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> Result<(), RepositoryError> {
    for day in 0..MILK_DAYS {
        for (index, (farmer_id, ..)) in FARMERS.iter().take(MILK_FARMERS).enumerate() {
            for (shift, base) in [("morning", 24.0), ("evening", 18.0)] {
                let quantity = base + index as f64 * 3.5 + (day % 4) as f64;
                let grade = GRADE_CYCLE[(day as usize + index) % GRADE_CYCLE.len()];
                sqlx::query(
                    "INSERT INTO milk_entries (id, farmer_id, date, quantity, shift, quality)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(format!("{SEED_PREFIX}milk-{day}-{index}-{shift}"))
                .bind(farmer_id)
                .bind(days_before(as_of, day))
                .bind(quantity)
                .bind(shift)
                .bind(grade)
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    for (index, grade) in GRADE_CYCLE.iter().enumerate() {
        let (farmer_id, ..) = FARMERS[index % FARMERS.len()];
        sqlx::query(
            "INSERT INTO quality_tests (id, farmer_id, test_date, overall_grade)
             VALUES (?, ?, ?, ?)",
        )
        .bind(format!("{SEED_PREFIX}quality-test-{}", index + 1))
        .bind(farmer_id)
        .bind(days_before(as_of, index as u64 * 3))
        .bind(grade)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_workforce(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> Result<(), RepositoryError> {
    for (id, name, department, days) in EMPLOYEES {
        sqlx::query("INSERT INTO employees (id, name, department, join_date) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(department)
            .bind(days_before(as_of, *days))
            .execute(&mut *conn)
            .await?;
    }
    for (employee_id, days, job, balance, compensation, growth, environment) in SURVEYS {
        sqlx::query(
            "INSERT INTO employee_surveys
                (employee_id, survey_date, job_satisfaction, work_life_balance,
                 compensation, career_growth, work_environment)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(employee_id)
        .bind(days_before(as_of, *days))
        .bind(job)
        .bind(balance)
        .bind(compensation)
        .bind(growth)
        .bind(environment)
        .execute(&mut *conn)
        .await?;
    }
    for (employee_id, days, score) in PERFORMANCE {
        sqlx::query(
            "INSERT INTO employee_performance (employee_id, review_date, score) VALUES (?, ?, ?)",
        )
        .bind(employee_id)
        .bind(days_before(as_of, *days))
        .bind(score)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_compliance(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> Result<(), RepositoryError> {
    for (id, category, requirement, status, documents_complete) in COMPLIANCE {
        sqlx::query(
            "INSERT INTO compliance_records (id, category, requirement, status, documents_complete)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(category)
        .bind(requirement)
        .bind(status)
        .bind(documents_complete)
        .execute(&mut *conn)
        .await?;
    }
    for (id, name, status, expires_in) in CERTIFICATIONS {
        sqlx::query(
            "INSERT INTO certifications (id, name, status, expiry_date) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(status)
        .bind(days_after(as_of, *expires_in))
        .execute(&mut *conn)
        .await?;
    }
    for (id, days, auditor, score) in AUDITS {
        sqlx::query("INSERT INTO audits (id, audit_date, auditor, score) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(days_before(as_of, *days))
            .bind(auditor)
            .bind(score)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_processing(
    conn: &mut SqliteConnection,
    as_of: NaiveDate,
) -> Result<(), RepositoryError> {
    for (id, name, capacity) in UNITS {
        sqlx::query(
            "INSERT INTO processing_units (id, name, capacity_litres, status)
             VALUES (?, ?, ?, 'operational')",
        )
        .bind(id)
        .bind(name)
        .bind(capacity)
        .execute(&mut *conn)
        .await?;
    }
    for (id, unit_id, product, days, output, waste, energy) in BATCHES {
        sqlx::query(
            "INSERT INTO production_batches
                (id, unit_id, product, production_date, output_units, waste_units, energy_kwh)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(unit_id)
        .bind(product)
        .bind(days_before(as_of, *days))
        .bind(output)
        .bind(waste)
        .bind(energy)
        .execute(&mut *conn)
        .await?;
    }
    for (index, (id, batch_id, passed)) in QUALITY_CHECKS.iter().enumerate() {
        sqlx::query(
            "INSERT INTO quality_checks (id, batch_id, check_date, passed) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(batch_id)
        .bind(days_before(as_of, index as u64 * 3))
        .bind(passed)
        .execute(&mut *conn)
        .await?;
    }
    for (id, unit_id, days, description) in MAINTENANCE {
        sqlx::query(
            "INSERT INTO maintenance_records (id, unit_id, maintenance_date, description)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(unit_id)
        .bind(days_before(as_of, *days))
        .bind(description)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct SeedResult {
    pub as_of: NaiveDate,
    pub tables_seeded: Vec<(&'static str, usize)>,
}

impl SeedResult {
    pub fn total_rows(&self) -> usize {
        self.tables_seeded.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Decimal sum of the seeded sales for one retailer name.
pub fn seeded_sales_total(retailer: &str) -> Decimal {
    SALES
        .iter()
        .filter(|(_, _, name, _, _)| *name == retailer)
        .filter_map(|(_, _, _, _, amount)| Decimal::from_str(amount).ok())
        .sum()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{seeded_sales_total, DemoSeedDataset};
    use crate::repositories::{
        MetricsDataSource, RetailerRepository, SqlMetricsDataSource, SqlRetailerRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 26).expect("date")
    }

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn load_then_verify_passes() {
        let pool = setup().await;

        let seeded = DemoSeedDataset::load(&pool, as_of()).await.expect("seed");
        let verification = DemoSeedDataset::verify(&pool).await.expect("verify");

        assert!(seeded.total_rows() > 0);
        assert!(verification.all_present, "{:?}", verification.checks);
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let pool = setup().await;

        DemoSeedDataset::load(&pool, as_of()).await.expect("first seed");
        DemoSeedDataset::load(&pool, as_of()).await.expect("second seed");

        let retailers = SqlRetailerRepository::new(pool.clone());
        let fresh_mart =
            retailers.find_by_name("FreshMart").await.expect("find").expect("FreshMart seeded");
        assert_eq!(fresh_mart.total_sales, seeded_sales_total("FreshMart"));
        assert_eq!(
            fresh_mart.total_sales,
            Decimal::from_str_exact("27750.75").expect("decimal")
        );
        assert!(DemoSeedDataset::verify(&pool).await.expect("verify").all_present);
    }

    #[tokio::test]
    async fn seeded_snapshot_feeds_every_metric() {
        let pool = setup().await;
        DemoSeedDataset::load(&pool, as_of()).await.expect("seed");

        let snapshot = SqlMetricsDataSource::new(pool).load_snapshot().await.expect("snapshot");

        assert!(!snapshot.quality_tests.is_empty());
        assert!(!snapshot.surveys.is_empty());
        assert!(!snapshot.audits.is_empty());
        assert!(!snapshot.maintenance_records.is_empty());
        assert!(snapshot.production_batches.iter().any(|batch| batch.energy_kwh.is_none()));
        assert_eq!(snapshot.milk_entries.len(), 84);
    }

    #[tokio::test]
    async fn clean_removes_seeded_rows() {
        let pool = setup().await;
        DemoSeedDataset::load(&pool, as_of()).await.expect("seed");

        DemoSeedDataset::clean(&pool).await.expect("clean");

        let retailers = SqlRetailerRepository::new(pool.clone());
        assert!(retailers.list().await.expect("list").is_empty());
        let snapshot = SqlMetricsDataSource::new(pool).load_snapshot().await.expect("snapshot");
        assert!(snapshot.farmers.is_empty());
        assert!(snapshot.sales.is_empty());
    }
}
