use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::dates::Dated;
use crate::domain::network::{Farmer, Supplier};
use crate::metrics::period::{bucket_ranges, BucketRange, Period};

/// Membership counts for one calendar month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GrowthPoint {
    pub month: String,
    /// Members joined on or before the month's last day.
    pub farmers: usize,
    pub suppliers: usize,
    /// Members joined during the month.
    pub new_farmers: usize,
    pub new_suppliers: usize,
    pub total: usize,
    pub new_total: usize,
}

/// Cumulative and incremental membership for the trailing six months.
pub fn network_growth(
    farmers: &[Farmer],
    suppliers: &[Supplier],
    today: NaiveDate,
) -> Vec<GrowthPoint> {
    let farmer_dates = join_dates(farmers);
    let supplier_dates = join_dates(suppliers);

    bucket_ranges(Period::Monthly, today)
        .into_iter()
        .map(|month| {
            let (farmers, new_farmers) = count_members(&farmer_dates, &month);
            let (suppliers, new_suppliers) = count_members(&supplier_dates, &month);
            GrowthPoint {
                month: month.label,
                farmers,
                suppliers,
                new_farmers,
                new_suppliers,
                total: farmers + suppliers,
                new_total: new_farmers + new_suppliers,
            }
        })
        .collect()
}

fn join_dates<T: Dated>(members: &[T]) -> Vec<NaiveDate> {
    members.iter().filter_map(Dated::record_date).collect()
}

fn count_members(dates: &[NaiveDate], month: &BucketRange) -> (usize, usize) {
    let cumulative = dates.iter().filter(|date| **date <= month.end).count();
    let joined = dates.iter().filter(|date| month.contains(**date)).count();
    (cumulative, joined)
}
