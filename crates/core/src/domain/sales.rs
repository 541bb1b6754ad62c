use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::dates::{parse_record_date, Dated};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetailerId(pub String);

/// A sale to a retailer. The retailer is referenced by name, not id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub date: String,
    pub retailer: String,
    pub product: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retailer {
    pub id: RetailerId,
    pub name: String,
    pub location: String,
    pub total_sales: Decimal,
}

/// Signed change to one retailer's running sales total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerAdjustment {
    pub retailer: String,
    pub delta: Decimal,
}

impl RetailerAdjustment {
    /// The retailer total after this change. Fails instead of overflowing.
    pub fn apply(&self, total: Decimal) -> Result<Decimal, DomainError> {
        total.checked_add(self.delta).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "retailer `{}` total would overflow ({} + {})",
                self.retailer, total, self.delta
            ))
        })
    }
}

impl Sale {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.retailer.trim().is_empty() {
            return Err(DomainError::InvariantViolation("sale retailer is required".to_string()));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(DomainError::InvariantViolation(format!(
                "sale amount must not be negative (got {})",
                self.amount
            )));
        }
        Ok(())
    }
}

impl Dated for Sale {
    fn record_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }
}

/// Plans the retailer total changes for a sale write.
///
/// `previous` is the stored sale (absent on create), `next` the sale after the
/// write (absent on delete). A retailer rename moves the whole amount from the
/// old retailer to the new one. Zero deltas are omitted.
pub fn plan_retailer_adjustments(
    previous: Option<&Sale>,
    next: Option<&Sale>,
) -> Vec<RetailerAdjustment> {
    let planned = match (previous, next) {
        (None, None) => Vec::new(),
        (None, Some(created)) => {
            vec![RetailerAdjustment { retailer: created.retailer.clone(), delta: created.amount }]
        }
        (Some(deleted), None) => {
            vec![RetailerAdjustment { retailer: deleted.retailer.clone(), delta: -deleted.amount }]
        }
        (Some(before), Some(after)) if before.retailer == after.retailer => {
            vec![RetailerAdjustment {
                retailer: after.retailer.clone(),
                delta: after.amount - before.amount,
            }]
        }
        (Some(before), Some(after)) => vec![
            RetailerAdjustment { retailer: before.retailer.clone(), delta: -before.amount },
            RetailerAdjustment { retailer: after.retailer.clone(), delta: after.amount },
        ],
    };

    planned.into_iter().filter(|adjustment| !adjustment.delta.is_zero()).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{plan_retailer_adjustments, RetailerAdjustment, Sale, SaleId};
    use crate::errors::DomainError;

    fn sale(retailer: &str, amount: i64) -> Sale {
        Sale {
            id: SaleId("S-1".to_string()),
            date: "2025-06-26".to_string(),
            retailer: retailer.to_string(),
            product: "Whole Milk".to_string(),
            amount: Decimal::from(amount),
        }
    }

    #[test]
    fn create_adds_full_amount() {
        let created = sale("FreshMart", 15_000);
        let plan = plan_retailer_adjustments(None, Some(&created));
        assert_eq!(
            plan,
            vec![RetailerAdjustment {
                retailer: "FreshMart".to_string(),
                delta: Decimal::from(15_000)
            }]
        );
    }

    #[test]
    fn update_applies_net_delta_not_new_amount() {
        let before = sale("FreshMart", 15_000);
        let after = sale("FreshMart", 12_500);
        let plan = plan_retailer_adjustments(Some(&before), Some(&after));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].delta, Decimal::from(-2_500));
    }

    #[test]
    fn retailer_rename_moves_amount_between_retailers() {
        let before = sale("FreshMart", 15_000);
        let after = sale("DairyDepot", 9_000);
        let plan = plan_retailer_adjustments(Some(&before), Some(&after));
        assert_eq!(
            plan,
            vec![
                RetailerAdjustment {
                    retailer: "FreshMart".to_string(),
                    delta: Decimal::from(-15_000)
                },
                RetailerAdjustment {
                    retailer: "DairyDepot".to_string(),
                    delta: Decimal::from(9_000)
                },
            ]
        );
    }

    #[test]
    fn delete_subtracts_stored_amount() {
        let deleted = sale("FreshMart", 15_000);
        let plan = plan_retailer_adjustments(Some(&deleted), None);
        assert_eq!(plan[0].delta, Decimal::from(-15_000));
    }

    #[test]
    fn unchanged_amount_plans_nothing() {
        let before = sale("FreshMart", 15_000);
        let after = sale("FreshMart", 15_000);
        assert!(plan_retailer_adjustments(Some(&before), Some(&after)).is_empty());
    }

    #[test]
    fn validation_rejects_negative_amount_and_blank_retailer() {
        assert!(sale("FreshMart", -1).validate().is_err());
        assert!(sale("  ", 10).validate().is_err());
        assert!(sale("FreshMart", 0).validate().is_ok());
    }

    #[test]
    fn adjustment_past_decimal_range_is_rejected() {
        let adjustment =
            RetailerAdjustment { retailer: "FreshMart".to_string(), delta: Decimal::MAX };

        assert_eq!(adjustment.apply(Decimal::from(10)).ok(), None);
        assert!(matches!(
            adjustment.apply(Decimal::ONE),
            Err(DomainError::InvariantViolation(message)) if message.contains("FreshMart")
        ));
        assert_eq!(adjustment.apply(Decimal::ZERO), Ok(Decimal::MAX));
    }
}
