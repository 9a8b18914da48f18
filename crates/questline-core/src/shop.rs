//! Shop ledger: purchases, derived fulfillment, refunds
//!
//! Fulfillment status is never stored. It is a pure function of
//! `(record, now)`, recomputed on every read, so it is trivially consistent
//! across views without any synchronization.

use crate::error::{Error, RefundDenial, Result};
use crate::progress::Progression;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes a purchase stays `Pending`
pub const PENDING_MINUTES: i64 = 2;

/// Minutes until a purchase is fully `Completed`
pub const FULFILL_MINUTES: i64 = 8;

/// Outer bound of the refund window, in minutes
pub const REFUND_WINDOW_MINUTES: i64 = 10;

/// Unique identifier for one purchase transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PurchaseId(pub String);

impl PurchaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item offered by the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub cost: u64,
    /// Percentage off, 0 for none
    pub discount_percent: u8,
}

impl ShopItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            discount_percent: 0,
        }
    }

    pub fn with_discount(mut self, percent: u8) -> Self {
        self.discount_percent = percent.min(100);
        self
    }

    /// Cost after any discount
    pub fn effective_cost(&self) -> u64 {
        self.cost - self.cost * u64::from(self.discount_percent.min(100)) / 100
    }
}

/// The items available for purchase
#[derive(Debug, Clone, Default)]
pub struct ShopCatalog {
    items: Vec<ShopItem>,
}

impl ShopCatalog {
    pub fn new(items: impl IntoIterator<Item = ShopItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// The campus shop every account sees
    pub fn campus_default() -> Self {
        Self::new([
            ShopItem::new("coffee", "Cafeteria coffee", 20),
            ShopItem::new("hoodie", "Campus hoodie", 150).with_discount(10),
            ShopItem::new("parking", "Week of parking", 80),
            ShopItem::new("locker", "Locker upgrade", 60),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }
}

/// One completed purchase transaction
///
/// Append-only history: a record is removed only by a refund inside the
/// eligibility window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PurchaseRecord {
    pub purchase_id: PurchaseId,
    pub item_id: String,
    pub item_name: String,
    pub variant: Option<String>,
    pub cost: u64,
    pub purchased_at: DateTime<Utc>,
}

/// Derived fulfillment state of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    Pending,
    InProgress,
    Completed,
}

/// Fulfillment status plus display progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfillment {
    pub status: FulfillmentStatus,
    /// 0-100, clamped
    pub percent: u8,
    pub elapsed_minutes: i64,
}

/// Compute the fulfillment state of a record at an instant
///
/// Pending below 2 elapsed minutes, in progress until 8, completed after.
/// A `now` before the purchase (clock skew between views) reads as zero
/// elapsed time.
pub fn fulfillment(record: &PurchaseRecord, now: DateTime<Utc>) -> Fulfillment {
    let elapsed_minutes = (now - record.purchased_at).num_minutes().max(0);
    let status = if elapsed_minutes < PENDING_MINUTES {
        FulfillmentStatus::Pending
    } else if elapsed_minutes < FULFILL_MINUTES {
        FulfillmentStatus::InProgress
    } else {
        FulfillmentStatus::Completed
    };
    let percent = ((elapsed_minutes as f64 / FULFILL_MINUTES as f64) * 100.0)
        .round()
        .min(100.0) as u8;
    Fulfillment {
        status,
        percent,
        elapsed_minutes,
    }
}

/// Purchase history for one account
///
/// `purchase_seq` rides along in the snapshot so ids stay unique across
/// views and reloads without coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShopLedger {
    pub records: Vec<PurchaseRecord>,
    pub purchase_seq: u64,
}

impl ShopLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buy an item: debit the balance and append a record, atomically
    ///
    /// Rejects with `InsufficientFunds` before any mutation when the balance
    /// is short. Grants no `earned_coins` and no XP.
    pub fn purchase(
        &mut self,
        progression: &mut Progression,
        item: &ShopItem,
        variant: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord> {
        let cost = item.effective_cost();
        progression.spend(cost)?;

        self.purchase_seq += 1;
        let record = PurchaseRecord {
            purchase_id: PurchaseId(format!(
                "p{:06}-{}",
                self.purchase_seq,
                now.timestamp_millis()
            )),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            variant,
            cost,
            purchased_at: now,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Look up a record by purchase id
    pub fn get(&self, id: &PurchaseId) -> Option<&PurchaseRecord> {
        self.records.iter().find(|r| &r.purchase_id == id)
    }

    /// Refund a purchase, restoring the exact cost
    ///
    /// Eligible only inside the 10-minute window and only while the derived
    /// status is still `Pending`. An ineligible refund is rejected with zero
    /// side effects.
    pub fn refund(
        &mut self,
        progression: &mut Progression,
        id: &PurchaseId,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let pos = self
            .records
            .iter()
            .position(|r| &r.purchase_id == id)
            .ok_or_else(|| Error::RefundNotEligible {
                purchase_id: id.clone(),
                reason: RefundDenial::UnknownPurchase,
            })?;

        let record = &self.records[pos];
        if now - record.purchased_at > Duration::minutes(REFUND_WINDOW_MINUTES) {
            return Err(Error::RefundNotEligible {
                purchase_id: id.clone(),
                reason: RefundDenial::WindowExpired,
            });
        }
        if fulfillment(record, now).status != FulfillmentStatus::Pending {
            return Err(Error::RefundNotEligible {
                purchase_id: id.clone(),
                reason: RefundDenial::AlreadyStarted,
            });
        }

        let record = self.records.remove(pos);
        progression.coins += record.cost;
        Ok(record.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefundDenial;

    fn now() -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + Duration::days(20_000)
    }

    fn funded(coins: u64) -> Progression {
        let mut p = Progression::default();
        p.grant_reward(coins, 0);
        p
    }

    #[test]
    fn test_effective_cost_discount() {
        let item = ShopItem::new("hoodie", "Hoodie", 150).with_discount(10);
        assert_eq!(item.effective_cost(), 135);
        assert_eq!(ShopItem::new("coffee", "Coffee", 20).effective_cost(), 20);
    }

    #[test]
    fn test_purchase_debits_without_earning() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);

        let record = ledger.purchase(&mut p, &item, None, now()).unwrap();

        assert_eq!(p.coins, 80);
        assert_eq!(p.earned_coins, 100);
        assert_eq!(p.xp, 0);
        assert_eq!(record.cost, 20);
        assert_eq!(ledger.records.len(), 1);
    }

    #[test]
    fn test_purchase_insufficient_funds_rejected() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(10);
        let item = ShopItem::new("hoodie", "Hoodie", 150);

        let err = ledger.purchase(&mut p, &item, None, now()).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(p.coins, 10);
        assert!(ledger.records.is_empty());
    }

    #[test]
    fn test_purchase_ids_unique() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);

        let a = ledger.purchase(&mut p, &item, None, now()).unwrap();
        let b = ledger.purchase(&mut p, &item, None, now()).unwrap();
        assert_ne!(a.purchase_id, b.purchase_id);
    }

    #[test]
    fn test_fulfillment_thresholds() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);
        let record = ledger.purchase(&mut p, &item, None, now()).unwrap();

        let at = |m: i64| fulfillment(&record, now() + Duration::minutes(m));

        assert_eq!(at(0).status, FulfillmentStatus::Pending);
        assert_eq!(at(1).status, FulfillmentStatus::Pending);
        assert_eq!(at(2).status, FulfillmentStatus::InProgress);
        assert_eq!(at(7).status, FulfillmentStatus::InProgress);
        assert_eq!(at(8).status, FulfillmentStatus::Completed);
        assert_eq!(at(4).percent, 50);
        assert_eq!(at(20).percent, 100);
        // Skewed clocks read as zero elapsed time.
        assert_eq!(at(-5).status, FulfillmentStatus::Pending);
        assert_eq!(at(-5).elapsed_minutes, 0);
    }

    #[test]
    fn test_refund_at_minute_one_restores_balance() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);
        let record = ledger.purchase(&mut p, &item, None, now()).unwrap();
        assert_eq!(p.coins, 80);

        let refunded = ledger
            .refund(&mut p, &record.purchase_id, now() + Duration::minutes(1))
            .unwrap();

        assert_eq!(refunded, 20);
        assert_eq!(p.coins, 100);
        assert_eq!(p.earned_coins, 100);
        assert!(ledger.records.is_empty());
    }

    #[test]
    fn test_refund_at_minute_nine_rejected() {
        // Inside the 10-minute envelope, but status is past Pending.
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);
        let record = ledger.purchase(&mut p, &item, None, now()).unwrap();

        let err = ledger
            .refund(&mut p, &record.purchase_id, now() + Duration::minutes(9))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RefundNotEligible {
                reason: RefundDenial::AlreadyStarted,
                ..
            }
        ));
        assert_eq!(p.coins, 80);
        assert_eq!(ledger.records.len(), 1);
    }

    #[test]
    fn test_refund_window_expired() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);
        let item = ShopItem::new("coffee", "Coffee", 20);
        let record = ledger.purchase(&mut p, &item, None, now()).unwrap();

        let err = ledger
            .refund(&mut p, &record.purchase_id, now() + Duration::minutes(11))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RefundNotEligible {
                reason: RefundDenial::WindowExpired,
                ..
            }
        ));
    }

    #[test]
    fn test_refund_unknown_purchase() {
        let mut ledger = ShopLedger::new();
        let mut p = funded(100);

        let err = ledger
            .refund(&mut p, &PurchaseId("ghost".into()), now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RefundNotEligible {
                reason: RefundDenial::UnknownPurchase,
                ..
            }
        ));
    }
}
