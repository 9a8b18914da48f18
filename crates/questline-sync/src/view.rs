//! View: one live surface over the shared account state
//!
//! A view bundles the domain state (progression, quest catalog, shop
//! ledger, leaderboard) with the machinery that keeps several concurrent
//! views coherent: a [`SyncCoordinator`] persisting every mutation, a
//! [`DailyQuestGenerator`] shared through the store, and an [`OpGuard`]
//! absorbing duplicate triggers. An application opens one view per surface
//! (a widget, a panel, a tab) against the same store.

use crate::codec::AccountSnapshot;
use crate::coordinator::SyncCoordinator;
use crate::error::{Error, Result};
use crate::generator::DailyQuestGenerator;
use crate::guard::OpGuard;
use questline_core::{
    fulfillment, AdvanceOutcome, ClaimOutcome, Clock, ExportFormat, Exporter, Fulfillment,
    Leaderboard, Progression, PurchaseId, PurchaseRecord, QuestCatalog, QuestId, ShopCatalog,
    ShopLedger,
};
use questline_store::{keys, DurableStore};
use std::sync::Arc;

const CLAIM_OP: &str = "daily-claim";

fn purchase_op(item_id: &str) -> String {
    format!("purchase/{item_id}")
}

/// A single view over the shared account
pub struct View {
    name: String,
    account: String,
    progression: Progression,
    catalog: QuestCatalog,
    ledger: ShopLedger,
    leaderboard: Leaderboard,
    shop: ShopCatalog,
    coordinator: SyncCoordinator,
    daily: DailyQuestGenerator,
    guard: OpGuard,
    clock: Arc<dyn Clock>,
}

impl View {
    /// Open a view over the store, loading the persisted snapshot
    ///
    /// `name` labels this one surface; `account` identifies the account and
    /// must be shared by every view of it. A missing snapshot starts from
    /// the first-run state; a malformed one is logged and also falls back
    /// rather than failing the open.
    pub fn open(
        name: impl Into<String>,
        account: impl Into<String>,
        store: Arc<dyn DurableStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let snapshot = match store.read(keys::SNAPSHOT)? {
            None => AccountSnapshot::first_run(),
            Some(bytes) => crate::codec::decode(&bytes).unwrap_or_else(|err| {
                tracing::warn!(%err, "starting from defaults over malformed snapshot");
                AccountSnapshot::first_run()
            }),
        };
        let coordinator = SyncCoordinator::new(Arc::clone(&store));
        let daily = DailyQuestGenerator::new(Arc::clone(&store));
        Ok(Self {
            name: name.into(),
            account: account.into(),
            progression: snapshot.progression,
            catalog: QuestCatalog::campus_default(),
            ledger: snapshot.ledger,
            leaderboard: snapshot.leaderboard,
            shop: ShopCatalog::campus_default(),
            coordinator,
            daily,
            guard: OpGuard::new(),
            clock,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.ledger.records
    }

    /// Derived fulfillment of a purchase at the clock's current time
    pub fn fulfillment_of(&self, id: &PurchaseId) -> Option<Fulfillment> {
        self.ledger
            .get(id)
            .map(|record| fulfillment(record, self.clock.now()))
    }

    /// Advance a quest by one step, persisting any resulting mutation
    ///
    /// Completion routes its reward through the progression and may unlock
    /// the next chain step; every mutating outcome also counts as activity
    /// for the streak and refreshes the leaderboard.
    pub fn advance_quest(&mut self, id: &QuestId) -> Result<AdvanceOutcome> {
        let outcome = self
            .catalog
            .advance(id, &mut self.progression, self.clock.now());
        if outcome.mutated() {
            self.progression.touch(self.clock.today());
            // Keyed by account, never by the view label: every view of the
            // account updates one shared entry.
            self.leaderboard
                .record(&self.account, self.progression.earned_coins);
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Materialize today's quest set into the catalog
    ///
    /// Generation is idempotent per calendar day and shared through the
    /// store, so every view sees the same set. Reloading never clobbers
    /// progress already made on today's quests.
    pub fn daily_quests(&mut self) -> Result<Vec<QuestId>> {
        let quests = self.daily.generate(self.clock.as_ref())?;
        let ids = quests.iter().map(|q| q.id.clone()).collect();
        for quest in quests {
            self.catalog.insert_if_absent(quest);
        }
        Ok(ids)
    }

    /// Claim the once-per-day coin reward and settle immediately
    ///
    /// The last claim day is persisted separately from the snapshot, so the
    /// claim stays idempotent across views and restarts.
    pub fn claim_daily(&mut self) -> Result<ClaimOutcome> {
        let result = self.claim_daily_deferred();
        self.settle_claim();
        result
    }

    /// Claim the daily reward, leaving the in-flight marker set
    ///
    /// Until [`settle_claim`](Self::settle_claim) runs, a second claim is
    /// rejected with [`Error::OperationInFlight`]. Callers whose trigger can
    /// re-fire before resolving (a button handler) use this pair; everyone
    /// else uses [`claim_daily`](Self::claim_daily).
    pub fn claim_daily_deferred(&mut self) -> Result<ClaimOutcome> {
        if !self.guard.begin(CLAIM_OP) {
            return Err(Error::OperationInFlight(CLAIM_OP.to_owned()));
        }
        self.claim_daily_inner()
    }

    /// Clear the daily-claim in-flight marker
    pub fn settle_claim(&mut self) {
        self.guard.settle(CLAIM_OP);
    }

    fn claim_daily_inner(&mut self) -> Result<ClaimOutcome> {
        let today = self.clock.today();
        let last_claim = self.read_last_claim()?;
        let outcome = self.progression.claim_daily(last_claim, today);
        if let ClaimOutcome::Granted { .. } = outcome {
            self.coordinator
                .store()
                .write(keys::LAST_DAILY_CLAIM, today.to_string().as_bytes())?;
            self.leaderboard
                .record(&self.account, self.progression.earned_coins);
            self.persist()?;
        }
        Ok(outcome)
    }

    fn read_last_claim(&self) -> Result<Option<chrono::NaiveDate>> {
        let Some(bytes) = self.coordinator.store().read(keys::LAST_DAILY_CLAIM)? else {
            return Ok(None);
        };
        match std::str::from_utf8(&bytes).ok().and_then(|s| s.parse().ok()) {
            Some(day) => Ok(Some(day)),
            None => {
                tracing::warn!("ignoring malformed last-claim marker");
                Ok(None)
            }
        }
    }

    /// Buy a shop item by id and settle immediately
    pub fn purchase(&mut self, item_id: &str, variant: Option<String>) -> Result<PurchaseRecord> {
        let result = self.purchase_deferred(item_id, variant);
        self.settle_purchase(item_id);
        result
    }

    /// Buy a shop item, leaving the per-item in-flight marker set
    ///
    /// A second purchase of the same item before
    /// [`settle_purchase`](Self::settle_purchase) is rejected with
    /// [`Error::OperationInFlight`]; other items are unaffected.
    pub fn purchase_deferred(
        &mut self,
        item_id: &str,
        variant: Option<String>,
    ) -> Result<PurchaseRecord> {
        let op = purchase_op(item_id);
        if !self.guard.begin(&op) {
            return Err(Error::OperationInFlight(op));
        }
        self.purchase_inner(item_id, variant)
    }

    /// Clear the in-flight marker for one item's purchase
    pub fn settle_purchase(&mut self, item_id: &str) {
        self.guard.settle(&purchase_op(item_id));
    }

    fn purchase_inner(
        &mut self,
        item_id: &str,
        variant: Option<String>,
    ) -> Result<PurchaseRecord> {
        let item = self
            .shop
            .get(item_id)
            .cloned()
            .ok_or_else(|| questline_core::Error::UnknownItem(item_id.to_owned()))?;
        let record = self
            .ledger
            .purchase(&mut self.progression, &item, variant, self.clock.now())?;
        self.persist()?;
        Ok(record)
    }

    /// Refund a pending purchase, restoring its cost
    pub fn refund(&mut self, id: &PurchaseId) -> Result<u64> {
        let restored = self
            .ledger
            .refund(&mut self.progression, id, self.clock.now())?;
        self.persist()?;
        Ok(restored)
    }

    /// Export the purchase history in the requested format
    pub fn export_purchases(&self, format: ExportFormat) -> Result<String> {
        Ok(Exporter::new(&self.ledger).export(format)?)
    }

    /// Merge state written by other views; returns whether anything changed
    ///
    /// Adoption is wholesale: the inbound snapshot replaces progression,
    /// ledger and leaderboard together, never field by field. The merged
    /// state is persisted again, which the coordinator turns into a no-op,
    /// so a sync never echoes a write back to its origin.
    pub fn sync(&mut self) -> Result<bool> {
        let current = self.snapshot();
        let Some(incoming) = self.coordinator.poll(&current) else {
            return Ok(false);
        };
        self.progression = incoming.progression;
        self.ledger = incoming.ledger;
        self.leaderboard = incoming.leaderboard;
        self.persist()?;
        Ok(true)
    }

    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            progression: self.progression.clone(),
            ledger: self.ledger.clone(),
            leaderboard: self.leaderboard.clone(),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.coordinator.persist(&snapshot)
    }
}
