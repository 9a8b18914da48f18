//! Two Views Demo
//!
//! Opens two views (a desktop widget and a phone widget) over one shared
//! in-memory store and walks through a day: daily quests, a quest chain,
//! the daily claim, a purchase with fulfillment and a refund attempt, then
//! shows the second view catching up through sync.

use chrono::Duration;
use questline_core::{AdvanceOutcome, Clock, ExportFormat, FixedClock, QuestId};
use questline_store::{DurableStore, MemoryStore};
use questline_sync::View;
use std::sync::Arc;

fn advance_to_completion(view: &mut View, id: &QuestId) {
    loop {
        match view.advance_quest(id) {
            Ok(AdvanceOutcome::Completed { reward, .. }) => {
                println!(
                    "  {id} completed: +{} coins, +{} levels (now level {})",
                    reward.coins_granted, reward.levels_gained, reward.level
                );
                return;
            }
            Ok(AdvanceOutcome::Progressed { current, total }) => {
                println!("  {id}: {current}/{total}");
            }
            Ok(other) => {
                println!("  {id}: {other:?}");
                return;
            }
            Err(err) => {
                println!("  {id}: error: {err}");
                return;
            }
        }
    }
}

fn main() -> questline_sync::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=== Questline Two Views Demo ===\n");

    let store = MemoryStore::shared();
    let clock = Arc::new(FixedClock::from_ymd(2026, 9, 1));

    // Two surfaces, one account: both views record under "student".
    let mut desk = View::open(
        "desk",
        "student",
        Arc::clone(&store) as Arc<dyn DurableStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )?;
    let mut phone = View::open(
        "phone",
        "student",
        Arc::clone(&store) as Arc<dyn DurableStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )?;

    // Both views materialize the same daily set from the shared store.
    let dailies = desk.daily_quests()?;
    phone.daily_quests()?;
    println!("Today's quests ({}):", clock.today());
    for id in &dailies {
        println!("  {id}");
    }

    println!("\nWorking through quests on the desk view:");
    advance_to_completion(&mut desk, &dailies[0]);
    advance_to_completion(&mut desk, &QuestId::from("orientation-1"));
    // Completing step 1 unlocked step 2 of the chain.
    advance_to_completion(&mut desk, &QuestId::from("orientation-2"));

    match desk.claim_daily()? {
        questline_core::ClaimOutcome::Granted { coins, .. } => {
            println!("\nDaily claim: +{coins} coins");
        }
        questline_core::ClaimOutcome::AlreadyClaimed => {
            println!("\nDaily claim: already claimed today");
        }
    }

    println!(
        "\nDesk balance: {} coins, level {}, streak {}",
        desk.progression().coins,
        desk.progression().level,
        desk.progression().streak
    );

    println!("\nBuying a coffee on the desk view:");
    let purchase = desk.purchase("coffee", Some("oat milk".into()))?;
    println!("  {} for {} coins", purchase.item_name, purchase.cost);

    clock.advance(Duration::minutes(3));
    if let Some(fulfillment) = desk.fulfillment_of(&purchase.purchase_id) {
        println!(
            "  after 3 minutes: {:?} ({}%)",
            fulfillment.status, fulfillment.percent
        );
    }

    // Too late for a refund once fulfillment has started.
    match desk.refund(&purchase.purchase_id) {
        Ok(coins) => println!("  refunded {coins} coins"),
        Err(err) => println!("  refund rejected: {err}"),
    }

    println!("\nSyncing the phone view:");
    let changed = phone.sync()?;
    println!(
        "  adopted changes: {changed}; balance now {} coins, {} purchase(s)",
        phone.progression().coins,
        phone.purchases().len()
    );

    println!("\nLeaderboard (from the phone view):");
    for (rank, entry) in phone.leaderboard().entries().iter().enumerate() {
        println!("  {}. {} - {} coins", rank + 1, entry.name, entry.coins);
    }

    println!("\nPurchase export (CSV):");
    println!("{}", desk.export_purchases(ExportFormat::Csv)?);

    Ok(())
}
