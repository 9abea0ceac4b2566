//! Headless Plinko session
//!
//! Usage: `plinko-drop [settings.json] [bet] [balls]`

use std::sync::Arc;

use rust_decimal::Decimal;

use plinko_drop::presentation::LogObserver;
use plinko_drop::sync::InMemoryAuthority;
use plinko_drop::sync::wire::{GET_BALANCE_PATH, SYNC_BALANCE_PATH, drop_endpoint};
use plinko_drop::{CancelToken, DropOutcome, Session, Settings, Wager};

const STARTING_BALANCE: i64 = 100;

fn main() {
    env_logger::init();
    log::info!("Plinko Drop starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let amount: Decimal = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| Decimal::new(10, 0));
    let balls: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    log::info!(
        "Balance authority: {url}{GET_BALANCE_PATH} / {url}{SYNC_BALANCE_PATH} (in-memory)",
        url = settings.authority_url
    );
    log::info!(
        "Drop authority: {}{} (local walk)",
        settings.authority_url,
        drop_endpoint(settings.start_slot)
    );
    let balances = Arc::new(InMemoryAuthority::new(Decimal::new(STARTING_BALANCE, 0)));

    let mut session = match Session::start_local(&settings, balances.clone()) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to start session: {e}");
            std::process::exit(1);
        }
    };

    println!("Risk: {}", session.profile().level().as_str());
    println!("Slots: {}", session.profile().display_labels().join(" "));
    println!("Balance: ${}", session.balance().round_dp(2));

    match session.play(Wager::new(amount, balls), &mut LogObserver::default(), &CancelToken::new()) {
        Ok(report) => {
            for outcome in &report.outcomes {
                match outcome {
                    DropOutcome::Paid { payout, .. } => {
                        println!("You won {}x! (+{})", payout.multiplier, payout.winnings.round_dp(2))
                    }
                    DropOutcome::Cancelled { .. } => println!("Drop abandoned"),
                    DropOutcome::Rejected { slot } => println!("Drop rejected (slot {slot})"),
                }
            }
            println!("Balance: ${}", report.balance.round_dp(2));
        }
        Err(e) => println!("Invalid bet amount or insufficient balance ({e})"),
    }

    log::info!("Authority received {} balance pushes", balances.pushes().len());
}
