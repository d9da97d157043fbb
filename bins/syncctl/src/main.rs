//! Gateway diagnostics CLI for Tallybridge.
//!
//! Usage:
//!   syncctl pull     - Fetch the voucher snapshot and report what it contains
//!   syncctl ledgers  - Fetch the remote ledger list and print the masters
//!
//! `pull` is a dry run: nothing is written to any store. It exists to
//! verify gateway connectivity and inspect what a scheduled sync pass
//! would see.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallybridge_shared::{AppConfig, GatewayResolver};
use tallybridge_sync::envelope::voucher_collection;
use tallybridge_sync::inbound::{clean_export, parse_export};
use tallybridge_sync::ledgers::parse_ledgers;
use tallybridge_sync::reconcile::PullOptions;
use tallybridge_sync::TallyClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallybridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_default();

    // Load configuration and resolve the active gateway
    let config = AppConfig::load().expect("Failed to load configuration");
    let gateway = config.active_gateway()?;
    info!(company = %gateway.company, url = %gateway.url, "resolved gateway");
    let client = TallyClient::new(gateway)?;

    match command.as_str() {
        "pull" => dry_run_pull(&client, &config).await?,
        "ledgers" => list_ledgers(&client).await?,
        _ => {
            eprintln!("Usage: syncctl <pull|ledgers>");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn dry_run_pull(client: &TallyClient, config: &AppConfig) -> anyhow::Result<()> {
    let options = PullOptions::from_config(&config.sync);
    let payload = voucher_collection(client.company(), options.date_range);
    let raw = client.post_xml(payload).await?;

    let parsed = parse_export(&clean_export(&raw), &options.managed_types);
    println!(
        "Snapshot: {} usable voucher(s), {} skipped node(s)",
        parsed.vouchers.len(),
        parsed.skipped
    );
    for voucher in &parsed.vouchers {
        println!(
            "  {} {} | {} | {} entries | narration: {}",
            voucher.voucher_type,
            voucher.voucher_number,
            voucher.date,
            voucher.entries.len(),
            voucher.narration.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn list_ledgers(client: &TallyClient) -> anyhow::Result<()> {
    let raw = client
        .post_xml(tallybridge_sync::envelope::ledger_collection())
        .await?;
    let ledgers = parse_ledgers(&clean_export(&raw));

    println!("{} ledger master(s)", ledgers.len());
    for ledger in &ledgers {
        println!(
            "  {} (under {})",
            ledger.name,
            ledger.parent_group.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
