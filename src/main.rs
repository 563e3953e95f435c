//! Bargain CLI binary

use anyhow::{bail, Context};
use bargain::cli::{BargainApp, Cli, Commands};
use bargain::negotiation::NegotiationOutcome;
use bargain::persona::format_amount;
use bargain::report::{render_outcome, render_transcript, Summary};
use bargain::scenario::{self, Scenario};
use bargain::BargainConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = BargainConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app = BargainApp::new(config);
    let currency = app.currency().to_string();

    match cli.command {
        Commands::Run {
            product,
            difficulty,
            budget,
            buyer,
            seller,
            transcript,
            json,
        } => {
            let mut scenario = Scenario::new(scenario::preset(&product)?, difficulty)?;
            if let Some(budget) = budget {
                scenario = scenario.with_budget(budget)?;
            }

            let outcome = app.run_scenario(&scenario, buyer, seller)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{} ({})", scenario.label, outcome.id);
                if transcript {
                    print!("{}", render_transcript(&outcome.transcript, &currency));
                }
                print!("{}", render_outcome(&outcome, &currency));
                println!("Digest: {}", outcome.digest);
            }
        }

        Commands::Suite { buyer, seller, json } => {
            let scenarios = scenario::suite()?;
            let outcomes = app.run_all(&scenarios, buyer, seller).await?;
            let summary = Summary::from_outcomes(&outcomes);

            if json {
                let doc = serde_json::json!({ "outcomes": outcomes, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
                    println!("\nTest: {}", scenario.label);
                    print!("{}", render_outcome(outcome, &currency));
                }
                println!("\n{}", "=".repeat(60));
                print!("{}", summary.render(&currency));
            }
        }

        Commands::Fuzz {
            count,
            seed,
            buyer,
            seller,
        } => {
            let report = app.fuzz(count, seed, buyer, seller).await?;

            println!(
                "{} scenarios (seed {}): {} deals, {} no deal",
                report.scenarios, seed, report.deals, report.no_deals
            );
            for violation in &report.violations {
                println!("VIOLATION {}", violation);
            }
            if !report.passed() {
                bail!("{} invariant violations", report.violations.len());
            }
        }

        Commands::Verify { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let outcome: NegotiationOutcome = serde_json::from_str(&raw)?;

            if !outcome.verify_digest()? {
                bail!("digest mismatch for {}", outcome.id);
            }
            println!("{}: digest {} matches transcript", outcome.id, outcome.digest);
        }

        Commands::FairPrice { product } => {
            let product = scenario::preset(&product)?;
            let report = app.fair_price_report(&product);

            println!("{} (market {})", report.product, format_amount(report.market_price, &currency));
            println!(
                "Buyer:  fair {}  zone {} - {}",
                format_amount(report.buyer_fair, &currency),
                format_amount(report.buyer_zone.0, &currency),
                format_amount(report.buyer_zone.1, &currency)
            );
            println!(
                "Seller: fair {}  zone {} - {}",
                format_amount(report.seller_fair, &currency),
                format_amount(report.seller_zone.0, &currency),
                format_amount(report.seller_zone.1, &currency)
            );
        }

        Commands::Persona { side } => {
            let (personality, prompt) = app.persona(side);
            println!("{}", serde_json::to_string_pretty(&personality)?);
            println!("\n{}", prompt);
        }
    }

    Ok(())
}
