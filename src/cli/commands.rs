//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::scenario::Difficulty;

#[derive(Parser, Debug)]
#[command(name = "bargain")]
#[command(about = "Bargain - turn-based buyer/seller price negotiation", long_about = None)]
pub struct Cli {
    /// JSON configuration file (defaults to ./bargain.json if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Negotiate one preset product
    Run {
        /// Preset product (alphonso, kesar, arabica)
        #[arg(short, long, default_value = "alphonso")]
        product: String,

        #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// Override the buyer budget
        #[arg(short, long)]
        budget: Option<u64>,

        #[arg(long, value_enum, default_value_t = BuyerKind::Diplomatic)]
        buyer: BuyerKind,

        #[arg(long, value_enum, default_value_t = SellerKind::Reservation)]
        seller: SellerKind,

        /// Print the full message log
        #[arg(short, long)]
        transcript: bool,

        /// Emit the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Every preset at every difficulty, run concurrently
    Suite {
        #[arg(long, value_enum, default_value_t = BuyerKind::Diplomatic)]
        buyer: BuyerKind,

        #[arg(long, value_enum, default_value_t = SellerKind::Reservation)]
        seller: SellerKind,

        #[arg(long)]
        json: bool,
    },

    /// Random scenarios checked against the negotiation invariants
    Fuzz {
        /// Number of scenarios
        #[arg(short = 'n', long, default_value = "200")]
        count: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        #[arg(long, value_enum, default_value_t = BuyerKind::Diplomatic)]
        buyer: BuyerKind,

        #[arg(long, value_enum, default_value_t = SellerKind::Reservation)]
        seller: SellerKind,
    },

    /// Check a saved JSON outcome against its transcript digest
    Verify {
        /// Outcome written by `run --json`
        path: PathBuf,
    },

    /// Show both sides' fair price and target zone
    FairPrice {
        #[arg(short, long, default_value = "alphonso")]
        product: String,
    },

    /// Show personality metadata and prompt
    Persona {
        #[arg(short, long, value_enum, default_value_t = PersonaSide::Buyer)]
        side: PersonaSide,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BuyerKind {
    /// Fair-value anchored concessions
    Diplomatic,
    /// Small incremental raises from 60% of market
    Cautious,
    /// Opens at 80% of market, fixed bumps
    Reservation,
}

impl BuyerKind {
    /// Whether consecutive offers are guaranteed never to decrease
    pub fn is_monotonic(self) -> bool {
        matches!(self, BuyerKind::Diplomatic)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SellerKind {
    /// Mirror of the diplomatic buyer, floored at the reservation price
    Diplomatic,
    /// Opens at 150% of market, never below the reservation price
    Reservation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PersonaSide {
    Buyer,
    Seller,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::parse_from(["bargain", "run"]);
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
                assert_eq!(product, "alphonso");
                assert_eq!(difficulty, Difficulty::Medium);
                assert_eq!(budget, None);
                assert_eq!(buyer, BuyerKind::Diplomatic);
                assert_eq!(seller, SellerKind::Reservation);
                assert!(!transcript && !json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_run_options() {
        let cli = Cli::parse_from([
            "bargain",
            "run",
            "--product",
            "kesar",
            "--difficulty",
            "hard",
            "--budget",
            "140000",
            "--buyer",
            "cautious",
            "--seller",
            "diplomatic",
            "--config",
            "custom.json",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        assert!(matches!(
            cli.command,
            Commands::Run {
                difficulty: Difficulty::Hard,
                budget: Some(140000),
                buyer: BuyerKind::Cautious,
                seller: SellerKind::Diplomatic,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_fuzz() {
        let cli = Cli::parse_from(["bargain", "fuzz", "-n", "10", "--seed", "7"]);
        assert!(matches!(cli.command, Commands::Fuzz { count: 10, seed: 7, .. }));
    }

    #[test]
    fn test_parse_verify() {
        let cli = Cli::parse_from(["bargain", "verify", "outcome.json"]);
        match cli.command {
            Commands::Verify { path } => assert_eq!(path, PathBuf::from("outcome.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_buyer() {
        assert!(Cli::try_parse_from(["bargain", "run", "--buyer", "greedy"]).is_err());
    }
}
