//! CLI module for Bargain

pub mod app;
pub mod commands;

pub use app::{BargainApp, FairPriceReport, FuzzReport};
pub use commands::{BuyerKind, Cli, Commands, PersonaSide, SellerKind};
