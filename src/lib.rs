//! Bargain: turn-based buyer/seller price negotiation.
//!
//! A seller opens, then the buyer and seller alternate offers for at most a
//! fixed number of rounds until one side accepts or the negotiation times
//! out. Strategies are pure functions of the negotiation context:
//! - fair-price model shared by both sides ([`pricing`])
//! - unified offer strategy with concession schedules ([`negotiation::strategy`])
//! - round-bounded orchestration and concurrent batches ([`negotiation::engine`])

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod persona;
pub mod pricing;
pub mod report;
pub mod scenario;
pub mod types;

// Re-export commonly used types
pub use config::BargainConfig;
pub use error::{NegotiationError, Result};
pub use negotiation::{
    run_batch, BuyerStrategy, DealStatus, NegotiationContext, NegotiationEngine,
    NegotiationOutcome, Negotiator, OfferStrategy, SellerStrategy,
};
pub use pricing::{fair_price, PricingModel};
pub use types::{Hash, NegotiationId, Product, QualityGrade};
