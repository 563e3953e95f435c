//! Negotiation module: strategies, context and the turn loop

pub mod capability;
pub mod context;
pub mod engine;
pub mod strategy;
pub mod types;

pub use capability::{BuyerStrategy, Reply, SellerStrategy};
pub use context::{NegotiationContext, DEFAULT_MAX_ROUNDS};
pub use engine::{run_batch, NegotiationEngine, NegotiationJob, NegotiationOutcome};
pub use strategy::{
    ConcessionSchedule, CounterRule, Negotiator, OfferStrategy, Side, StrategyTerms, TargetZone,
    TurnView,
};
pub use types::{DealStatus, Decision, DecisionReason, Message, NegotiationState, Role};
