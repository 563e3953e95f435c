//! Capability sets the negotiation loop drives

use serde::{Deserialize, Serialize};

use crate::persona::Personality;
use crate::types::Product;

use super::context::NegotiationContext;
use super::types::DealStatus;

/// A side's answer to one turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub status: DealStatus,
    /// Accepted price, or the counter-offer while ongoing
    pub price: u64,
    pub message: String,
}

impl Reply {
    pub fn ongoing(price: u64, message: impl Into<String>) -> Self {
        Self {
            status: DealStatus::Ongoing,
            price,
            message: message.into(),
        }
    }

    pub fn accepted(price: u64, message: impl Into<String>) -> Self {
        Self {
            status: DealStatus::Accepted,
            price,
            message: message.into(),
        }
    }
}

/// Buyer side of the table.
///
/// Implementations must be stateless (or hold read-only configuration) so
/// one instance can serve many negotiations at once.
pub trait BuyerStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn define_personality(&self) -> Personality;

    /// First offer, made before any buyer offer is recorded
    fn open(&self, context: &NegotiationContext) -> Reply;

    /// Answer the seller's standing price
    fn respond(&self, context: &NegotiationContext, seller_price: u64, seller_message: &str)
        -> Reply;

    fn personality_prompt(&self) -> String;
}

/// Seller side of the table.
///
/// `round_num` is the 0-based index of the round being played.
pub trait SellerStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn define_personality(&self) -> Personality;

    fn open(&self, product: &Product) -> Reply;

    fn respond(&self, product: &Product, buyer_offer: u64, round_num: u32) -> Reply;

    fn personality_prompt(&self) -> String;
}
