//! Negotiation context: the mutable record threaded through every turn

use crate::error::{NegotiationError, Result};
use crate::types::Product;

use super::types::{DealStatus, Message, NegotiationState, Role};

/// Default number of buyer turns before a negotiation times out
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// State of a single negotiation between one buyer and one seller
#[derive(Clone, Debug)]
pub struct NegotiationContext {
    product: Product,
    budget: u64,
    max_rounds: u32,
    current_round: u32,
    state: NegotiationState,
    seller_offers: Vec<u64>,
    buyer_offers: Vec<u64>,
    messages: Vec<Message>,
}

impl NegotiationContext {
    /// Create a fresh context with the default round cap
    pub fn new(product: Product, budget: u64) -> Self {
        Self::with_max_rounds(product, budget, DEFAULT_MAX_ROUNDS)
    }

    pub fn with_max_rounds(product: Product, budget: u64, max_rounds: u32) -> Self {
        Self {
            product,
            budget,
            max_rounds,
            current_round: 0,
            state: NegotiationState::NotStarted,
            seller_offers: Vec::new(),
            buyer_offers: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Buyer's hard ceiling
    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Round in progress; 0 before the first buyer turn
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.max_rounds.saturating_sub(self.current_round)
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn seller_offers(&self) -> &[u64] {
        &self.seller_offers
    }

    pub fn buyer_offers(&self) -> &[u64] {
        &self.buyer_offers
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_seller_offer(&self) -> Option<u64> {
        self.seller_offers.last().copied()
    }

    pub fn last_buyer_offer(&self) -> Option<u64> {
        self.buyer_offers.last().copied()
    }

    /// Move to the next round
    pub fn begin_round(&mut self) -> Result<u32> {
        if self.state.is_terminal() {
            return Err(NegotiationError::InvalidStateTransition(
                "Cannot start a round after the negotiation ended".to_string(),
            ));
        }

        let next = self.current_round + 1;
        if next > self.max_rounds {
            return Err(NegotiationError::RoundCapExceeded {
                round: next,
                max_rounds: self.max_rounds,
            });
        }

        self.current_round = next;
        self.state = NegotiationState::RoundInProgress { round: next };
        Ok(next)
    }

    /// Record a buyer offer; offers above the budget are refused
    pub fn record_buyer_offer(&mut self, offer: u64) -> Result<()> {
        self.ensure_active("Cannot record an offer after the negotiation ended")?;

        if offer > self.budget {
            return Err(NegotiationError::BudgetViolation {
                price: offer,
                budget: self.budget,
            });
        }

        self.buyer_offers.push(offer);
        Ok(())
    }

    pub fn record_seller_offer(&mut self, offer: u64) -> Result<()> {
        self.ensure_active("Cannot record an offer after the negotiation ended")?;
        self.seller_offers.push(offer);
        Ok(())
    }

    /// Append to the transcript. Allowed in any state so the closing
    /// message of a deal can be logged after settlement.
    pub fn push_message(&mut self, role: Role, price: Option<u64>, text: impl Into<String>) {
        self.messages.push(Message {
            role,
            round: self.current_round,
            price,
            text: text.into(),
        });
    }

    /// Close with an agreed price
    pub fn settle(&mut self, price: u64, accepted_by: Role) -> Result<()> {
        self.ensure_active("Negotiation already finalized")?;

        if accepted_by == Role::Buyer && price > self.budget {
            return Err(NegotiationError::BudgetViolation {
                price,
                budget: self.budget,
            });
        }

        self.state = NegotiationState::Deal { price, accepted_by };
        Ok(())
    }

    /// Close without agreement
    pub fn close(&mut self, status: DealStatus) -> Result<()> {
        self.ensure_active("Negotiation already finalized")?;

        if !matches!(status, DealStatus::Rejected | DealStatus::Timeout) {
            return Err(NegotiationError::InvalidStateTransition(format!(
                "Cannot close a negotiation as {}",
                status
            )));
        }

        self.state = NegotiationState::NoDeal { status };
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, NegotiationState::Deal { .. })
    }

    /// Agreed price, if a deal was reached
    pub fn final_price(&self) -> Option<u64> {
        match self.state {
            NegotiationState::Deal { price, .. } => Some(price),
            _ => None,
        }
    }

    fn ensure_active(&self, reason: &str) -> Result<()> {
        if self.state.is_terminal() {
            return Err(NegotiationError::InvalidStateTransition(reason.to_string()));
        }
        Ok(())
    }
}
