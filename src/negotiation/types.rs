//! Negotiation types and state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Buyer => f.write_str("buyer"),
            Role::Seller => f.write_str("seller"),
        }
    }
}

/// Status reported by either side after a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Ongoing,
    Accepted,
    Rejected,
    Timeout,
}

impl DealStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DealStatus::Ongoing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Ongoing => "ongoing",
            DealStatus::Accepted => "accepted",
            DealStatus::Rejected => "rejected",
            DealStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Negotiation state machine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationState {
    /// Context created, no buyer turn yet
    NotStarted,
    /// Buyer/seller turn pair `round` is being played
    RoundInProgress { round: u32 },
    /// One side accepted the other's standing price
    Deal { price: u64, accepted_by: Role },
    /// Ended without agreement (`Rejected` or `Timeout`)
    NoDeal { status: DealStatus },
}

impl NegotiationState {
    /// Check if negotiation is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NegotiationState::Deal { .. } | NegotiationState::NoDeal { .. }
        )
    }

    /// Check if negotiation is active
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Status as seen from outside the loop
    pub fn status(&self) -> DealStatus {
        match self {
            NegotiationState::NotStarted | NegotiationState::RoundInProgress { .. } => {
                DealStatus::Ongoing
            }
            NegotiationState::Deal { .. } => DealStatus::Accepted,
            NegotiationState::NoDeal { status } => *status,
        }
    }
}

/// One entry of the transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub round: u32,
    /// Price quoted or accepted in this message, if any
    pub price: Option<u64>,
    pub text: String,
}

/// Why a strategy produced its decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Opening,
    /// Counterpart's price landed inside the target zone
    ZoneAccept,
    /// Counterpart's price is far better than the target zone
    SnapAccept,
    /// Counterpart's price is within the convergence band of our proposal
    ConvergenceAccept,
    /// Counterpart already matched or beat our proposal
    DominanceAccept,
    Counter,
    /// Counter made in the closing rounds
    FinalCounter,
}

/// Outcome of a pure strategy evaluation, before any wording is attached
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: DealStatus,
    /// Accepted price, or our counter when still ongoing
    pub price: u64,
    pub reason: DecisionReason,
}

impl Decision {
    pub fn accept(price: u64, reason: DecisionReason) -> Self {
        Self {
            status: DealStatus::Accepted,
            price,
            reason,
        }
    }

    pub fn counter(price: u64, reason: DecisionReason) -> Self {
        Self {
            status: DealStatus::Ongoing,
            price,
            reason,
        }
    }

    pub fn opening(price: u64) -> Self {
        Self::counter(price, DecisionReason::Opening)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == DealStatus::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_terminal() {
        let timeout = NegotiationState::NoDeal {
            status: DealStatus::Timeout,
        };
        assert!(timeout.is_terminal());
        assert!(!timeout.is_active());
        assert_eq!(timeout.status(), DealStatus::Timeout);

        let in_progress = NegotiationState::RoundInProgress { round: 3 };
        assert!(!in_progress.is_terminal());
        assert!(in_progress.is_active());
        assert_eq!(in_progress.status(), DealStatus::Ongoing);

        let deal = NegotiationState::Deal {
            price: 170000,
            accepted_by: Role::Seller,
        };
        assert_eq!(deal.status(), DealStatus::Accepted);
    }

    #[test]
    fn test_deal_status_terminal() {
        assert!(!DealStatus::Ongoing.is_terminal());
        assert!(DealStatus::Accepted.is_terminal());
        assert!(DealStatus::Rejected.is_terminal());
        assert!(DealStatus::Timeout.is_terminal());
    }

    #[test]
    fn test_deal_status_serialization() {
        let serialized = serde_json::to_string(&DealStatus::Accepted).unwrap();
        assert_eq!(serialized, "\"accepted\"");
        assert_eq!(DealStatus::Timeout.to_string(), "timeout");
    }

    #[test]
    fn test_message_serialization() {
        let message = Message {
            role: Role::Seller,
            round: 0,
            price: Some(270000),
            text: "I'm asking ₹270,000.".to_string(),
        };

        let serialized = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&serialized).unwrap();
        assert_eq!(message, deserialized);
    }

    #[test]
    fn test_decision_constructors() {
        let accepted = Decision::accept(170000, DecisionReason::ZoneAccept);
        assert!(accepted.is_accepted());

        let opening = Decision::opening(147420);
        assert_eq!(opening.status, DealStatus::Ongoing);
        assert_eq!(opening.reason, DecisionReason::Opening);
    }
}
