//! Personalities and message wording.
//!
//! Strategies decide; this module only turns a [`Decision`] into text in
//! the voice of a [`Personality`].

use serde::{Deserialize, Serialize};

use crate::negotiation::{Decision, DecisionReason, Role};
use crate::types::Product;

/// Default currency symbol for rendered amounts
pub const DEFAULT_CURRENCY: &str = "₹";

/// Personality metadata exposed by every agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub personality_type: String,
    pub traits: Vec<String>,
    pub negotiation_style: String,
    pub catchphrases: Vec<String>,
}

impl Personality {
    fn build(personality_type: &str, traits: &[&str], style: &str, catchphrases: &[&str]) -> Self {
        Self {
            personality_type: personality_type.to_string(),
            traits: traits.iter().map(|t| t.to_string()).collect(),
            negotiation_style: style.to_string(),
            catchphrases: catchphrases.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn diplomatic_buyer() -> Self {
        Self::build(
            "diplomatic",
            &["collaborative", "clear-communication", "calm", "principled", "win-win"],
            "Leads with common ground, anchors on fair market data, makes reciprocal \
             concessions, and signals a clear zone of agreement.",
            &[
                "Let's find the number that respects both sides.",
                "I'm aiming for a fair, repeatable deal.",
                "Win-win or no deal.",
            ],
        )
    }

    pub fn diplomatic_seller() -> Self {
        Self::build(
            "diplomatic",
            &["collaborative", "transparent", "calm", "principled", "win-win"],
            "Opens high with rationale, reciprocates genuine moves, seeks stable partnerships.",
            &[
                "Let's align on value and quality.",
                "I prioritize repeat business over one-off wins.",
                "We can bridge this thoughtfully.",
            ],
        )
    }

    pub fn cautious_buyer() -> Self {
        Self::build(
            "cautious",
            &["careful", "budget-conscious", "polite"],
            "Makes small incremental offers, very careful with money.",
            &["Let me think about that...", "That's a bit steep for me"],
        )
    }

    pub fn standard_seller() -> Self {
        Self::build(
            "standard",
            &["firm", "direct"],
            "Asks a premium, concedes toward a private reservation price.",
            &["Take it or leave it."],
        )
    }

    pub fn budget_buyer() -> Self {
        Self::build(
            "reasonable",
            &["market-aware", "steady"],
            "Opens near market, raises in fixed bumps up to a budget.",
            &["Can you meet me closer?"],
        )
    }

    /// Catchphrase `index`, wrapping around; empty when there are none
    pub fn catchphrase(&self, index: usize) -> &str {
        if self.catchphrases.is_empty() {
            return "";
        }
        &self.catchphrases[index % self.catchphrases.len()]
    }
}

pub const DIPLOMATIC_BUYER_PROMPT: &str = "You are a diplomatic buyer who seeks collaborative, \
win-win agreements. You speak calmly and clearly, justify numbers with market and quality \
benchmarks, and make reciprocal concessions that signal progress. You avoid ultimatums, respect \
budget limits, and aim to close before timeouts. Typical phrases: 'Let's find a number that \
respects both sides.', 'I'm aiming for a fair, repeatable deal.', 'Win-win or no deal.'";

pub const DIPLOMATIC_SELLER_PROMPT: &str = "You are a diplomatic seller who aims for win-win \
deals. You justify pricing with market, quality, and reliability, and you reciprocate genuine \
movement from the buyer. You close within a fair corridor to secure long-term partnerships.";

pub const CAUTIOUS_BUYER_PROMPT: &str = "I am a cautious buyer who is very careful with money. I \
speak politely but firmly. I often say things like 'Let me think about that' or 'That's a bit \
steep for me'. I make small incremental offers and show concern about my budget.";

pub const STANDARD_SELLER_PROMPT: &str = "You are a straightforward seller. You open at a \
premium, concede in fixed steps, and never go below your reservation price.";

pub const BUDGET_BUYER_PROMPT: &str = "You are a reasonable buyer who opens near market value, \
raises in fixed bumps, and never exceeds the budget.";

/// Format an amount with thousands separators, e.g. `₹147,420`
pub fn format_amount(amount: u64, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}", currency, grouped)
}

/// Word a diplomatic decision for the given side
pub fn render_decision(
    personality: &Personality,
    role: Role,
    product: &Product,
    decision: &Decision,
    currency: &str,
) -> String {
    let amount = format_amount(decision.price, currency);

    match (role, decision.reason) {
        (Role::Buyer, DecisionReason::Opening) => format!(
            "{} For {} units of {}-grade {} from {}, my opening is {}. I'm anchoring on market \
             benchmarks with quality factored in. {}",
            personality.catchphrase(0),
            product.quantity,
            product.quality_grade,
            product.name,
            product.origin,
            amount,
            personality.catchphrase(1)
        ),
        (Role::Buyer, DecisionReason::ZoneAccept) => format!(
            "Agreed at {}. {} Appreciate the collaborative approach.",
            amount,
            personality.catchphrase(2)
        ),
        (Role::Buyer, DecisionReason::SnapAccept) => format!(
            "That's compelling. I accept {}. Looking forward to a long-term relationship.",
            amount
        ),
        (Role::Buyer, DecisionReason::ConvergenceAccept) => format!(
            "We're aligned. Let's close at {}. {}",
            amount,
            personality.catchphrase(0)
        ),
        (Role::Buyer, DecisionReason::DominanceAccept) => format!(
            "Fair enough, accepted at {}. {}",
            amount,
            personality.catchphrase(1)
        ),
        (Role::Buyer, DecisionReason::FinalCounter) => format!(
            "To bridge the gap, I can finalize at {}. {}",
            amount,
            personality.catchphrase(2)
        ),
        (Role::Buyer, DecisionReason::Counter) => format!(
            "I appreciate your position. Based on market and quality, I can move to {}. If you \
             can narrow the difference, we'll land a repeatable win-win.",
            amount
        ),
        (Role::Seller, DecisionReason::Opening) => format!(
            "{} For {} units of {}-grade {} ({}), my opening is {}. This reflects current \
             market, quality, and assurance.",
            personality.catchphrase(0),
            product.quantity,
            product.quality_grade,
            product.name,
            product.origin,
            amount
        ),
        (Role::Seller, DecisionReason::SnapAccept) => {
            format!("That's reasonable, let's lock it in at {}.", amount)
        }
        (Role::Seller, _) if decision.is_accepted() => {
            format!("Agreed at {}. {}", amount, personality.catchphrase(1))
        }
        (Role::Seller, _) => format!(
            "I appreciate your offer. Considering quality and fulfillment, I can improve to {}. {}",
            amount,
            personality.catchphrase(2)
        ),
    }
}
