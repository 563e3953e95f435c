//! Transcript rendering and batch summaries

use serde::{Deserialize, Serialize};

use crate::negotiation::{Message, NegotiationOutcome};
use crate::persona::format_amount;

/// One line per message: round, speaker, quoted price and text
pub fn render_transcript(messages: &[Message], currency: &str) -> String {
    messages
        .iter()
        .map(|message| {
            let price = message
                .price
                .map_or_else(|| "-".to_string(), |price| format_amount(price, currency));
            format!(
                "[round {:>2}] {:<6} {:>12}  {}\n",
                message.round,
                message.role.to_string().to_uppercase(),
                price,
                message.text
            )
        })
        .collect()
}

/// Short result block for a single negotiation
pub fn render_outcome(outcome: &NegotiationOutcome, currency: &str) -> String {
    let mut out = format!(
        "{} | budget {} | market {}\n",
        outcome.product,
        format_amount(outcome.budget, currency),
        format_amount(outcome.market_price, currency)
    );

    match outcome.final_price {
        Some(price) => {
            out.push_str(&format!(
                "DEAL at {} in {} rounds\n",
                format_amount(price, currency),
                outcome.rounds
            ));
            out.push_str(&format!(
                "   Savings: {} ({:.1}%)\n",
                format_amount(outcome.savings(), currency),
                outcome.savings_pct()
            ));
            out.push_str(&format!("   Below Market: {:.1}%\n", outcome.below_market_pct()));
            out.push_str(&format!(
                "   Off Opening: {:.1}%\n",
                outcome.discount_from_opening_pct()
            ));
        }
        None => out.push_str(&format!(
            "NO DEAL ({}) after {} rounds\n",
            outcome.status, outcome.rounds
        )),
    }
    out
}

/// Aggregate over many negotiations
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub deals: usize,
    pub total_savings: u64,
    pub success_rate: f64,
    pub avg_rounds: f64,
    /// Mean discount from the seller's opening, over deals only
    pub avg_discount_from_opening_pct: f64,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[NegotiationOutcome]) -> Self {
        let total = outcomes.len();
        if total == 0 {
            return Self::default();
        }

        let deals: Vec<&NegotiationOutcome> =
            outcomes.iter().filter(|outcome| outcome.deal_made()).collect();
        let total_rounds: u64 = outcomes.iter().map(|o| u64::from(o.rounds)).sum();

        let avg_discount_from_opening_pct = if deals.is_empty() {
            0.0
        } else {
            deals
                .iter()
                .map(|o| o.discount_from_opening_pct())
                .sum::<f64>()
                / deals.len() as f64
        };

        Self {
            total,
            deals: deals.len(),
            total_savings: deals.iter().map(|o| o.savings()).sum(),
            success_rate: deals.len() as f64 / total as f64 * 100.0,
            avg_rounds: total_rounds as f64 / total as f64,
            avg_discount_from_opening_pct,
        }
    }

    pub fn render(&self, currency: &str) -> String {
        format!(
            "Deals Completed: {}/{} ({:.0}%)\nTotal Savings: {}\nAverage Rounds: {:.1}\nAverage Discount From Opening: {:.1}%\n",
            self.deals,
            self.total,
            self.success_rate,
            format_amount(self.total_savings, currency),
            self.avg_rounds,
            self.avg_discount_from_opening_pct
        )
    }
}
