//! Reference counterparts with a private reservation price.
//!
//! These are the simple sparring partners used to exercise the diplomatic
//! strategies: a seller that will not go below a minimum price and a buyer
//! that will not go above its budget.

use crate::negotiation::{BuyerStrategy, NegotiationContext, Reply, SellerStrategy};
use crate::persona::{
    format_amount, Personality, BUDGET_BUYER_PROMPT, DEFAULT_CURRENCY, STANDARD_SELLER_PROMPT,
};
use crate::pricing::scale;
use crate::types::Product;

/// Seller that opens at 150% of market and never drops below `min_price`
#[derive(Clone, Debug)]
pub struct ReservationSeller {
    name: String,
    min_price: u64,
    currency: String,
}

impl ReservationSeller {
    pub fn new(min_price: u64) -> Self {
        Self {
            name: "ReservationSeller".to_string(),
            min_price,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn min_price(&self) -> u64 {
        self.min_price
    }

    /// An offer of at least 110% of the reservation price is a good profit
    fn is_profitable(&self, offer: u64) -> bool {
        u128::from(offer) * 10 >= u128::from(self.min_price) * 11
    }
}

impl SellerStrategy for ReservationSeller {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_personality(&self) -> Personality {
        Personality::standard_seller()
    }

    fn open(&self, product: &Product) -> Reply {
        let price = scale(product.base_market_price, 15_000);
        Reply::ongoing(
            price,
            format!(
                "These are premium {} grade {}. I'm asking {}.",
                product.quality_grade,
                product.name,
                format_amount(price, &self.currency)
            ),
        )
    }

    fn respond(&self, _product: &Product, buyer_offer: u64, round_num: u32) -> Reply {
        if self.is_profitable(buyer_offer) {
            return Reply::accepted(
                buyer_offer,
                format!("You have a deal at {}!", format_amount(buyer_offer, &self.currency)),
            );
        }

        if round_num >= 8 {
            let counter = self.min_price.max(scale(buyer_offer, 10_500));
            Reply::ongoing(
                counter,
                format!(
                    "Final offer: {}. Take it or leave it.",
                    format_amount(counter, &self.currency)
                ),
            )
        } else {
            let counter = self.min_price.max(scale(buyer_offer, 11_500));
            Reply::ongoing(
                counter,
                format!("I can come down to {}.", format_amount(counter, &self.currency)),
            )
        }
    }

    fn personality_prompt(&self) -> String {
        STANDARD_SELLER_PROMPT.to_string()
    }
}

/// Buyer that opens at 80% of market and raises in fixed bumps up to its budget
#[derive(Clone, Debug)]
pub struct ReservationBuyer {
    name: String,
    currency: String,
}

impl ReservationBuyer {
    pub fn new() -> Self {
        Self {
            name: "ReservationBuyer".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl Default for ReservationBuyer {
    fn default() -> Self {
        Self::new()
    }
}

impl BuyerStrategy for ReservationBuyer {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_personality(&self) -> Personality {
        Personality::budget_buyer()
    }

    fn open(&self, context: &NegotiationContext) -> Reply {
        let price = scale(context.product().base_market_price, 8_000).min(context.budget());
        Reply::ongoing(
            price,
            format!(
                "I'm opening at {} based on market checks.",
                format_amount(price, &self.currency)
            ),
        )
    }

    fn respond(&self, context: &NegotiationContext, seller_price: u64, _seller_message: &str) -> Reply {
        let budget = context.budget();
        let market = context.product().base_market_price;

        if seller_price <= budget && seller_price <= scale(market, 9_500) {
            return Reply::accepted(seller_price, "Accepted. Let's proceed.");
        }

        let round_num = context.current_round().saturating_sub(1);
        let bump_bps = if round_num >= 8 { 10_500 } else { 10_700 };

        let base = scale(seller_price, 8_800).max(scale(market, 9_000)).min(budget);
        let counter = scale(base, bump_bps).min(budget);

        Reply::ongoing(
            counter,
            format!(
                "I can move to {}. Can you meet me closer?",
                format_amount(counter, &self.currency)
            ),
        )
    }

    fn personality_prompt(&self) -> String {
        BUDGET_BUYER_PROMPT.to_string()
    }
}
