//! A deliberately simple buyer, kept as a baseline to compare against

use crate::negotiation::{BuyerStrategy, NegotiationContext, Reply};
use crate::persona::{format_amount, Personality, CAUTIOUS_BUYER_PROMPT, DEFAULT_CURRENCY};
use crate::pricing::scale;

/// Opens at 60% of market and creeps up 10% a round
#[derive(Clone, Debug)]
pub struct CautiousBuyer {
    name: String,
    currency: String,
}

impl CautiousBuyer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl BuyerStrategy for CautiousBuyer {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_personality(&self) -> Personality {
        Personality::cautious_buyer()
    }

    fn open(&self, context: &NegotiationContext) -> Reply {
        let price = scale(context.product().base_market_price, 6_000).min(context.budget());
        Reply::ongoing(
            price,
            format!(
                "I'm interested, but {} is what I can offer. Let me think about that...",
                format_amount(price, &self.currency)
            ),
        )
    }

    fn respond(&self, context: &NegotiationContext, seller_price: u64, _seller_message: &str) -> Reply {
        let budget = context.budget();
        let market = context.product().base_market_price;

        if seller_price <= budget && u128::from(seller_price) * 100 <= u128::from(market) * 85 {
            return Reply::accepted(
                seller_price,
                format!("Alright, {} works for me!", format_amount(seller_price, &self.currency)),
            );
        }

        let last = context.last_buyer_offer().unwrap_or(0);
        let counter = scale(last, 11_000).min(budget);

        // Close to the ask: shave just under it
        if u128::from(counter) * 100 >= u128::from(seller_price) * 95 {
            let counter = seller_price.saturating_sub(1000).min(budget);
            return Reply::ongoing(
                counter,
                format!(
                    "That's a bit steep for me. How about {}?",
                    format_amount(counter, &self.currency)
                ),
            );
        }

        Reply::ongoing(
            counter,
            format!(
                "I can go up to {}, but that's pushing my budget.",
                format_amount(counter, &self.currency)
            ),
        )
    }

    fn personality_prompt(&self) -> String {
        CAUTIOUS_BUYER_PROMPT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::DealStatus;
    use crate::types::Product;

    fn context(budget: u64) -> NegotiationContext {
        let product = Product::new("Kesar Mangoes", "Mangoes", 150, "B", "Gujarat", 150000);
        NegotiationContext::new(product, budget)
    }

    #[test]
    fn test_opening_at_sixty_percent() {
        let buyer = CautiousBuyer::new("Cautious");
        assert_eq!(buyer.open(&context(150000)).price, 90000);
        assert_eq!(buyer.open(&context(80000)).price, 80000);
    }

    #[test]
    fn test_accepts_below_85_percent_of_market() {
        let buyer = CautiousBuyer::new("Cautious");
        let reply = buyer.respond(&context(150000), 127500, "");

        assert_eq!(reply.status, DealStatus::Accepted);
        assert_eq!(reply.price, 127500);
    }

    #[test]
    fn test_incremental_counter() {
        let buyer = CautiousBuyer::new("Cautious");
        let mut ctx = context(150000);
        ctx.begin_round().unwrap();
        ctx.record_buyer_offer(90000).unwrap();

        let reply = buyer.respond(&ctx, 200000, "");
        assert_eq!(reply.status, DealStatus::Ongoing);
        assert_eq!(reply.price, 99000);
    }

    #[test]
    fn test_shaves_under_close_ask() {
        let buyer = CautiousBuyer::new("Cautious");
        let mut ctx = context(150000);
        ctx.begin_round().unwrap();
        ctx.record_buyer_offer(120000).unwrap();

        // 132000 ≥ 95% of 135000
        let reply = buyer.respond(&ctx, 135000, "");
        assert_eq!(reply.price, 134000);
        assert!(reply.message.starts_with("That's a bit steep"));
    }
}
