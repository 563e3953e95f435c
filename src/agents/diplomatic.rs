//! Diplomatic buyer and seller, both backed by [`Negotiator`]

use crate::negotiation::{
    BuyerStrategy, Decision, NegotiationContext, Negotiator, OfferStrategy, Reply, Role,
    SellerStrategy, TurnView, DEFAULT_MAX_ROUNDS,
};
use crate::persona::{
    render_decision, Personality, DEFAULT_CURRENCY, DIPLOMATIC_BUYER_PROMPT,
    DIPLOMATIC_SELLER_PROMPT,
};
use crate::pricing::PricingModel;
use crate::types::Product;

/// Collaborative buyer: anchors low on fair value and concedes on a schedule
#[derive(Clone, Debug)]
pub struct DiplomaticBuyer {
    name: String,
    negotiator: Negotiator,
    personality: Personality,
    currency: String,
}

impl DiplomaticBuyer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            negotiator: Negotiator::buyer(),
            personality: Personality::diplomatic_buyer(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_pricing(mut self, pricing: PricingModel) -> Self {
        self.negotiator = self.negotiator.with_pricing(pricing);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    fn reply(&self, product: &Product, decision: Decision) -> Reply {
        let message = render_decision(
            &self.personality,
            Role::Buyer,
            product,
            &decision,
            &self.currency,
        );
        Reply {
            status: decision.status,
            price: decision.price,
            message,
        }
    }
}

impl BuyerStrategy for DiplomaticBuyer {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_personality(&self) -> Personality {
        self.personality.clone()
    }

    fn open(&self, context: &NegotiationContext) -> Reply {
        if !context.buyer_offers().is_empty() {
            tracing::warn!(
                buyer = %self.name,
                "opening requested after {} buyer offers",
                context.buyer_offers().len()
            );
        }

        let decision = self
            .negotiator
            .opening(context.product(), Some(context.budget()));
        self.reply(context.product(), decision)
    }

    fn respond(&self, context: &NegotiationContext, seller_price: u64, _seller_message: &str) -> Reply {
        let view = TurnView {
            product: context.product(),
            round: context.current_round(),
            max_rounds: context.max_rounds(),
            counter_price: seller_price,
            own_last: context.last_buyer_offer(),
            limit: Some(context.budget()),
        };

        let decision = self.negotiator.decide(&view);
        self.reply(context.product(), decision)
    }

    fn personality_prompt(&self) -> String {
        DIPLOMATIC_BUYER_PROMPT.to_string()
    }
}

/// Mirror of [`DiplomaticBuyer`]: opens high and concedes toward fair value
#[derive(Clone, Debug)]
pub struct DiplomaticSeller {
    name: String,
    negotiator: Negotiator,
    personality: Personality,
    currency: String,
    max_rounds: u32,
    floor: Option<u64>,
}

impl DiplomaticSeller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            negotiator: Negotiator::seller(),
            personality: Personality::diplomatic_seller(),
            currency: DEFAULT_CURRENCY.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            floor: None,
        }
    }

    pub fn with_pricing(mut self, pricing: PricingModel) -> Self {
        self.negotiator = self.negotiator.with_pricing(pricing);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Never quote or accept below `floor`
    pub fn with_floor(mut self, floor: u64) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    fn reply(&self, product: &Product, decision: Decision) -> Reply {
        let message = render_decision(
            &self.personality,
            Role::Seller,
            product,
            &decision,
            &self.currency,
        );
        Reply {
            status: decision.status,
            price: decision.price,
            message,
        }
    }
}

impl SellerStrategy for DiplomaticSeller {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_personality(&self) -> Personality {
        self.personality.clone()
    }

    fn open(&self, product: &Product) -> Reply {
        let decision = self.negotiator.opening(product, self.floor);
        self.reply(product, decision)
    }

    fn respond(&self, product: &Product, buyer_offer: u64, round_num: u32) -> Reply {
        let view = TurnView {
            product,
            round: round_num + 1,
            max_rounds: self.max_rounds,
            counter_price: buyer_offer,
            own_last: None,
            limit: self.floor,
        };

        let decision = self.negotiator.decide(&view);
        self.reply(product, decision)
    }

    fn personality_prompt(&self) -> String {
        DIPLOMATIC_SELLER_PROMPT.to_string()
    }
}
