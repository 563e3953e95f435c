//! Bargain application: wires configuration, agents and the engine together

use serde::Serialize;
use std::sync::Arc;

use crate::agents::{
    CautiousBuyer, DiplomaticBuyer, DiplomaticSeller, ReservationBuyer, ReservationSeller,
};
use crate::config::BargainConfig;
use crate::error::Result;
use crate::negotiation::{
    run_batch, BuyerStrategy, NegotiationEngine, NegotiationJob, NegotiationOutcome,
    Negotiator, OfferStrategy, SellerStrategy,
};
use crate::persona::Personality;
use crate::scenario::{Scenario, ScenarioGenerator};
use crate::types::Product;

use super::commands::{BuyerKind, PersonaSide, SellerKind};

/// Main Bargain application
#[derive(Clone, Debug)]
pub struct BargainApp {
    config: BargainConfig,
}

/// Fair price and target zone of each side for one product
#[derive(Clone, Debug, Serialize)]
pub struct FairPriceReport {
    pub product: String,
    pub market_price: u64,
    pub buyer_fair: u64,
    pub buyer_zone: (u64, u64),
    pub seller_fair: u64,
    pub seller_zone: (u64, u64),
}

/// Result of a fuzz run
#[derive(Clone, Debug, Default, Serialize)]
pub struct FuzzReport {
    pub scenarios: usize,
    pub deals: usize,
    /// Timeouts and rejections alike
    pub no_deals: usize,
    pub violations: Vec<String>,
}

impl FuzzReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

impl BargainApp {
    pub fn new(config: BargainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BargainConfig {
        &self.config
    }

    pub fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    pub fn build_buyer(&self, kind: BuyerKind) -> Arc<dyn BuyerStrategy> {
        let currency = self.currency();
        match kind {
            BuyerKind::Diplomatic => Arc::new(
                DiplomaticBuyer::new("DiplomatBuyer")
                    .with_pricing(self.config.buyer_pricing())
                    .with_currency(currency),
            ),
            BuyerKind::Cautious => Arc::new(CautiousBuyer::new("CautiousBuyer").with_currency(currency)),
            BuyerKind::Reservation => Arc::new(ReservationBuyer::new().with_currency(currency)),
        }
    }

    /// Seller for `scenario`, holding its reservation price
    pub fn build_seller(&self, kind: SellerKind, scenario: &Scenario) -> Arc<dyn SellerStrategy> {
        let currency = self.currency();
        match kind {
            SellerKind::Diplomatic => Arc::new(
                DiplomaticSeller::new("DiplomatSeller")
                    .with_pricing(self.config.seller_pricing())
                    .with_currency(currency)
                    .with_max_rounds(self.config.max_rounds)
                    .with_floor(scenario.seller_min),
            ),
            SellerKind::Reservation => {
                Arc::new(ReservationSeller::new(scenario.seller_min).with_currency(currency))
            }
        }
    }

    pub fn engine(&self, buyer: BuyerKind, seller: SellerKind, scenario: &Scenario) -> NegotiationEngine {
        NegotiationEngine::new(self.build_buyer(buyer), self.build_seller(seller, scenario))
            .with_max_rounds(self.config.max_rounds)
    }

    /// Negotiate a single scenario on the current thread
    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        buyer: BuyerKind,
        seller: SellerKind,
    ) -> Result<NegotiationOutcome> {
        tracing::info!("Running {}", scenario.label);
        self.engine(buyer, seller, scenario)
            .run(scenario.product.clone(), scenario.budget)
    }

    /// Negotiate many scenarios concurrently; outcomes keep scenario order
    pub async fn run_all(
        &self,
        scenarios: &[Scenario],
        buyer: BuyerKind,
        seller: SellerKind,
    ) -> Result<Vec<NegotiationOutcome>> {
        let jobs = scenarios
            .iter()
            .map(|scenario| NegotiationJob {
                engine: self.engine(buyer, seller, scenario),
                product: scenario.product.clone(),
                budget: scenario.budget,
            })
            .collect();

        run_batch(jobs).await
    }

    /// Run seeded random scenarios and check the negotiation invariants
    pub async fn fuzz(
        &self,
        count: usize,
        seed: u64,
        buyer: BuyerKind,
        seller: SellerKind,
    ) -> Result<FuzzReport> {
        let scenarios = ScenarioGenerator::new(seed).take(count)?;
        let outcomes = self.run_all(&scenarios, buyer, seller).await?;

        let mut report = FuzzReport {
            scenarios: outcomes.len(),
            ..FuzzReport::default()
        };

        for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
            if outcome.deal_made() {
                report.deals += 1;
            } else {
                report.no_deals += 1;
            }
            report.violations.extend(
                self.check_invariants(outcome, buyer)
                    .into_iter()
                    .map(|v| format!("{}: {}", scenario.label, v)),
            );
        }

        if !report.passed() {
            tracing::warn!("{} invariant violations", report.violations.len());
        }
        Ok(report)
    }

    fn check_invariants(&self, outcome: &NegotiationOutcome, buyer: BuyerKind) -> Vec<String> {
        let mut violations = Vec::new();

        if let Some(offer) = outcome.buyer_offers.iter().find(|o| **o > outcome.budget) {
            violations.push(format!("buyer offer {} over budget {}", offer, outcome.budget));
        }
        if let Some(price) = outcome.final_price.filter(|p| *p > outcome.budget) {
            violations.push(format!("deal at {} over budget {}", price, outcome.budget));
        }
        if outcome.rounds > self.config.max_rounds {
            violations.push(format!(
                "{} rounds exceeds cap {}",
                outcome.rounds, self.config.max_rounds
            ));
        }
        if buyer.is_monotonic() && outcome.buyer_offers.windows(2).any(|w| w[1] < w[0]) {
            violations.push(format!("buyer offers retreat: {:?}", outcome.buyer_offers));
        }

        violations
    }

    pub fn fair_price_report(&self, product: &Product) -> FairPriceReport {
        let buyer = Negotiator::buyer().with_pricing(self.config.buyer_pricing());
        let seller = Negotiator::seller().with_pricing(self.config.seller_pricing());

        FairPriceReport {
            product: product.name.clone(),
            market_price: product.base_market_price,
            buyer_fair: buyer.fair_price(product),
            buyer_zone: buyer.target_zone(product),
            seller_fair: seller.fair_price(product),
            seller_zone: seller.target_zone(product),
        }
    }

    /// Personality and prompt of the diplomatic agent on `side`
    pub fn persona(&self, side: PersonaSide) -> (Personality, String) {
        match side {
            PersonaSide::Buyer => {
                let buyer = DiplomaticBuyer::new("DiplomatBuyer");
                (buyer.define_personality(), buyer.personality_prompt())
            }
            PersonaSide::Seller => {
                let seller = DiplomaticSeller::new("DiplomatSeller");
                (seller.define_personality(), seller.personality_prompt())
            }
        }
    }
}
