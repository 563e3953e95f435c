//! Negotiation engine drives the alternating buyer/seller turns

use crate::error::{NegotiationError, Result};
use crate::types::{Hash, NegotiationId, Product};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::capability::{BuyerStrategy, SellerStrategy};
use super::context::{NegotiationContext, DEFAULT_MAX_ROUNDS};
use super::types::{DealStatus, Message, NegotiationState, Role};

/// Runs negotiations between one buyer strategy and one seller strategy.
///
/// Cloning is cheap; strategies are shared read-only between clones, and
/// every call to [`NegotiationEngine::run`] gets its own context.
#[derive(Clone)]
pub struct NegotiationEngine {
    buyer: Arc<dyn BuyerStrategy>,
    seller: Arc<dyn SellerStrategy>,
    max_rounds: u32,
}

impl NegotiationEngine {
    /// Create new negotiation engine
    pub fn new(buyer: Arc<dyn BuyerStrategy>, seller: Arc<dyn SellerStrategy>) -> Self {
        Self {
            buyer,
            seller,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn buyer(&self) -> &Arc<dyn BuyerStrategy> {
        &self.buyer
    }

    pub fn seller(&self) -> &Arc<dyn SellerStrategy> {
        &self.seller
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Negotiate `product` for a buyer holding `budget`.
    ///
    /// The loop makes at most `max_rounds` buyer turns whatever the
    /// strategies return. When both sides could accept in the same round the
    /// buyer moves first, so the deal closes at the seller's quoted price.
    pub fn run(&self, product: Product, budget: u64) -> Result<NegotiationOutcome> {
        if budget == 0 {
            return Err(NegotiationError::InvalidScenario(
                "Buyer budget must be positive".to_string(),
            ));
        }

        let id = NegotiationId::generate();
        let span = tracing::info_span!("negotiation", id = %id, product = %product.name);
        let _guard = span.enter();

        let mut ctx = NegotiationContext::with_max_rounds(product, budget, self.max_rounds);

        let opening = self.seller.open(ctx.product());
        tracing::debug!("Seller {} opens at {}", self.seller.name(), opening.price);
        ctx.record_seller_offer(opening.price)?;
        ctx.push_message(Role::Seller, Some(opening.price), opening.message.clone());

        let seller_opening = opening.price;
        let mut seller_price = opening.price;
        let mut seller_message = opening.message;

        for round_num in 0..self.max_rounds {
            let round = ctx.begin_round()?;

            let reply = if round_num == 0 {
                self.buyer.open(&ctx)
            } else {
                self.buyer.respond(&ctx, seller_price, &seller_message)
            };

            match reply.status {
                DealStatus::Accepted => {
                    tracing::debug!("Round {}: buyer accepts {}", round, seller_price);
                    ctx.push_message(Role::Buyer, Some(seller_price), reply.message);
                    ctx.settle(seller_price, Role::Buyer)?;
                    break;
                }
                DealStatus::Rejected | DealStatus::Timeout => {
                    tracing::debug!("Round {}: buyer walks away ({})", round, reply.status);
                    ctx.push_message(Role::Buyer, None, reply.message);
                    ctx.close(DealStatus::Rejected)?;
                    break;
                }
                DealStatus::Ongoing => {}
            }

            let offer = if reply.price > budget {
                tracing::warn!(
                    "Buyer {} offered {} over budget {}, clamping",
                    self.buyer.name(),
                    reply.price,
                    budget
                );
                budget
            } else {
                reply.price
            };

            tracing::debug!("Round {}: buyer offers {}", round, offer);
            ctx.record_buyer_offer(offer)?;
            ctx.push_message(Role::Buyer, Some(offer), reply.message);

            let answer = self.seller.respond(ctx.product(), offer, round_num);

            match answer.status {
                DealStatus::Accepted => {
                    tracing::debug!("Round {}: seller accepts {}", round, offer);
                    ctx.push_message(Role::Seller, Some(offer), answer.message);
                    ctx.settle(offer, Role::Seller)?;
                    break;
                }
                DealStatus::Rejected | DealStatus::Timeout => {
                    tracing::debug!("Round {}: seller walks away ({})", round, answer.status);
                    ctx.push_message(Role::Seller, None, answer.message);
                    ctx.close(DealStatus::Rejected)?;
                    break;
                }
                DealStatus::Ongoing => {
                    tracing::debug!("Round {}: seller counters {}", round, answer.price);
                    ctx.record_seller_offer(answer.price)?;
                    ctx.push_message(Role::Seller, Some(answer.price), answer.message.clone());
                    seller_price = answer.price;
                    seller_message = answer.message;
                }
            }
        }

        if ctx.state().is_active() {
            ctx.close(DealStatus::Timeout)?;
        }

        let outcome = NegotiationOutcome::from_context(
            id,
            self.buyer.name(),
            self.seller.name(),
            seller_opening,
            ctx,
        )?;

        match outcome.final_price {
            Some(price) => tracing::info!(
                "Deal at {} after {} rounds (accepted by {:?})",
                price,
                outcome.rounds,
                outcome.accepted_by
            ),
            None => tracing::info!("No deal ({}) after {} rounds", outcome.status, outcome.rounds),
        }

        Ok(outcome)
    }
}

/// Result of one finished negotiation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub id: NegotiationId,
    pub buyer: String,
    pub seller: String,
    pub product: String,
    pub budget: u64,
    pub market_price: u64,
    pub seller_opening: u64,
    pub status: DealStatus,
    pub final_price: Option<u64>,
    pub accepted_by: Option<Role>,
    pub rounds: u32,
    pub buyer_offers: Vec<u64>,
    pub seller_offers: Vec<u64>,
    pub transcript: Vec<Message>,
    /// Hex Blake2b digest of the transcript, for auditing
    pub digest: String,
}

impl NegotiationOutcome {
    fn from_context(
        id: NegotiationId,
        buyer: &str,
        seller: &str,
        seller_opening: u64,
        ctx: NegotiationContext,
    ) -> Result<Self> {
        let digest = transcript_digest(ctx.messages())?.to_hex();
        let accepted_by = match ctx.state() {
            NegotiationState::Deal { accepted_by, .. } => Some(*accepted_by),
            _ => None,
        };

        Ok(Self {
            id,
            buyer: buyer.to_string(),
            seller: seller.to_string(),
            product: ctx.product().name.clone(),
            budget: ctx.budget(),
            market_price: ctx.product().base_market_price,
            seller_opening,
            status: ctx.state().status(),
            final_price: ctx.final_price(),
            accepted_by,
            rounds: ctx.current_round(),
            buyer_offers: ctx.buyer_offers().to_vec(),
            seller_offers: ctx.seller_offers().to_vec(),
            transcript: ctx.messages().to_vec(),
            digest,
        })
    }

    /// Recompute the transcript digest and compare it with the stored one.
    ///
    /// `Ok(false)` means the transcript was altered after the run; a digest
    /// that is not 32 bytes of hex is an error.
    pub fn verify_digest(&self) -> Result<bool> {
        let recorded = Hash::from_hex(&self.digest)?;
        Ok(transcript_digest(&self.transcript)? == recorded)
    }

    pub fn deal_made(&self) -> bool {
        self.final_price.is_some()
    }

    /// Budget left unspent; zero without a deal
    pub fn savings(&self) -> u64 {
        self.final_price
            .map_or(0, |price| self.budget.saturating_sub(price))
    }

    pub fn savings_pct(&self) -> f64 {
        percent_below(self.budget, self.final_price)
    }

    /// Negative when the deal closed above market
    pub fn below_market_pct(&self) -> f64 {
        percent_below(self.market_price, self.final_price)
    }

    pub fn discount_from_opening_pct(&self) -> f64 {
        percent_below(self.seller_opening, self.final_price)
    }
}

fn transcript_digest(messages: &[Message]) -> Result<Hash> {
    Ok(Hash::from_bytes(&serde_json::to_vec(messages)?))
}

fn percent_below(reference: u64, price: Option<u64>) -> f64 {
    match price {
        Some(price) if reference > 0 => {
            (reference as f64 - price as f64) / reference as f64 * 100.0
        }
        _ => 0.0,
    }
}

/// One negotiation queued for [`run_batch`]
#[derive(Clone)]
pub struct NegotiationJob {
    pub engine: NegotiationEngine,
    pub product: Product,
    pub budget: u64,
}

/// Run independent negotiations concurrently on the blocking pool.
///
/// Outcomes come back in job order.
pub async fn run_batch(jobs: Vec<NegotiationJob>) -> Result<Vec<NegotiationOutcome>> {
    let handles = jobs.into_iter().map(|job| {
        tokio::task::spawn_blocking(move || job.engine.run(job.product, job.budget))
    });

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.map_err(|e| NegotiationError::TaskFailed(e.to_string()))?)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{
        CautiousBuyer, DiplomaticBuyer, DiplomaticSeller, ReservationBuyer, ReservationSeller,
    };
    use crate::negotiation::capability::Reply;
    use crate::persona::Personality;

    fn alphonso() -> Product {
        Product::new("Alphonso Mangoes", "Mangoes", 100, "A", "Ratnagiri", 180000)
    }

    fn engine_against_reservation(min_price: u64) -> NegotiationEngine {
        NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(ReservationSeller::new(min_price)),
        )
    }

    /// Seller that never moves and never accepts
    struct StubbornSeller;

    impl SellerStrategy for StubbornSeller {
        fn name(&self) -> &str {
            "Stubborn"
        }
        fn define_personality(&self) -> Personality {
            Personality::standard_seller()
        }
        fn open(&self, product: &Product) -> Reply {
            Reply::ongoing(product.base_market_price * 3, "Take it or leave it.")
        }
        fn respond(&self, product: &Product, _buyer_offer: u64, _round_num: u32) -> Reply {
            Reply::ongoing(product.base_market_price * 3, "Take it or leave it.")
        }
        fn personality_prompt(&self) -> String {
            String::new()
        }
    }

    /// Buyer that ignores its budget entirely
    struct Reckless;

    impl BuyerStrategy for Reckless {
        fn name(&self) -> &str {
            "Reckless"
        }
        fn define_personality(&self) -> Personality {
            Personality::cautious_buyer()
        }
        fn open(&self, context: &NegotiationContext) -> Reply {
            Reply::ongoing(context.budget() * 2, "Double!")
        }
        fn respond(&self, _context: &NegotiationContext, seller_price: u64, _msg: &str) -> Reply {
            Reply::accepted(seller_price, "Sure")
        }
        fn personality_prompt(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_zero_budget_rejected() {
        let result = engine_against_reservation(150000).run(alphonso(), 0);
        assert!(matches!(result, Err(NegotiationError::InvalidScenario(_))));
    }

    #[test]
    fn test_seller_opening_is_round_zero() {
        let outcome = engine_against_reservation(153000).run(alphonso(), 180000).unwrap();

        assert_eq!(outcome.seller_opening, 270000);
        assert_eq!(outcome.seller_offers[0], 270000);
        assert_eq!(outcome.transcript[0].role, Role::Seller);
        assert_eq!(outcome.transcript[0].round, 0);
        assert_eq!(outcome.buyer_offers[0], 147420);
    }

    #[test]
    fn test_deal_against_reservation_seller() {
        let outcome = engine_against_reservation(153000).run(alphonso(), 180000).unwrap();

        assert!(outcome.deal_made());
        assert_eq!(outcome.status, DealStatus::Accepted);
        let price = outcome.final_price.unwrap();
        assert!(price <= 180000);
        assert!(price >= 153000);
        assert!(outcome.rounds <= 10);
    }

    #[test]
    fn test_timeout_against_stubborn_seller() {
        let engine = NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(StubbornSeller),
        );
        let outcome = engine.run(alphonso(), 180000).unwrap();

        assert_eq!(outcome.status, DealStatus::Timeout);
        assert!(!outcome.deal_made());
        assert_eq!(outcome.rounds, 10);
        assert_eq!(outcome.buyer_offers.len(), 10);
        assert_eq!(outcome.savings(), 0);
        assert_eq!(outcome.savings_pct(), 0.0);
        assert!(outcome.buyer_offers.iter().all(|offer| *offer <= 180000));
        assert!(outcome.buyer_offers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_custom_round_cap() {
        let engine = NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(StubbornSeller),
        )
        .with_max_rounds(3);
        let outcome = engine.run(alphonso(), 180000).unwrap();

        assert_eq!(outcome.status, DealStatus::Timeout);
        assert_eq!(outcome.rounds, 3);
    }

    #[test]
    fn test_buyer_acceptance_settles_at_seller_price() {
        // Seller drops from 270000 to 169533, inside the buyer's zone
        let outcome = engine_against_reservation(153000).run(alphonso(), 180000).unwrap();

        assert_eq!(outcome.accepted_by, Some(Role::Buyer));
        assert_eq!(outcome.final_price, Some(169533));
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.buyer_offers, vec![147420]);
        assert_eq!(outcome.seller_offers, vec![270000, 169533]);
        // Acceptance is logged but not appended to the offer history
        let last = outcome.transcript.last().unwrap();
        assert_eq!(last.role, Role::Buyer);
        assert_eq!(last.price, Some(169533));
    }

    #[test]
    fn test_diplomatic_pair_settles_seller_at_fair_late() {
        let engine = NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(DiplomaticSeller::new("DiplomatSeller")),
        );
        let outcome = engine.run(alphonso(), 250000).unwrap();

        assert_eq!(outcome.seller_offers[0], 246666);
        assert_eq!(outcome.seller_offers[1], 210051);
        // Seller answer at round index 8 lands on its fair price
        assert_eq!(outcome.seller_offers[9], 192708);
        assert!(outcome.seller_offers[1..9].iter().all(|ask| *ask > 192708));
        assert!(outcome.buyer_offers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_closing_moves_follow_short_round_cap() {
        let engine = NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(DiplomaticSeller::new("DiplomatSeller").with_max_rounds(5)),
        )
        .with_max_rounds(5);
        let outcome = engine.run(alphonso(), 250000).unwrap();

        assert_eq!(outcome.status, DealStatus::Timeout);
        assert_eq!(outcome.rounds, 5);
        // Buyer leaves the 92% cap (173880) in round 4 of 5
        assert_eq!(outcome.buyer_offers, vec![147420, 173373, 173880, 180706, 186127]);
        // Seller may reach fair from round index 3
        assert_eq!(
            outcome.seller_offers,
            vec![246666, 210051, 204270, 198710, 196342, 193271]
        );
    }

    #[test]
    fn test_closing_moves_wait_for_long_round_cap() {
        let engine = NegotiationEngine::new(
            Arc::new(DiplomaticBuyer::new("DiplomatBuyer")),
            Arc::new(DiplomaticSeller::new("DiplomatSeller").with_max_rounds(20)),
        )
        .with_max_rounds(20);
        let outcome = engine.run(alphonso(), 250000).unwrap();

        assert_eq!(outcome.rounds, 20);
        assert!(outcome.buyer_offers[2..18].iter().all(|offer| *offer == 173880));
        assert_eq!(outcome.buyer_offers[18..], [180598, 186015]);
        assert!(outcome.seller_offers[1..19].iter().all(|ask| *ask > 192708));
        assert_eq!(outcome.seller_offers[19], 192708);
    }

    #[test]
    fn test_seller_acceptance_settles_at_buyer_offer() {
        let engine = NegotiationEngine::new(
            Arc::new(ReservationBuyer::new()),
            Arc::new(ReservationSeller::new(120000)),
        );
        let outcome = engine.run(alphonso(), 200000).unwrap();

        // Opening 144000 is already 110% of the reservation
        assert_eq!(outcome.accepted_by, Some(Role::Seller));
        assert_eq!(outcome.final_price, Some(144000));
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.savings(), 56000);
    }

    #[test]
    fn test_over_budget_acceptance_is_a_defect() {
        let engine = NegotiationEngine::new(Arc::new(Reckless), Arc::new(StubbornSeller));
        let result = engine.run(alphonso(), 150000);

        // The opening is clamped; the blind acceptance of 540000 is not
        assert!(matches!(
            result,
            Err(NegotiationError::BudgetViolation { price: 540000, budget: 150000 })
        ));
    }

    #[test]
    fn test_cautious_buyer_runs_to_completion() {
        let engine = NegotiationEngine::new(
            Arc::new(CautiousBuyer::new("Cautious")),
            Arc::new(ReservationSeller::new(153000)),
        );
        let outcome = engine.run(alphonso(), 180000).unwrap();

        // 108000 draws the reservation price, which is 85% of market
        assert_eq!(outcome.buyer_offers, vec![108000]);
        assert_eq!(outcome.final_price, Some(153000));
        assert_eq!(outcome.accepted_by, Some(Role::Buyer));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let engine = engine_against_reservation(153000);
        let first = engine.run(alphonso(), 180000).unwrap();
        let second = engine.run(alphonso(), 180000).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.transcript, second.transcript);
    }

    #[test]
    fn test_verify_digest_detects_edits() {
        let mut outcome = engine_against_reservation(153000).run(alphonso(), 180000).unwrap();
        assert!(outcome.verify_digest().unwrap());

        // Survives a JSON round trip
        let restored: NegotiationOutcome =
            serde_json::from_str(&serde_json::to_string(&outcome).unwrap()).unwrap();
        assert!(restored.verify_digest().unwrap());

        outcome.transcript[1].price = Some(160000);
        assert!(!outcome.verify_digest().unwrap());

        outcome.digest = "not-hex".to_string();
        assert!(matches!(outcome.verify_digest(), Err(NegotiationError::InvalidDigest(_))));
    }

    #[test]
    fn test_outcome_metrics() {
        let outcome = NegotiationOutcome {
            id: NegotiationId("neg_test".to_string()),
            buyer: "b".to_string(),
            seller: "s".to_string(),
            product: "Alphonso Mangoes".to_string(),
            budget: 200000,
            market_price: 180000,
            seller_opening: 270000,
            status: DealStatus::Accepted,
            final_price: Some(162000),
            accepted_by: Some(Role::Seller),
            rounds: 4,
            buyer_offers: vec![],
            seller_offers: vec![],
            transcript: vec![],
            digest: Hash::from_bytes(b"").to_hex(),
        };

        assert_eq!(outcome.savings(), 38000);
        assert!((outcome.savings_pct() - 19.0).abs() < 1e-9);
        assert!((outcome.below_market_pct() - 10.0).abs() < 1e-9);
        assert!((outcome.discount_from_opening_pct() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_batch_propagates_errors() {
        let engine = engine_against_reservation(153000);
        let jobs = vec![
            NegotiationJob {
                engine: engine.clone(),
                product: alphonso(),
                budget: 180000,
            },
            NegotiationJob {
                engine: engine.clone(),
                product: alphonso(),
                budget: 0,
            },
        ];

        let result = tokio_test::block_on(run_batch(jobs));
        assert!(matches!(result, Err(NegotiationError::InvalidScenario(_))));
    }

    #[tokio::test]
    async fn test_run_batch_concurrent() {
        let engine = engine_against_reservation(153000);
        let budgets = [200000u64, 180000, 162000, 150000];
        let jobs = budgets
            .iter()
            .map(|budget| NegotiationJob {
                engine: engine.clone(),
                product: alphonso(),
                budget: *budget,
            })
            .collect();

        let outcomes = run_batch(jobs).await.unwrap();

        assert_eq!(outcomes.len(), budgets.len());
        for (outcome, budget) in outcomes.iter().zip(budgets) {
            assert_eq!(outcome.budget, budget);
            assert!(outcome.buyer_offers.iter().all(|offer| *offer <= budget));
            if let Some(price) = outcome.final_price {
                assert!(price <= budget);
            }
        }
    }
}
