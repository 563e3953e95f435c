//! Offer strategy shared by both sides of the table.
//!
//! Buyer and seller run the same decision pipeline: accept inside the target
//! zone, snap-accept anything far better than it, otherwise compute a
//! counter from the concession schedule and accept when the counterpart has
//! already converged on it. The pipeline is parameterised by [`Side`], which
//! fixes the direction of concessions, by a [`PricingModel`] table and by
//! [`StrategyTerms`].
//!
//! Everything here is pure arithmetic over a [`TurnView`]; wording is added
//! later by the persona layer.

use serde::{Deserialize, Serialize};

use crate::pricing::{scale, PricingModel, BPS_SCALE};
use crate::types::Product;

use super::types::{Decision, DecisionReason, Role};

/// Which way a strategy concedes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Starts low, concedes upward, never above its budget
    Buyer,
    /// Starts high, concedes downward, never below its floor
    Seller,
}

impl Side {
    pub fn role(self) -> Role {
        match self {
            Side::Buyer => Role::Buyer,
            Side::Seller => Role::Seller,
        }
    }

    /// `price` is at least as good for this side as `reference`
    pub fn favours(self, price: u64, reference: u64) -> bool {
        match self {
            Side::Buyer => price <= reference,
            Side::Seller => price >= reference,
        }
    }

    pub fn within_limit(self, price: u64, limit: Option<u64>) -> bool {
        limit.map_or(true, |limit| self.favours(price, limit))
    }

    /// Pull `price` back inside the limit
    pub fn clamp(self, price: u64, limit: Option<u64>) -> u64 {
        match (self, limit) {
            (_, None) => price,
            (Side::Buyer, Some(budget)) => price.min(budget),
            (Side::Seller, Some(floor)) => price.max(floor),
        }
    }

    /// The more generous of two prices
    pub fn concede(self, a: u64, b: u64) -> u64 {
        match self {
            Side::Buyer => a.max(b),
            Side::Seller => a.min(b),
        }
    }

    /// The less generous of two prices
    pub fn hold(self, a: u64, b: u64) -> u64 {
        match self {
            Side::Buyer => a.min(b),
            Side::Seller => a.max(b),
        }
    }

    /// Shift a basis-point ratio by `delta` in the conceding direction
    pub fn toward(self, bps: u64, delta: u64) -> u64 {
        match self {
            Side::Buyer => bps.saturating_add(delta),
            Side::Seller => bps.saturating_sub(delta),
        }
    }

    /// Shift a basis-point ratio by `delta` away from the counterpart
    pub fn away(self, bps: u64, delta: u64) -> u64 {
        match self {
            Side::Buyer => bps.saturating_sub(delta),
            Side::Seller => bps.saturating_add(delta),
        }
    }
}

/// Price band, as fractions of fair price, accepted without further talk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetZone {
    pub low_bps: u64,
    pub high_bps: u64,
}

/// Step size by rounds remaining
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionSchedule {
    /// `(min_rounds_left, step_bps)`, largest threshold first
    tiers: Vec<(u32, u64)>,
    tail_bps: u64,
}

impl ConcessionSchedule {
    pub fn new(mut tiers: Vec<(u32, u64)>, tail_bps: u64) -> Self {
        tiers.sort_by(|a, b| b.0.cmp(&a.0));
        Self { tiers, tail_bps }
    }

    /// 7% with six or more rounds left, 4.5% with three to five, 3% after
    pub fn buyer() -> Self {
        Self::new(vec![(6, 700), (3, 450)], 300)
    }

    /// 7% / 5% / 3% on the buyer's thresholds
    pub fn seller() -> Self {
        Self::new(vec![(6, 700), (3, 500)], 300)
    }

    pub fn step_bps(&self, rounds_left: u32) -> u64 {
        self.tiers
            .iter()
            .find(|(min_left, _)| rounds_left >= *min_left)
            .map_or(self.tail_bps, |(_, bps)| *bps)
    }
}

/// How the next counter is derived
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CounterRule {
    /// Step away from our own last offer, or halfway to the counterpart
    /// shaded by `midpoint_bps`, whichever concedes more. Capped at
    /// `early_cap_bps` of fair until the closing phase, floored at
    /// `closing_floor_bps` during it.
    Anchored {
        midpoint_bps: u64,
        early_cap_bps: u64,
        closing_floor_bps: u64,
        /// Closing phase starts once this many rounds or fewer remain
        closing_rounds_left: u32,
    },
    /// Meet the counterpart halfway from a reference ask that decays by
    /// `decay_bps` per round for `decay_rounds` rounds. The counterpart's
    /// price is supported at `support_bps` of fair. Never concede past one
    /// schedule step from fair before the closing phase, and never past
    /// fair itself during it.
    Decaying {
        decay_bps: u64,
        decay_rounds: u32,
        support_bps: u64,
        /// Settling at fair is allowed once this many rounds or fewer remain
        settle_rounds_left: u32,
    },
}

impl CounterRule {
    /// Whether the turn falls in the closing phase of its negotiation
    pub fn is_closing(&self, view: &TurnView<'_>) -> bool {
        let window = match *self {
            CounterRule::Anchored {
                closing_rounds_left,
                ..
            } => closing_rounds_left,
            CounterRule::Decaying {
                settle_rounds_left, ..
            } => settle_rounds_left,
        };
        view.rounds_remaining() <= window
    }
}

/// Numeric personality of a strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTerms {
    pub opening_bps: u64,
    pub zone: TargetZone,
    pub snap_bps: u64,
    /// Accept when the counterpart is within this much of our proposal
    pub convergence_bps: Option<u64>,
    /// Accept when the counterpart already matched our proposal
    pub accept_dominated: bool,
    pub schedule: ConcessionSchedule,
    pub counter: CounterRule,
}

impl StrategyTerms {
    pub fn buyer() -> Self {
        Self {
            opening_bps: 7_800,
            zone: TargetZone {
                low_bps: 8_800,
                high_bps: 9_700,
            },
            snap_bps: 8_500,
            convergence_bps: Some(150),
            accept_dominated: true,
            schedule: ConcessionSchedule::buyer(),
            counter: CounterRule::Anchored {
                midpoint_bps: 9_700,
                early_cap_bps: 9_200,
                closing_floor_bps: 9_000,
                closing_rounds_left: 1,
            },
        }
    }

    pub fn seller() -> Self {
        Self {
            opening_bps: 12_800,
            zone: TargetZone {
                low_bps: BPS_SCALE,
                high_bps: 11_000,
            },
            snap_bps: 9_800,
            convergence_bps: None,
            accept_dominated: false,
            schedule: ConcessionSchedule::seller(),
            counter: CounterRule::Decaying {
                decay_bps: 600,
                decay_rounds: 4,
                support_bps: 9_000,
                settle_rounds_left: 1,
            },
        }
    }
}

/// Everything a strategy may look at when deciding a turn
#[derive(Clone, Copy, Debug)]
pub struct TurnView<'a> {
    pub product: &'a Product,
    /// Round in progress, 1-based
    pub round: u32,
    pub max_rounds: u32,
    /// Counterpart's standing price
    pub counter_price: u64,
    /// Our previous offer, if any
    pub own_last: Option<u64>,
    /// Budget for a buyer, reservation floor for a seller
    pub limit: Option<u64>,
}

impl TurnView<'_> {
    pub fn rounds_remaining(&self) -> u32 {
        self.max_rounds.saturating_sub(self.round)
    }
}

/// Polymorphic offer/accept logic for either side
pub trait OfferStrategy: Send + Sync {
    fn side(&self) -> Side;

    fn fair_price(&self, product: &Product) -> u64;

    /// `(low, high)` accepted without further negotiation
    fn target_zone(&self, product: &Product) -> (u64, u64);

    fn opening(&self, product: &Product, limit: Option<u64>) -> Decision;

    fn decide(&self, view: &TurnView<'_>) -> Decision;
}

/// The one implementation of [`OfferStrategy`] used by both sides
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiator {
    side: Side,
    pricing: PricingModel,
    terms: StrategyTerms,
}

impl Negotiator {
    pub fn new(side: Side, pricing: PricingModel, terms: StrategyTerms) -> Self {
        Self {
            side,
            pricing,
            terms,
        }
    }

    pub fn buyer() -> Self {
        Self::new(Side::Buyer, PricingModel::buyer(), StrategyTerms::buyer())
    }

    pub fn seller() -> Self {
        Self::new(Side::Seller, PricingModel::seller(), StrategyTerms::seller())
    }

    pub fn with_pricing(mut self, pricing: PricingModel) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn pricing(&self) -> &PricingModel {
        &self.pricing
    }

    pub fn terms(&self) -> &StrategyTerms {
        &self.terms
    }

    /// Unclamped counter from the side's rule
    fn propose(&self, view: &TurnView<'_>, fair: u64) -> u64 {
        let side = self.side;
        let step = self.terms.schedule.step_bps(view.rounds_remaining());

        match self.terms.counter {
            CounterRule::Anchored {
                midpoint_bps,
                early_cap_bps,
                closing_floor_bps,
                ..
            } => {
                let anchor = view
                    .own_last
                    .unwrap_or_else(|| scale(fair, self.terms.opening_bps));
                let target = side.clamp(view.counter_price, view.limit);
                let midpoint = scale(anchor.saturating_add(target), midpoint_bps) / 2;
                let stepped = scale(anchor, side.toward(BPS_SCALE, step));

                let candidate = side.clamp(
                    side.concede(side.concede(anchor, stepped), midpoint),
                    view.limit,
                );

                if self.terms.counter.is_closing(view) {
                    side.clamp(
                        side.concede(candidate, scale(fair, closing_floor_bps)),
                        view.limit,
                    )
                } else {
                    side.hold(candidate, side.concede(scale(fair, early_cap_bps), anchor))
                }
            }
            CounterRule::Decaying {
                decay_bps,
                decay_rounds,
                support_bps,
                ..
            } => {
                let index = view.round.saturating_sub(1);
                let decay = decay_bps * u64::from(index.min(decay_rounds));
                let ask = scale(fair, side.toward(self.terms.opening_bps, decay));
                let support = side.hold(view.counter_price, scale(fair, support_bps));
                let midpoint = midpoint_of(ask, support);

                let floor = if self.terms.counter.is_closing(view) {
                    fair
                } else {
                    scale(fair, side.away(BPS_SCALE, step))
                };

                side.hold(midpoint, floor)
            }
        }
    }
}

fn midpoint_of(a: u64, b: u64) -> u64 {
    let sum = u128::from(a) + u128::from(b);
    u64::try_from(sum / 2).unwrap_or(u64::MAX)
}

impl OfferStrategy for Negotiator {
    fn side(&self) -> Side {
        self.side
    }

    fn fair_price(&self, product: &Product) -> u64 {
        self.pricing.fair_price(product)
    }

    fn target_zone(&self, product: &Product) -> (u64, u64) {
        let fair = self.fair_price(product);
        (
            scale(fair, self.terms.zone.low_bps),
            scale(fair, self.terms.zone.high_bps),
        )
    }

    fn opening(&self, product: &Product, limit: Option<u64>) -> Decision {
        let fair = self.fair_price(product);
        let price = self.side.clamp(scale(fair, self.terms.opening_bps), limit);
        Decision::opening(price)
    }

    fn decide(&self, view: &TurnView<'_>) -> Decision {
        let side = self.side;
        let fair = self.fair_price(view.product);
        let (low, high) = self.target_zone(view.product);
        let price = view.counter_price;
        let acceptable = side.within_limit(price, view.limit);

        if acceptable && (low..=high).contains(&price) {
            return Decision::accept(price, DecisionReason::ZoneAccept);
        }

        if acceptable && side.favours(price, scale(fair, self.terms.snap_bps)) {
            return Decision::accept(price, DecisionReason::SnapAccept);
        }

        let proposal = side.clamp(self.propose(view, fair), view.limit);

        if let Some(band_bps) = self.terms.convergence_bps {
            if acceptable && price.abs_diff(proposal) <= scale(fair, band_bps) {
                return Decision::accept(price, DecisionReason::ConvergenceAccept);
            }
        }

        if self.terms.accept_dominated && acceptable && side.favours(price, proposal) {
            return Decision::accept(price, DecisionReason::DominanceAccept);
        }

        let reason = if self.terms.counter.is_closing(view) {
            DecisionReason::FinalCounter
        } else {
            DecisionReason::Counter
        };
        Decision::counter(proposal, reason)
    }
}
