//! Fair-price model.
//!
//! Both sides anchor their strategy on a "fair price" derived from the
//! product's market price and a table of multiplicative factors. Factors are
//! held in basis points and evaluated with exact integer arithmetic, so the
//! same product always yields the same price.

use serde::{Deserialize, Serialize};

use crate::types::{Product, QualityGrade};

/// One hundred percent, in basis points.
pub const BPS_SCALE: u64 = 10_000;

/// Origins that command a premium in the default tables.
pub const DEFAULT_BONUS_ORIGINS: [&str; 3] = ["colombia", "ethiopia", "yirgacheffe"];

/// `amount × bps / 10_000`, truncated toward zero.
pub fn scale(amount: u64, bps: u64) -> u64 {
    let scaled = u128::from(amount) * u128::from(bps) / u128::from(BPS_SCALE);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Integer division rounding half to even.
fn div_round_half_even(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let twice = remainder * 2;

    if twice > denominator || (twice == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Bulk discount applied once a lot reaches `min_quantity` units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    pub min_quantity: u32,
    pub bps: u64,
}

/// Factor table for one side of the negotiation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingModel {
    pub export_bps: u64,
    pub grade_a_bps: u64,
    pub grade_b_bps: u64,
    pub origin_bonus_bps: u64,
    /// Lower-cased origin names that earn the bonus
    pub bonus_origins: Vec<String>,
    pub volume_discount: Option<VolumeDiscount>,
    pub logistics_bps: u64,
}

impl PricingModel {
    /// Buyer table: quality, origin and a small bulk discount.
    pub fn buyer() -> Self {
        Self {
            export_bps: 11_500,
            grade_a_bps: 10_500,
            grade_b_bps: 9_500,
            origin_bonus_bps: 10_500,
            bonus_origins: default_bonus_origins(),
            volume_discount: Some(VolumeDiscount {
                min_quantity: 200,
                bps: 9_800,
            }),
            logistics_bps: BPS_SCALE,
        }
    }

    /// Seller table: slightly wider grade spread, a flat 1% logistics
    /// surcharge and no bulk discount.
    pub fn seller() -> Self {
        Self {
            export_bps: 11_500,
            grade_a_bps: 10_600,
            grade_b_bps: 9_400,
            origin_bonus_bps: 10_500,
            bonus_origins: default_bonus_origins(),
            volume_discount: None,
            logistics_bps: 10_100,
        }
    }

    /// Replace the bonus-origin set; names are matched case-insensitively.
    pub fn with_bonus_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bonus_origins = origins
            .into_iter()
            .map(|o| o.as_ref().trim().to_lowercase())
            .collect();
        self
    }

    pub fn quality_bps(&self, grade: QualityGrade) -> u64 {
        match grade {
            QualityGrade::Export => self.export_bps,
            QualityGrade::A => self.grade_a_bps,
            QualityGrade::B => self.grade_b_bps,
            QualityGrade::Ungraded => BPS_SCALE,
        }
    }

    pub fn origin_bps(&self, origin: &str) -> u64 {
        let origin = origin.trim().to_lowercase();
        if self.bonus_origins.iter().any(|o| *o == origin) {
            self.origin_bonus_bps
        } else {
            BPS_SCALE
        }
    }

    pub fn volume_bps(&self, quantity: u32) -> u64 {
        match self.volume_discount {
            Some(discount) if quantity >= discount.min_quantity => discount.bps,
            _ => BPS_SCALE,
        }
    }

    /// Fair price of `product` under this table, rounded half to even.
    pub fn fair_price(&self, product: &Product) -> u64 {
        let factors = [
            self.quality_bps(product.quality_grade),
            self.origin_bps(&product.origin),
            self.volume_bps(product.quantity),
            self.logistics_bps,
        ];

        let numerator = factors
            .iter()
            .fold(u128::from(product.base_market_price), |acc, bps| {
                acc * u128::from(*bps)
            });
        let denominator = u128::from(BPS_SCALE).pow(factors.len() as u32);

        u64::try_from(div_round_half_even(numerator, denominator)).unwrap_or(u64::MAX)
    }
}

impl Default for PricingModel {
    fn default() -> Self {
        Self::buyer()
    }
}

fn default_bonus_origins() -> Vec<String> {
    DEFAULT_BONUS_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// Reference fair price of a product (buyer table).
pub fn fair_price(product: &Product) -> u64 {
    PricingModel::buyer().fair_price(product)
}
