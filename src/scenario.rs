//! Test scenarios: preset products, difficulty levels and a seeded
//! generator for random products.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NegotiationError, Result};
use crate::pricing::scale;
use crate::types::Product;

/// How much room the buyer has relative to the seller's reservation price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Buyer budget as a fraction of market price
    pub fn budget_bps(self) -> u64 {
        match self {
            Difficulty::Easy => 12_000,
            Difficulty::Medium => 10_000,
            Difficulty::Hard => 9_000,
        }
    }

    /// Seller reservation price as a fraction of market price
    pub fn seller_min_bps(self) -> u64 {
        match self {
            Difficulty::Easy => 8_000,
            Difficulty::Medium => 8_500,
            Difficulty::Hard => 8_200,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = NegotiationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(NegotiationError::InvalidScenario(format!(
                "Unknown difficulty: {}",
                other
            ))),
        }
    }
}

/// Preset product names accepted by [`preset`]
pub const PRESETS: [&str; 3] = ["alphonso", "kesar", "arabica"];

/// Look up a preset product by short name
pub fn preset(name: &str) -> Result<Product> {
    match name.trim().to_lowercase().as_str() {
        "alphonso" => Ok(
            Product::new("Alphonso Mangoes", "Mangoes", 100, "A", "Ratnagiri", 180000)
                .with_attribute("ripeness", "optimal".into())
                .with_attribute("export_grade", true.into()),
        ),
        "kesar" => Ok(
            Product::new("Kesar Mangoes", "Mangoes", 150, "B", "Gujarat", 150000)
                .with_attribute("ripeness", "semi-ripe".into())
                .with_attribute("export_grade", false.into()),
        ),
        "arabica" => Ok(
            Product::new("Arabica Coffee Beans", "Coffee", 200, "A", "Colombia", 240000)
                .with_attribute("roast", "green".into())
                .with_attribute("screen_size", "17/18".into())
                .with_attribute("crop_year", "2024-25".into()),
        ),
        other => Err(NegotiationError::UnknownPreset(other.to_string())),
    }
}

/// All preset products, in [`PRESETS`] order
pub fn presets() -> Vec<Product> {
    PRESETS.iter().filter_map(|name| preset(name).ok()).collect()
}

/// A product plus the private limits of both sides
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    pub product: Product,
    pub difficulty: Difficulty,
    pub budget: u64,
    pub seller_min: u64,
}

impl Scenario {
    /// Budget and reservation derived from the difficulty
    pub fn new(product: Product, difficulty: Difficulty) -> Result<Self> {
        let market = product.base_market_price;
        let scenario = Self {
            label: format!("{} - {}", product.name, difficulty),
            budget: scale(market, difficulty.budget_bps()),
            seller_min: scale(market, difficulty.seller_min_bps()),
            product,
            difficulty,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn with_budget(mut self, budget: u64) -> Result<Self> {
        self.budget = budget;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.product.base_market_price == 0 {
            return Err(NegotiationError::InvalidScenario(format!(
                "{}: market price must be positive",
                self.product.name
            )));
        }
        if self.budget == 0 {
            return Err(NegotiationError::InvalidScenario(format!(
                "{}: budget must be positive",
                self.product.name
            )));
        }
        Ok(())
    }
}

/// Every preset at every difficulty
pub fn suite() -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for product in presets() {
        for difficulty in Difficulty::ALL {
            scenarios.push(Scenario::new(product.clone(), difficulty)?);
        }
    }
    Ok(scenarios)
}

const CATEGORIES: [(&str, &str); 5] = [
    ("Mangoes", "Mangoes"),
    ("Coffee", "Coffee Beans"),
    ("Tea", "Tea Leaves"),
    ("Spices", "Cardamom"),
    ("Rice", "Basmati Rice"),
];

const ORIGINS: [&str; 7] = [
    "Ratnagiri",
    "Gujarat",
    "Colombia",
    "Ethiopia",
    "Yirgacheffe",
    "Kerala",
    "Darjeeling",
];

const GRADES: [&str; 4] = ["A", "B", "Export", "C"];

/// Reproducible random scenarios
pub struct ScenarioGenerator {
    rng: StdRng,
    generated: u64,
}

impl ScenarioGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            generated: 0,
        }
    }

    pub fn next_scenario(&mut self) -> Result<Scenario> {
        self.generated += 1;

        let (category, noun) = *CATEGORIES.choose(&mut self.rng).unwrap_or(&CATEGORIES[0]);
        let origin = *ORIGINS.choose(&mut self.rng).unwrap_or(&ORIGINS[0]);
        let grade = *GRADES.choose(&mut self.rng).unwrap_or(&GRADES[0]);
        let quantity = self.rng.gen_range(1..=400);
        let market = self.rng.gen_range(10_000..=1_000_000);
        let difficulty = *Difficulty::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Difficulty::Medium);

        let product = Product::new(
            format!("{} {} #{}", origin, noun, self.generated),
            category,
            quantity,
            grade,
            origin,
            market,
        );

        let mut scenario = Scenario::new(product, difficulty)?;
        // Jitter limits so the grid is not only three ratios
        let budget_bps = self.rng.gen_range(7_000..=13_000);
        let seller_bps = self.rng.gen_range(7_500..=9_500);
        scenario.budget = scale(market, budget_bps);
        scenario.seller_min = scale(market, seller_bps);
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn take(&mut self, count: usize) -> Result<Vec<Scenario>> {
        (0..count).map(|_| self.next_scenario()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualityGrade;

    #[test]
    fn test_presets() {
        let alphonso = preset("alphonso").unwrap();
        assert_eq!(alphonso.base_market_price, 180000);
        assert_eq!(alphonso.quality_grade, QualityGrade::A);
        assert_eq!(alphonso.attributes["ripeness"], "optimal");

        let kesar = preset("Kesar").unwrap();
        assert_eq!(kesar.quantity, 150);
        assert_eq!(kesar.quality_grade, QualityGrade::B);

        assert_eq!(presets().len(), 3);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            preset("durian"),
            Err(NegotiationError::UnknownPreset(name)) if name == "durian"
        ));
    }

    #[test]
    fn test_difficulty_limits() {
        let product = preset("alphonso").unwrap();

        let easy = Scenario::new(product.clone(), Difficulty::Easy).unwrap();
        assert_eq!(easy.budget, 216000);
        assert_eq!(easy.seller_min, 144000);

        let medium = Scenario::new(product.clone(), Difficulty::Medium).unwrap();
        assert_eq!(medium.budget, 180000);
        assert_eq!(medium.seller_min, 153000);

        let hard = Scenario::new(product, Difficulty::Hard).unwrap();
        assert_eq!(hard.budget, 162000);
        assert_eq!(hard.seller_min, 147600);
        assert_eq!(hard.label, "Alphonso Mangoes - hard");
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_invalid_scenarios() {
        let free = Product::new("Free", "Misc", 1, "A", "Nowhere", 0);
        assert!(Scenario::new(free, Difficulty::Easy).is_err());

        let scenario = Scenario::new(preset("kesar").unwrap(), Difficulty::Easy).unwrap();
        assert!(matches!(
            scenario.with_budget(0),
            Err(NegotiationError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_suite_covers_grid() {
        let scenarios = suite().unwrap();
        assert_eq!(scenarios.len(), 9);
        assert_eq!(scenarios[0].difficulty, Difficulty::Easy);
        assert_eq!(scenarios[8].product.name, "Arabica Coffee Beans");
    }

    #[test]
    fn test_generator_is_reproducible() {
        let first = ScenarioGenerator::new(42).take(20).unwrap();
        let second = ScenarioGenerator::new(42).take(20).unwrap();
        assert_eq!(first, second);

        for scenario in &first {
            assert!(scenario.budget > 0);
            assert!(scenario.product.base_market_price >= 10_000);
            assert!((1..=400).contains(&scenario.product.quantity));
        }
    }
}
