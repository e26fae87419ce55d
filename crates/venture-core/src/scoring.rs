use serde::{Deserialize, Serialize};

use crate::inputs::{
    AssetIntensity, Inevitability, MarketSignal, StructuralPosition, UnitEconomics,
    ValueChainPosition, VentureInput,
};
use crate::verdict::Verdict;

/// Growth strictly above this rate earns [`STRONG_GROWTH_POINTS`].
pub const STRONG_GROWTH_ABOVE: f64 = 20.0;
pub const STRONG_GROWTH_POINTS: i32 = 50;
/// Growth strictly above this rate (and not strong) earns [`MODERATE_GROWTH_POINTS`].
pub const MODERATE_GROWTH_ABOVE: f64 = 5.0;
pub const MODERATE_GROWTH_POINTS: i32 = 20;
pub const STAGNANT_GROWTH_POINTS: i32 = -10;

/// Largest attainable raw analyst sum (IP owner + light assets).
pub const ANALYST_NORMALIZER: f64 = 160.0;

pub const VISIONARY_WEIGHT: f64 = 0.3;
pub const ANALYST_WEIGHT: f64 = 0.3;
pub const UNIT_WEIGHT: f64 = 0.4;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

impl Inevitability {
    pub const fn visionary_points(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Maybe => 10,
            Self::Mandated => 50,
        }
    }
}

impl ValueChainPosition {
    pub const fn analyst_points(self) -> u32 {
        match self {
            Self::Commodity => 0,
            Self::Middleman => 20,
            Self::Aggregator => 80,
            Self::IpOwner => 100,
        }
    }
}

impl AssetIntensity {
    pub const fn analyst_points(self) -> u32 {
        match self {
            Self::Heavy => 10,
            Self::Medium => 40,
            Self::Light => 60,
        }
    }
}

/// Three-step classification of a single sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTier {
    /// Price does not cover the direct cost of the unit.
    Underwater,
    /// Covers direct cost but not the cost of acquiring the customer.
    Subsidized,
    /// Profitable after acquisition cost.
    Profitable,
}

impl UnitTier {
    pub fn classify(economics: &UnitEconomics) -> Self {
        if economics.contribution_margin() <= 0.0 {
            Self::Underwater
        } else if economics.net_unit_profit() < 0.0 {
            Self::Subsidized
        } else {
            Self::Profitable
        }
    }

    pub const fn score(self) -> u8 {
        match self {
            Self::Underwater => 0,
            Self::Subsidized => 40,
            Self::Profitable => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VentureAssessment {
    pub visionary_score: i32,
    pub analyst_score: f64,
    /// Always `unit_tier.score()`.
    pub unit_score: u8,
    pub unit_tier: UnitTier,
    pub final_score: f64,
    pub verdict: Verdict,
    pub contribution_margin: f64,
    pub net_unit_profit: f64,
}

pub fn growth_points(growth_rate: f64) -> i32 {
    if growth_rate > STRONG_GROWTH_ABOVE {
        STRONG_GROWTH_POINTS
    } else if growth_rate > MODERATE_GROWTH_ABOVE {
        MODERATE_GROWTH_POINTS
    } else {
        STAGNANT_GROWTH_POINTS
    }
}

pub fn visionary_score(market: &MarketSignal) -> i32 {
    growth_points(market.growth_rate) + market.inevitability.visionary_points()
}

pub fn analyst_score(structure: &StructuralPosition) -> f64 {
    let raw = structure.value_chain_position.analyst_points()
        + structure.asset_intensity.analyst_points();
    (f64::from(raw) / ANALYST_NORMALIZER * 100.0).min(SCORE_MAX)
}

pub fn unit_score(economics: &UnitEconomics) -> u8 {
    UnitTier::classify(economics).score()
}

pub fn composite_score(visionary: i32, analyst: f64, unit: u8) -> f64 {
    let weighted = VISIONARY_WEIGHT * f64::from(visionary)
        + ANALYST_WEIGHT * analyst
        + UNIT_WEIGHT * f64::from(unit);
    weighted.clamp(SCORE_MIN, SCORE_MAX)
}

pub fn score(input: &VentureInput) -> VentureAssessment {
    let visionary_score = visionary_score(&input.market);
    let analyst_score = analyst_score(&input.structure);
    let unit_tier = UnitTier::classify(&input.economics);
    let unit_score = unit_tier.score();
    let final_score = composite_score(visionary_score, analyst_score, unit_score);

    VentureAssessment {
        visionary_score,
        analyst_score,
        unit_score,
        unit_tier,
        final_score,
        verdict: Verdict::from_score(final_score),
        contribution_margin: input.economics.contribution_margin(),
        net_unit_profit: input.economics.net_unit_profit(),
    }
}
