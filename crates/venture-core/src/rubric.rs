//! The scoring framework as publishable data.
//!
//! Every number here is read from the same constants and point tables the
//! scorer uses, so the published rubric cannot drift from the arithmetic.

use serde::Serialize;

use crate::inputs::{AssetIntensity, Inevitability, ValueChainPosition};
use crate::scoring::{
    UnitTier, ANALYST_NORMALIZER, ANALYST_WEIGHT, MODERATE_GROWTH_ABOVE, MODERATE_GROWTH_POINTS,
    STAGNANT_GROWTH_POINTS, STRONG_GROWTH_ABOVE, STRONG_GROWTH_POINTS, UNIT_WEIGHT,
    VISIONARY_WEIGHT,
};
use crate::verdict::{Verdict, CAUTION_THRESHOLD, UNICORN_THRESHOLD};

#[derive(Debug, Clone, Serialize)]
pub struct GrowthBand {
    /// Exclusive lower bound; `None` for the catch-all band.
    pub above: Option<f64>,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPoints {
    pub kind: &'static str,
    pub label: &'static str,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitTierPoints {
    pub tier: UnitTier,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Weights {
    pub visionary: f64,
    pub analyst: f64,
    pub unit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerdictBand {
    pub verdict: Verdict,
    /// Inclusive lower bound on the clamped composite score.
    pub at_least: f64,
    pub headline: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rubric {
    pub growth_bands: Vec<GrowthBand>,
    pub inevitability: Vec<CategoryPoints>,
    pub value_chain_position: Vec<CategoryPoints>,
    pub asset_intensity: Vec<CategoryPoints>,
    pub analyst_normalizer: f64,
    pub unit_tiers: Vec<UnitTierPoints>,
    pub weights: Weights,
    pub verdicts: Vec<VerdictBand>,
}

impl Rubric {
    pub fn standard() -> Self {
        Self {
            growth_bands: vec![
                GrowthBand {
                    above: Some(STRONG_GROWTH_ABOVE),
                    points: STRONG_GROWTH_POINTS,
                },
                GrowthBand {
                    above: Some(MODERATE_GROWTH_ABOVE),
                    points: MODERATE_GROWTH_POINTS,
                },
                GrowthBand {
                    above: None,
                    points: STAGNANT_GROWTH_POINTS,
                },
            ],
            inevitability: Inevitability::ALL
                .iter()
                .map(|kind| CategoryPoints {
                    kind: kind.as_str(),
                    label: kind.label(),
                    points: i64::from(kind.visionary_points()),
                })
                .collect(),
            value_chain_position: ValueChainPosition::ALL
                .iter()
                .map(|kind| CategoryPoints {
                    kind: kind.as_str(),
                    label: kind.label(),
                    points: i64::from(kind.analyst_points()),
                })
                .collect(),
            asset_intensity: AssetIntensity::ALL
                .iter()
                .map(|kind| CategoryPoints {
                    kind: kind.as_str(),
                    label: kind.label(),
                    points: i64::from(kind.analyst_points()),
                })
                .collect(),
            analyst_normalizer: ANALYST_NORMALIZER,
            unit_tiers: [UnitTier::Underwater, UnitTier::Subsidized, UnitTier::Profitable]
                .iter()
                .map(|tier| UnitTierPoints {
                    tier: *tier,
                    score: tier.score(),
                })
                .collect(),
            weights: Weights {
                visionary: VISIONARY_WEIGHT,
                analyst: ANALYST_WEIGHT,
                unit: UNIT_WEIGHT,
            },
            verdicts: vec![
                VerdictBand {
                    verdict: Verdict::Unicorn,
                    at_least: UNICORN_THRESHOLD,
                    headline: Verdict::Unicorn.headline(),
                },
                VerdictBand {
                    verdict: Verdict::Caution,
                    at_least: CAUTION_THRESHOLD,
                    headline: Verdict::Caution.headline(),
                },
                VerdictBand {
                    verdict: Verdict::NoGo,
                    at_least: 0.0,
                    headline: Verdict::NoGo.headline(),
                },
            ],
        }
    }

    /// Largest raw analyst sum any structural position can reach.
    pub fn max_analyst_sum(&self) -> i64 {
        let best = |rows: &[CategoryPoints]| {
            rows.iter().map(|row| row.points).max().unwrap_or(0)
        };
        best(&self.value_chain_position) + best(&self.asset_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizer_matches_best_structural_position() {
        let rubric = Rubric::standard();
        assert_eq!(rubric.max_analyst_sum(), 160);
        assert_eq!(rubric.analyst_normalizer, 160.0);
    }

    #[test]
    fn weights_sum_to_one() {
        let weights = Rubric::standard().weights;
        assert!((weights.visionary + weights.analyst + weights.unit - 1.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_category_tables_with_labels() {
        let value = serde_json::to_value(Rubric::standard()).expect("serialize rubric");
        assert_eq!(value["value_chain_position"][3]["kind"], "ip_owner");
        assert_eq!(value["value_chain_position"][3]["points"], 100);
        assert_eq!(value["inevitability"][2]["label"], "Yes (Laws/Physics mandate it)");
        assert_eq!(value["verdicts"][2]["verdict"], "NO_GO");
        assert_eq!(value["unit_tiers"][1]["tier"], "subsidized");
    }
}
