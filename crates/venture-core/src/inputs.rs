use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Lowest annual market growth rate (percent) the input layer accepts.
pub const GROWTH_RATE_MIN: f64 = -10.0;
/// Highest annual market growth rate (percent) the input layer accepts.
pub const GROWTH_RATE_MAX: f64 = 500.0;

/// Whether the future the venture bets on is forced by external constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inevitability {
    None,
    Maybe,
    Mandated,
}

impl Inevitability {
    pub const ALL: [Self; 3] = [Self::None, Self::Maybe, Self::Mandated];
    const EXPECTED: &'static str = "none, maybe, mandated";

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Maybe => "maybe",
            Self::Mandated => "mandated",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No (Purely consumer preference)",
            Self::Maybe => "Maybe (Some favorable trends)",
            Self::Mandated => "Yes (Laws/Physics mandate it)",
        }
    }
}

impl FromStr for Inevitability {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_kind(s).as_str() {
            "none" => Ok(Self::None),
            "maybe" => Ok(Self::Maybe),
            "mandated" => Ok(Self::Mandated),
            _ => Err(ScoreError::invalid_kind("inevitability", s, Self::EXPECTED)),
        }
    }
}

/// Where the venture sits in its industry's value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueChainPosition {
    Commodity,
    Middleman,
    Aggregator,
    IpOwner,
}

impl ValueChainPosition {
    pub const ALL: [Self; 4] = [
        Self::Commodity,
        Self::Middleman,
        Self::Aggregator,
        Self::IpOwner,
    ];
    const EXPECTED: &'static str = "commodity, middleman, aggregator, ip_owner";

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commodity => "commodity",
            Self::Middleman => "middleman",
            Self::Aggregator => "aggregator",
            Self::IpOwner => "ip_owner",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Commodity => "Commodity Producer (Price Taker)",
            Self::Middleman => "Middleman/Distributor (Squeezed)",
            Self::Aggregator => "Aggregator/Platform (Owns Customer)",
            Self::IpOwner => "IP/Bottleneck Owner (Price Maker)",
        }
    }
}

impl FromStr for ValueChainPosition {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_kind(s).as_str() {
            "commodity" => Ok(Self::Commodity),
            "middleman" => Ok(Self::Middleman),
            "aggregator" => Ok(Self::Aggregator),
            "ip_owner" => Ok(Self::IpOwner),
            _ => Err(ScoreError::invalid_kind(
                "value_chain_position",
                s,
                Self::EXPECTED,
            )),
        }
    }
}

/// How much capital the venture has to sink into physical assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetIntensity {
    Heavy,
    Medium,
    Light,
}

impl AssetIntensity {
    pub const ALL: [Self; 3] = [Self::Heavy, Self::Medium, Self::Light];
    const EXPECTED: &'static str = "heavy, medium, light";

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heavy => "heavy",
            Self::Medium => "medium",
            Self::Light => "light",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Heavy => "Heavy (Factories/Inventory)",
            Self::Medium => "Medium (Leased Assets)",
            Self::Light => "Light (Software/IP)",
        }
    }
}

impl FromStr for AssetIntensity {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_kind(s).as_str() {
            "heavy" => Ok(Self::Heavy),
            "medium" => Ok(Self::Medium),
            "light" => Ok(Self::Light),
            _ => Err(ScoreError::invalid_kind("asset_intensity", s, Self::EXPECTED)),
        }
    }
}

impl fmt::Display for Inevitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ValueChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssetIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_kind(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub growth_rate: f64,
    pub inevitability: Inevitability,
}

impl MarketSignal {
    /// Builds a signal with `growth_rate` pulled into the accepted input domain.
    pub fn clamped(growth_rate: f64, inevitability: Inevitability) -> Self {
        Self {
            growth_rate: growth_rate.clamp(GROWTH_RATE_MIN, GROWTH_RATE_MAX),
            inevitability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralPosition {
    pub value_chain_position: ValueChainPosition,
    pub asset_intensity: AssetIntensity,
}

/// Per-unit prices and costs, in currency units. Any sign is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub price: f64,
    pub cogs: f64,
    pub cac: f64,
}

impl UnitEconomics {
    pub fn contribution_margin(&self) -> f64 {
        self.price - self.cogs
    }

    pub fn net_unit_profit(&self) -> f64 {
        self.contribution_margin() - self.cac
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VentureInput {
    #[serde(flatten)]
    pub market: MarketSignal,
    #[serde(flatten)]
    pub structure: StructuralPosition,
    #[serde(flatten)]
    pub economics: UnitEconomics,
}

impl VentureInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        growth_rate: f64,
        inevitability: Inevitability,
        value_chain_position: ValueChainPosition,
        asset_intensity: AssetIntensity,
        price: f64,
        cogs: f64,
        cac: f64,
    ) -> Self {
        Self {
            market: MarketSignal {
                growth_rate,
                inevitability,
            },
            structure: StructuralPosition {
                value_chain_position,
                asset_intensity,
            },
            economics: UnitEconomics { price, cogs, cac },
        }
    }
}

/// Starting values of the input form.
impl Default for VentureInput {
    fn default() -> Self {
        Self::new(
            5.0,
            Inevitability::None,
            ValueChainPosition::Commodity,
            AssetIntensity::Heavy,
            100.0,
            60.0,
            20.0,
        )
    }
}

/// Unvalidated input as it arrives from a request body or command line.
///
/// Omitted fields fall back to [`VentureInput::default`]. Converting into a
/// [`VentureInput`] clamps `growth_rate` and rejects unknown category names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVentureInput {
    pub growth_rate: Option<f64>,
    pub inevitability: Option<String>,
    pub value_chain_position: Option<String>,
    pub asset_intensity: Option<String>,
    pub price: Option<f64>,
    pub cogs: Option<f64>,
    pub cac: Option<f64>,
}

impl TryFrom<RawVentureInput> for VentureInput {
    type Error = ScoreError;

    fn try_from(raw: RawVentureInput) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let inevitability = match raw.inevitability.as_deref() {
            Some(v) => v.parse()?,
            None => defaults.market.inevitability,
        };
        let value_chain_position = match raw.value_chain_position.as_deref() {
            Some(v) => v.parse()?,
            None => defaults.structure.value_chain_position,
        };
        let asset_intensity = match raw.asset_intensity.as_deref() {
            Some(v) => v.parse()?,
            None => defaults.structure.asset_intensity,
        };

        Ok(Self {
            market: MarketSignal::clamped(
                raw.growth_rate.unwrap_or(defaults.market.growth_rate),
                inevitability,
            ),
            structure: StructuralPosition {
                value_chain_position,
                asset_intensity,
            },
            economics: UnitEconomics {
                price: raw.price.unwrap_or(defaults.economics.price),
                cogs: raw.cogs.unwrap_or(defaults.economics.cogs),
                cac: raw.cac.unwrap_or(defaults.economics.cac),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_case_insensitively() {
        assert_eq!(
            "MANDATED".parse::<Inevitability>(),
            Ok(Inevitability::Mandated)
        );
        assert_eq!(
            " IP_OWNER ".parse::<ValueChainPosition>(),
            Ok(ValueChainPosition::IpOwner)
        );
        assert_eq!(
            "ip-owner".parse::<ValueChainPosition>(),
            Ok(ValueChainPosition::IpOwner)
        );
        assert_eq!("Light".parse::<AssetIntensity>(), Ok(AssetIntensity::Light));
    }

    #[test]
    fn display_labels_are_not_accepted_as_kinds() {
        let err = ValueChainPosition::IpOwner
            .label()
            .parse::<ValueChainPosition>()
            .expect_err("label must not parse");
        assert_eq!(err.field(), "value_chain_position");
    }

    #[test]
    fn unknown_kind_names_the_field() {
        let err = "definitely".parse::<Inevitability>().expect_err("reject");
        assert_eq!(
            err,
            ScoreError::InvalidInputKind {
                field: "inevitability",
                value: "definitely".to_string(),
                expected: "none, maybe, mandated",
            }
        );
        assert!(err.to_string().contains("definitely"));
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for kind in Inevitability::ALL {
            assert_eq!(kind.as_str().parse::<Inevitability>(), Ok(kind));
        }
        for kind in ValueChainPosition::ALL {
            assert_eq!(kind.to_string().parse::<ValueChainPosition>(), Ok(kind));
        }
        for kind in AssetIntensity::ALL {
            assert_eq!(kind.as_str().parse::<AssetIntensity>(), Ok(kind));
        }
    }

    #[test]
    fn raw_input_fills_defaults_and_clamps_growth() {
        let raw = RawVentureInput {
            growth_rate: Some(900.0),
            value_chain_position: Some("aggregator".to_string()),
            ..RawVentureInput::default()
        };
        let input = VentureInput::try_from(raw).expect("valid input");

        assert_eq!(input.market.growth_rate, GROWTH_RATE_MAX);
        assert_eq!(input.market.inevitability, Inevitability::None);
        assert_eq!(
            input.structure.value_chain_position,
            ValueChainPosition::Aggregator
        );
        assert_eq!(input.structure.asset_intensity, AssetIntensity::Heavy);
        assert_eq!(input.economics, VentureInput::default().economics);
    }

    #[test]
    fn raw_input_clamps_growth_from_below() {
        let raw = RawVentureInput {
            growth_rate: Some(-75.0),
            ..RawVentureInput::default()
        };
        let input = VentureInput::try_from(raw).expect("valid input");
        assert_eq!(input.market.growth_rate, GROWTH_RATE_MIN);
    }

    #[test]
    fn raw_input_rejects_unknown_asset_intensity() {
        let raw = RawVentureInput {
            asset_intensity: Some("weightless".to_string()),
            ..RawVentureInput::default()
        };
        let err = VentureInput::try_from(raw).expect_err("reject");
        assert_eq!(err.field(), "asset_intensity");
    }

    #[test]
    fn unit_economics_derives_margins() {
        let economics = UnitEconomics {
            price: 50.0,
            cogs: 55.0,
            cac: 5.0,
        };
        assert_eq!(economics.contribution_margin(), -5.0);
        assert_eq!(economics.net_unit_profit(), -10.0);
    }
}
