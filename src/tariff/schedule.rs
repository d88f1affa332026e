use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

use super::bracket::{self, Bracket};
use super::config::{BracketConfig, TariffConfig};
use super::validation::validate_tariff;

pub const ZONE_COUNT: usize = 5;
pub const BRACKET_COUNT: usize = 8;

const ZONE_NAMES: [&str; ZONE_COUNT] = [
    "Local",
    "Regional",
    "Nacional 1",
    "Nacional 2",
    "Principales",
];

/// Numeric tariff zone as it appears in a manifest. Only 1 to 5 are priced;
/// anything else is carried through and prices at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zone(pub i64);

impl Zone {
    /// Column index into a price row, if the zone is known.
    pub fn index(self) -> Option<usize> {
        match self.0 {
            1..=5 => Some((self.0 - 1) as usize),
            _ => None,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        self.index().map(|i| ZONE_NAMES[i])
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One finite weight bracket of the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightBracket {
    pub max_kg: Decimal,
    pub prices: [Decimal; ZONE_COUNT],
}

/// Immutable tariff table shared by every manifest processed in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffSchedule {
    name: String,
    brackets: Vec<WeightBracket>,
    ceilings: Vec<Decimal>,
    overage: [Decimal; ZONE_COUNT],
}

impl TariffSchedule {
    /// Build a schedule from its config representation, validating it first.
    pub fn from_config(config: &TariffConfig) -> Result<Self, Vec<String>> {
        validate_tariff(config)?;

        let mut errors = Vec::new();
        let brackets = config
            .brackets
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let path = format!("tariff.brackets[{}]", i);
                WeightBracket {
                    max_kg: to_decimal(b.max_kg, &format!("{}.max_kg", path), &mut errors),
                    prices: to_prices(&b.prices, &format!("{}.prices", path), &mut errors),
                }
            })
            .collect();
        let overage = to_prices(&config.overage, "tariff.overage", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        let name = config.name.clone().unwrap_or_else(|| "custom".to_string());
        Ok(Self::new(name, brackets, overage))
    }

    fn new(name: String, brackets: Vec<WeightBracket>, overage: [Decimal; ZONE_COUNT]) -> Self {
        let ceilings = brackets.iter().map(|b| b.max_kg).collect();
        Self {
            name,
            brackets,
            ceilings,
            overage,
        }
    }

    /// Config representation of this schedule (used by `init`).
    pub fn to_config(&self) -> TariffConfig {
        let to_f64 = |d: &Decimal| d.to_f64().unwrap_or_default();
        TariffConfig {
            name: Some(self.name.clone()),
            brackets: self
                .brackets
                .iter()
                .map(|b| BracketConfig {
                    max_kg: to_f64(&b.max_kg),
                    prices: b.prices.iter().map(to_f64).collect(),
                })
                .collect(),
            overage: self.overage.iter().map(to_f64).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brackets(&self) -> &[WeightBracket] {
        &self.brackets
    }

    pub fn overage_prices(&self) -> &[Decimal; ZONE_COUNT] {
        &self.overage
    }

    /// Ceiling of the heaviest finite bracket; the overage formula starts here.
    pub fn top_ceiling(&self) -> Decimal {
        self.ceilings.last().copied().unwrap_or_default()
    }

    pub fn top_bracket(&self) -> Bracket {
        Bracket::Tier(self.brackets.len().saturating_sub(1))
    }

    pub fn resolve_bracket(&self, weight_kg: Decimal) -> Bracket {
        bracket::resolve_bracket(&self.ceilings, weight_kg)
    }

    pub fn bracket_label(&self, bracket: Bracket) -> String {
        bracket::bracket_label(&self.ceilings, bracket)
    }

    /// Unit price for a bracket and zone. Unknown zones and brackets price at
    /// zero instead of failing.
    pub fn lookup(&self, bracket: Bracket, zone: Zone) -> Decimal {
        let Some(z) = zone.index() else {
            return Decimal::ZERO;
        };
        match bracket {
            Bracket::Tier(i) => self.brackets.get(i).map(|b| b.prices[z]).unwrap_or_default(),
            Bracket::Overage => self.overage[z],
        }
    }

    /// Same as [`lookup`](Self::lookup), keyed by a label such as `"2 - 5"`.
    pub fn lookup_label(&self, label: &str, zone: Zone) -> Decimal {
        bracket::parse_bracket_label(&self.ceilings, label)
            .map(|b| self.lookup(b, zone))
            .unwrap_or_default()
    }

    /// Per-kilogram price above the top ceiling.
    pub fn lookup_overage(&self, zone: Zone) -> Decimal {
        self.lookup(Bracket::Overage, zone)
    }
}

/// Ceilings (kg) and per-zone prices of the domestic schedule.
#[rustfmt::skip]
const DEFAULT_BRACKETS: [(Decimal, [Decimal; ZONE_COUNT]); BRACKET_COUNT] = [
    (dec!(0.5), [dec!(4531.27),  dec!(5858.26),  dec!(6073.39),  dec!(6412.57),  dec!(5169.05)]),
    (dec!(1),   [dec!(4604.73),  dec!(5949.21),  dec!(6164.27),  dec!(6503.54),  dec!(5249.31)]),
    (dec!(2),   [dec!(4706.84),  dec!(6131.54),  dec!(6413.22),  dec!(7543.44),  dec!(5410.18)]),
    (dec!(5),   [dec!(5007.47),  dec!(6819.16),  dec!(7475.90),  dec!(9363.50),  dec!(6016.92)]),
    (dec!(10),  [dec!(6445.03),  dec!(8537.37),  dec!(10903.62), dec!(13290.07), dec!(7532.97)]),
    (dec!(15),  [dec!(7740.28),  dec!(10870.36), dec!(14599.45), dec!(18768.19), dec!(9591.49)]),
    (dec!(20),  [dec!(9518.85),  dec!(13923.42), dec!(19497.67), dec!(25851.92), dec!(12285.36)]),
    (dec!(25),  [dec!(10567.75), dec!(16072.51), dec!(23152.42), dec!(31505.53), dec!(14181.61)]),
];

const DEFAULT_OVERAGE: [Decimal; ZONE_COUNT] =
    [dec!(214.95), dec!(455.41), dec!(527.41), dec!(913.82), dec!(401.83)];

impl Default for TariffSchedule {
    /// The domestic schedule shipped with the tool.
    fn default() -> Self {
        let brackets = DEFAULT_BRACKETS
            .iter()
            .map(|&(max_kg, prices)| WeightBracket { max_kg, prices })
            .collect();
        Self::new("default".to_string(), brackets, DEFAULT_OVERAGE)
    }
}

fn to_decimal(value: f64, path: &str, errors: &mut Vec<String>) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        errors.push(format!("{}: {} is not representable as a decimal", path, value));
        Decimal::ZERO
    })
}

fn to_prices(values: &[f64], path: &str, errors: &mut Vec<String>) -> [Decimal; ZONE_COUNT] {
    let mut prices = [Decimal::ZERO; ZONE_COUNT];
    for (i, (slot, value)) in prices.iter_mut().zip(values).enumerate() {
        *slot = to_decimal(*value, &format!("{}[{}]", path, i), errors);
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_names() {
        assert_eq!(Zone(1).name(), Some("Local"));
        assert_eq!(Zone(3).name(), Some("Nacional 1"));
        assert_eq!(Zone(5).name(), Some("Principales"));
        assert_eq!(Zone(0).name(), None);
        assert_eq!(Zone(6).name(), None);
        assert_eq!(Zone(-1).index(), None);
    }

    #[test]
    fn test_lookup_known_cells() {
        let schedule = TariffSchedule::default();
        assert_eq!(schedule.lookup(Bracket::Tier(0), Zone(1)), dec!(4531.27));
        assert_eq!(schedule.lookup(Bracket::Tier(3), Zone(4)), dec!(9363.50));
        assert_eq!(schedule.lookup(Bracket::Tier(7), Zone(5)), dec!(14181.61));
        assert_eq!(schedule.lookup_overage(Zone(2)), dec!(455.41));
    }

    #[test]
    fn test_lookup_fails_open() {
        let schedule = TariffSchedule::default();
        assert_eq!(schedule.lookup(Bracket::Tier(0), Zone(0)), Decimal::ZERO);
        assert_eq!(schedule.lookup(Bracket::Tier(2), Zone(9)), Decimal::ZERO);
        assert_eq!(schedule.lookup(Bracket::Tier(8), Zone(1)), Decimal::ZERO);
        assert_eq!(schedule.lookup_overage(Zone(-4)), Decimal::ZERO);
        assert_eq!(schedule.lookup_label("25 - 30", Zone(1)), Decimal::ZERO);
    }

    #[test]
    fn test_lookup_by_label() {
        let schedule = TariffSchedule::default();
        assert_eq!(schedule.lookup_label("20 - 25", Zone(1)), dec!(10567.75));
        assert_eq!(schedule.lookup_label("Excedente", Zone(4)), dec!(913.82));
    }

    #[test]
    fn test_prices_non_decreasing_across_brackets() {
        let schedule = TariffSchedule::default();
        for zone in 1..=5 {
            let zone = Zone(zone);
            let prices: Vec<Decimal> = (0..BRACKET_COUNT)
                .map(|i| schedule.lookup(Bracket::Tier(i), zone))
                .collect();
            assert!(
                prices.windows(2).all(|w| w[0] <= w[1]),
                "zone {} prices decrease: {:?}",
                zone,
                prices
            );
        }
    }

    #[test]
    fn test_top_bracket() {
        let schedule = TariffSchedule::default();
        assert_eq!(schedule.top_ceiling(), dec!(25));
        assert_eq!(schedule.top_bracket(), Bracket::Tier(7));
        assert_eq!(schedule.bracket_label(schedule.top_bracket()), "20 - 25");
    }

    #[test]
    fn test_config_roundtrip_preserves_prices() {
        let schedule = TariffSchedule::default();
        let rebuilt = TariffSchedule::from_config(&schedule.to_config()).unwrap();
        assert_eq!(rebuilt, schedule);
    }

    #[test]
    fn test_from_config_reports_validation_errors() {
        let mut config = TariffSchedule::default().to_config();
        config.overage.clear();
        let errors = TariffSchedule::from_config(&config).unwrap_err();
        assert!(errors[0].contains("tariff.overage"));
    }
}
