pub mod bracket;
pub mod config;
pub mod schedule;
pub mod validation;

pub use bracket::{Bracket, OVERAGE_LABEL};
pub use config::{BracketConfig, TariffConfig};
pub use schedule::{TariffSchedule, WeightBracket, Zone, BRACKET_COUNT, ZONE_COUNT};
pub use validation::validate_tariff;
