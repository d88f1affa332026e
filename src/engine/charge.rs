use rust_decimal::Decimal;

use crate::tariff::{Bracket, TariffSchedule, Zone};

/// Expected charge for one shipment and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    pub bracket: Bracket,
    /// Flat bracket price (the top bracket's price for overage shipments)
    pub base: Decimal,
    /// Kilograms above the top ceiling; zero unless in overage
    pub excess_kg: Decimal,
    pub overage_rate: Decimal,
    pub total: Decimal,
}

/// Expected charge for a billable weight in a zone.
///
/// Up to the top ceiling the bracket price applies as is. Above it the top
/// bracket's flat price is charged plus the zone's overage rate for every
/// kilogram (or fraction) beyond the ceiling. Amounts are exact; nothing is
/// rounded here.
///
/// Returns None when the overage total does not fit in a decimal.
pub fn expected_charge(
    schedule: &TariffSchedule,
    billable_kg: Decimal,
    zone: Zone,
) -> Option<Charge> {
    let bracket = schedule.resolve_bracket(billable_kg);
    let charge = match bracket {
        Bracket::Overage => {
            let base = schedule.lookup(schedule.top_bracket(), zone);
            let excess_kg = billable_kg.checked_sub(schedule.top_ceiling())?;
            let overage_rate = schedule.lookup_overage(zone);
            Charge {
                bracket,
                base,
                excess_kg,
                overage_rate,
                total: excess_kg.checked_mul(overage_rate)?.checked_add(base)?,
            }
        }
        Bracket::Tier(_) => {
            let base = schedule.lookup(bracket, zone);
            Charge {
                bracket,
                base,
                excess_kg: Decimal::ZERO,
                overage_rate: Decimal::ZERO,
                total: base,
            }
        }
    };
    Some(charge)
}
