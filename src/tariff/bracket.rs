use rust_decimal::Decimal;

/// Label of the tier above the top bracket ceiling.
pub const OVERAGE_LABEL: &str = "Excedente";

/// Position of a weight within a tariff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    /// Finite bracket, by ordinal position (0 = lightest)
    Tier(usize),
    /// Weight strictly above the top ceiling
    Overage,
}

/// Resolve a weight against ascending, upper-inclusive ceilings.
///
/// A weight sitting exactly on a ceiling belongs to the lower bracket. Negative
/// weights are not rejected and fall into the first bracket.
pub fn resolve_bracket(ceilings: &[Decimal], weight_kg: Decimal) -> Bracket {
    ceilings
        .iter()
        .position(|ceiling| weight_kg <= *ceiling)
        .map(Bracket::Tier)
        .unwrap_or(Bracket::Overage)
}

/// Render a bracket as "low - high", using the previous ceiling as the lower
/// bound (0 for the first bracket). Unknown tiers render as the overage label.
pub fn bracket_label(ceilings: &[Decimal], bracket: Bracket) -> String {
    match bracket {
        Bracket::Tier(i) if i < ceilings.len() => {
            let low = if i == 0 { Decimal::ZERO } else { ceilings[i - 1] };
            format!("{} - {}", low.normalize(), ceilings[i].normalize())
        }
        _ => OVERAGE_LABEL.to_string(),
    }
}

/// Inverse of [`bracket_label`]. Whitespace around the dash is optional.
pub fn parse_bracket_label(ceilings: &[Decimal], label: &str) -> Option<Bracket> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(OVERAGE_LABEL) {
        return Some(Bracket::Overage);
    }
    let (low, high) = label.split_once('-')?;
    let low: Decimal = low.trim().parse().ok()?;
    let high: Decimal = high.trim().parse().ok()?;

    let i = ceilings.iter().position(|c| *c == high)?;
    let expected_low = if i == 0 { Decimal::ZERO } else { ceilings[i - 1] };
    (low == expected_low).then_some(Bracket::Tier(i))
}
