use super::config::TariffConfig;
use super::schedule::{BRACKET_COUNT, ZONE_COUNT};

/// Validate a configured tariff schedule at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_tariff(config: &TariffConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.brackets.len() != BRACKET_COUNT {
        errors.push(format!(
            "tariff.brackets: expected {} brackets, found {}",
            BRACKET_COUNT,
            config.brackets.len()
        ));
    }

    let mut previous_ceiling: Option<f64> = None;
    for (i, bracket) in config.brackets.iter().enumerate() {
        if !bracket.max_kg.is_finite() || bracket.max_kg <= 0.0 {
            errors.push(format!(
                "tariff.brackets[{}].max_kg: must be a positive number, got {}",
                i, bracket.max_kg
            ));
        } else if let Some(prev) = previous_ceiling {
            if bracket.max_kg <= prev {
                errors.push(format!(
                    "tariff.brackets[{}].max_kg: {} must be greater than the previous ceiling {}",
                    i, bracket.max_kg, prev
                ));
            }
        }
        previous_ceiling = Some(bracket.max_kg);

        check_prices(
            &format!("tariff.brackets[{}].prices", i),
            &bracket.prices,
            &mut errors,
        );
    }

    check_prices("tariff.overage", &config.overage, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_prices(path: &str, prices: &[f64], errors: &mut Vec<String>) {
    if prices.len() != ZONE_COUNT {
        errors.push(format!(
            "{}: expected {} zone prices, found {}",
            path,
            ZONE_COUNT,
            prices.len()
        ));
    }
    for (zone, price) in prices.iter().enumerate() {
        if !price.is_finite() || *price < 0.0 {
            errors.push(format!(
                "{}[{}]: zone {} price must be a non-negative number, got {}",
                path,
                zone,
                zone + 1,
                price
            ));
        }
    }
}
