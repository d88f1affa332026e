use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

use super::charge::{expected_charge, Charge};
use super::input::ShipmentInput;
use super::weight::{billable_weight, WeightBreakdown};
use crate::error::AuditError;
use crate::table::schema::BILLED;
use crate::tariff::TariffSchedule;

/// Outcome of comparing the billed price with the expected charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    Ok,
    NeedsReview,
}

impl Review {
    pub fn as_str(self) -> &'static str {
        match self {
            Review::Ok => "ok",
            Review::NeedsReview => "needs review",
        }
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest row with every derived field filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRow {
    pub input: ShipmentInput,
    pub weight: WeightBreakdown,
    pub bracket_label: String,
    pub zone_name: Option<&'static str>,
    pub charge: Charge,
    /// Billed minus expected; negative means under-billed
    pub delta: Decimal,
    pub review: Review,
    /// Identifier occurs more than once in the manifest
    pub duplicate: bool,
}

impl ShipmentRow {
    pub fn expected(&self) -> Decimal {
        self.charge.total
    }
}

/// Billed minus expected, or None when the difference does not fit in a decimal.
pub fn price_delta(billed: Decimal, expected: Decimal) -> Option<Decimal> {
    billed.checked_sub(expected)
}

/// Exact comparison: any non-zero delta needs review, whatever its sign.
pub fn classify(delta: Decimal) -> Review {
    if delta.is_zero() {
        Review::Ok
    } else {
        Review::NeedsReview
    }
}

/// For each identifier, whether it appears more than once in the whole list.
pub fn duplicate_flags<S: AsRef<str>>(identifiers: &[S]) -> Vec<bool> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in identifiers {
        *counts.entry(id.as_ref()).or_default() += 1;
    }
    identifiers
        .iter()
        .map(|id| counts.get(id.as_ref()).copied().unwrap_or(0) > 1)
        .collect()
}

/// Derive weight, charge, delta and classification for every row, then flag
/// duplicates once the whole identifier column is known.
///
/// Fails on the first row whose charge or delta leaves the decimal range.
pub fn reconcile(
    schedule: &TariffSchedule,
    inputs: Vec<ShipmentInput>,
) -> Result<Vec<ShipmentRow>, AuditError> {
    let flags = {
        let identifiers: Vec<&str> = inputs.iter().map(|i| i.identifier.as_str()).collect();
        duplicate_flags(&identifiers)
    };

    inputs
        .into_iter()
        .zip(flags)
        .map(|(input, duplicate)| {
            let weight = billable_weight(input.actual_grams, &input.measurements);
            let charge = expected_charge(schedule, weight.billable_kg, input.zone).ok_or_else(|| {
                AuditError::Computation {
                    line: input.line,
                    field: "PESO A LIQUIDAR",
                    value: weight.billable_kg.to_string(),
                    reason: "expected charge is out of range",
                }
            })?;
            let delta = price_delta(input.billed, charge.total).ok_or_else(|| {
                AuditError::Computation {
                    line: input.line,
                    field: BILLED,
                    value: input.billed.to_string(),
                    reason: "difference from the expected charge is out of range",
                }
            })?;
            Ok(ShipmentRow {
                bracket_label: schedule.bracket_label(charge.bracket),
                zone_name: input.zone.name(),
                weight,
                charge,
                delta,
                review: classify(delta),
                duplicate,
                input,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::weight::Measurements;
    use crate::tariff::Zone;
    use rust_decimal_macros::dec;

    fn input(id: &str, zone: i64, grams: Decimal, billed: Decimal) -> ShipmentInput {
        ShipmentInput {
            line: 2,
            identifier: id.to_string(),
            zone: Zone(zone),
            actual_grams: grams,
            measurements: Measurements::Dimensional {
                height_cm: dec!(10),
                width_cm: dec!(10),
                length_cm: dec!(10),
            },
            billed,
            cells: vec![],
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(dec!(0)), Review::Ok);
        assert_eq!(classify(dec!(0.00)), Review::Ok);
        assert_eq!(classify(dec!(0.01)), Review::NeedsReview);
        assert_eq!(classify(dec!(-150)), Review::NeedsReview);
    }

    #[test]
    fn test_price_delta_sign() {
        assert_eq!(price_delta(dec!(100), dec!(80)), Some(dec!(20)));
        assert_eq!(price_delta(dec!(80), dec!(100)), Some(dec!(-20)));
        assert_eq!(price_delta(Decimal::MIN, dec!(1)), None);
    }

    #[test]
    fn test_duplicate_flags() {
        assert_eq!(
            duplicate_flags(&["A", "B", "A", "C"]),
            vec![true, false, true, false]
        );
        assert_eq!(duplicate_flags(&["X", "X", "X"]), vec![true, true, true]);
        assert!(duplicate_flags::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_reconcile_exact_billing_is_ok() {
        let schedule = TariffSchedule::default();
        let rows = reconcile(&schedule, vec![input("A", 1, dec!(400), dec!(4531.27))]).unwrap();
        let row = &rows[0];
        assert_eq!(row.bracket_label, "0 - 0.5");
        assert_eq!(row.zone_name, Some("Local"));
        assert_eq!(row.expected(), dec!(4531.27));
        assert_eq!(row.delta, Decimal::ZERO);
        assert_eq!(row.review, Review::Ok);
        assert!(!row.duplicate);
    }

    #[test]
    fn test_reconcile_over_and_under_billing() {
        let schedule = TariffSchedule::default();
        let rows = reconcile(
            &schedule,
            vec![
                input("A", 2, dec!(1500), dec!(6200)),
                input("B", 2, dec!(1500), dec!(6000)),
            ],
        )
        .unwrap();
        // 1 - 2 kg in zone 2 is 6131.54
        assert_eq!(rows[0].delta, dec!(68.46));
        assert_eq!(rows[1].delta, dec!(-131.54));
        assert!(rows.iter().all(|r| r.review == Review::NeedsReview));
    }

    #[test]
    fn test_reconcile_flags_duplicates_across_dataset() {
        let schedule = TariffSchedule::default();
        let rows = reconcile(
            &schedule,
            vec![
                input("A", 1, dec!(100), dec!(1)),
                input("B", 1, dec!(100), dec!(1)),
                input("A", 2, dec!(100), dec!(1)),
                input("C", 3, dec!(100), dec!(1)),
            ],
        )
        .unwrap();
        let flags: Vec<bool> = rows.iter().map(|r| r.duplicate).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn test_reconcile_unknown_zone() {
        let schedule = TariffSchedule::default();
        let rows = reconcile(&schedule, vec![input("Z", 8, dec!(100), dec!(0))]).unwrap();
        assert_eq!(rows[0].zone_name, None);
        assert_eq!(rows[0].expected(), Decimal::ZERO);
        assert_eq!(rows[0].review, Review::Ok);
    }

    #[test]
    fn test_billing_at_expected_charge_is_idempotent() {
        let schedule = TariffSchedule::default();
        let weights = [
            dec!(100),
            dec!(900),
            dec!(4999),
            dec!(25000),
            dec!(25000.1),
            dec!(61234),
        ];
        let first: Vec<ShipmentInput> = weights
            .iter()
            .enumerate()
            .map(|(i, g)| input(&i.to_string(), (i % 5) as i64 + 1, *g, dec!(0)))
            .collect();
        let rows = reconcile(&schedule, first).unwrap();

        let rebilled: Vec<ShipmentInput> = rows
            .iter()
            .map(|r| ShipmentInput {
                billed: r.expected(),
                ..r.input.clone()
            })
            .collect();
        let rows = reconcile(&schedule, rebilled).unwrap();
        assert!(rows.iter().all(|r| r.delta.is_zero() && r.review == Review::Ok));
    }

    #[test]
    fn test_charge_out_of_range_fails_with_row() {
        let mut config = TariffSchedule::default().to_config();
        config.overage = vec![1e12; 5];
        let schedule = TariffSchedule::from_config(&config).unwrap();

        let mut huge = input("H", 1, dec!(100), dec!(1));
        huge.line = 7;
        huge.measurements = Measurements::Dimensional {
            height_cm: dec!(1000000000),
            width_cm: dec!(1000000000),
            length_cm: dec!(1000000000),
        };
        let err = reconcile(&schedule, vec![input("A", 1, dec!(100), dec!(1)), huge]).unwrap_err();
        match err {
            AuditError::Computation { line, field, .. } => {
                assert_eq!(line, 7);
                assert_eq!(field, "PESO A LIQUIDAR");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
