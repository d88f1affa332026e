use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const GRAMS_PER_KG: Decimal = dec!(1000);
const CM_PER_DM: Decimal = dec!(10);
/// Cubic decimeters per volumetric unit.
const VOLUMETRIC_DIVISOR: Decimal = dec!(4000);

/// The schema-dependent input used to derive volumetric weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurements {
    Dimensional {
        height_cm: Decimal,
        width_cm: Decimal,
        length_cm: Decimal,
    },
    Assessed {
        assessed_grams: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBreakdown {
    pub actual_kg: Decimal,
    pub volumetric_kg: Decimal,
    /// Greater of actual and volumetric weight
    pub billable_kg: Decimal,
}

pub fn actual_weight(grams: Decimal) -> Decimal {
    grams / GRAMS_PER_KG
}

pub fn volumetric_weight(measurements: &Measurements) -> Decimal {
    match *measurements {
        Measurements::Dimensional {
            height_cm,
            width_cm,
            length_cm,
        } => {
            let volume_dm3 =
                (height_cm / CM_PER_DM) * (width_cm / CM_PER_DM) * (length_cm / CM_PER_DM);
            volume_dm3 / VOLUMETRIC_DIVISOR / GRAMS_PER_KG
        }
        Measurements::Assessed { assessed_grams } => assessed_grams / GRAMS_PER_KG,
    }
}

pub fn billable_weight(actual_grams: Decimal, measurements: &Measurements) -> WeightBreakdown {
    let actual_kg = actual_weight(actual_grams);
    let volumetric_kg = volumetric_weight(measurements);
    WeightBreakdown {
        actual_kg,
        volumetric_kg,
        billable_kg: actual_kg.max(volumetric_kg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(h: Decimal, w: Decimal, l: Decimal) -> Measurements {
        Measurements::Dimensional {
            height_cm: h,
            width_cm: w,
            length_cm: l,
        }
    }

    #[test]
    fn test_actual_weight_converts_grams() {
        assert_eq!(actual_weight(dec!(1500)), dec!(1.5));
        assert_eq!(actual_weight(dec!(250)), dec!(0.25));
    }

    #[test]
    fn test_dimensional_volumetric_weight() {
        // 200 x 200 x 200 dm3 = 8,000,000 / 4000 / 1000 = 2 kg
        assert_eq!(volumetric_weight(&dims(dec!(2000), dec!(2000), dec!(2000))), dec!(2));
        assert_eq!(volumetric_weight(&dims(dec!(30), dec!(20), dec!(10))), dec!(0.0000015));
    }

    #[test]
    fn test_assessed_volumetric_weight() {
        let m = Measurements::Assessed {
            assessed_grams: dec!(3200),
        };
        assert_eq!(volumetric_weight(&m), dec!(3.2));
    }

    #[test]
    fn test_billable_takes_actual_when_heavier() {
        let w = billable_weight(dec!(5000), &dims(dec!(30), dec!(20), dec!(10)));
        assert_eq!(w.actual_kg, dec!(5));
        assert_eq!(w.billable_kg, dec!(5));
    }

    #[test]
    fn test_billable_takes_volumetric_when_heavier() {
        let w = billable_weight(dec!(500), &Measurements::Assessed { assessed_grams: dec!(7000) });
        assert_eq!(w.billable_kg, dec!(7));
    }

    #[test]
    fn test_billable_never_below_either_operand() {
        let cases = [
            (dec!(0), dec!(0)),
            (dec!(499), dec!(500)),
            (dec!(25000.1), dec!(1)),
            (dec!(1), dec!(26000)),
            (dec!(7777), dec!(7777)),
        ];
        for (grams, assessed) in cases {
            let w = billable_weight(grams, &Measurements::Assessed { assessed_grams: assessed });
            assert!(w.billable_kg >= w.actual_kg);
            assert!(w.billable_kg >= w.volumetric_kg);
        }
    }
}
