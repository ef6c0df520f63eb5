//! Pediatric dose estimates from an adult baseline.
//!
//! Two independent heuristics, each gated on its own precondition:
//! - **Clark's Rule**: (weight_kg / 70) x adult dose, needs weight > 0
//! - **Young's Rule**: (age / (age + 12)) x adult dose, needs age >= 0
//!
//! Both also need a positive adult dose. A failed precondition drops that
//! rule from the result; nothing here returns an error.

use crate::{DosageRecommendation, DosingRule};

/// Reference adult body weight for Clark's Rule
pub const REFERENCE_ADULT_WEIGHT_KG: f64 = 70.0;

/// Age offset in the Young's Rule denominator
pub const YOUNG_AGE_OFFSET: f64 = 12.0;

/// Clark's Rule, unrounded. `None` when weight or dose is not positive.
pub fn clark_rule(weight_kg: f64, adult_dose_mg: f64) -> Option<f64> {
    if weight_kg > 0.0 && adult_dose_mg > 0.0 {
        Some((weight_kg / REFERENCE_ADULT_WEIGHT_KG) * adult_dose_mg)
    } else {
        None
    }
}

/// Young's Rule, unrounded. `None` when age is negative or dose not positive.
///
/// Age 0 is valid and yields 0 mg.
pub fn young_rule(age: f64, adult_dose_mg: f64) -> Option<f64> {
    if age >= 0.0 && adult_dose_mg > 0.0 {
        Some((age / (age + YOUNG_AGE_OFFSET)) * adult_dose_mg)
    } else {
        None
    }
}

/// Compute every applicable recommendation, rounded to 2 decimal places
pub fn recommend_dosage(age: f64, weight_kg: f64, adult_dose_mg: f64) -> DosageRecommendation {
    let mut recs = DosageRecommendation::default();

    if let Some(dose) = clark_rule(weight_kg, adult_dose_mg) {
        recs.push(DosingRule::Clark, round2(dose));
    }

    if let Some(dose) = young_rule(age, adult_dose_mg) {
        recs.push(DosingRule::Young, round2(dose));
    }

    recs
}

/// Round to 2 decimal places, half-to-even on the exact binary value
///
/// `value * 100.0` is not exact in floating point, so the scaled value is
/// computed in integer arithmetic from the mantissa and exponent. A double
/// whose decimal spelling looks like a tie (2.675) is really just below or
/// above it and rounds accordingly; only true ties (3.125) go to even.
fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e15 {
        return value;
    }

    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };

    // value * 100 == scaled * 2^exponent, exactly
    let scaled = u128::from(mantissa) * 100;
    let hundredths = if exponent >= 0 {
        scaled << exponent
    } else {
        let shift = exponent.unsigned_abs();
        if shift >= 127 {
            0
        } else {
            let quotient = scaled >> shift;
            let remainder = scaled - (quotient << shift);
            let half = 1u128 << (shift - 1);
            if remainder > half || (remainder == half && quotient & 1 == 1) {
                quotient + 1
            } else {
                quotient
            }
        }
    };

    let rounded = hundredths as f64 / 100.0;
    if negative {
        -rounded
    } else {
        rounded
    }
}
