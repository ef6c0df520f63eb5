//! Adult dose string parsing.
//!
//! Best-effort: only the leading magnitude of the text is read, units are
//! ignored and assumed to be milligrams.

/// Baseline used whenever the adult dose text is absent or unparsable
pub const DEFAULT_ADULT_DOSE_MG: f64 = 100.0;

/// Parse a free-text adult dose into a milligram baseline
///
/// Takes the first whitespace-delimited token, keeps the part before the
/// first hyphen for ranges ("2-10 mg" -> 2.0), and parses it as a float.
/// Anything that fails falls back to [`DEFAULT_ADULT_DOSE_MG`].
pub fn parse_adult_dose(dose_text: Option<&str>) -> f64 {
    let Some(token) = dose_text.and_then(|text| text.split_whitespace().next()) else {
        return DEFAULT_ADULT_DOSE_MG;
    };

    let number = match token.split_once('-') {
        Some((low, _)) => low,
        None => token,
    };

    match number.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(
                "Unparsable adult dose {:?}, using default {} mg",
                dose_text,
                DEFAULT_ADULT_DOSE_MG
            );
            DEFAULT_ADULT_DOSE_MG
        }
    }
}
