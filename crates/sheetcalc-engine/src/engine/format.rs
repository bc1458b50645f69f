/// Error marker written in place of a formula that failed to evaluate.
pub const ERROR_MARKER: &str = "#ERROR";

/// Format a number as the shortest decimal string that round-trips,
/// without trailing zeros or exponent notation (`12`, `0.5`, `-0.25`).
///
/// Returns `None` for NaN and infinities, which have no decimal form.
pub fn format_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    Some(format!("{}", n))
}
