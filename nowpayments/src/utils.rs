use rust_decimal::Decimal;

/// Format an amount the way the API expects it in query strings.
///
/// Plain decimal notation, trailing fractional zeros removed, no dangling decimal point:
/// `100.50` becomes `100.5`, `100.00` becomes `100`.
pub fn format_decimal(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.is_zero() {
        // normalize() keeps the sign of negative zero
        return "0".to_string();
    }
    normalized.to_string()
}
