//! Helpers for building `filterByFormula` expressions.
//!
//! Airtable formulas are injected straight into query strings, so every
//! user-supplied value must be escaped before it lands in one.

/// Escape a value for use inside a single-quoted formula string.
///
/// Airtable escapes a single quote by doubling it.
#[must_use]
pub fn escape_formula_value(value: &str) -> String {
    value.replace('\'', "''")
}

/// Build a `{Field} = 'value'` equality check with proper escaping.
#[must_use]
pub fn field_equals(field: &str, value: &str) -> String {
    format!("{{{field}}} = '{}'", escape_formula_value(value))
}

/// Combine clauses with `AND(...)`. A single clause passes through unchanged.
#[must_use]
pub fn and(clauses: &[String]) -> String {
    match clauses {
        [] => String::new(),
        [single] => single.clone(),
        many => format!("AND({})", many.join(", ")),
    }
}
