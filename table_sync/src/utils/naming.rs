//! Naming utilities for TableSync
//!
//! Column names default to a snake-case form of the record member name.

/// Derive a column name from a record member name
///
/// Every ASCII uppercase letter becomes `_` followed by its lowercase form, so
/// `nickName` maps to `nick_name`. Names already in snake case pass through.
pub fn column_name_for_member(member: &str, uppercase: bool) -> String {
    let mut column = String::with_capacity(member.len() + 4);

    for c in member.chars() {
        if c.is_ascii_uppercase() {
            column.push('_');
            column.push(c.to_ascii_lowercase());
        } else {
            column.push(c);
        }
    }

    if uppercase {
        column.to_uppercase()
    } else {
        column
    }
}

/// Generated name for a composite index over the given columns
pub fn composite_index_name(columns: &[String]) -> String {
    columns.join("_").replace(' ', "")
}

/// Render a double-quoted SQL string literal
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
