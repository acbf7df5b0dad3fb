//! Type mapping
//!
//! Resolves declared field types to concrete MySQL column types and renders
//! them with lengths clamped to what the engine accepts.

use crate::schema::types::{ColumnType, FieldDescriptor, FieldType, ValueKind};

/// Longest VARCHAR that fits a utf8 row
pub const MAX_VARCHAR_LENGTH: u32 = 21845;
pub const MAX_DECIMAL_PRECISION: u32 = 65;
pub const MAX_DECIMAL_SCALE: u32 = 30;
pub const MAX_FLOAT_PRECISION: u32 = 255;
pub const MAX_FLOAT_SCALE: u32 = 30;
pub const MAX_DOUBLE_PRECISION: u32 = 255;
pub const MAX_DOUBLE_SCALE: u32 = 53;

/// Resolve the concrete column type of a field
pub fn resolve(field: &FieldDescriptor) -> ColumnType {
    match field.field_type {
        FieldType::Explicit(ty) => ty,
        FieldType::Auto => infer(field.value_kind),
    }
}

/// Column type used for a value kind when none is declared
pub fn infer(kind: ValueKind) -> ColumnType {
    match kind {
        ValueKind::Int32 => ColumnType::Integer,
        ValueKind::Int64 => ColumnType::Bigint,
        ValueKind::Float64 => ColumnType::Double,
        ValueKind::Float32 => ColumnType::Float,
        ValueKind::DateTime => ColumnType::Datetime,
        ValueKind::Decimal => ColumnType::Decimal,
        ValueKind::Blob => ColumnType::Blob,
        ValueKind::String | ValueKind::Other => ColumnType::Varchar,
    }
}

/// Clamp length and decimal length to the maxima of the given type
///
/// Types without parameters come back unchanged.
pub fn clamp(ty: ColumnType, length: u32, decimal_length: u32) -> (u32, u32) {
    match ty {
        ColumnType::Varchar => (length.min(MAX_VARCHAR_LENGTH), decimal_length),
        ColumnType::Decimal => (
            length.min(MAX_DECIMAL_PRECISION),
            decimal_length.min(MAX_DECIMAL_SCALE),
        ),
        ColumnType::Float => (
            length.min(MAX_FLOAT_PRECISION),
            decimal_length.min(MAX_FLOAT_SCALE),
        ),
        ColumnType::Double => (
            length.min(MAX_DOUBLE_PRECISION),
            decimal_length.min(MAX_DOUBLE_SCALE),
        ),
        _ => (length, decimal_length),
    }
}

/// Render the SQL type token, e.g. `VARCHAR(255)` or `DECIMAL(10, 2)`
pub fn render_type(ty: ColumnType, length: u32, decimal_length: u32) -> String {
    let (length, decimal_length) = clamp(ty, length, decimal_length);

    match ty {
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal => {
            format!("{}({}, {})", ty.keyword(), length, decimal_length)
        }
        ColumnType::Varchar => format!("VARCHAR({})", length),
        _ => ty.keyword().to_string(),
    }
}
