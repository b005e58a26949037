//! Reference number generation.

use chrono::{DateTime, Utc};

use super::types::MovementType;

/// Builds a reference number like `GRN-20261018-143005-123`.
#[must_use]
pub fn generate_reference(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}", at.format("%Y%m%d-%H%M%S-%3f"))
}

/// Returns the supplied reference number, or a generated one when it is
/// absent or blank.
#[must_use]
pub fn resolve_reference(
    supplied: Option<&str>,
    movement_type: MovementType,
    at: DateTime<Utc>,
) -> String {
    match supplied.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => generate_reference(movement_type.reference_prefix(), at),
    }
}
