//! Validation utilities for the POS stock ledger

/// Validate a retail quantity is positive
pub fn validate_quantity(qty: i32) -> Result<(), &'static str> {
    if qty <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate an actor name is present
///
/// Every mutating ledger call records who performed it; an empty actor would
/// leave the audit trail unattributable.
pub fn validate_actor(actor: &str) -> Result<(), &'static str> {
    if actor.trim().is_empty() {
        return Err("Actor must not be empty");
    }
    Ok(())
}

/// Validate an official receipt number (STORE-TERMINAL-SEQUENCE)
pub fn validate_or_number(or_number: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = or_number.split('-').collect();
    if parts.len() < 3 {
        return Err("OR number must have store, terminal and sequence segments");
    }
    if parts.iter().any(|p| p.is_empty()) {
        return Err("OR number segments must not be empty");
    }
    match parts.last() {
        Some(seq) if seq.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        _ => Err("OR number must end in a numeric sequence"),
    }
}

/// Validate a variant SKU (uppercase alphanumeric with dashes, 4-24 chars)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 4 {
        return Err("SKU must be at least 4 characters");
    }
    if sku.len() > 24 {
        return Err("SKU must be at most 24 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn or_numbers_need_three_segments_and_numeric_tail() {
        assert!(validate_or_number("SC01-001-000000123").is_ok());
        assert!(validate_or_number("SC01-000000123").is_err());
        assert!(validate_or_number("SC01-001-12A").is_err());
        assert!(validate_or_number("SC01--123").is_err());
    }

    #[test]
    fn skus_are_uppercase_alphanumeric() {
        assert!(validate_sku("TUNA-250G").is_ok());
        assert!(validate_sku("abc").is_err());
        assert!(validate_sku("tuna-250g").is_err());
    }
}
