//! Input validation helpers
//!
//! Text length limits plus the name/phone rules used by vendor, flavor and
//! customer input.

use crate::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: flavor, vendor, customer
pub const MAX_NAME_LEN: usize = 200;

/// Phone numbers (digits only)
pub const MAX_PHONE_LEN: usize = 20;

/// PIX key text (e-mail, CPF/CNPJ, phone or random key)
pub const MAX_PIX_KEY_LEN: usize = 140;

/// Blob paths
pub const MAX_PATH_LEN: usize = 2048;

/// Names need at least two non-blank characters
pub const MIN_NAME_LEN: usize = 2;

// ── Rules ───────────────────────────────────────────────────────────

/// A name is valid when it has at least two characters after trimming.
pub fn validate_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}

/// A phone is valid when it is non-empty and made only of ASCII digits.
pub fn validate_phone(phone: &str) -> bool {
    !phone.is_empty() && phone.bytes().all(|b| b.is_ascii_digit())
}

// ── Validation helpers (handlers / services) ────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} é obrigatório")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} é muito longo ({} caracteres, máximo {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} é muito longo ({} caracteres, máximo {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Trim and check an entity name, returning the trimmed value.
pub fn require_name(value: &str, field: &str) -> Result<String, AppError> {
    validate_required_text(value, field, MAX_NAME_LEN)?;
    if !validate_name(value) {
        return Err(AppError::validation("Nome deve ter pelo menos 2 caracteres")
            .with_detail("field", field));
    }
    Ok(value.trim().to_string())
}

/// Trim and check an optional phone. Blank input is treated as absent.
pub fn normalize_phone(value: Option<&str>, field: &str) -> Result<Option<String>, AppError> {
    let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    validate_optional_text(Some(phone), field, MAX_PHONE_LEN)?;
    if !validate_phone(phone) {
        return Err(AppError::validation("Telefone deve conter apenas números")
            .with_detail("field", field));
    }
    Ok(Some(phone.to_string()))
}
