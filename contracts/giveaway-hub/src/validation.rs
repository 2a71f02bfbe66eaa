use std::collections::BTreeSet;

use crate::error::ContractError;
use crate::msg::RegisterParams;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_SELECTED_PRODUCTS: usize = 50;
pub const MAX_PRODUCT_ID_LEN: usize = 64;

/// Registration input after validation and normalization.
#[derive(Debug, PartialEq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Normalized phone used for duplicate detection, `None` when no phone given
    pub phone_key: Option<String>,
    pub selected_products: Vec<String>,
}

pub fn validate_registration(params: &RegisterParams) -> Result<ValidRegistration, ContractError> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(ContractError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ContractError::validation(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }

    let email = normalize_email(&params.email);
    validate_email(&email)?;

    let phone = params.phone.trim();
    let phone_key = if phone.is_empty() {
        None
    } else {
        Some(validate_phone(phone)?)
    };

    if params.selected_products.len() > MAX_SELECTED_PRODUCTS {
        return Err(ContractError::validation(
            "selected_products",
            format!("at most {MAX_SELECTED_PRODUCTS} products"),
        ));
    }
    let mut products = BTreeSet::new();
    for product in &params.selected_products {
        let product = product.trim();
        if product.is_empty() || product.len() > MAX_PRODUCT_ID_LEN {
            return Err(ContractError::validation(
                "selected_products",
                format!("product ids must be 1-{MAX_PRODUCT_ID_LEN} characters"),
            ));
        }
        products.insert(product.to_string());
    }

    Ok(ValidRegistration {
        name: name.to_string(),
        email,
        phone: phone.to_string(),
        phone_key,
        selected_products: products.into_iter().collect(),
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Syntactic check only: one `@`, non-empty local part, dotted domain
/// without empty labels, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ContractError> {
    if email.is_empty() {
        return Err(ContractError::validation("email", "must not be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ContractError::validation(
            "email",
            format!("must be at most {MAX_EMAIL_LEN} characters"),
        ));
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ContractError::validation("email", "must not contain whitespace"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(ContractError::validation("email", "missing @")),
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ContractError::validation("email", "malformed address"));
    }
    if !domain.contains('.') || domain.split('.').any(|label| label.is_empty()) {
        return Err(ContractError::validation("email", "malformed domain"));
    }
    Ok(())
}

/// Returns the digits-only key (keeping a leading `+`) used for duplicate detection.
pub fn validate_phone(phone: &str) -> Result<String, ContractError> {
    if phone.len() > MAX_PHONE_LEN {
        return Err(ContractError::validation(
            "phone",
            format!("must be at most {MAX_PHONE_LEN} characters"),
        ));
    }
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ContractError::validation("phone", "unexpected character"));
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ContractError::validation(
            "phone",
            format!("needs at least {MIN_PHONE_DIGITS} digits"),
        ));
    }

    if phone.starts_with('+') {
        Ok(format!("+{digits}"))
    } else {
        Ok(digits)
    }
}
