//! Walk-in customer registration
//!
//! Most customers are found by username search; this form covers the
//! walk-in who has never bought before and is registered at the
//! counter mid-checkout.

use crate::error::{ValidationError, first_violation};
use shared::models::AccountCreate;
use validator::Validate;

/// Registration input for a new customer account.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewCustomerForm {
    #[validate(length(min = 3, max = 32, message = "username must be 3 to 32 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 64, message = "full name is required"))]
    pub full_name: String,
    /// Optional; digits, spaces, `+` and `-` accepted
    pub phone: Option<String>,
    #[validate(email(message = "email address is invalid"))]
    pub email: Option<String>,
}

fn check_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let well_formed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ');
    if !well_formed || !(8..=15).contains(&digits) {
        return Err(ValidationError::new("phone", "phone number is invalid"));
    }
    Ok(())
}

impl NewCustomerForm {
    /// Validate and build the registration payload.
    pub fn to_payload(&self) -> Result<AccountCreate, ValidationError> {
        self.validate().map_err(|e| first_violation(&e))?;

        let phone = match self.phone.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(p) => {
                check_phone(p)?;
                Some(p.to_string())
            }
        };

        Ok(AccountCreate {
            username: self.username.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            phone,
            email: self.email.as_deref().map(str::trim).map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewCustomerForm {
        NewCustomerForm {
            username: "lan.tran".to_string(),
            full_name: "Tran Thi Lan".to_string(),
            phone: Some("+84 905 123 456".to_string()),
            email: Some("lan.tran@example.com".to_string()),
        }
    }

    #[test]
    fn valid_form_builds_payload() {
        let payload = form().to_payload().unwrap();
        assert_eq!(payload.username, "lan.tran");
        assert_eq!(payload.full_name, "Tran Thi Lan");
        assert_eq!(payload.phone.as_deref(), Some("+84 905 123 456"));
    }

    #[test]
    fn short_username_is_rejected() {
        let mut f = form();
        f.username = "ab".to_string();
        assert_eq!(f.to_payload().unwrap_err().field, "username");
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut f = form();
        f.email = Some("not-an-email".to_string());
        assert_eq!(f.to_payload().unwrap_err().field, "email");
    }

    #[test]
    fn phone_with_letters_is_rejected() {
        let mut f = form();
        f.phone = Some("0905abc".to_string());
        assert_eq!(f.to_payload().unwrap_err().field, "phone");
    }

    #[test]
    fn empty_phone_and_email_are_optional() {
        let f = NewCustomerForm {
            username: "walkin01".to_string(),
            full_name: "Walk In".to_string(),
            phone: Some("  ".to_string()),
            email: None,
        };
        let payload = f.to_payload().unwrap();
        assert_eq!(payload.phone, None);
        assert_eq!(payload.email, None);
    }
}
