//! Input validation contract for registration.
//!
//! The lifecycle manager calls [`UserValidator::validate_user`] exactly once
//! per registration, before touching the store. Errors are handed back to the
//! caller unchanged.

use validator::{Validate, ValidationErrors};

use crate::TRACING_TARGET_VALIDATION as TRACING_TARGET;
use crate::security::PasswordStrength;
use crate::service::NewUser;

/// Validates registration candidates.
pub trait UserValidator {
    /// Checks the shape of a candidate user.
    fn validate_user(&self, user: &NewUser) -> Result<(), ValidationErrors>;
}

impl<F> UserValidator for F
where
    F: Fn(&NewUser) -> Result<(), ValidationErrors>,
{
    #[inline]
    fn validate_user(&self, user: &NewUser) -> Result<(), ValidationErrors> {
        self(user)
    }
}

/// Default validator: field format rules plus an optional strength check.
///
/// - `email` must be a syntactically valid address
/// - `password` must be 8 to 128 characters long
/// - `display_name`, when present, must be 2 to 64 characters long
/// - `password` must reach the configured zxcvbn score (disabled by default)
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator {
    password_strength: PasswordStrength,
}

impl StructuralValidator {
    /// Creates a validator without a strength requirement.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a password strength requirement.
    #[inline]
    pub fn with_password_strength(mut self, password_strength: PasswordStrength) -> Self {
        self.password_strength = password_strength;
        self
    }
}

impl UserValidator for StructuralValidator {
    fn validate_user(&self, user: &NewUser) -> Result<(), ValidationErrors> {
        let mut errors = match user.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let mut user_inputs: Vec<&str> = user.email.split('@').collect();
        if let Some(display_name) = user.display_name.as_deref() {
            user_inputs.push(display_name);
        }

        if let Err(error) = self.password_strength.check(&user.password, &user_inputs) {
            errors.add("password", error);
        }

        if errors.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: TRACING_TARGET,
            fields = ?errors.field_errors().keys().collect::<Vec<_>>(),
            "registration candidate failed validation"
        );

        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use validator::ValidationError;

    use super::*;

    #[test]
    fn accept_well_formed_user() {
        let validator = StructuralValidator::new();
        let user = NewUser::new("a@x.com", "secret123").with_display_name("Alice");
        assert!(validator.validate_user(&user).is_ok());
    }

    #[test]
    fn reject_malformed_fields() {
        let validator = StructuralValidator::new();
        let user = NewUser::new("not-an-email", "short").with_display_name("A");

        let errors = validator.validate_user(&user).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("display_name"));
    }

    #[test]
    fn strength_requirement_is_opt_in() {
        let user = NewUser::new("alice@x.com", "password1");
        assert!(StructuralValidator::new().validate_user(&user).is_ok());

        let strict =
            StructuralValidator::new().with_password_strength(PasswordStrength::with_min_score(3));
        let errors = strict.validate_user(&user).unwrap_err();
        let password_errors = errors.field_errors();
        let codes: Vec<_> = password_errors["password"]
            .iter()
            .map(|error| error.code.clone())
            .collect();
        assert_eq!(codes, ["password_strength"]);
    }

    #[test]
    fn closures_are_validators() {
        let reject_all = |_: &NewUser| -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors.add("email", ValidationError::new("blocked_domain"));
            Err(errors)
        };

        let user = NewUser::new("a@x.com", "secret123");
        assert!(reject_all.validate_user(&user).is_err());
    }
}
