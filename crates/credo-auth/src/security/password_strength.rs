//! Password strength evaluation using the zxcvbn algorithm.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::ValidationError;
use zxcvbn::feedback::Feedback;
use zxcvbn::zxcvbn;

use crate::TRACING_TARGET_VALIDATION as TRACING_TARGET;

/// Highest score zxcvbn assigns.
const MAX_SCORE: u8 = 4;

/// Password strength evaluator.
///
/// A minimum score of zero disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// Lowest accepted score; 0 accepts everything.
    min_score: u8,
}

/// Strength estimate for a single password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordStrengthResult {
    /// zxcvbn score, 0 to 4.
    pub score: u8,
    /// Estimated number of guesses an attacker needs.
    pub guesses: u64,
    /// Advice for the user, present for weak passwords.
    pub feedback: Option<PasswordFeedback>,
}

/// zxcvbn advice for a weak password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordFeedback {
    /// Why the password is weak.
    pub warning: Option<String>,
    /// How to pick a stronger password.
    pub suggestions: Vec<String>,
}

impl PasswordStrength {
    /// Creates an evaluator that accepts any password.
    #[inline]
    pub const fn disabled() -> Self {
        Self { min_score: 0 }
    }

    /// Creates an evaluator with a minimum acceptable score.
    ///
    /// Scores above 4 are clamped to 4.
    #[inline]
    pub const fn with_min_score(min_score: u8) -> Self {
        let min_score = if min_score > MAX_SCORE {
            MAX_SCORE
        } else {
            min_score
        };

        Self { min_score }
    }

    /// Returns the minimum acceptable score.
    #[inline]
    pub const fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Returns whether the evaluator rejects anything.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.min_score > 0
    }

    /// Estimates the strength of `password`.
    ///
    /// `user_inputs` are user-specific words to penalize, such as the email
    /// local part or the display name.
    pub fn evaluate(&self, password: &str, user_inputs: &[&str]) -> PasswordStrengthResult {
        let entropy = zxcvbn(password, user_inputs);
        let score: u8 = entropy.score().into();

        tracing::debug!(
            target: TRACING_TARGET,
            score,
            guesses = entropy.guesses(),
            "password strength evaluated"
        );

        PasswordStrengthResult {
            score,
            guesses: entropy.guesses(),
            feedback: entropy.feedback().map(Self::convert_feedback),
        }
    }

    /// Checks that a password meets the minimum score.
    ///
    /// # Errors
    ///
    /// Returns a `password_strength` validation error carrying the score and
    /// zxcvbn's suggestions when the password is too weak.
    pub fn check(&self, password: &str, user_inputs: &[&str]) -> Result<(), ValidationError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let result = self.evaluate(password, user_inputs);
        if result.score >= self.min_score {
            return Ok(());
        }

        tracing::debug!(
            target: TRACING_TARGET,
            score = result.score,
            min_score = self.min_score,
            "password rejected: insufficient strength"
        );

        let mut error = ValidationError::new("password_strength");
        error.message = Some(Cow::Borrowed(
            "Password does not meet minimum strength requirements",
        ));
        error.add_param(Cow::Borrowed("score"), &result.score);
        error.add_param(Cow::Borrowed("min_score"), &self.min_score);

        if let Some(feedback) = result.feedback {
            if let Some(warning) = feedback.warning {
                error.add_param(Cow::Borrowed("warning"), &warning);
            }
            if !feedback.suggestions.is_empty() {
                error.add_param(Cow::Borrowed("suggestions"), &feedback.suggestions);
            }
        }

        Err(error)
    }

    fn convert_feedback(feedback: &Feedback) -> PasswordFeedback {
        PasswordFeedback {
            warning: feedback.warning().map(|w| w.to_string()),
            suggestions: feedback
                .suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for PasswordStrength {
    #[inline]
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_password_scores_low() {
        let checker = PasswordStrength::with_min_score(3);
        let result = checker.evaluate("password", &[]);
        assert!(result.score < 3);
        assert!(result.feedback.is_some());
    }

    #[test]
    fn user_inputs_are_penalized() {
        let checker = PasswordStrength::with_min_score(3);
        let result = checker.evaluate("john1234", &["john", "smith"]);
        assert!(result.score < 3);
    }

    #[test]
    fn disabled_accepts_anything() {
        let checker = PasswordStrength::default();
        assert!(!checker.is_enabled());
        assert!(checker.check("password", &[]).is_ok());
        assert!(checker.check("", &[]).is_ok());
    }

    #[test]
    fn check_rejects_weak_password() {
        let checker = PasswordStrength::with_min_score(3);
        let error = checker.check("password", &[]).unwrap_err();

        assert_eq!(error.code, "password_strength");
        assert!(error.params.contains_key("score"));
        assert!(checker.check("kX9$mP2#vL5@wQ8!", &[]).is_ok());
    }

    #[test]
    fn min_score_is_clamped() {
        assert_eq!(PasswordStrength::with_min_score(9).min_score(), 4);
    }
}
