//! Authentication configuration.

use std::path::PathBuf;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use derive_builder::Builder;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::security::{PasswordHasher, PasswordStrength, SessionKeys};
use crate::token::TokenIssuer;
use crate::validation::StructuralValidator;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    use crate::security::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};
    use crate::token::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, DEFAULT_LIFETIME};

    /// Default path to the session public key.
    pub fn public_pem_filepath() -> PathBuf {
        "./public.pem".into()
    }

    /// Default path to the session private key.
    pub fn private_pem_filepath() -> PathBuf {
        "./private.pem".into()
    }

    pub fn token_lifetime_secs() -> u64 {
        DEFAULT_LIFETIME.as_secs().unsigned_abs()
    }

    pub fn token_issuer() -> String {
        DEFAULT_ISSUER.to_owned()
    }

    pub fn token_audience() -> String {
        DEFAULT_AUDIENCE.to_owned()
    }

    pub fn argon2_memory_kib() -> u32 {
        DEFAULT_MEMORY_KIB
    }

    pub fn argon2_iterations() -> u32 {
        DEFAULT_ITERATIONS
    }

    pub fn argon2_parallelism() -> u32 {
        DEFAULT_PARALLELISM
    }
}

/// Authentication configuration.
///
/// Every setting can come from the builder, from serde or (with the `config`
/// feature) from command-line flags and `CREDO_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct AuthConfig {
    /// File path to the Ed25519 public key used to verify session tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-public-pem-filepath",
            env = "CREDO_AUTH_PUBLIC_PEM_FILEPATH",
            default_value = "./public.pem"
        )
    )]
    #[serde(default = "defaults::public_pem_filepath")]
    #[builder(default = "defaults::public_pem_filepath()")]
    pub public_pem_filepath: PathBuf,

    /// File path to the Ed25519 private key used to sign session tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-private-pem-filepath",
            env = "CREDO_AUTH_PRIVATE_PEM_FILEPATH",
            default_value = "./private.pem"
        )
    )]
    #[serde(default = "defaults::private_pem_filepath")]
    #[builder(default = "defaults::private_pem_filepath()")]
    pub private_pem_filepath: PathBuf,

    /// How long session tokens stay valid, in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "token-lifetime-secs",
            env = "CREDO_TOKEN_LIFETIME_SECS",
            default_value_t = defaults::token_lifetime_secs()
        )
    )]
    #[serde(default = "defaults::token_lifetime_secs")]
    #[builder(default = "defaults::token_lifetime_secs()")]
    pub token_lifetime_secs: u64,

    /// Value of the `iss` claim.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "token-issuer",
            env = "CREDO_TOKEN_ISSUER",
            default_value_t = defaults::token_issuer()
        )
    )]
    #[serde(default = "defaults::token_issuer")]
    #[builder(default = "defaults::token_issuer()")]
    pub token_issuer: String,

    /// Value of the `aud` claim.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "token-audience",
            env = "CREDO_TOKEN_AUDIENCE",
            default_value_t = defaults::token_audience()
        )
    )]
    #[serde(default = "defaults::token_audience")]
    #[builder(default = "defaults::token_audience()")]
    pub token_audience: String,

    /// Argon2id memory cost in KiB.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "argon2-memory-kib",
            env = "CREDO_ARGON2_MEMORY_KIB",
            default_value_t = defaults::argon2_memory_kib()
        )
    )]
    #[serde(default = "defaults::argon2_memory_kib")]
    #[builder(default = "defaults::argon2_memory_kib()")]
    pub argon2_memory_kib: u32,

    /// Argon2id iteration count.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "argon2-iterations",
            env = "CREDO_ARGON2_ITERATIONS",
            default_value_t = defaults::argon2_iterations()
        )
    )]
    #[serde(default = "defaults::argon2_iterations")]
    #[builder(default = "defaults::argon2_iterations()")]
    pub argon2_iterations: u32,

    /// Argon2id degree of parallelism.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "argon2-parallelism",
            env = "CREDO_ARGON2_PARALLELISM",
            default_value_t = defaults::argon2_parallelism()
        )
    )]
    #[serde(default = "defaults::argon2_parallelism")]
    #[builder(default = "defaults::argon2_parallelism()")]
    pub argon2_parallelism: u32,

    /// Minimum zxcvbn score (1 to 4) for new passwords; 0 disables the check.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "password-min-score",
            env = "CREDO_PASSWORD_MIN_SCORE",
            default_value_t = 0
        )
    )]
    #[serde(default)]
    #[builder(default)]
    pub password_min_score: u8,
}

impl AuthConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Returns the session token lifetime.
    ///
    /// # Errors
    ///
    /// Returns a config error when the lifetime is zero or does not fit a
    /// signed duration.
    pub fn token_lifetime(&self) -> Result<SignedDuration> {
        let secs = i64::try_from(self.token_lifetime_secs)
            .map_err(|_| Error::config("token lifetime is out of range"))?;
        if secs == 0 {
            return Err(Error::config("token lifetime must be greater than 0"));
        }

        Ok(SignedDuration::from_secs(secs))
    }

    /// Creates the password hasher with the configured cost parameters.
    pub fn password_hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::with_params(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
        )
    }

    /// Loads the session key pair from the configured paths and checks that
    /// both halves match.
    pub async fn load_session_keys(&self) -> Result<SessionKeys> {
        let keys =
            SessionKeys::from_pem_files(&self.public_pem_filepath, &self.private_pem_filepath)
                .await?;
        keys.validate_keys()?;
        Ok(keys)
    }

    /// Creates a token issuer that signs with `keys`.
    pub fn token_issuer(&self, keys: SessionKeys) -> Result<TokenIssuer> {
        Ok(TokenIssuer::new(keys)
            .with_issuer(self.token_issuer.clone())
            .with_audience(self.token_audience.clone())
            .with_lifetime(self.token_lifetime()?))
    }

    /// Returns the password strength requirement.
    pub fn password_strength(&self) -> PasswordStrength {
        PasswordStrength::with_min_score(self.password_min_score)
    }

    /// Returns the default registration validator with the configured
    /// strength requirement.
    pub fn validator(&self) -> StructuralValidator {
        StructuralValidator::new().with_password_strength(self.password_strength())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            public_pem_filepath: defaults::public_pem_filepath(),
            private_pem_filepath: defaults::private_pem_filepath(),
            token_lifetime_secs: defaults::token_lifetime_secs(),
            token_issuer: defaults::token_issuer(),
            token_audience: defaults::token_audience(),
            argon2_memory_kib: defaults::argon2_memory_kib(),
            argon2_iterations: defaults::argon2_iterations(),
            argon2_parallelism: defaults::argon2_parallelism(),
            password_min_score: 0,
        }
    }
}

impl AuthConfigBuilder {
    fn validate(builder: &AuthConfigBuilder) -> Result<(), String> {
        if let Some(lifetime) = builder.token_lifetime_secs {
            if lifetime == 0 {
                return Err("Token lifetime must be greater than 0".to_owned());
            }
            if i64::try_from(lifetime).is_err() {
                return Err("Token lifetime is out of range".to_owned());
            }
        }

        if let Some(issuer) = &builder.token_issuer
            && issuer.is_empty()
        {
            return Err("Token issuer cannot be empty".to_owned());
        }

        if let Some(audience) = &builder.token_audience
            && audience.is_empty()
        {
            return Err("Token audience cannot be empty".to_owned());
        }

        if let Some(iterations) = builder.argon2_iterations
            && iterations == 0
        {
            return Err("Argon2 iterations must be greater than 0".to_owned());
        }

        if let Some(parallelism) = builder.argon2_parallelism
            && parallelism == 0
        {
            return Err("Argon2 parallelism must be greater than 0".to_owned());
        }

        // Argon2 needs at least 8 KiB per lane.
        let parallelism = builder
            .argon2_parallelism
            .unwrap_or_else(defaults::argon2_parallelism);
        if let Some(memory_kib) = builder.argon2_memory_kib
            && memory_kib < parallelism.saturating_mul(8)
        {
            return Err("Argon2 memory must be at least 8 KiB per lane".to_owned());
        }

        if let Some(score) = builder.password_min_score
            && score > 4
        {
            return Err("Password minimum score cannot exceed 4".to_owned());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;
    use uuid::Uuid;

    use super::*;
    use crate::ErrorKind;
    use crate::security::session_keys::tests::{
        OTHER_PRIVATE_KEY, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY,
    };

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        auth: AuthConfig,
    }

    fn pem_file(contents: &str) -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn builder_defaults_match_default() -> anyhow::Result<()> {
        let config = AuthConfig::builder().build()?;
        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.token_lifetime()?, SignedDuration::from_hours(24));
        assert!(!config.password_strength().is_enabled());
        Ok(())
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert!(
            AuthConfig::builder()
                .with_token_lifetime_secs(0u64)
                .build()
                .is_err()
        );
        assert!(AuthConfig::builder().with_token_issuer("").build().is_err());
        assert!(
            AuthConfig::builder()
                .with_argon2_parallelism(4u32)
                .with_argon2_memory_kib(16u32)
                .build()
                .is_err()
        );
        assert!(
            AuthConfig::builder()
                .with_password_min_score(5u8)
                .build()
                .is_err()
        );
    }

    #[test]
    fn deserialize_fills_defaults() -> anyhow::Result<()> {
        let config: AuthConfig =
            serde_json::from_str(r#"{"token_issuer":"acme","password_min_score":3}"#)?;
        assert_eq!(config.token_issuer, "acme");
        assert_eq!(config.token_audience, crate::token::DEFAULT_AUDIENCE);
        assert_eq!(config.password_strength().min_score(), 3);
        Ok(())
    }

    #[test]
    fn parse_command_line_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "credo",
            "--token-lifetime-secs",
            "3600",
            "--token-audience",
            "credo:test",
            "--argon2-memory-kib",
            "64",
        ])?;

        assert_eq!(cli.auth.token_lifetime()?, SignedDuration::from_hours(1));
        assert_eq!(cli.auth.token_audience, "credo:test");
        assert_eq!(cli.auth.argon2_memory_kib, 64);
        assert_eq!(cli.auth.token_issuer, crate::token::DEFAULT_ISSUER);
        Ok(())
    }

    #[test]
    fn invalid_hashing_parameters() {
        let config = AuthConfig {
            argon2_iterations: 0,
            ..AuthConfig::default()
        };

        let error = config.password_hasher().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Crypto);
    }

    #[tokio::test]
    async fn load_keys_and_issue_tokens() -> anyhow::Result<()> {
        let public = pem_file(TEST_PUBLIC_KEY)?;
        let private = pem_file(TEST_PRIVATE_KEY)?;

        let config = AuthConfig::builder()
            .with_public_pem_filepath(public.path())
            .with_private_pem_filepath(private.path())
            .with_token_lifetime_secs(60u64)
            .build()?;

        let issuer = config.token_issuer(config.load_session_keys().await?)?;
        assert_eq!(issuer.lifetime(), SignedDuration::from_secs(60));

        let user_id = Uuid::now_v7();
        let token = issuer.issue(user_id)?;
        assert_eq!(issuer.verify(token.as_str())?.user_id, user_id);

        Ok(())
    }

    #[tokio::test]
    async fn reject_mismatched_key_files() -> anyhow::Result<()> {
        let public = pem_file(TEST_PUBLIC_KEY)?;
        let private = pem_file(OTHER_PRIVATE_KEY)?;

        let config = AuthConfig::builder()
            .with_public_pem_filepath(public.path())
            .with_private_pem_filepath(private.path())
            .build()?;

        let error = config.load_session_keys().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Crypto);
        Ok(())
    }

    #[tokio::test]
    async fn missing_key_file_is_config_error() -> anyhow::Result<()> {
        let config = AuthConfig::builder()
            .with_public_pem_filepath("/nonexistent/public.pem")
            .build()?;

        let error = config.load_session_keys().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
        Ok(())
    }
}
