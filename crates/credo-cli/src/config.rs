//! Command-line configuration.
//!
//! ```text
//! Cli
//! ├── auth: AuthConfig   # Key files, token claims, Argon2 cost
//! └── command: Command   # What to do
//! ```

use clap::{Parser, Subcommand};
use credo_auth::AuthConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Parser)]
#[command(name = "credo")]
#[command(about = "Operator tools for the Credo authentication core")]
#[command(version)]
pub struct Cli {
    /// Authentication configuration shared by every command.
    #[clap(flatten)]
    pub auth: AuthConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Operator commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Loads the session key pair and checks that both halves match.
    CheckKeys,
    /// Issues a session token for a user.
    IssueToken {
        /// Identifier of the user the token is bound to.
        #[arg(long)]
        user_id: Uuid,
    },
    /// Verifies a session token and prints its claims.
    VerifyToken {
        /// Encoded session token.
        token: String,
    },
    /// Reads a password from stdin and prints its Argon2id hash.
    HashPassword,
    /// Reads a password from stdin and prints its strength estimate.
    PasswordStrength,
}

impl Command {
    /// Returns the command name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckKeys => "check-keys",
            Self::IssueToken { .. } => "issue-token",
            Self::VerifyToken { .. } => "verify-token",
            Self::HashPassword => "hash-password",
            Self::PasswordStrength => "password-strength",
        }
    }
}

impl Cli {
    /// Parses command-line arguments and `CREDO_*` environment variables.
    pub fn init() -> Self {
        Self::parse()
    }

    /// Initializes tracing with `RUST_LOG` filtering, writing to stderr.
    pub fn init_tracing() -> anyhow::Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn"))
            .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))?;

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(env_filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

        Ok(())
    }

    /// Logs the effective configuration. Key material is never logged.
    pub fn log_startup_info(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            command = self.command.name(),
            public_pem_filepath = %self.auth.public_pem_filepath.display(),
            private_pem_filepath = %self.auth.private_pem_filepath.display(),
            token_issuer = %self.auth.token_issuer,
            token_audience = %self.auth.token_audience,
            token_lifetime_secs = self.auth.token_lifetime_secs,
            argon2_memory_kib = self.auth.argon2_memory_kib,
            argon2_iterations = self.auth.argon2_iterations,
            argon2_parallelism = self.auth.argon2_parallelism,
            password_min_score = self.auth.password_min_score,
            "starting credo"
        );
    }
}
