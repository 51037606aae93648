//! Command implementations.
//!
//! Results go to stdout, logs to stderr.

use anyhow::Context;
use credo_auth::AuthConfig;
use credo_auth::security::PasswordStrength;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::TRACING_TARGET_COMMAND as TRACING_TARGET;
use crate::config::{Cli, Command};

/// Runs the selected command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { auth, command } = cli;

    match command {
        Command::CheckKeys => check_keys(&auth).await,
        Command::IssueToken { user_id } => issue_token(&auth, user_id).await,
        Command::VerifyToken { token } => verify_token(&auth, &token).await,
        Command::HashPassword => hash_password(&auth).await,
        Command::PasswordStrength => password_strength(&auth).await,
    }
}

async fn check_keys(config: &AuthConfig) -> anyhow::Result<()> {
    config
        .load_session_keys()
        .await
        .context("failed to load session keys")?;

    println!("session keys are valid");
    Ok(())
}

async fn issue_token(config: &AuthConfig, user_id: Uuid) -> anyhow::Result<()> {
    let keys = config
        .load_session_keys()
        .await
        .context("failed to load session keys")?;
    let issuer = config.token_issuer(keys)?;

    let token = issuer.issue(user_id)?;
    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user_id,
        token_id = %token.claims().token_id,
        expires_at = %token.claims().expires_at,
        "issued session token"
    );

    println!("{}", token.as_str());
    Ok(())
}

async fn verify_token(config: &AuthConfig, token: &str) -> anyhow::Result<()> {
    let keys = config
        .load_session_keys()
        .await
        .context("failed to load session keys")?;
    let issuer = config.token_issuer(keys)?;

    let claims = issuer.verify(token.trim())?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}

async fn hash_password(config: &AuthConfig) -> anyhow::Result<()> {
    let hasher = config.password_hasher()?;
    let password = read_secret(BufReader::new(io::stdin())).await?;

    let hash = hasher.hash_password(&password)?;
    println!("{hash}");
    Ok(())
}

async fn password_strength(config: &AuthConfig) -> anyhow::Result<()> {
    let password = read_secret(BufReader::new(io::stdin())).await?;
    let report = strength_report(config.password_strength(), &password);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Builds the JSON report for `password-strength`.
fn strength_report(strength: PasswordStrength, password: &str) -> serde_json::Value {
    let result = strength.evaluate(password, &[]);

    serde_json::json!({
        "score": result.score,
        "guesses": result.guesses,
        "minScore": strength.min_score(),
        "accepted": strength.check(password, &[]).is_ok(),
        "feedback": result.feedback,
    })
}

/// Reads one line from `reader` and strips the line terminator.
async fn read_secret<R>(mut reader: R) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    let secret = line.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!secret.is_empty(), "no password given on stdin");

    Ok(secret.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_secret_strips_line_terminator() -> anyhow::Result<()> {
        let secret = read_secret(&b"correct horse\r\nignored\n"[..]).await?;
        assert_eq!(secret, "correct horse");
        Ok(())
    }

    #[tokio::test]
    async fn read_secret_rejects_empty_input() {
        assert!(read_secret(&b"\n"[..]).await.is_err());
        assert!(read_secret(&b""[..]).await.is_err());
    }

    #[test]
    fn strength_report_flags_weak_password() {
        let report = strength_report(PasswordStrength::with_min_score(3), "password");
        assert_eq!(report["accepted"], false);
        assert_eq!(report["minScore"], 3);

        let report = strength_report(PasswordStrength::disabled(), "password");
        assert_eq!(report["accepted"], true);
    }
}
