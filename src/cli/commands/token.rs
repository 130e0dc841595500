use anyhow::{anyhow, bail};
use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::auth::{cookie::token_cookie, TokenSigner, TOKEN_TTL_SECS};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token with the server secret")]
    Issue {
        #[arg(long, help = "Email embedded in the token")]
        email: String,
        #[arg(long, help = "Extra claim as key=value (repeatable)")]
        claim: Vec<String>,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { email, claim } => {
            let payload = build_payload(&email, &claim)?;
            let signer = TokenSigner::new(&config.security.jwt_secret)?;
            let token = signer.issue(payload)?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    Some(json!({
                        "token": token,
                        "expires_in": TOKEN_TTL_SECS,
                        "cookie": token_cookie(&token, config.security.cookie_secure),
                    })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}

/// Claim values that parse as JSON keep their type; anything else is a string.
fn build_payload(email: &str, claims: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut payload = Map::new();
    for claim in claims {
        let (key, value) = claim
            .split_once('=')
            .ok_or_else(|| anyhow!("claim must be key=value, got {:?}", claim))?;
        if key.is_empty() {
            bail!("claim key is empty in {:?}", claim);
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        payload.insert(key.to_string(), value);
    }
    payload.insert("email".to_string(), Value::String(email.to_string()));
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_typed_when_possible() {
        let claims = vec!["admin=true".to_string(), "level=3".to_string(), "name=Sam".to_string()];
        let payload = build_payload("a@x.com", &claims).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({ "admin": true, "level": 3, "name": "Sam", "email": "a@x.com" })
        );
    }

    #[test]
    fn email_flag_wins_over_claim() {
        let payload = build_payload("a@x.com", &["email=b@x.com".to_string()]).unwrap();
        assert_eq!(payload["email"], json!("a@x.com"));
    }

    #[test]
    fn rejects_malformed_claims() {
        assert!(build_payload("a@x.com", &["novalue".to_string()]).is_err());
        assert!(build_payload("a@x.com", &["=1".to_string()]).is_err());
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let signer = TokenSigner::new("s3cret").unwrap();
        let token = signer.issue(build_payload("a@x.com", &[]).unwrap()).unwrap();
        assert_eq!(signer.verify(&token).unwrap().email(), Some("a@x.com"));
    }
}
