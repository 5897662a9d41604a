//! Heroku Platform API key validator: `GET /oauth/authorizations` with the
//! candidate key as a bearer token, then scan the response for an
//! authorization whose `access_token.token` equals the key.

use crate::validator::{ExpirationProbe, HttpValidatorTemplate, ValidationOutcome};
use scoutbom_core::{Secret, SecretKind};
use std::collections::HashMap;

const ENDPOINT: &str = "https://api.heroku.com/oauth/authorizations";

fn key_of(secret: &Secret) -> anyhow::Result<&str> {
    match &secret.secret {
        SecretKind::HerokuApiKey { key } => Ok(key.as_str()),
        other => anyhow::bail!("heroku validator invoked on non-heroku secret: {other:?}"),
    }
}

pub fn template() -> HttpValidatorTemplate {
    HttpValidatorTemplate {
        endpoint: ENDPOINT.to_string(),
        method: "GET",
        headers: |secret| {
            let mut headers = HashMap::new();
            if let Ok(key) = key_of(secret) {
                headers.insert("Authorization".to_string(), format!("Bearer {key}"));
            }
            headers.insert(
                "Accept".to_string(),
                "application/vnd.heroku+json; version=3".to_string(),
            );
            headers
        },
        body: |_| Ok(String::new()),
        valid_codes: &[200],
        invalid_codes: &[401, 403],
    }
}

pub fn validate(secret: &Secret) -> ValidationOutcome {
    template().validate(secret)
}

#[derive(serde::Deserialize)]
struct Authorization {
    access_token: Option<AccessToken>,
}

#[derive(serde::Deserialize)]
struct AccessToken {
    token: String,
    expires_in: Option<i64>,
}

/// Parse a `GET /oauth/authorizations` response body and, if an
/// authorization's token matches `key`, return its `expires_in` (seconds;
/// `None` meaning the enricher should set `never_expires`).
pub fn parse_expiration(body: &str, key: &str) -> Option<Option<i64>> {
    let authorizations: Vec<Authorization> = serde_json::from_str(body).ok()?;
    authorizations
        .into_iter()
        .find(|a| a.access_token.as_ref().is_some_and(|t| t.token == key))
        .map(|a| a.access_token.and_then(|t| t.expires_in))
}

/// Live expiration probe: re-runs the authorizations lookup and converts the
/// matching `expires_in` (seconds from now) into an absolute timestamp.
/// Anything short of a clean match is `Unknown`, not an error.
pub fn fetch_expiration(secret: &Secret) -> ExpirationProbe {
    let key = match key_of(secret) {
        Ok(k) => k,
        Err(_) => return ExpirationProbe::Unknown,
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(10)))
        .build()
        .into();

    let response = agent
        .get(ENDPOINT)
        .header("Authorization", &format!("Bearer {key}"))
        .header("Accept", "application/vnd.heroku+json; version=3")
        .call();

    let body = match response {
        Ok(mut r) => match r.body_mut().read_to_string() {
            Ok(b) => b,
            Err(_) => return ExpirationProbe::Unknown,
        },
        Err(_) => return ExpirationProbe::Unknown,
    };

    match parse_expiration(&body, key) {
        Some(Some(seconds)) => {
            ExpirationProbe::Expires(time::OffsetDateTime::now_utc() + time::Duration::seconds(seconds))
        }
        Some(None) => ExpirationProbe::Never,
        None => ExpirationProbe::Unknown,
    }
}
