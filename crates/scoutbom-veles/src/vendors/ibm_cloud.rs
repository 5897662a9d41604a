//! IBM Cloud API key validator: exchange the key for a bearer token via
//! `POST /identity/token`, then `GET /v1/apikeys/details` with both the
//! bearer and the original key to confirm validity.

use crate::validator::{ExpirationProbe, ValidationOutcome};
use scoutbom_core::{Secret, SecretKind};

const TOKEN_ENDPOINT: &str = "https://iam.cloud.ibm.com/identity/token";
const DETAILS_ENDPOINT: &str = "https://iam.cloud.ibm.com/v1/apikeys/details";

fn key_of(secret: &Secret) -> anyhow::Result<&str> {
    match &secret.secret {
        SecretKind::IbmCloudApiKey { key } => Ok(key.as_str()),
        other => anyhow::bail!("ibm cloud validator invoked on non-ibm-cloud secret: {other:?}"),
    }
}

/// Full two-step validation: exchange the key for a bearer, then query
/// apikey details. The token exchange is a programmer-error-only step (a
/// malformed request), so its failure still yields `Failed` rather than
/// propagating an `Err` out of `validate`.
pub fn validate(secret: &Secret) -> ValidationOutcome {
    let key = match key_of(secret) {
        Ok(k) => k,
        Err(err) => {
            return crate::validator::ValidationOutcome {
                status: crate::validator::ValidationStatus::Failed,
                error: Some(err.to_string()),
            }
        }
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(10)))
        .build()
        .into();

    let form = format!("grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={key}");
    let token_response = agent
        .post(TOKEN_ENDPOINT)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .send(&form);

    let bearer = match token_response {
        Ok(mut response) => {
            let parsed: Result<TokenResponse, _> = response.body_mut().read_json();
            match parsed {
                Ok(t) => t.access_token,
                Err(err) => {
                    return crate::validator::ValidationOutcome {
                        status: crate::validator::ValidationStatus::Failed,
                        error: Some(err.to_string()),
                    }
                }
            }
        }
        Err(ureq::Error::StatusCode(401)) | Err(ureq::Error::StatusCode(400)) => {
            return crate::validator::ValidationOutcome {
                status: crate::validator::ValidationStatus::Invalid,
                error: None,
            }
        }
        Err(err) => {
            return crate::validator::ValidationOutcome {
                status: crate::validator::ValidationStatus::Failed,
                error: Some(err.to_string()),
            }
        }
    };

    let details = agent
        .get(DETAILS_ENDPOINT)
        .header("Authorization", &format!("Bearer {bearer}"))
        .header("IAM-Apikey", key)
        .call();

    match details {
        Ok(response) => {
            let status = response.status().as_u16();
            if status == 200 {
                crate::validator::ValidationOutcome {
                    status: crate::validator::ValidationStatus::Valid,
                    error: None,
                }
            } else {
                crate::validator::ValidationOutcome {
                    status: crate::validator::ValidationStatus::Invalid,
                    error: None,
                }
            }
        }
        Err(ureq::Error::StatusCode(status)) if status == 400 || status == 401 || status == 403 => {
            crate::validator::ValidationOutcome {
                status: crate::validator::ValidationStatus::Invalid,
                error: None,
            }
        }
        Err(err) => crate::validator::ValidationOutcome {
            status: crate::validator::ValidationStatus::Failed,
            error: Some(err.to_string()),
        },
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(serde::Deserialize)]
pub struct ApiKeyDetails {
    pub expires_at: Option<String>,
}

/// Live expiration probe: repeats the token exchange and details lookup,
/// parsing `expires_at` as RFC 3339. A `None` field or a parse failure is
/// `Unknown`, never an assumed "does not expire" — IBM Cloud keys without a
/// TTL configured simply omit the field, which looks identical to a vendor
/// error from here.
pub fn fetch_expiration(secret: &Secret) -> ExpirationProbe {
    let key = match key_of(secret) {
        Ok(k) => k,
        Err(_) => return ExpirationProbe::Unknown,
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(10)))
        .build()
        .into();

    let form = format!("grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={key}");
    let token_response = agent
        .post(TOKEN_ENDPOINT)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .send(&form);

    let bearer = match token_response {
        Ok(mut response) => match response.body_mut().read_json::<TokenResponse>() {
            Ok(t) => t.access_token,
            Err(_) => return ExpirationProbe::Unknown,
        },
        Err(_) => return ExpirationProbe::Unknown,
    };

    let details = agent
        .get(DETAILS_ENDPOINT)
        .header("Authorization", &format!("Bearer {bearer}"))
        .header("IAM-Apikey", key)
        .call();

    let details: ApiKeyDetails = match details {
        Ok(mut response) => match response.body_mut().read_json() {
            Ok(d) => d,
            Err(_) => return ExpirationProbe::Unknown,
        },
        Err(_) => return ExpirationProbe::Unknown,
    };

    match details.expires_at {
        Some(raw) => match time::OffsetDateTime::parse(&raw, &time::format_description::well_known::Rfc3339) {
            Ok(dt) => ExpirationProbe::Expires(dt),
            Err(_) => ExpirationProbe::Unknown,
        },
        None => ExpirationProbe::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_response_parses_expiration() {
        let body = r#"{"expires_at": "2030-01-01T00:00:00Z"}"#;
        let details: ApiKeyDetails = serde_json::from_str(body).unwrap();
        assert_eq!(details.expires_at.as_deref(), Some("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn missing_expiration_is_none() {
        let details: ApiKeyDetails = serde_json::from_str("{}").unwrap();
        assert!(details.expires_at.is_none());
    }
}
