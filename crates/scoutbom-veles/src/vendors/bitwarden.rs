//! Bitwarden API key validator: exchange a (client_id, client_secret) pair
//! for an access token via the identity server's client-credentials grant.

use crate::validator::{HttpValidatorTemplate, ValidationOutcome};
use scoutbom_core::{Secret, SecretKind};
use std::collections::HashMap;

const DEFAULT_ENDPOINT: &str = "https://identity.bitwarden.com/connect/token";

fn pair_of(secret: &Secret) -> anyhow::Result<(&str, &str)> {
    match &secret.secret {
        SecretKind::BitwardenApiKey {
            client_id,
            client_secret,
        } => Ok((client_id.as_str(), client_secret.as_str())),
        other => anyhow::bail!("bitwarden validator invoked on non-bitwarden secret: {other:?}"),
    }
}

pub fn template(endpoint: &str) -> HttpValidatorTemplate {
    HttpValidatorTemplate {
        endpoint: endpoint.to_string(),
        method: "POST",
        headers: |_| {
            let mut headers = HashMap::new();
            headers.insert(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
            headers
        },
        body: |secret| {
            let (client_id, client_secret) = pair_of(secret)?;
            Ok(format!(
                "grant_type=client_credentials&scope=api&client_id={client_id}&client_secret={client_secret}\
                 &deviceIdentifier=0&deviceType=0&deviceName=scoutbom"
            ))
        },
        valid_codes: &[200],
        invalid_codes: &[400, 401],
    }
}

pub fn validate(secret: &Secret) -> ValidationOutcome {
    template(DEFAULT_ENDPOINT).validate(secret)
}
