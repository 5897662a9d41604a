//! NuGet publish API key validator: `PUT <host>/api/v2/package` with an
//! intentionally empty octet-stream body. A valid key authenticates and
//! then fails on the (empty) package contents with 400; an invalid key
//! never gets that far and is rejected with 403. Preserved exactly as
//! observed rather than switched to a dedicated introspection endpoint,
//! per the open question in spec §9.

use crate::validator::{HttpValidatorTemplate, ValidationOutcome};
use scoutbom_core::{Secret, SecretKind};
use std::collections::HashMap;

const DEFAULT_ENDPOINT: &str = "https://www.nuget.org/api/v2/package";

fn key_of(secret: &Secret) -> anyhow::Result<&str> {
    match &secret.secret {
        SecretKind::NuGetApiKey { key } => Ok(key.as_str()),
        other => anyhow::bail!("nuget validator invoked on non-nuget secret: {other:?}"),
    }
}

pub fn template(endpoint: &str) -> HttpValidatorTemplate {
    HttpValidatorTemplate {
        endpoint: endpoint.to_string(),
        method: "PUT",
        headers: |secret| {
            let mut headers = HashMap::new();
            if let Ok(key) = key_of(secret) {
                headers.insert("X-NuGet-ApiKey".to_string(), key.to_string());
            }
            headers.insert("X-NuGet-Protocol-Version".to_string(), "4.1.0".to_string());
            headers.insert(
                "Content-Type".to_string(),
                "application/octet-stream".to_string(),
            );
            headers
        },
        body: |_| Ok(String::new()),
        // A 400 ("failed to read package") means the key authenticated and
        // the upload itself was rejected for being empty — that is success
        // from the validator's point of view.
        valid_codes: &[400],
        invalid_codes: &[403],
    }
}

pub fn validate(secret: &Secret) -> ValidationOutcome {
    template(DEFAULT_ENDPOINT).validate(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes_treat_empty_upload_rejection_as_success() {
        let template = template(DEFAULT_ENDPOINT);
        assert_eq!(template.valid_codes, &[400]);
        assert_eq!(template.invalid_codes, &[403]);
    }

    #[test]
    fn headers_carry_the_candidate_key() {
        let secret = Secret::new(
            "",
            SecretKind::NuGetApiKey {
                key: "oy2abc123".to_string(),
            },
        );
        let headers = (template(DEFAULT_ENDPOINT).headers)(&secret);
        assert_eq!(headers.get("X-NuGet-ApiKey"), Some(&"oy2abc123".to_string()));
        assert_eq!(
            headers.get("X-NuGet-Protocol-Version"),
            Some(&"4.1.0".to_string())
        );
    }
}
