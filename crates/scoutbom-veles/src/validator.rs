//! Generic HTTP validator template (spec §4.6): one request per secret,
//! classified into a three-valued outcome. Only programmer errors (a
//! malformed URL, a `Body` closure returning `Err`) surface as a real
//! `anyhow::Error`; every network-shaped failure becomes `Failed`.

use scoutbom_core::Secret;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Failed,
}

/// Result of an expiration probe (spec §4.7's expiration enrichers). Unknown
/// covers every non-fatal case — network failure, malformed body, no
/// matching token in the response — the enricher leaves the secret alone
/// rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationProbe {
    Expires(time::OffsetDateTime),
    Never,
    Unknown,
}

pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub error: Option<String>,
}

impl ValidationOutcome {
    fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            error: None,
        }
    }
    fn invalid() -> Self {
        Self {
            status: ValidationStatus::Invalid,
            error: None,
        }
    }
    fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Declarative shape of a vendor validator: build one request per secret and
/// classify the response by status code. `headers`/`body` are closures
/// rather than fixed strings because most vendors need the secret's
/// cleartext embedded in a header or request body.
pub struct HttpValidatorTemplate {
    pub endpoint: String,
    pub method: &'static str,
    pub headers: fn(&Secret) -> HashMap<String, String>,
    pub body: fn(&Secret) -> anyhow::Result<String>,
    pub valid_codes: &'static [u16],
    pub invalid_codes: &'static [u16],
}

impl HttpValidatorTemplate {
    pub fn validate(&self, secret: &Secret) -> ValidationOutcome {
        let body = match (self.body)(secret) {
            Ok(b) => b,
            Err(err) => return ValidationOutcome::failed(err.to_string()),
        };

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(std::time::Duration::from_secs(10)))
            .build()
            .into();

        let mut request = match self.method {
            "GET" => agent.get(&self.endpoint),
            "POST" => agent.post(&self.endpoint),
            "PUT" => agent.put(&self.endpoint),
            other => return ValidationOutcome::failed(format!("unsupported HTTP method {other:?}")),
        };
        for (name, value) in (self.headers)(secret) {
            request = request.header(&name, &value);
        }

        let result = if body.is_empty() {
            request.call()
        } else {
            request.send(&body)
        };

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                if self.valid_codes.contains(&status) {
                    ValidationOutcome::valid()
                } else if self.invalid_codes.contains(&status) {
                    ValidationOutcome::invalid()
                } else {
                    ValidationOutcome::failed(format!("unexpected status {status}"))
                }
            }
            Err(ureq::Error::StatusCode(status)) => {
                if self.valid_codes.contains(&status) {
                    ValidationOutcome::valid()
                } else if self.invalid_codes.contains(&status) {
                    ValidationOutcome::invalid()
                } else {
                    ValidationOutcome::failed(format!("unexpected status {status}"))
                }
            }
            Err(err) => ValidationOutcome::failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutbom_core::SecretKind;

    #[test]
    fn programmer_error_in_body_closure_is_failed_not_panic() {
        let template = HttpValidatorTemplate {
            endpoint: "https://example.invalid/validate".to_string(),
            method: "POST",
            headers: |_| HashMap::new(),
            body: |_| anyhow::bail!("body construction failed"),
            valid_codes: &[200],
            invalid_codes: &[401],
        };
        let secret = Secret::new("loc", SecretKind::Generic { value: "x".to_string() });
        let outcome = template.validate(&secret);
        assert_eq!(outcome.status, ValidationStatus::Failed);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn unsupported_method_is_failed() {
        let template = HttpValidatorTemplate {
            endpoint: "https://example.invalid/validate".to_string(),
            method: "DELETE",
            headers: |_| HashMap::new(),
            body: |_| Ok(String::new()),
            valid_codes: &[200],
            invalid_codes: &[401],
        };
        let secret = Secret::new("loc", SecretKind::Generic { value: "x".to_string() });
        assert_eq!(template.validate(&secret).status, ValidationStatus::Failed);
    }
}
