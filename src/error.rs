// src/error.rs
use thiserror::Error;

/// Failures of calls against the DAM portal and of the admin flows built on them.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Domain, client id or client secret is empty.
    #[error("domain or OAuth credentials not configured")]
    ConfigIncomplete,

    /// Token endpoint refused, answered garbage, or returned no token.
    #[error("authorization failed: {reason}")]
    Authorization { reason: String },

    /// Portal check endpoint did not answer 200.
    #[error("domain check failed with status {status}")]
    DomainCheck { status: u16 },

    /// Derivatives endpoint did not answer 200.
    #[error("derivatives request failed with status {status}")]
    Derivatives { status: u16 },

    /// A document asset without a public original file.
    #[error("asset {name} is not public")]
    AssetNotPublic { name: String },

    /// Picked asset lacks the file its block needs.
    #[error("asset {name} has no {file} file")]
    MissingFile { name: String, file: String },

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PortalError {
    pub(crate) fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }

    /// Human-readable message for the administrator screen.
    pub fn operator_message(&self) -> String {
        match self {
            Self::ConfigIncomplete => "Domain or OAuth token not configured!".to_string(),
            Self::Authorization { reason } if reason == MISSING_ACCESS_TOKEN => {
                "Access token could not be retrieved, please verify domain and OAuth credentials are configured correctly."
                    .to_string()
            }
            Self::Authorization { .. } => {
                "Could not authorize, please verify domain and OAuth credentials are configured correctly."
                    .to_string()
            }
            Self::DomainCheck { .. } => {
                "Could not verify the domain, please confirm the domain is entered correctly."
                    .to_string()
            }
            Self::Derivatives { .. } | Self::InvalidResponse(_) | Self::Transport(_) => {
                "Could not fetch derivatives, please verify domain and OAuth credentials are configured correctly."
                    .to_string()
            }
            Self::MissingFile { name, file } => {
                format!("{name} has no {file} file and cannot be inserted.")
            }
            Self::AssetNotPublic { name } => {
                format!("{name} is not marked as public and cannot be selected.")
            }
        }
    }
}

pub(crate) const MISSING_ACCESS_TOKEN: &str = "response has no access_token";

pub type PortalResult<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_has_its_own_operator_message() {
        let e = PortalError::authorization(MISSING_ACCESS_TOKEN);
        assert!(e.is_authorization_failure());
        assert!(e.operator_message().starts_with("Access token could not be retrieved"));

        let e = PortalError::authorization("status 401");
        assert!(e.operator_message().starts_with("Could not authorize"));
    }

    #[test]
    fn asset_not_public_names_the_asset() {
        let e = PortalError::AssetNotPublic {
            name: "brochure.pdf".into(),
        };
        assert_eq!(
            e.operator_message(),
            "brochure.pdf is not marked as public and cannot be selected."
        );
        assert!(!e.is_authorization_failure());
    }
}
