//! Error types for the completion gateway.

use ap_protocol::agent_models::ResolvedProvider;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No credential is configured for the resolved provider.
    #[error("{} API key is not configured.", .0.display_name())]
    AuthMissing(ResolvedProvider),

    /// The vendor rejected the call or could not be reached.
    #[error("{} API Error: {message}", .provider.display_name())]
    Vendor {
        provider: ResolvedProvider,
        message: String,
    },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl GatewayError {
    pub(crate) fn vendor(provider: ResolvedProvider, message: impl Into<String>) -> Self {
        Self::Vendor {
            provider,
            message: message.into(),
        }
    }
}
