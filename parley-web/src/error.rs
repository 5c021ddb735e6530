use thiserror::Error;
use wasm_bindgen::JsValue;

use parley_core::endpoint::EndpointError;

/// Failures surfaced through the session error callback. Only `Endpoint`
/// (and signalling construction around it) is ever raised synchronously.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Socket-level failure; recoverable through the reconnect policy.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A rejected offer/answer/ICE operation; never triggers reconnect.
    #[error("negotiation failure: {0}")]
    Negotiation(String),
    /// The default signalling address could not be derived.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

pub(crate) fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
