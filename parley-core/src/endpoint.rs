use thiserror::Error;

/// Fixed port of the signalling rendezvous service.
pub const DEFAULT_SIGNALLING_PORT: u16 = 8443;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("unsupported page scheme: {0}")]
    UnsupportedScheme(String),
    #[error("empty host name")]
    EmptyHost,
}

/// Derives the default signalling address from the hosting page's scheme and
/// host: `http` pages talk `ws`, `https` pages talk `wss`, pages opened from
/// disk fall back to loopback. Anything else is a configuration error —
/// better to refuse than to silently connect elsewhere.
pub fn default_endpoint(scheme: &str, hostname: &str) -> Result<String, EndpointError> {
    let scheme = scheme.trim_end_matches(':');
    let (proto, host) = match scheme {
        "file" => ("ws", "127.0.0.1"),
        "https" => ("wss", hostname),
        "http" => ("ws", hostname),
        other => return Err(EndpointError::UnsupportedScheme(other.to_owned())),
    };
    if host.is_empty() {
        return Err(EndpointError::EmptyHost);
    }
    Ok(format!("{proto}://{host}:{DEFAULT_SIGNALLING_PORT}"))
}
