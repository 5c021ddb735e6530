mod ice;
mod session;
mod signal;

pub use ice::{IceCandidate, IceServerConfig};
pub use session::{SdpKind, SessionDescription};
pub use signal::{
    DecodeError, ERROR_PREFIX, HELLO_PREFIX, OFFER_REQUEST_PREFIX, SignalMessage, SignalPayload,
};
