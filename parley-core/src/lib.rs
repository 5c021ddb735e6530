pub mod endpoint;
pub mod model;
pub mod util;

pub use model::{
    DecodeError, IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalMessage,
    SignalPayload,
};
