mod error;
mod logger;
pub mod session;
pub mod signalling;
pub mod transport;

pub use error::ClientError;
pub use session::{PeerSession, SessionCallbacks, SessionOptions};
pub use signalling::{
    SignallingApi, SignallingCallbacks, SignallingConfig, SignallingSession, V1Api, dispatch,
};
pub use transport::{Socket, SocketHandlers, SocketState};
