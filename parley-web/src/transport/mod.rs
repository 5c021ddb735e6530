mod queue;
mod socket;

pub(crate) use queue::OutboundQueue;
pub use socket::{Socket, SocketHandlers, SocketState};
