mod v1;

use std::rc::Rc;

use parley_core::{IceCandidate, SessionDescription, SignalMessage, SignalPayload};

use crate::error::ClientError;
use crate::logger::Logger;

pub use v1::{SignallingV1, V1Api};

/// Callback set a signalling session delivers into. All optional; absent
/// callbacks drop the event.
#[derive(Default)]
pub struct SignallingCallbacks {
    /// A connection attempt was issued (the socket may still be opening).
    pub on_connect: Option<Box<dyn Fn()>>,
    /// The underlying transport reached the open state.
    pub on_open: Option<Box<dyn Fn()>>,
    pub on_close: Option<Box<dyn Fn()>>,
    pub on_error: Option<Box<dyn Fn(ClientError)>>,
    /// A server-side exception frame; carries the raw frame text.
    pub on_server_error: Option<Box<dyn Fn(String)>>,
    /// `None` when the peer asks this side to initiate the offer, the
    /// payload otherwise.
    pub on_offer: Option<Box<dyn Fn(Option<&SignalPayload>)>>,
    pub on_message: Option<Box<dyn Fn(&SignalPayload)>>,
}

/// Immutable configuration a signalling session is built from. `address:
/// None` resolves the default endpoint from the hosting page.
#[derive(Default)]
pub struct SignallingConfig {
    pub address: Option<String>,
    pub callbacks: SignallingCallbacks,
}

/// Constructor seam for signalling implementations. Keeps the session
/// orchestrator agnostic of the protocol version behind the handle.
pub trait SignallingApi {
    fn open(&self, config: SignallingConfig) -> Result<Rc<dyn SignallingSession>, ClientError>;
}

/// The capability set the orchestrator depends on.
pub trait SignallingSession {
    /// Opens a fresh connection to the signalling server. Each call starts
    /// a new transport; errors are reported through the error callback.
    fn connect(&self);
    fn close(&self);
    fn address(&self) -> String;
    /// Sends a raw frame; a no-op until `connect` has been called.
    fn send_raw(&self, data: &str);
    fn offer_session(&self, desc: &SessionDescription);
    fn offer_candidate(&self, candidate: &IceCandidate);
}

/// Routes one raw inbound frame to the configured callbacks. Structured
/// payloads reach `on_offer` first and `on_message` second; frames that
/// classify as neither prefix nor payload are logged and dropped.
pub fn dispatch(callbacks: &SignallingCallbacks, raw: &str) {
    match SignalMessage::decode(raw) {
        Ok(SignalMessage::Hello) => Logger::info("[signalling] session is opened"),
        Ok(SignalMessage::ServerError(text)) => {
            if let Some(callback) = &callbacks.on_server_error {
                callback(text);
            }
        }
        Ok(SignalMessage::OfferRequest) => {
            if let Some(callback) = &callbacks.on_offer {
                callback(None);
            }
        }
        Ok(SignalMessage::Payload(payload)) => {
            if let Some(callback) = &callbacks.on_offer {
                callback(Some(&payload));
            }
            if let Some(callback) = &callbacks.on_message {
                callback(&payload);
            }
        }
        Err(err) => Logger::warn(&format!("[signalling] dropping frame: {err}")),
    }
}
