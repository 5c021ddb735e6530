use std::cell::RefCell;
use std::rc::Rc;

use parley_core::endpoint::default_endpoint;
use parley_core::{IceCandidate, SessionDescription, SignalPayload};

use crate::error::{ClientError, js_error_text};
use crate::logger::Logger;
use crate::signalling::{
    SignallingApi, SignallingCallbacks, SignallingConfig, SignallingSession, dispatch,
};
use crate::transport::{Socket, SocketHandlers};

/// Protocol version 1 over a WebSocket transport.
pub struct V1Api;

impl SignallingApi for V1Api {
    fn open(&self, config: SignallingConfig) -> Result<Rc<dyn SignallingSession>, ClientError> {
        let address = match config.address {
            Some(address) => address,
            None => page_endpoint()?,
        };
        Ok(Rc::new(SignallingV1 {
            inner: Rc::new(V1Inner {
                address,
                callbacks: Rc::new(config.callbacks),
                socket: RefCell::new(None),
            }),
        }))
    }
}

struct V1Inner {
    address: String,
    callbacks: Rc<SignallingCallbacks>,
    socket: RefCell<Option<Socket>>,
}

/// A v1 signalling session: owns the socket slot and translates between
/// transport events and the signalling vocabulary.
pub struct SignallingV1 {
    inner: Rc<V1Inner>,
}

impl SignallingSession for SignallingV1 {
    fn connect(&self) {
        Logger::debug(&format!("[signalling] connecting to {}", self.inner.address));

        let callbacks = self.inner.callbacks.clone();
        let handlers = SocketHandlers {
            on_open: Some(Box::new({
                let callbacks = callbacks.clone();
                move || {
                    if let Some(callback) = &callbacks.on_open {
                        callback();
                    }
                }
            })),
            on_message: Some(Box::new({
                let callbacks = callbacks.clone();
                move |raw: String| dispatch(&callbacks, &raw)
            })),
            on_error: Some(Box::new({
                let callbacks = callbacks.clone();
                move |text: String| {
                    if let Some(callback) = &callbacks.on_error {
                        callback(ClientError::Transport(text));
                    }
                }
            })),
            on_close: Some(Box::new({
                let callbacks = callbacks.clone();
                move || {
                    if let Some(callback) = &callbacks.on_close {
                        callback();
                    }
                }
            })),
        };

        match Socket::connect(&self.inner.address, handlers) {
            Ok(socket) => {
                *self.inner.socket.borrow_mut() = Some(socket);
                if let Some(callback) = &self.inner.callbacks.on_connect {
                    callback();
                }
            }
            Err(err) => {
                if let Some(callback) = &self.inner.callbacks.on_error {
                    callback(err);
                }
            }
        }
    }

    fn close(&self) {
        // The socket stays in its slot so the close event still reaches the
        // handlers; it is replaced on the next connect.
        if let Some(socket) = self.inner.socket.borrow().as_ref() {
            socket.close();
        }
    }

    fn address(&self) -> String {
        self.inner.address.clone()
    }

    fn send_raw(&self, data: &str) {
        if let Some(socket) = self.inner.socket.borrow().as_ref() {
            socket.send(data);
        }
    }

    fn offer_session(&self, desc: &SessionDescription) {
        match SignalPayload::Session(desc.clone()).encode() {
            Ok(text) => self.send_raw(&text),
            Err(err) => Logger::warn(&format!("[signalling] non-convertible session: {err}")),
        }
    }

    fn offer_candidate(&self, candidate: &IceCandidate) {
        match SignalPayload::Candidate(candidate.clone()).encode() {
            Ok(text) => self.send_raw(&text),
            Err(err) => Logger::warn(&format!("[signalling] non-convertible candidate: {err}")),
        }
    }
}

/// Default endpoint from the hosting page's scheme and host.
fn page_endpoint() -> Result<String, ClientError> {
    let window = web_sys::window()
        .ok_or_else(|| ClientError::Transport("no window to derive the endpoint from".into()))?;
    let location = window.location();
    let scheme = location
        .protocol()
        .map_err(|err| ClientError::Transport(js_error_text(&err)))?;
    let hostname = location
        .hostname()
        .map_err(|err| ClientError::Transport(js_error_text(&err)))?;
    Ok(default_endpoint(&scheme, &hostname)?)
}
