use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use crate::error::{ClientError, js_error_text};
use crate::logger::Logger;
use crate::transport::OutboundQueue;

/// Browser WebSocket ready-state codes, as an honest enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SocketState {
    pub(crate) fn from_ready_state(code: u16) -> Self {
        match code {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Lifecycle callbacks delivered by a [`Socket`]. Only text frames are
/// forwarded; the signalling protocol is text-based.
#[derive(Default)]
pub struct SocketHandlers {
    pub on_open: Option<Box<dyn Fn()>>,
    pub on_message: Option<Box<dyn Fn(String)>>,
    pub on_error: Option<Box<dyn Fn(String)>>,
    pub on_close: Option<Box<dyn Fn()>>,
}

struct SocketCore {
    address: String,
    ws: web_sys::WebSocket,
    queue: RefCell<OutboundQueue>,
    handlers: SocketHandlers,
}

impl SocketCore {
    fn state(&self) -> SocketState {
        SocketState::from_ready_state(self.ws.ready_state())
    }
}

/// A message-oriented duplex connection that buffers outbound traffic until
/// the underlying WebSocket opens. Delivery is reliable within a single
/// connection only: the buffer is discarded on error or close, and no retry
/// logic lives at this layer.
pub struct Socket {
    core: Rc<SocketCore>,
}

impl Socket {
    pub fn connect(address: &str, handlers: SocketHandlers) -> Result<Self, ClientError> {
        Logger::info(&format!("[socket] connecting to [{address}]"));

        let ws = web_sys::WebSocket::new(address)
            .map_err(|err| ClientError::Transport(js_error_text(&err)))?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        let core = Rc::new(SocketCore {
            address: address.to_owned(),
            ws,
            queue: RefCell::new(OutboundQueue::new()),
            handlers,
        });

        let onopen = {
            let core = core.clone();
            Closure::wrap(Box::new(move |_: web_sys::Event| {
                Logger::info("[socket] connection has been opened");
                {
                    let mut queue = core.queue.borrow_mut();
                    Logger::debug(&format!(
                        "[socket] there are [{}] messages in the queue",
                        queue.len()
                    ));
                    queue.drain_with(|message| {
                        if core.state() != SocketState::Open {
                            return false;
                        }
                        core.ws.send_with_str(message).is_ok()
                    });
                }
                if let Some(callback) = &core.handlers.on_open {
                    callback();
                }
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        core.ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let onmessage = {
            let core = core.clone();
            Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
                if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                    if let Some(callback) = &core.handlers.on_message {
                        callback(String::from(text));
                    }
                } else {
                    Logger::debug("[socket] dropping non-text frame");
                }
            }) as Box<dyn FnMut(web_sys::MessageEvent)>)
        };
        core.ws
            .set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onerror = {
            let core = core.clone();
            Closure::wrap(Box::new(move |event: web_sys::Event| {
                core.queue.borrow_mut().clear();
                let text = event
                    .dyn_ref::<web_sys::ErrorEvent>()
                    .map(|err| err.message())
                    .unwrap_or_else(|| "connection failure".to_owned());
                Logger::error(&format!("[socket] fail: {text}"));
                if let Some(callback) = &core.handlers.on_error {
                    callback(text);
                }
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        core.ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let onclose = {
            let core = core.clone();
            Closure::wrap(Box::new(move |event: web_sys::CloseEvent| {
                core.queue.borrow_mut().clear();
                Logger::debug(&format!(
                    "[socket] closed (code {}, reason [{}])",
                    event.code(),
                    event.reason()
                ));
                if let Some(callback) = &core.handlers.on_close {
                    callback();
                }
            }) as Box<dyn FnMut(web_sys::CloseEvent)>)
        };
        core.ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        Ok(Self { core })
    }

    /// Transmits immediately when open, otherwise enqueues at the tail of
    /// the outbound buffer.
    pub fn send(&self, message: &str) {
        if self.state() == SocketState::Open {
            Logger::debug(&format!("[socket] sending: {message}"));
            if let Err(err) = self.core.ws.send_with_str(message) {
                Logger::warn(&format!("[socket] send failed: {}", js_error_text(&err)));
            }
        } else {
            self.core.queue.borrow_mut().push(message.to_owned());
        }
    }

    pub fn state(&self) -> SocketState {
        self.core.state()
    }

    pub fn address(&self) -> &str {
        &self.core.address
    }

    pub fn close(&self) {
        let _ = self.core.ws.close();
    }
}
