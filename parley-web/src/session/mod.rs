mod data_channel_impl;
mod negotiate_impl;
mod open_peer_impl;
mod retry;
mod state;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{MediaStream, RtcDataChannel, RtcPeerConnection, RtcPeerConnectionState};

use parley_core::util::default_ice_servers;
use parley_core::{IceServerConfig, SignalPayload};

use crate::error::ClientError;
use crate::logger::Logger;
use crate::signalling::{
    SignallingApi, SignallingCallbacks, SignallingConfig, SignallingSession, V1Api,
};

use open_peer_impl::open_peer_connection;
use retry::{BackoffTimer, RetrySlot};
use state::PeerSessionState;

/// Name of the data channel opened on every new peer connection.
pub(crate) const DEFAULT_CHANNEL: &str = "ch0";

// Backoff is fixed, not exponential. Signalling errors wait noticeably
// longer than plain closes before the next attempt.
const ERROR_RETRY_DELAY_MS: i32 = 3_000;
const CLOSE_RETRY_DELAY_MS: i32 = 1_000;

/// Tunables of a peer session.
pub struct SessionOptions {
    /// Signalling address; `None` derives the default from the hosting page.
    pub address: Option<String>,
    pub ice_servers: Vec<IceServerConfig>,
    /// Reconnect attempt budget checked by `prepare`.
    pub max_attempts: u32,
    /// Keep forwarding local candidates after the gathering-complete
    /// sentinel. Off by default: completion latches the trickle shut.
    pub trickle_after_complete: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            address: None,
            ice_servers: default_ice_servers(),
            max_attempts: 3,
            trickle_after_complete: false,
        }
    }
}

/// Caller-facing lifecycle callbacks. Every failure of the session surfaces
/// here; the session never panics the page and never throws past its own
/// boundary on asynchronous paths.
#[derive(Default)]
pub struct SessionCallbacks {
    /// A connection pass is starting.
    pub on_prepare: Option<Box<dyn Fn()>>,
    /// The attempt budget is exhausted; no further automatic attempts.
    pub on_prepare_fail: Option<Box<dyn Fn()>>,
    pub on_connect: Option<Box<dyn Fn()>>,
    pub on_open: Option<Box<dyn Fn()>>,
    pub on_close: Option<Box<dyn Fn()>>,
    pub on_error: Option<Box<dyn Fn(ClientError)>>,
    pub on_message: Option<Box<dyn Fn(&SignalPayload)>>,
    pub on_remote_track: Option<Box<dyn Fn(web_sys::RtcTrackEvent)>>,
}

pub(crate) struct SessionInner {
    pub(crate) options: SessionOptions,
    pub(crate) callbacks: SessionCallbacks,
    pub(crate) state: RefCell<PeerSessionState>,
    pub(crate) connection: RefCell<Option<RtcPeerConnection>>,
    pub(crate) channels: RefCell<HashMap<String, RtcDataChannel>>,
    pub(crate) retry: RefCell<RetrySlot<BackoffTimer>>,
    pub(crate) signalling: RefCell<Option<Rc<dyn SignallingSession>>>,
}

/// The peer session orchestrator: owns the native connection, consumes
/// signalling events, drives offer/answer/ICE exchange and reconnects with
/// a bounded number of attempts.
pub struct PeerSession {
    inner: Rc<SessionInner>,
}

impl PeerSession {
    /// Builds a session against the v1 signalling protocol.
    pub fn new(options: SessionOptions, callbacks: SessionCallbacks) -> Result<Self, ClientError> {
        Self::with_api(&V1Api, options, callbacks)
    }

    /// Builds a session against a caller-supplied signalling implementation.
    pub fn with_api(
        api: &dyn SignallingApi,
        options: SessionOptions,
        callbacks: SessionCallbacks,
    ) -> Result<Self, ClientError> {
        let address = options.address.clone();
        let inner = Rc::new(SessionInner {
            options,
            callbacks,
            state: RefCell::new(PeerSessionState::default()),
            connection: RefCell::new(None),
            channels: RefCell::new(HashMap::new()),
            retry: RefCell::new(RetrySlot::default()),
            signalling: RefCell::new(None),
        });

        let signalling = api.open(SignallingConfig {
            address,
            callbacks: signalling_callbacks(&inner),
        })?;
        *inner.signalling.borrow_mut() = Some(signalling);

        Ok(Self { inner })
    }

    /// Starts (or restarts) a connection pass against the attempt budget.
    pub fn prepare(&self) {
        prepare(&self.inner);
    }

    /// Resets the aggregate connection state and closes the signalling
    /// channel. The native connection is left to the close callback, which
    /// keeps teardown on the same path as transport-initiated closes.
    pub fn shutdown(&self) {
        shutdown(&self.inner);
    }

    pub fn is_active(&self) -> bool {
        self.inner.connection.borrow().is_some()
    }

    pub fn connection(&self) -> Option<RtcPeerConnection> {
        self.inner.connection.borrow().clone()
    }

    pub fn connection_state(&self) -> Option<RtcPeerConnectionState> {
        self.inner.state.borrow().connection_state
    }

    pub fn signalling(&self) -> Option<Rc<dyn SignallingSession>> {
        self.inner.signalling.borrow().clone()
    }

    /// Guarded constructor for the native connection: a no-op while one is
    /// active, so duplicate offer requests cannot double-negotiate.
    pub fn open_peer_connection(&self) {
        open_peer_connection(&self.inner);
    }

    /// Attaches an externally captured media stream to the active
    /// connection; a no-op without one.
    pub fn add_stream(&self, stream: &MediaStream) {
        let connection = self.inner.connection.borrow().clone();
        if let Some(connection) = connection {
            connection.add_stream(stream);
        }
    }
}

/// Wires the signalling events into the session state machine.
fn signalling_callbacks(inner: &Rc<SessionInner>) -> SignallingCallbacks {
    SignallingCallbacks {
        on_connect: Some(Box::new({
            let inner = inner.clone();
            move || {
                inner.retry.borrow_mut().disarm();
                if let Some(callback) = &inner.callbacks.on_connect {
                    callback();
                }
            }
        })),
        on_open: Some(Box::new({
            let inner = inner.clone();
            move || {
                if let Some(callback) = &inner.callbacks.on_open {
                    callback();
                }
            }
        })),
        on_error: Some(Box::new({
            let inner = inner.clone();
            move |err| {
                if let Some(callback) = &inner.callbacks.on_error {
                    callback(err);
                }
                schedule_retry(&inner, ERROR_RETRY_DELAY_MS);
            }
        })),
        on_server_error: Some(Box::new({
            let inner = inner.clone();
            move |text| {
                Logger::error(&format!("[webrtc] got signalling error: {text}"));
                // Fatal for this signalling connection. Tear down only; any
                // reconnect rides the close event that follows.
                shutdown(&inner);
            }
        })),
        on_close: Some(Box::new({
            let inner = inner.clone();
            move || {
                if let Some(callback) = &inner.callbacks.on_close {
                    callback();
                }
                if let Some(connection) = inner.connection.borrow_mut().take() {
                    connection.close();
                }
                schedule_retry(&inner, CLOSE_RETRY_DELAY_MS);
            }
        })),
        on_offer: Some(Box::new({
            let inner = inner.clone();
            move |data: Option<&SignalPayload>| {
                open_peer_connection(&inner);
                if data.is_none() {
                    // The peer wants us to initiate
                    let inner = inner.clone();
                    spawn_local(async move {
                        if let Err(err) = negotiate_impl::create_offer(inner.clone()).await {
                            report_error(&inner, err);
                        }
                    });
                }
            }
        })),
        on_message: Some(Box::new({
            let inner = inner.clone();
            move |payload: &SignalPayload| {
                match payload {
                    SignalPayload::Session(desc) => {
                        let inner = inner.clone();
                        let desc = desc.clone();
                        spawn_local(async move {
                            if let Err(err) =
                                negotiate_impl::apply_remote_description(inner.clone(), desc).await
                            {
                                report_error(&inner, err);
                            }
                        });
                    }
                    SignalPayload::Candidate(ice) => {
                        let inner = inner.clone();
                        let ice = ice.clone();
                        spawn_local(async move {
                            if let Err(err) =
                                negotiate_impl::add_remote_candidate(inner.clone(), ice).await
                            {
                                report_error(&inner, err);
                            }
                        });
                    }
                }
                if let Some(callback) = &inner.callbacks.on_message {
                    callback(payload);
                }
            }
        })),
    }
}

pub(crate) fn prepare(inner: &Rc<SessionInner>) {
    if let Some(callback) = &inner.callbacks.on_prepare {
        callback();
    }

    let admitted = inner
        .state
        .borrow_mut()
        .begin_attempt(inner.options.max_attempts);
    if !admitted {
        Logger::warn("[webrtc] connection attempts are exhausted");
        if let Some(callback) = &inner.callbacks.on_prepare_fail {
            callback();
        }
        return;
    }

    let signalling = inner.signalling.borrow().clone();
    if let Some(signalling) = signalling {
        signalling.connect();
    }
}

pub(crate) fn shutdown(inner: &Rc<SessionInner>) {
    inner.state.borrow_mut().connection_state = None;
    let signalling = inner.signalling.borrow().clone();
    if let Some(signalling) = signalling {
        signalling.close();
    }
}

/// Arms the retry timer unless one is already pending.
fn schedule_retry(inner: &Rc<SessionInner>, delay_ms: i32) {
    if inner.retry.borrow().is_armed() {
        return;
    }
    let fire = {
        let inner = inner.clone();
        move || {
            inner.retry.borrow_mut().disarm();
            prepare(&inner);
        }
    };
    match BackoffTimer::schedule(delay_ms, fire) {
        Ok(timer) => {
            inner.retry.borrow_mut().arm(timer);
        }
        Err(err) => Logger::warn(&format!("[webrtc] failed to arm the retry timer: {err}")),
    }
}

/// Routes an asynchronous failure to the caller. Negotiation failures end
/// here and nowhere else; reconnects are driven solely by transport events.
pub(crate) fn report_error(inner: &Rc<SessionInner>, err: ClientError) {
    match &inner.callbacks.on_error {
        Some(callback) => callback(err),
        None => Logger::error(&format!("[webrtc] {err}")),
    }
}
