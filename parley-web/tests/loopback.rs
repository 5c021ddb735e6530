//! Two peer sessions joined by an in-memory signalling exchange, driven to
//! a live connection the way the rendezvous service would drive them.
#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::RtcPeerConnectionState;

use parley_core::{IceCandidate, SessionDescription, SignalPayload};
use parley_web::{
    ClientError, PeerSession, SessionCallbacks, SessionOptions, SignallingApi, SignallingCallbacks,
    SignallingConfig, SignallingSession, dispatch,
};

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn peer(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// An in-memory stand-in for the rendezvous service: frames sent by one
/// side are dispatched into the other side's wiring on the next tick.
#[derive(Default)]
struct Exchange {
    left: RefCell<Option<Rc<SignallingCallbacks>>>,
    right: RefCell<Option<Rc<SignallingCallbacks>>>,
}

impl Exchange {
    fn slot(&self, side: Side) -> &RefCell<Option<Rc<SignallingCallbacks>>> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn register(&self, side: Side, callbacks: SignallingCallbacks) {
        *self.slot(side).borrow_mut() = Some(Rc::new(callbacks));
    }

    fn deliver(&self, side: Side, raw: String) {
        let callbacks = self.slot(side).borrow().clone();
        if let Some(callbacks) = callbacks {
            wasm_bindgen_futures::spawn_local(async move {
                dispatch(&callbacks, &raw);
            });
        }
    }
}

struct LoopbackApi {
    exchange: Rc<Exchange>,
    side: Side,
}

impl SignallingApi for LoopbackApi {
    fn open(&self, config: SignallingConfig) -> Result<Rc<dyn SignallingSession>, ClientError> {
        self.exchange.register(self.side, config.callbacks);
        Ok(Rc::new(LoopbackSession {
            exchange: self.exchange.clone(),
            side: self.side,
        }))
    }
}

struct LoopbackSession {
    exchange: Rc<Exchange>,
    side: Side,
}

impl LoopbackSession {
    fn own_callbacks(&self) -> Option<Rc<SignallingCallbacks>> {
        self.exchange.slot(self.side).borrow().clone()
    }
}

impl SignallingSession for LoopbackSession {
    fn connect(&self) {
        if let Some(callbacks) = self.own_callbacks() {
            if let Some(on_connect) = &callbacks.on_connect {
                on_connect();
            }
            if let Some(on_open) = &callbacks.on_open {
                on_open();
            }
        }
    }

    fn close(&self) {
        if let Some(callbacks) = self.own_callbacks() {
            if let Some(on_close) = &callbacks.on_close {
                on_close();
            }
        }
    }

    fn address(&self) -> String {
        "loopback://".to_owned()
    }

    fn send_raw(&self, data: &str) {
        self.exchange.deliver(self.side.peer(), data.to_owned());
    }

    fn offer_session(&self, desc: &SessionDescription) {
        if let Ok(raw) = SignalPayload::Session(desc.clone()).encode() {
            self.send_raw(&raw);
        }
    }

    fn offer_candidate(&self, candidate: &IceCandidate) {
        if let Ok(raw) = SignalPayload::Candidate(candidate.clone()).encode() {
            self.send_raw(&raw);
        }
    }
}

fn local_only_options() -> SessionOptions {
    SessionOptions {
        // host candidates are enough for a same-page loopback
        ice_servers: Vec::new(),
        ..Default::default()
    }
}

fn session(exchange: &Rc<Exchange>, side: Side) -> PeerSession {
    PeerSession::with_api(
        &LoopbackApi {
            exchange: exchange.clone(),
            side,
        },
        local_only_options(),
        SessionCallbacks::default(),
    )
    .unwrap()
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    let _ = JsFuture::from(promise).await;
}

fn connected(session: &PeerSession) -> bool {
    session.connection_state() == Some(RtcPeerConnectionState::Connected)
}

#[wasm_bindgen_test]
async fn offer_request_drives_both_sides_to_connected() {
    let exchange = Rc::new(Exchange::default());
    let left = session(&exchange, Side::Left);
    let right = session(&exchange, Side::Right);

    left.prepare();
    right.prepare();

    // the rendezvous service elects the left side as the offerer
    exchange.deliver(Side::Left, "OFFER_REQUEST".to_owned());

    for _ in 0..100 {
        if connected(&left) && connected(&right) {
            break;
        }
        sleep(100).await;
    }

    assert!(connected(&left), "left side never reached Connected");
    assert!(connected(&right), "right side never reached Connected");
    assert!(left.is_active());
    assert!(right.is_active());
}

#[wasm_bindgen_test]
async fn duplicate_offer_request_keeps_a_single_connection() {
    let exchange = Rc::new(Exchange::default());
    let left = session(&exchange, Side::Left);

    left.prepare();
    exchange.deliver(Side::Left, "OFFER_REQUEST".to_owned());
    sleep(100).await;
    let first = left.connection().expect("no connection after offer request");

    exchange.deliver(Side::Left, "OFFER_REQUEST".to_owned());
    sleep(100).await;
    let second = left.connection().expect("connection vanished");

    assert!(js_sys::Object::is(first.as_ref(), second.as_ref()));
}
