use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{RtcPeerConnection, RtcSdpType, RtcSessionDescriptionInit};

use parley_core::{IceCandidate, SdpKind, SessionDescription};

use crate::error::{ClientError, js_error_text};
use crate::logger::Logger;
use crate::session::SessionInner;

// The connection slot is re-read after every await: a close event may null
// it while an exchange is in flight, and an absent connection is a no-op,
// not a failure.
fn current_connection(inner: &Rc<SessionInner>) -> Option<RtcPeerConnection> {
    inner.connection.borrow().clone()
}

/// Creates the local offer and publishes it to the peer.
pub(crate) async fn create_offer(inner: Rc<SessionInner>) -> Result<(), ClientError> {
    let Some(connection) = current_connection(&inner) else {
        return Ok(());
    };
    let offer = JsFuture::from(connection.create_offer())
        .await
        .map_err(negotiation)?;
    let sdp = description_sdp(&offer)?;
    send_local_description(
        inner,
        SessionDescription {
            kind: SdpKind::Offer,
            sdp,
        },
    )
    .await
}

/// Applies a session description received from the peer; an offer is
/// additionally answered.
pub(crate) async fn apply_remote_description(
    inner: Rc<SessionInner>,
    desc: SessionDescription,
) -> Result<(), ClientError> {
    let Some(connection) = current_connection(&inner) else {
        return Ok(());
    };
    JsFuture::from(connection.set_remote_description(&description_init(&desc)))
        .await
        .map_err(negotiation)?;
    Logger::debug("[webrtc] remote SDP set");

    if desc.kind != SdpKind::Offer {
        return Ok(());
    }

    Logger::debug("[webrtc] got SDP offer");
    let Some(connection) = current_connection(&inner) else {
        return Ok(());
    };
    let answer = JsFuture::from(connection.create_answer())
        .await
        .map_err(negotiation)?;
    let sdp = description_sdp(&answer)?;
    send_local_description(
        inner,
        SessionDescription {
            kind: SdpKind::Answer,
            sdp,
        },
    )
    .await
}

/// Sets the local description and forwards what the connection settled on
/// to the peer.
pub(crate) async fn send_local_description(
    inner: Rc<SessionInner>,
    desc: SessionDescription,
) -> Result<(), ClientError> {
    Logger::info("[webrtc] got local SDP");
    let Some(connection) = current_connection(&inner) else {
        return Ok(());
    };
    JsFuture::from(connection.set_local_description(&description_init(&desc)))
        .await
        .map_err(negotiation)?;

    let outgoing = current_connection(&inner)
        .and_then(|connection| connection.local_description())
        .and_then(|native| session_from_native(&native))
        .unwrap_or(desc);

    Logger::debug(&format!("[webrtc] sending SDP {:?}", outgoing.kind));
    let signalling = inner.signalling.borrow().clone();
    if let Some(signalling) = signalling {
        signalling.offer_session(&outgoing);
    }
    Ok(())
}

/// Feeds a trickled remote candidate into the native connection.
pub(crate) async fn add_remote_candidate(
    inner: Rc<SessionInner>,
    ice: IceCandidate,
) -> Result<(), ClientError> {
    Logger::debug(&format!("[webrtc][ice] received ice {}", ice.candidate));
    let Some(connection) = current_connection(&inner) else {
        return Ok(());
    };

    let init = web_sys::RtcIceCandidateInit::new(&ice.candidate);
    if let Some(mid) = &ice.sdp_mid {
        init.set_sdp_mid(Some(mid));
    }
    if let Some(index) = ice.sdp_m_line_index {
        init.set_sdp_m_line_index(Some(index));
    }

    JsFuture::from(connection.add_ice_candidate_with_opt_rtc_ice_candidate_init(Some(&init)))
        .await
        .map_err(negotiation)?;
    Ok(())
}

fn negotiation(err: JsValue) -> ClientError {
    ClientError::Negotiation(js_error_text(&err))
}

fn description_init(desc: &SessionDescription) -> RtcSessionDescriptionInit {
    let init = RtcSessionDescriptionInit::new(sdp_type(desc.kind));
    init.set_sdp(&desc.sdp);
    init
}

fn description_sdp(value: &JsValue) -> Result<String, ClientError> {
    js_sys::Reflect::get(value, &JsValue::from_str("sdp"))
        .ok()
        .and_then(|sdp| sdp.as_string())
        .ok_or_else(|| ClientError::Negotiation("description without sdp".into()))
}

fn session_from_native(native: &web_sys::RtcSessionDescription) -> Option<SessionDescription> {
    sdp_kind(native.type_()).map(|kind| SessionDescription {
        kind,
        sdp: native.sdp(),
    })
}

fn sdp_type(kind: SdpKind) -> RtcSdpType {
    match kind {
        SdpKind::Offer => RtcSdpType::Offer,
        SdpKind::Pranswer => RtcSdpType::Pranswer,
        SdpKind::Answer => RtcSdpType::Answer,
        SdpKind::Rollback => RtcSdpType::Rollback,
    }
}

fn sdp_kind(kind: RtcSdpType) -> Option<SdpKind> {
    match kind {
        RtcSdpType::Offer => Some(SdpKind::Offer),
        RtcSdpType::Pranswer => Some(SdpKind::Pranswer),
        RtcSdpType::Answer => Some(SdpKind::Answer),
        RtcSdpType::Rollback => Some(SdpKind::Rollback),
        _ => None,
    }
}
