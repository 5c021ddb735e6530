use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    RtcConfiguration, RtcDataChannelEvent, RtcPeerConnection, RtcPeerConnectionIceEvent,
    RtcTrackEvent,
};

use parley_core::IceCandidate;

use crate::error::{ClientError, js_error_text};
use crate::logger::Logger;
use crate::session::data_channel_impl::register_data_channel;
use crate::session::state::CandidateAction;
use crate::session::{DEFAULT_CHANNEL, SessionInner, report_error};

/// Creates the native connection unless one is already active. The guard
/// makes duplicate offer-request frames harmless: at most one connection
/// per session, silently.
pub(crate) fn open_peer_connection(inner: &Rc<SessionInner>) {
    if inner.connection.borrow().is_some() {
        return;
    }

    Logger::info("[webrtc] setup peer connection");

    // Session state belongs to the connection being created
    inner.state.borrow_mut().reset();

    let connection = match create_connection(inner) {
        Ok(connection) => connection,
        Err(err) => {
            report_error(inner, ClientError::Negotiation(js_error_text(&err)));
            return;
        }
    };
    *inner.connection.borrow_mut() = Some(connection.clone());

    let channel = connection.create_data_channel(DEFAULT_CHANNEL);
    register_data_channel(inner, channel);
}

fn create_connection(inner: &Rc<SessionInner>) -> Result<RtcPeerConnection, JsValue> {
    let config = RtcConfiguration::new();
    let servers = js_sys::Array::new();
    for server in &inner.options.ice_servers {
        let entry = web_sys::RtcIceServer::new();

        let urls = js_sys::Array::new();
        for url in &server.urls {
            urls.push(&JsValue::from_str(url));
        }
        entry.set_urls(&urls);

        if let Some(username) = &server.username {
            entry.set_username(username);
        }
        if let Some(credential) = &server.credential {
            entry.set_credential(credential);
        }

        servers.push(&entry);
    }
    config.set_ice_servers(&servers);

    let connection = RtcPeerConnection::new_with_configuration(&config)?;

    let onstatechange = {
        let inner = inner.clone();
        let connection = connection.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            let next = connection.connection_state();
            let mut state = inner.state.borrow_mut();
            Logger::debug(&format!(
                "[webrtc] connection state change [{:?}] -> [{next:?}]",
                state.connection_state
            ));
            state.connection_state = Some(next);
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    connection.set_onconnectionstatechange(Some(onstatechange.as_ref().unchecked_ref()));
    onstatechange.forget();

    // Trickle ICE: forward candidates as they surface, until the
    // completion sentinel latches the flow shut.
    let onicecandidate = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: RtcPeerConnectionIceEvent| {
            let candidate = event.candidate();
            let action = inner
                .state
                .borrow_mut()
                .on_local_candidate(candidate.is_some(), inner.options.trickle_after_complete);
            match action {
                CandidateAction::Drop => {}
                CandidateAction::Complete => Logger::info("[webrtc][ice] ICE gathering is complete"),
                CandidateAction::Forward => {
                    if let Some(candidate) = candidate {
                        let ice = IceCandidate {
                            candidate: candidate.candidate(),
                            sdp_mid: candidate.sdp_mid(),
                            sdp_m_line_index: candidate.sdp_m_line_index(),
                        };
                        Logger::debug(&format!("[webrtc][ice] got ice {}", ice.candidate));
                        let signalling = inner.signalling.borrow().clone();
                        if let Some(signalling) = signalling {
                            signalling.offer_candidate(&ice);
                        }
                    }
                }
            }
        }) as Box<dyn FnMut(RtcPeerConnectionIceEvent)>)
    };
    connection.set_onicecandidate(Some(onicecandidate.as_ref().unchecked_ref()));
    onicecandidate.forget();

    let onicestatechange = {
        let inner = inner.clone();
        let connection = connection.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            let next = connection.ice_connection_state();
            let mut state = inner.state.borrow_mut();
            Logger::debug(&format!(
                "[webrtc][ice] ICE connection state change [{:?}] -> [{next:?}]",
                state.ice_connection_state
            ));
            state.ice_connection_state = Some(next);
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    connection.set_oniceconnectionstatechange(Some(onicestatechange.as_ref().unchecked_ref()));
    onicestatechange.forget();

    let ongatheringchange = {
        let inner = inner.clone();
        let connection = connection.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            let next = connection.ice_gathering_state();
            let mut state = inner.state.borrow_mut();
            Logger::debug(&format!(
                "[webrtc][ice] ICE gathering state change [{:?}] -> [{next:?}]",
                state.ice_gathering_state
            ));
            state.ice_gathering_state = Some(next);
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    connection.set_onicegatheringstatechange(Some(ongatheringchange.as_ref().unchecked_ref()));
    ongatheringchange.forget();

    let ondatachannel = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: RtcDataChannelEvent| {
            let channel = event.channel();
            Logger::debug(&format!(
                "[webrtc] data channel has been created: {}",
                channel.label()
            ));
            register_data_channel(&inner, channel);
        }) as Box<dyn FnMut(RtcDataChannelEvent)>)
    };
    connection.set_ondatachannel(Some(ondatachannel.as_ref().unchecked_ref()));
    ondatachannel.forget();

    let ontrack = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: RtcTrackEvent| {
            if let Some(callback) = &inner.callbacks.on_remote_track {
                callback(event);
            }
        }) as Box<dyn FnMut(RtcTrackEvent)>)
    };
    connection.set_ontrack(Some(ontrack.as_ref().unchecked_ref()));
    ontrack.forget();

    Ok(connection)
}
