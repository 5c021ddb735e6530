use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{RtcDataChannel, RtcDataChannelType};

use crate::logger::Logger;
use crate::session::SessionInner;

/// Wires diagnostics onto a channel (local or inbound) and tracks it in the
/// registry until it closes.
pub(crate) fn register_data_channel(inner: &Rc<SessionInner>, channel: RtcDataChannel) {
    channel.set_binary_type(RtcDataChannelType::Arraybuffer);
    let label = channel.label();

    let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
        Logger::debug("[webrtc][data-chan] has been opened");
    }) as Box<dyn FnMut(web_sys::Event)>);
    channel.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onmessage = Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
        match event.data().as_string() {
            Some(text) => Logger::info(&format!("[webrtc][data-chan][txt] message: {text}")),
            None => Logger::info("[webrtc][data-chan][bin] message"),
        }
    }) as Box<dyn FnMut(web_sys::MessageEvent)>);
    channel.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onerror = Closure::wrap(Box::new(move |_: web_sys::Event| {
        Logger::error("[webrtc][data-chan] an error");
    }) as Box<dyn FnMut(web_sys::Event)>);
    channel.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let onclose = {
        let inner = inner.clone();
        let label = label.clone();
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            Logger::debug(&format!("[webrtc][data-chan] closed: {label}"));
            inner.channels.borrow_mut().remove(&label);
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    channel.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    inner.channels.borrow_mut().insert(label, channel);
}
