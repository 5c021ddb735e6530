use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use crate::error::{ClientError, js_error_text};

/// Holder for the single pending reconnect timer. The presence check is the
/// mutual exclusion: arming while armed is refused, so concurrent failure
/// events cannot schedule a second retry.
#[derive(Debug)]
pub(crate) struct RetrySlot<T> {
    pending: Option<T>,
}

impl<T> Default for RetrySlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> RetrySlot<T> {
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn arm(&mut self, timer: T) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(timer);
        true
    }

    pub fn disarm(&mut self) {
        self.pending = None;
    }
}

/// One-shot `setTimeout` wrapper. Dropping the handle clears the timeout,
/// so disarming the slot is an actual cancellation.
pub(crate) struct BackoffTimer {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl BackoffTimer {
    pub fn schedule(delay_ms: i32, fire: impl FnOnce() + 'static) -> Result<Self, ClientError> {
        let mut fire = Some(fire);
        let callback = Closure::wrap(Box::new(move || {
            if let Some(fire) = fire.take() {
                fire();
            }
        }) as Box<dyn FnMut()>);
        let window = web_sys::window()
            .ok_or_else(|| ClientError::Transport("no window to schedule on".into()))?;
        let id = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms,
            )
            .map_err(|err| ClientError::Transport(js_error_text(&err)))?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for BackoffTimer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_timer_can_be_armed() {
        let mut slot: RetrySlot<u32> = RetrySlot::default();

        assert!(slot.arm(1));
        assert!(slot.is_armed());
        // a second failure before the timer fires must not double-schedule
        assert!(!slot.arm(2));
    }

    #[test]
    fn disarming_frees_the_slot() {
        let mut slot: RetrySlot<u32> = RetrySlot::default();
        slot.arm(1);

        slot.disarm();

        assert!(!slot.is_armed());
        assert!(slot.arm(2));
    }
}
