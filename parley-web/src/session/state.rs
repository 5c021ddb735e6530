use web_sys::{RtcIceConnectionState, RtcIceGatheringState, RtcPeerConnectionState};

/// What to do with a locally gathered ICE candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateAction {
    /// Trickle it to the peer.
    Forward,
    /// The null-candidate sentinel: gathering finished, latch it.
    Complete,
    /// Gathering already finished and late trickling is disabled.
    Drop,
}

/// Mutable state of one peer session. Owned exclusively by the session
/// orchestrator and reset whenever a new native connection is created.
#[derive(Debug, Default)]
pub(crate) struct PeerSessionState {
    pub connection_attempts: u32,
    pub connection_state: Option<RtcPeerConnectionState>,
    pub ice_connection_state: Option<RtcIceConnectionState>,
    pub ice_gathering_state: Option<RtcIceGatheringState>,
    pub local_ice_completed: bool,
}

impl PeerSessionState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accounts for one `prepare` pass. Returns `false` when the attempt
    /// budget is already exhausted; the counter is untouched in that case.
    pub fn begin_attempt(&mut self, max_attempts: u32) -> bool {
        if self.connection_attempts > max_attempts {
            return false;
        }
        self.connection_attempts += 1;
        true
    }

    /// Classifies a local ICE gathering event. `has_candidate: false` is the
    /// null-candidate sentinel; the completion latch holds for the lifetime
    /// of the current native connection.
    pub fn on_local_candidate(
        &mut self,
        has_candidate: bool,
        trickle_after_complete: bool,
    ) -> CandidateAction {
        if self.local_ice_completed && !trickle_after_complete {
            return CandidateAction::Drop;
        }
        if !has_candidate {
            self.local_ice_completed = true;
            return CandidateAction::Complete;
        }
        CandidateAction::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_accumulate_until_the_budget_runs_out() {
        let mut state = PeerSessionState::default();

        // max 3 admits four passes: the check runs before the increment
        for _ in 0..4 {
            assert!(state.begin_attempt(3));
        }
        assert_eq!(state.connection_attempts, 4);

        assert!(!state.begin_attempt(3));
        assert_eq!(state.connection_attempts, 4);
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut state = PeerSessionState::default();
        state.begin_attempt(3);
        state.connection_state = Some(RtcPeerConnectionState::Connected);
        state.on_local_candidate(false, false);

        state.reset();

        assert_eq!(state.connection_attempts, 0);
        assert_eq!(state.connection_state, None);
        assert!(!state.local_ice_completed);
    }

    #[test]
    fn candidates_stop_flowing_after_the_completion_sentinel() {
        let mut state = PeerSessionState::default();

        for _ in 0..3 {
            assert_eq!(
                state.on_local_candidate(true, false),
                CandidateAction::Forward
            );
        }
        assert_eq!(
            state.on_local_candidate(false, false),
            CandidateAction::Complete
        );
        // a late candidate after the sentinel is swallowed
        assert_eq!(state.on_local_candidate(true, false), CandidateAction::Drop);
    }

    #[test]
    fn late_trickling_can_be_kept_enabled() {
        let mut state = PeerSessionState::default();

        assert_eq!(
            state.on_local_candidate(false, true),
            CandidateAction::Complete
        );
        assert_eq!(
            state.on_local_candidate(true, true),
            CandidateAction::Forward
        );
    }
}
