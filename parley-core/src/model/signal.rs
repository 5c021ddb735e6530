use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ice::IceCandidate;
use crate::model::session::SessionDescription;

// Literal frame prefixes of the v1 signalling protocol.
pub const HELLO_PREFIX: &str = "HELLO";
pub const ERROR_PREFIX: &str = "ERROR";
pub const OFFER_REQUEST_PREFIX: &str = "OFFER_REQUEST";

/// One inbound signalling frame, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Session-opened acknowledgement from the server.
    Hello,
    /// A server-side exception; carries the raw frame text.
    ServerError(String),
    /// The peer asks this side to initiate an offer.
    OfferRequest,
    /// A structured SDP or ICE payload.
    Payload(SignalPayload),
}

/// The JSON-shaped part of the vocabulary, exchanged in both directions.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPayload {
    Session(SessionDescription),
    Candidate(IceCandidate),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("non-parsable frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame carries neither sdp nor ice")]
    UnknownShape,
}

/// Wire envelope for structured payloads: `{"sdp": ...}` or `{"ice": ...}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdp: Option<SessionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ice: Option<IceCandidate>,
}

impl SignalMessage {
    /// Classifies a raw text frame. Literal prefixes route first; everything
    /// else must parse as a structured envelope, where an `sdp` field wins
    /// over an `ice` field.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        if raw.starts_with(HELLO_PREFIX) {
            return Ok(Self::Hello);
        }
        if raw.starts_with(ERROR_PREFIX) {
            return Ok(Self::ServerError(raw.to_owned()));
        }
        if raw.starts_with(OFFER_REQUEST_PREFIX) {
            return Ok(Self::OfferRequest);
        }

        let envelope: Envelope = serde_json::from_str(raw)?;
        if let Some(sdp) = envelope.sdp {
            return Ok(Self::Payload(SignalPayload::Session(sdp)));
        }
        if let Some(ice) = envelope.ice {
            return Ok(Self::Payload(SignalPayload::Candidate(ice)));
        }
        Err(DecodeError::UnknownShape)
    }
}

impl SignalPayload {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let envelope = match self {
            Self::Session(desc) => Envelope {
                sdp: Some(desc.clone()),
                ice: None,
            },
            Self::Candidate(ice) => Envelope {
                sdp: None,
                ice: Some(ice.clone()),
            },
        };
        serde_json::to_string(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::session::SdpKind;

    #[test]
    fn hello_routes_by_prefix() {
        assert_eq!(SignalMessage::decode("HELLO").unwrap(), SignalMessage::Hello);
        assert_eq!(
            SignalMessage::decode("HELLO 42").unwrap(),
            SignalMessage::Hello
        );
    }

    #[test]
    fn server_error_keeps_the_raw_frame() {
        let msg = SignalMessage::decode("ERROR no such session").unwrap();
        assert_eq!(
            msg,
            SignalMessage::ServerError("ERROR no such session".to_owned())
        );
    }

    #[test]
    fn offer_request_routes_by_prefix() {
        assert_eq!(
            SignalMessage::decode("OFFER_REQUEST").unwrap(),
            SignalMessage::OfferRequest
        );
    }

    #[test]
    fn sdp_envelope_decodes_as_session() {
        let msg = SignalMessage::decode(r#"{"sdp":{"type":"offer","sdp":"v=0\r\n"}}"#).unwrap();
        match msg {
            SignalMessage::Payload(SignalPayload::Session(desc)) => {
                assert_eq!(desc.kind, SdpKind::Offer);
                assert_eq!(desc.sdp, "v=0\r\n");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn ice_envelope_decodes_as_candidate() {
        let raw = r#"{"ice":{"candidate":"candidate:1 1 UDP 1 10.0.0.1 9 typ host","sdpMid":"0","sdpMLineIndex":0}}"#;
        let msg = SignalMessage::decode(raw).unwrap();
        match msg {
            SignalMessage::Payload(SignalPayload::Candidate(ice)) => {
                assert_eq!(ice.sdp_mid.as_deref(), Some("0"));
                assert_eq!(ice.sdp_m_line_index, Some(0));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn sdp_wins_when_both_fields_are_present() {
        let raw = r#"{"sdp":{"type":"answer","sdp":""},"ice":{"candidate":"c"}}"#;
        let msg = SignalMessage::decode(raw).unwrap();
        assert!(matches!(
            msg,
            SignalMessage::Payload(SignalPayload::Session(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            SignalMessage::decode("not json at all"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn unrelated_object_is_unknown_shape() {
        assert!(matches!(
            SignalMessage::decode(r#"{"ping":1}"#),
            Err(DecodeError::UnknownShape)
        ));
    }

    #[test]
    fn encoded_session_decodes_back() {
        let payload = SignalPayload::Session(SessionDescription {
            kind: SdpKind::Answer,
            sdp: "v=0\r\n".to_owned(),
        });

        let raw = payload.encode().unwrap();
        assert_eq!(
            SignalMessage::decode(&raw).unwrap(),
            SignalMessage::Payload(payload)
        );
    }

    #[test]
    fn encoded_candidate_omits_absent_hints() {
        let payload = SignalPayload::Candidate(IceCandidate {
            candidate: "candidate:1 1 UDP 1 10.0.0.1 9 typ host".to_owned(),
            sdp_mid: None,
            sdp_m_line_index: None,
        });

        let raw = payload.encode().unwrap();
        assert!(!raw.contains("sdpMid"));
        assert!(!raw.contains("sdpMLineIndex"));
    }
}
