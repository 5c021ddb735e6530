use serde::{Deserialize, Serialize};

/// An ICE candidate in the shape `RTCIceCandidate.toJSON()` produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_uses_browser_field_names() {
        let ice = IceCandidate {
            candidate: "candidate:0 1 UDP 2122 192.168.1.2 49203 typ host".to_string(),
            sdp_mid: Some("0".to_string()),
            sdp_m_line_index: Some(0),
        };

        let json = serde_json::to_string(&ice).unwrap();
        assert!(json.contains(r#""sdpMid":"0""#));
        assert!(json.contains(r#""sdpMLineIndex":0"#));
    }

    #[test]
    fn candidate_tolerates_missing_line_hints() {
        let ice: IceCandidate =
            serde_json::from_str(r#"{"candidate":"candidate:1 1 UDP 1 10.0.0.1 9 typ host"}"#)
                .unwrap();

        assert_eq!(ice.sdp_mid, None);
        assert_eq!(ice.sdp_m_line_index, None);
    }
}
