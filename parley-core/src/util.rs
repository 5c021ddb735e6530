use crate::model::IceServerConfig;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.services.mozilla.com";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun.stunprotocol.org";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun.l.google.com:19302";

/// The ICE server set used when the caller configures none.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![IceServerConfig {
        urls: vec![
            DEFAULT_STUN_ADDR.to_owned(),
            DEFAULT_STUN_ADDR_2.to_owned(),
            DEFAULT_STUN_ADDR_3.to_owned(),
        ],
        username: None,
        credential: None,
    }]
}
