pub use parley_core::model::{SessionDescription, SignalMessage};

pub mod model {
    pub use parley_core::model::*;
}

pub mod endpoint {
    pub use parley_core::endpoint::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use parley_web::*;
}
