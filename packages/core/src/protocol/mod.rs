pub mod framer;
pub mod key_transport;
pub mod messages;
pub mod mode;
pub mod sequence;
pub mod validation;
pub mod wire;

pub use framer::{Decoded, TamperingSuspected};
pub use key_transport::{TransportedKey, TrustFailure};
pub use mode::{mode_display, mode_from_string, Mode};
pub use sequence::{OrderingAnomaly, SequenceTracker};
