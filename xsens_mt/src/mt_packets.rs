//! MT message definitions: message identifiers, the two runtime-configured
//! output bitfields, zero-copy section readers and outbound frame builders.

pub use packets::*;
pub use types::*;

mod packets;
mod types;
