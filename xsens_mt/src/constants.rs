//! Wire-level constants of the MT binary protocol.

/// Preamble byte opening every MT frame.
pub const MT_PREAMBLE: u8 = 0xfa;
/// Fixed bus identifier of the master device.
pub const MT_BUS_ID: u8 = 0xff;

/// Largest payload a standard-length MT frame can declare.
pub const MAX_PAYLOAD_LEN: usize = 254;

pub(crate) const MT_PREAMBLE_LEN: usize = 1;
pub(crate) const MT_BUS_ID_LEN: usize = 1;
pub(crate) const MT_MSG_ID_LEN: usize = 1;
pub(crate) const MT_PAYLOAD_SIZE_LEN: usize = 1;
pub(crate) const MT_HEADER_LEN: usize =
    MT_PREAMBLE_LEN + MT_BUS_ID_LEN + MT_MSG_ID_LEN + MT_PAYLOAD_SIZE_LEN;
pub(crate) const MT_CHECKSUM_LEN: usize = 1;

/// Full frame size for a given payload length.
pub const fn frame_len(payload_len: usize) -> usize {
    MT_HEADER_LEN + payload_len + MT_CHECKSUM_LEN
}
