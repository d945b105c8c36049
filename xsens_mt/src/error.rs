use core::fmt;

/// Error that is possible during frame assembly.
///
/// The [`Assembler`](crate::Assembler) itself never surfaces these to the
/// byte-feeding caller; a malformed frame is silently discarded and the state
/// machine resets. They are reported through the optional
/// [`FrameEvent`](crate::FrameEvent) diagnostics hook and by the outbound
/// builders' validation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserError {
    /// Running checksum over bus id..checksum byte did not sum to zero.
    InvalidChecksum { got: u8 },
    /// Declared payload length exceeds the protocol maximum.
    InvalidPayloadLen { declared: usize, max: usize },
    /// Byte after the preamble was not the fixed bus identifier.
    InvalidBusId { got: u8 },
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::InvalidChecksum { got } => {
                write!(f, "frame checksum not zero, residue {:#04x}", got)
            },
            ParserError::InvalidPayloadLen { declared, max } => write!(
                f,
                "declared payload length {} exceeds protocol maximum {}",
                declared, max
            ),
            ParserError::InvalidBusId { got } => {
                write!(f, "unexpected bus id byte {:#04x}", got)
            },
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParserError {}

/// Error converting a decoded UTC record into a calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    InvalidDate,
    InvalidTime,
    InvalidNanoseconds,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
            DateTimeError::InvalidNanoseconds => f.write_str("invalid nanoseconds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DateTimeError {}
