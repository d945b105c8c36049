//! Byte-at-a-time assembler for MT frames.
//!
//! The assembler is fed one byte at a time (from a UART interrupt, a poll
//! loop, or a capture replay) and drives a seven-state machine. It buffers at
//! most one payload; a completed, checksum-valid frame is handed out as a
//! borrowed [`Frame`] and the machine folds back to [`State::Idle`]. Any
//! protocol violation takes the same reset path, so a partial frame is never
//! observable.
//!
//! One `Assembler` owns the cursor and checksum state of one physical link.
//! It is not reentrant; a second link needs a second instance.

use crate::{
    constants::{MAX_PAYLOAD_LEN, MT_BUS_ID, MT_PREAMBLE},
    error::ParserError,
};

/// MT checksum on the fly: the sum of every byte from the bus id through the
/// checksum byte, modulo 256, is zero for a valid frame.
#[derive(Default)]
pub(crate) struct MtChecksumCalc {
    sum: u8,
}

impl MtChecksumCalc {
    pub(crate) const fn new() -> Self {
        Self { sum: 0 }
    }

    pub(crate) const fn update_byte(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    pub(crate) const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    pub(crate) const fn reset(&mut self) {
        self.sum = 0;
    }

    /// Residue after folding in every frame byte; zero on a valid frame.
    pub(crate) const fn residue(&self) -> u8 {
        self.sum
    }

    /// Trailer byte the transmit side appends so the receive residue is zero.
    pub(crate) const fn trailer(&self) -> u8 {
        0u8.wrapping_sub(self.sum)
    }
}

/// Assembler state. Terminal [`GotFullPayload`](State::GotFullPayload) folds
/// back to [`Idle`](State::Idle); there is no separate error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    GotStart,
    GotSyncByte,
    GotMessageId,
    GotLength,
    AccumulatingPayload,
    GotFullPayload,
}

/// One complete, checksum-validated MT frame.
///
/// Borrowed from the assembler's internal buffer; decode it before feeding
/// the next byte.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    message_id: u8,
    payload: &'a [u8],
}

impl<'a> Frame<'a> {
    pub(crate) fn new(message_id: u8, payload: &'a [u8]) -> Self {
        Self {
            message_id,
            payload,
        }
    }

    pub fn message_id(&self) -> u8 {
        self.message_id
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

/// Outcome of feeding one byte, for callers that want discard diagnostics.
#[derive(Debug)]
pub enum FrameEvent<'a> {
    /// Byte consumed, nothing to report yet.
    Pending,
    /// A checksum-valid frame completed on this byte.
    Complete(Frame<'a>),
    /// An in-progress frame was discarded on this byte.
    Discarded(ParserError),
}

/// Frame assembler for one MT link.
pub struct Assembler {
    state: State,
    checksum: MtChecksumCalc,
    message_id: u8,
    declared_len: usize,
    cursor: usize,
    buf: [u8; MAX_PAYLOAD_LEN],
    discarded: u32,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            checksum: MtChecksumCalc::new(),
            message_id: 0,
            declared_len: 0,
            cursor: 0,
            buf: [0; MAX_PAYLOAD_LEN],
            discarded: 0,
        }
    }

    /// Number of frames discarded since construction (framing or checksum
    /// errors). Purely diagnostic.
    pub fn discarded_frames(&self) -> u32 {
        self.discarded
    }

    /// Feed a single byte, returning a frame if this byte completed one.
    ///
    /// O(1), never blocks, never fails: malformed input resets the machine
    /// and the byte stream keeps being scanned for the next preamble.
    pub fn feed(&mut self, byte: u8) -> Option<Frame<'_>> {
        match self.advance(byte) {
            FrameEvent::Complete(frame) => Some(frame),
            _ => None,
        }
    }

    /// As [`feed`](Self::feed), but reports discards for diagnostics.
    pub fn advance(&mut self, byte: u8) -> FrameEvent<'_> {
        // The checksum covers every byte from the bus id through the
        // checksum byte itself; fold the byte in before any state logic.
        self.checksum.update_byte(byte);
        match self.state {
            State::Idle => {
                if byte == MT_PREAMBLE {
                    self.state = State::GotStart;
                    self.checksum.reset();
                }
                FrameEvent::Pending
            },
            State::GotStart => {
                if byte == MT_BUS_ID {
                    self.state = State::GotSyncByte;
                    FrameEvent::Pending
                } else {
                    self.discard(ParserError::InvalidBusId { got: byte })
                }
            },
            State::GotSyncByte => {
                self.message_id = byte;
                self.state = State::GotMessageId;
                FrameEvent::Pending
            },
            State::GotMessageId => {
                let declared = usize::from(byte);
                if declared > MAX_PAYLOAD_LEN {
                    return self.discard(ParserError::InvalidPayloadLen {
                        declared,
                        max: MAX_PAYLOAD_LEN,
                    });
                }
                self.declared_len = declared;
                self.cursor = 0;
                self.state = if declared == 0 {
                    State::AccumulatingPayload
                } else {
                    State::GotLength
                };
                FrameEvent::Pending
            },
            State::GotLength => {
                self.buf[self.cursor] = byte;
                self.cursor += 1;
                if self.cursor >= self.declared_len {
                    self.state = State::AccumulatingPayload;
                }
                FrameEvent::Pending
            },
            State::AccumulatingPayload => {
                if self.checksum.residue() == 0 {
                    self.state = State::GotFullPayload;
                    self.reset();
                    FrameEvent::Complete(Frame::new(
                        self.message_id,
                        &self.buf[..self.declared_len],
                    ))
                } else {
                    self.discard(ParserError::InvalidChecksum {
                        got: self.checksum.residue(),
                    })
                }
            },
            // Unreachable in practice: reset() runs before feed() returns.
            State::GotFullPayload => {
                self.reset();
                FrameEvent::Pending
            },
        }
    }

    fn discard(&mut self, err: ParserError) -> FrameEvent<'_> {
        self.discarded = self.discarded.wrapping_add(1);
        self.reset();
        FrameEvent::Discarded(err)
    }

    /// Single reset path for both success and error; payload contents stay
    /// in the buffer until overwritten, but are no longer reachable.
    fn reset(&mut self) {
        self.state = State::Idle;
        self.checksum.reset();
        self.cursor = 0;
    }
}
