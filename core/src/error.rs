//! Error taxonomy for the action codec.
//!
//! - **Range errors** come from constructors: [`CodecError::OutOfRange`],
//!   [`CodecError::ReservedOpcode`].
//! - **Decode-format errors** come from malformed streams:
//!   [`CodecError::UnexpectedEof`], [`CodecError::UnknownBasicOpcode`],
//!   [`CodecError::UnknownPushTag`], [`CodecError::FrameOverrun`],
//!   [`CodecError::NestingTooDeep`], [`CodecError::BodyLengthMismatch`],
//!   [`CodecError::InvalidText`], [`CodecError::InvalidFlags`].
//! - **Consistency errors** come from the encoder checking itself:
//!   [`CodecError::LengthMismatch`], [`CodecError::BodyTooLarge`].
//!
//! Decoding never attempts partial recovery: the first error aborts the
//! current action and every framed region that encloses it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input while reading {what}")]
    UnexpectedEof { what: &'static str },

    #[error("{what} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// `UnknownAction` was built for an opcode that has a dedicated variant.
    #[error("opcode 0x{0:02X} has a dedicated action variant")]
    ReservedOpcode(u8),

    #[error("unknown fixed-form opcode 0x{0:02X}")]
    UnknownBasicOpcode(u8),

    #[error("unknown push operand tag {0}")]
    UnknownPushTag(u8),

    /// A framed action region decoded past its declared byte count.
    #[error("framed region overrun: declared {limit} bytes, consumed {consumed}")]
    FrameOverrun { limit: usize, consumed: usize },

    #[error("framed regions nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("action 0x{opcode:02X} declared a {declared}-byte body but its fields span {consumed} bytes")]
    BodyLengthMismatch {
        opcode: u8,
        declared: usize,
        consumed: usize,
    },

    #[error("action 0x{opcode:02X} body of {len} bytes does not fit a 16-bit length field")]
    BodyTooLarge { opcode: u8, len: usize },

    #[error("action 0x{opcode:02X} declared {declared} body bytes but wrote {written}")]
    LengthMismatch {
        opcode: u8,
        declared: usize,
        written: usize,
    },

    #[error("invalid text: {0}")]
    InvalidText(String),

    #[error("action 0x{opcode:02X} has invalid flags 0x{value:02X}")]
    InvalidFlags { opcode: u8, value: u16 },
}

impl CodecError {
    pub(crate) fn out_of_range(what: &'static str, value: i64, min: i64, max: i64) -> Self {
        CodecError::OutOfRange { what, value, min, max }
    }

    /// True for errors caused by malformed input rather than by the caller.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CodecError::UnexpectedEof { .. }
                | CodecError::UnknownBasicOpcode(_)
                | CodecError::UnknownPushTag(_)
                | CodecError::FrameOverrun { .. }
                | CodecError::NestingTooDeep { .. }
                | CodecError::BodyLengthMismatch { .. }
                | CodecError::InvalidText(_)
                | CodecError::InvalidFlags { .. }
        )
    }
}
