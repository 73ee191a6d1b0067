use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::ByteReader;

use super::{Action, decode_action};

/// Deepest chain of framed regions the decoder will enter.
///
/// Decoded trees never exceed it. Encoding and dropping recurse once per
/// level too, so trees built in code should stay within the same bound.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Decode actions until exactly `limit` bytes have been consumed.
///
/// A zero `limit` yields an empty list without touching the reader. The
/// region must fit in the remaining input, and an action that ends past the
/// limit is a [`CodecError::FrameOverrun`]. Each open region holds one mark
/// on `reader`; opening one at [`MAX_NESTING_DEPTH`] marks is a
/// [`CodecError::NestingTooDeep`].
pub fn decode_framed(reader: &mut ByteReader<'_>, ctx: &CodecContext, limit: usize) -> Result<Vec<Action>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    if limit > reader.remaining() {
        return Err(CodecError::UnexpectedEof { what: "framed region" });
    }
    if reader.depth() >= MAX_NESTING_DEPTH {
        return Err(CodecError::NestingTooDeep { limit: MAX_NESTING_DEPTH });
    }

    reader.mark();
    let mut actions = Vec::new();
    let result = loop {
        let consumed = reader.bytes_since_mark();
        if consumed == limit {
            break Ok(());
        }
        if consumed > limit {
            break Err(CodecError::FrameOverrun { limit, consumed });
        }
        match decode_action(reader, ctx) {
            Ok(action) => actions.push(action),
            Err(err) => break Err(err),
        }
    };
    reader.unmark();
    result.map(|()| actions)
}
