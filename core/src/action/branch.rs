//! Relative branches. Offsets count bytes from the end of the branch action.

use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::Result;
use crate::io::{ByteReader, ByteWriter};

use super::{VariableForm, opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jump {
    offset: i16,
}

impl Jump {
    pub fn new(offset: i16) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> i16 {
        self.offset
    }
}

/// Branch when the popped value is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct If {
    offset: i16,
}

impl If {
    pub fn new(offset: i16) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> i16 {
        self.offset
    }
}

macro_rules! impl_branch {
    ($ty:ident, $opcode:expr) => {
        impl VariableForm for $ty {
            const OPCODE: u8 = $opcode;

            fn body_len(&self, _ctx: &CodecContext) -> usize {
                2
            }

            fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
                w.write_i16(self.offset);
                Ok(())
            }

            fn decode_body(
                body: &mut ByteReader<'_>,
                _rest: &mut ByteReader<'_>,
                _ctx: &CodecContext,
            ) -> Result<Self> {
                Ok(Self {
                    offset: body.read_i16()?,
                })
            }
        }
    };
}

impl_branch!(Jump, opcode::JUMP);
impl_branch!(If, opcode::IF);
