//! Scoped-block actions: exception handlers and `with` blocks.

use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::value::RegisterIndex;

use super::{Action, VariableForm, actions_size, decode_framed, opcode, region_len, write_actions};

const CATCH_BLOCK_FLAG: u8 = 0x01;
const FINALLY_BLOCK_FLAG: u8 = 0x02;
const CATCH_IN_REGISTER_FLAG: u8 = 0x04;

/// Where the thrown value is bound inside the catch block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchTarget {
    Name(String),
    Register(RegisterIndex),
}

impl Default for CatchTarget {
    fn default() -> Self {
        CatchTarget::Name(String::new())
    }
}

/// Arguments for [`Try::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrySpec {
    pub try_body: Vec<Action>,
    #[serde(default)]
    pub catch_target: CatchTarget,
    #[serde(default)]
    pub catch_body: Vec<Action>,
    #[serde(default)]
    pub finally_body: Vec<Action>,
}

/// `try { } catch { } finally { }`.
///
/// The catch and finally presence flags are derived from whether the
/// respective block is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrySpec", into = "TrySpec")]
pub struct Try {
    try_body: Vec<Action>,
    catch_target: CatchTarget,
    catch_body: Vec<Action>,
    finally_body: Vec<Action>,
}

impl Try {
    pub fn new(spec: TrySpec) -> Self {
        Self {
            try_body: spec.try_body,
            catch_target: spec.catch_target,
            catch_body: spec.catch_body,
            finally_body: spec.finally_body,
        }
    }

    pub fn try_body(&self) -> &[Action] {
        &self.try_body
    }

    pub fn catch_target(&self) -> &CatchTarget {
        &self.catch_target
    }

    pub fn catch_body(&self) -> &[Action] {
        &self.catch_body
    }

    pub fn finally_body(&self) -> &[Action] {
        &self.finally_body
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if !self.catch_body.is_empty() {
            flags |= CATCH_BLOCK_FLAG;
        }
        if !self.finally_body.is_empty() {
            flags |= FINALLY_BLOCK_FLAG;
        }
        if matches!(self.catch_target, CatchTarget::Register(_)) {
            flags |= CATCH_IN_REGISTER_FLAG;
        }
        flags
    }
}

impl From<TrySpec> for Try {
    fn from(spec: TrySpec) -> Self {
        Try::new(spec)
    }
}

impl From<Try> for TrySpec {
    fn from(handler: Try) -> Self {
        TrySpec {
            try_body: handler.try_body,
            catch_target: handler.catch_target,
            catch_body: handler.catch_body,
            finally_body: handler.finally_body,
        }
    }
}

impl VariableForm for Try {
    const OPCODE: u8 = opcode::TRY;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        let target = match &self.catch_target {
            CatchTarget::Name(name) => ctx.string_len(name),
            CatchTarget::Register(_) => 1,
        };
        1 + 2 + 2 + 2 + target
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        // Oversized blocks fail before any field is emitted.
        let try_size = region_len(&self.try_body, Self::OPCODE, ctx)?;
        let catch_size = region_len(&self.catch_body, Self::OPCODE, ctx)?;
        let finally_size = region_len(&self.finally_body, Self::OPCODE, ctx)?;
        w.write_u8(self.flags());
        w.write_u16(try_size);
        w.write_u16(catch_size);
        w.write_u16(finally_size);
        match &self.catch_target {
            CatchTarget::Name(name) => w.write_string(name, ctx)?,
            CatchTarget::Register(register) => w.write_u8(register.get()),
        }
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let flags = body.read_u8()?;
        let known = CATCH_BLOCK_FLAG | FINALLY_BLOCK_FLAG | CATCH_IN_REGISTER_FLAG;
        if flags & !known != 0 && !ctx.lenient {
            return Err(CodecError::InvalidFlags {
                opcode: Self::OPCODE,
                value: flags as u16,
            });
        }
        let try_size = body.read_u16()? as usize;
        let catch_size = body.read_u16()? as usize;
        let finally_size = body.read_u16()? as usize;
        let catch_target = if flags & CATCH_IN_REGISTER_FLAG != 0 {
            CatchTarget::Register(RegisterIndex::from_u8(body.read_u8()?))
        } else {
            CatchTarget::Name(body.read_string(ctx)?)
        };

        let try_body = decode_framed(rest, ctx, try_size)?;
        let catch_body = decode_framed(rest, ctx, catch_size)?;
        let finally_body = decode_framed(rest, ctx, finally_size)?;
        Ok(Self {
            try_body,
            catch_target,
            catch_body,
            finally_body,
        })
    }

    fn nested_len(&self, ctx: &CodecContext) -> usize {
        actions_size(&self.try_body, ctx) + actions_size(&self.catch_body, ctx) + actions_size(&self.finally_body, ctx)
    }

    fn write_nested(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        write_actions(&self.try_body, w, ctx)?;
        write_actions(&self.catch_body, w, ctx)?;
        write_actions(&self.finally_body, w, ctx)
    }
}

/// Evaluate the block with the popped object at the front of the scope chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct With {
    body: Vec<Action>,
}

impl With {
    pub fn new(body: Vec<Action>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &[Action] {
        &self.body
    }
}

impl VariableForm for With {
    const OPCODE: u8 = opcode::WITH;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        2
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_u16(region_len(&self.body, Self::OPCODE, ctx)?);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let code_size = body.read_u16()? as usize;
        Ok(Self {
            body: decode_framed(rest, ctx, code_size)?,
        })
    }

    fn nested_len(&self, ctx: &CodecContext) -> usize {
        actions_size(&self.body, ctx)
    }

    fn write_nested(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        write_actions(&self.body, w, ctx)
    }
}
