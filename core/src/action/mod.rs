//! The AVM1 action model and its wire codec.
//!
//! Every action is one [`Action`] value. Fixed-form actions are their opcode
//! byte. Variable-form actions are `opcode, u16 length, body`; the four
//! control-structure kinds (function definitions, `Try`, `With`) append their
//! nested action regions after the body, sized by code-size fields inside it.
//!
//! Sizes are never cached: [`Action::estimate_size`] is a pure function of the
//! current field values, and [`Action::write`] recomputes the length it emits
//! and verifies the body it produced against it.

mod branch;
mod frame;
mod framed;
mod function;
mod handler;
pub mod opcode;
mod push;
mod table;
mod unknown;
mod url;

pub use branch::{If, Jump};
pub use frame::{GotoFrame, GotoFrame2, GotoLabel, SetTarget, WaitForFrame, WaitForFrame2};
pub use framed::{MAX_NESTING_DEPTH, decode_framed};
pub use function::{DefineFunction, DefineFunction2, Function2Spec, FunctionFlags, FunctionSpec, RegisterParam};
pub use handler::{CatchTarget, Try, TrySpec, With};
pub use opcode::BasicOp;
pub use push::{Push, PushValue};
pub use table::{ConstantPool, StoreRegister};
pub use unknown::UnknownAction;
pub use url::{GetUrl, GetUrl2, SendVarsMethod};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};

/// Opcode byte plus the `u16` length field.
pub const VARIABLE_HEADER_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Basic(BasicOp),
    GotoFrame(GotoFrame),
    GetUrl(GetUrl),
    StoreRegister(StoreRegister),
    ConstantPool(ConstantPool),
    WaitForFrame(WaitForFrame),
    SetTarget(SetTarget),
    GotoLabel(GotoLabel),
    WaitForFrame2(WaitForFrame2),
    DefineFunction2(DefineFunction2),
    Try(Try),
    With(With),
    Push(Push),
    Jump(Jump),
    GetUrl2(GetUrl2),
    DefineFunction(DefineFunction),
    If(If),
    /// Calls the frame named on the stack; no operands but still variable-form.
    Call,
    GotoFrame2(GotoFrame2),
    Unknown(UnknownAction),
}

/// Per-variant layout of a variable-form action.
///
/// `body_len` is the value of the declared length field. `nested_len` covers
/// the action regions written after the body.
pub(crate) trait VariableForm: Sized {
    const OPCODE: u8;

    fn body_len(&self, ctx: &CodecContext) -> usize;

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()>;

    /// `body` holds exactly the declared bytes; nested regions are read from `rest`.
    fn decode_body(body: &mut ByteReader<'_>, rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self>;

    fn nested_len(&self, _ctx: &CodecContext) -> usize {
        0
    }

    fn write_nested(&self, _w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        Ok(())
    }
}

fn variable_size<T: VariableForm>(action: &T, ctx: &CodecContext) -> usize {
    VARIABLE_HEADER_LEN + action.body_len(ctx) + action.nested_len(ctx)
}

fn write_variable<T: VariableForm>(action: &T, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
    let declared = action.body_len(ctx);
    let len = u16::try_from(declared).map_err(|_| CodecError::BodyTooLarge {
        opcode: T::OPCODE,
        len: declared,
    })?;
    w.write_u8(T::OPCODE);
    w.write_u16(len);
    let start = w.position();
    action.write_body(w, ctx)?;
    let written = w.position() - start;
    if written != declared {
        return Err(CodecError::LengthMismatch {
            opcode: T::OPCODE,
            declared,
            written,
        });
    }
    action.write_nested(w, ctx)
}

fn decode_variable<T: VariableForm>(reader: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<T> {
    let declared = reader.read_u16()? as usize;
    let mut body = reader.sub_reader(declared, "action body")?;
    let action = T::decode_body(&mut body, reader, ctx)?;
    finish_body(T::OPCODE, declared, &mut body, ctx)?;
    Ok(action)
}

/// Checks that a fixed-layout body was consumed exactly.
fn finish_body(opcode: u8, declared: usize, body: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<()> {
    let left = body.remaining();
    if left == 0 {
        return Ok(());
    }
    if ctx.lenient {
        debug!(opcode, declared, left, "skipping trailing action body bytes");
        return body.skip(left);
    }
    Err(CodecError::BodyLengthMismatch {
        opcode,
        declared,
        consumed: declared - left,
    })
}

/// Sum of the encoded sizes of `actions`, checked against a `u16` field.
pub(crate) fn region_len(actions: &[Action], opcode: u8, ctx: &CodecContext) -> Result<u16> {
    let len = actions_size(actions, ctx);
    u16::try_from(len).map_err(|_| CodecError::BodyTooLarge { opcode, len })
}

impl Action {
    pub fn opcode(&self) -> u8 {
        match self {
            Action::Basic(op) => op.opcode(),
            Action::GotoFrame(_) => opcode::GOTO_FRAME,
            Action::GetUrl(_) => opcode::GET_URL,
            Action::StoreRegister(_) => opcode::STORE_REGISTER,
            Action::ConstantPool(_) => opcode::CONSTANT_POOL,
            Action::WaitForFrame(_) => opcode::WAIT_FOR_FRAME,
            Action::SetTarget(_) => opcode::SET_TARGET,
            Action::GotoLabel(_) => opcode::GOTO_LABEL,
            Action::WaitForFrame2(_) => opcode::WAIT_FOR_FRAME2,
            Action::DefineFunction2(_) => opcode::DEFINE_FUNCTION2,
            Action::Try(_) => opcode::TRY,
            Action::With(_) => opcode::WITH,
            Action::Push(_) => opcode::PUSH,
            Action::Jump(_) => opcode::JUMP,
            Action::GetUrl2(_) => opcode::GET_URL2,
            Action::DefineFunction(_) => opcode::DEFINE_FUNCTION,
            Action::If(_) => opcode::IF,
            Action::Call => opcode::CALL,
            Action::GotoFrame2(_) => opcode::GOTO_FRAME2,
            Action::Unknown(a) => a.opcode(),
        }
    }

    /// Total encoded size: opcode, length field, body and nested regions.
    pub fn estimate_size(&self, ctx: &CodecContext) -> usize {
        match self {
            Action::Basic(_) => 1,
            Action::GotoFrame(a) => variable_size(a, ctx),
            Action::GetUrl(a) => variable_size(a, ctx),
            Action::StoreRegister(a) => variable_size(a, ctx),
            Action::ConstantPool(a) => variable_size(a, ctx),
            Action::WaitForFrame(a) => variable_size(a, ctx),
            Action::SetTarget(a) => variable_size(a, ctx),
            Action::GotoLabel(a) => variable_size(a, ctx),
            Action::WaitForFrame2(a) => variable_size(a, ctx),
            Action::DefineFunction2(a) => variable_size(a, ctx),
            Action::Try(a) => variable_size(a, ctx),
            Action::With(a) => variable_size(a, ctx),
            Action::Push(a) => variable_size(a, ctx),
            Action::Jump(a) => variable_size(a, ctx),
            Action::GetUrl2(a) => variable_size(a, ctx),
            Action::DefineFunction(a) => variable_size(a, ctx),
            Action::If(a) => variable_size(a, ctx),
            Action::Call => VARIABLE_HEADER_LEN,
            Action::GotoFrame2(a) => variable_size(a, ctx),
            Action::Unknown(a) => a.encoded_len(),
        }
    }

    pub fn write(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        match self {
            Action::Basic(op) => {
                w.write_u8(op.opcode());
                Ok(())
            }
            Action::GotoFrame(a) => write_variable(a, w, ctx),
            Action::GetUrl(a) => write_variable(a, w, ctx),
            Action::StoreRegister(a) => write_variable(a, w, ctx),
            Action::ConstantPool(a) => write_variable(a, w, ctx),
            Action::WaitForFrame(a) => write_variable(a, w, ctx),
            Action::SetTarget(a) => write_variable(a, w, ctx),
            Action::GotoLabel(a) => write_variable(a, w, ctx),
            Action::WaitForFrame2(a) => write_variable(a, w, ctx),
            Action::DefineFunction2(a) => write_variable(a, w, ctx),
            Action::Try(a) => write_variable(a, w, ctx),
            Action::With(a) => write_variable(a, w, ctx),
            Action::Push(a) => write_variable(a, w, ctx),
            Action::Jump(a) => write_variable(a, w, ctx),
            Action::GetUrl2(a) => write_variable(a, w, ctx),
            Action::DefineFunction(a) => write_variable(a, w, ctx),
            Action::If(a) => write_variable(a, w, ctx),
            Action::Call => {
                w.write_u8(opcode::CALL);
                w.write_u16(0);
                Ok(())
            }
            Action::GotoFrame2(a) => write_variable(a, w, ctx),
            Action::Unknown(a) => a.write(w),
        }
    }

    /// Encode this action alone into a fresh buffer.
    pub fn encode(&self, ctx: &CodecContext) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_capacity(self.estimate_size(ctx));
        self.write(&mut w, ctx)?;
        Ok(w.into_inner())
    }

    /// Decode one action from a reader positioned at an opcode byte.
    pub fn decode(reader: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Action> {
        decode_action(reader, ctx)
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Action::Basic(_))
    }
}

/// Decode a single action, dispatching on its opcode.
pub fn decode_action(reader: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Action> {
    let offset = reader.position();
    let op = reader.read_u8()?;
    trace!(offset, opcode = op, "decoding action");

    if opcode::is_fixed_form(op) {
        return match BasicOp::from_u8(op) {
            Some(basic) => Ok(Action::Basic(basic)),
            None if ctx.lenient => {
                debug!(offset, opcode = op, "fixed-form gap decoded as opaque action");
                Ok(Action::Unknown(UnknownAction::from_wire(op, Vec::new())))
            }
            None => Err(CodecError::UnknownBasicOpcode(op)),
        };
    }

    let action = match op {
        opcode::GOTO_FRAME => Action::GotoFrame(decode_variable(reader, ctx)?),
        opcode::GET_URL => Action::GetUrl(decode_variable(reader, ctx)?),
        opcode::STORE_REGISTER => Action::StoreRegister(decode_variable(reader, ctx)?),
        opcode::CONSTANT_POOL => Action::ConstantPool(decode_variable(reader, ctx)?),
        opcode::WAIT_FOR_FRAME => Action::WaitForFrame(decode_variable(reader, ctx)?),
        opcode::SET_TARGET => Action::SetTarget(decode_variable(reader, ctx)?),
        opcode::GOTO_LABEL => Action::GotoLabel(decode_variable(reader, ctx)?),
        opcode::WAIT_FOR_FRAME2 => Action::WaitForFrame2(decode_variable(reader, ctx)?),
        opcode::DEFINE_FUNCTION2 => Action::DefineFunction2(decode_variable(reader, ctx)?),
        opcode::TRY => Action::Try(decode_variable(reader, ctx)?),
        opcode::WITH => Action::With(decode_variable(reader, ctx)?),
        opcode::PUSH => Action::Push(decode_variable(reader, ctx)?),
        opcode::JUMP => Action::Jump(decode_variable(reader, ctx)?),
        opcode::GET_URL2 => Action::GetUrl2(decode_variable(reader, ctx)?),
        opcode::DEFINE_FUNCTION => Action::DefineFunction(decode_variable(reader, ctx)?),
        opcode::IF => Action::If(decode_variable(reader, ctx)?),
        opcode::CALL => {
            // The length is normally zero; anything declared is reserved.
            let declared = reader.read_u16()? as usize;
            reader.skip(declared)?;
            Action::Call
        }
        opcode::GOTO_FRAME2 => Action::GotoFrame2(decode_variable(reader, ctx)?),
        other => {
            let declared = reader.read_u16()? as usize;
            let body = reader.read_bytes(declared)?;
            trace!(offset, opcode = other, len = declared, "preserving unknown action");
            Action::Unknown(UnknownAction::from_wire(other, body))
        }
    };
    Ok(action)
}

/// Decode a whole action stream until the input is exhausted.
pub fn decode_actions(bytes: &[u8], ctx: &CodecContext) -> Result<Vec<Action>> {
    let mut reader = ByteReader::new(bytes);
    let mut actions = Vec::new();
    while !reader.is_empty() {
        actions.push(decode_action(&mut reader, ctx)?);
    }
    Ok(actions)
}

pub fn actions_size(actions: &[Action], ctx: &CodecContext) -> usize {
    actions.iter().map(|a| a.estimate_size(ctx)).sum()
}

pub fn write_actions(actions: &[Action], w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
    for action in actions {
        action.write(w, ctx)?;
    }
    Ok(())
}

pub fn encode_actions(actions: &[Action], ctx: &CodecContext) -> Result<Vec<u8>> {
    let mut w = ByteWriter::with_capacity(actions_size(actions, ctx));
    write_actions(actions, &mut w, ctx)?;
    Ok(w.into_inner())
}

macro_rules! impl_from_variant {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Action {
                fn from(value: $ty) -> Self {
                    Action::$ty(value)
                }
            }
        )*
    };
}

impl_from_variant!(
    GotoFrame,
    GetUrl,
    StoreRegister,
    ConstantPool,
    WaitForFrame,
    SetTarget,
    GotoLabel,
    WaitForFrame2,
    DefineFunction2,
    Try,
    With,
    Push,
    Jump,
    GetUrl2,
    DefineFunction,
    If,
    GotoFrame2,
);

impl From<BasicOp> for Action {
    fn from(value: BasicOp) -> Self {
        Action::Basic(value)
    }
}

impl From<UnknownAction> for Action {
    fn from(value: UnknownAction) -> Self {
        Action::Unknown(value)
    }
}

#[cfg(test)]
mod action_test;
