//! Function definitions. The function body is a framed action region that
//! follows the header; its size is the last header field.

use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::value::RegisterIndex;

use super::{Action, VariableForm, actions_size, decode_framed, opcode, region_len, write_actions};

fn check_param_count(count: usize) -> Result<()> {
    if count > u16::MAX as usize {
        return Err(CodecError::out_of_range(
            "function parameter count",
            count as i64,
            0,
            u16::MAX as i64,
        ));
    }
    Ok(())
}

/// Arguments for [`DefineFunction::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Empty for anonymous functions, which are left on the stack.
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Action>,
}

/// SWF 5 function definition with named parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FunctionSpec", into = "FunctionSpec")]
pub struct DefineFunction {
    name: String,
    params: Vec<String>,
    body: Vec<Action>,
}

impl DefineFunction {
    pub fn new(spec: FunctionSpec) -> Result<Self> {
        check_param_count(spec.params.len())?;
        Ok(Self {
            name: spec.name,
            params: spec.params,
            body: spec.body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &[Action] {
        &self.body
    }
}

impl TryFrom<FunctionSpec> for DefineFunction {
    type Error = CodecError;

    fn try_from(spec: FunctionSpec) -> Result<Self> {
        DefineFunction::new(spec)
    }
}

impl From<DefineFunction> for FunctionSpec {
    fn from(func: DefineFunction) -> Self {
        FunctionSpec {
            name: func.name,
            params: func.params,
            body: func.body,
        }
    }
}

impl VariableForm for DefineFunction {
    const OPCODE: u8 = opcode::DEFINE_FUNCTION;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        ctx.string_len(&self.name) + 2 + self.params.iter().map(|p| ctx.string_len(p)).sum::<usize>() + 2
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        let code_size = region_len(&self.body, Self::OPCODE, ctx)?;
        w.write_string(&self.name, ctx)?;
        w.write_u16(self.params.len() as u16);
        for param in &self.params {
            w.write_string(param, ctx)?;
        }
        w.write_u16(code_size);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let name = body.read_string(ctx)?;
        let count = body.read_u16()? as usize;
        let mut params = Vec::with_capacity(count.min(body.remaining()));
        for _ in 0..count {
            params.push(body.read_string(ctx)?);
        }
        let code_size = body.read_u16()? as usize;
        let actions = decode_framed(rest, ctx, code_size)?;
        Ok(Self {
            name,
            params,
            body: actions,
        })
    }

    fn nested_len(&self, ctx: &CodecContext) -> usize {
        actions_size(&self.body, ctx)
    }

    fn write_nested(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        write_actions(&self.body, w, ctx)
    }
}

/// Preload/suppress switches of a `DefineFunction2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionFlags(u16);

impl FunctionFlags {
    pub const NONE: FunctionFlags = FunctionFlags(0);
    pub const PRELOAD_THIS: FunctionFlags = FunctionFlags(1 << 0);
    pub const SUPPRESS_THIS: FunctionFlags = FunctionFlags(1 << 1);
    pub const PRELOAD_ARGUMENTS: FunctionFlags = FunctionFlags(1 << 2);
    pub const SUPPRESS_ARGUMENTS: FunctionFlags = FunctionFlags(1 << 3);
    pub const PRELOAD_SUPER: FunctionFlags = FunctionFlags(1 << 4);
    pub const SUPPRESS_SUPER: FunctionFlags = FunctionFlags(1 << 5);
    pub const PRELOAD_ROOT: FunctionFlags = FunctionFlags(1 << 6);
    pub const PRELOAD_PARENT: FunctionFlags = FunctionFlags(1 << 7);
    pub const PRELOAD_GLOBAL: FunctionFlags = FunctionFlags(1 << 8);

    const DEFINED: u16 = (1 << 9) - 1;

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u16) -> FunctionFlags {
        FunctionFlags(bits)
    }

    #[inline]
    pub const fn contains(self, other: FunctionFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: FunctionFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub const fn union(self, other: FunctionFlags) -> FunctionFlags {
        FunctionFlags(self.0 | other.0)
    }

    #[inline]
    const fn reserved_bits(self) -> u16 {
        self.0 & !Self::DEFINED
    }
}

/// A `DefineFunction2` parameter: bound to a register, or by name when
/// `register` is `None` (written as register 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParam {
    pub register: Option<RegisterIndex>,
    pub name: String,
}

impl RegisterParam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            register: None,
            name: name.into(),
        }
    }

    pub fn in_register(register: RegisterIndex, name: impl Into<String>) -> Self {
        Self {
            register: Some(register),
            name: name.into(),
        }
    }
}

/// Arguments for [`DefineFunction2::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Function2Spec {
    pub name: String,
    pub register_count: u8,
    #[serde(default)]
    pub flags: FunctionFlags,
    pub params: Vec<RegisterParam>,
    pub body: Vec<Action>,
}

/// SWF 7 function definition with register allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Function2Spec", into = "Function2Spec")]
pub struct DefineFunction2 {
    name: String,
    register_count: u8,
    flags: FunctionFlags,
    params: Vec<RegisterParam>,
    body: Vec<Action>,
}

impl DefineFunction2 {
    pub fn new(spec: Function2Spec) -> Result<Self> {
        check_param_count(spec.params.len())?;
        if spec.flags.reserved_bits() != 0 {
            return Err(CodecError::InvalidFlags {
                opcode: opcode::DEFINE_FUNCTION2,
                value: spec.flags.bits(),
            });
        }
        for param in &spec.params {
            if let Some(register) = param.register {
                let reg = register.get();
                if reg == 0 || reg >= spec.register_count {
                    return Err(CodecError::out_of_range(
                        "parameter register",
                        reg as i64,
                        1,
                        spec.register_count as i64 - 1,
                    ));
                }
            }
        }
        Ok(Self {
            name: spec.name,
            register_count: spec.register_count,
            flags: spec.flags,
            params: spec.params,
            body: spec.body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_count(&self) -> u8 {
        self.register_count
    }

    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    pub fn params(&self) -> &[RegisterParam] {
        &self.params
    }

    pub fn body(&self) -> &[Action] {
        &self.body
    }
}

impl TryFrom<Function2Spec> for DefineFunction2 {
    type Error = CodecError;

    fn try_from(spec: Function2Spec) -> Result<Self> {
        DefineFunction2::new(spec)
    }
}

impl From<DefineFunction2> for Function2Spec {
    fn from(func: DefineFunction2) -> Self {
        Function2Spec {
            name: func.name,
            register_count: func.register_count,
            flags: func.flags,
            params: func.params,
            body: func.body,
        }
    }
}

impl VariableForm for DefineFunction2 {
    const OPCODE: u8 = opcode::DEFINE_FUNCTION2;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        let params: usize = self.params.iter().map(|p| 1 + ctx.string_len(&p.name)).sum();
        ctx.string_len(&self.name) + 2 + 1 + 2 + params + 2
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        let code_size = region_len(&self.body, Self::OPCODE, ctx)?;
        w.write_string(&self.name, ctx)?;
        w.write_u16(self.params.len() as u16);
        w.write_u8(self.register_count);
        w.write_u16(self.flags.bits());
        for param in &self.params {
            w.write_u8(param.register.map_or(0, RegisterIndex::get));
            w.write_string(&param.name, ctx)?;
        }
        w.write_u16(code_size);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let name = body.read_string(ctx)?;
        let count = body.read_u16()? as usize;
        let register_count = body.read_u8()?;
        let flags = FunctionFlags::from_bits(body.read_u16()?);
        if flags.reserved_bits() != 0 && !ctx.lenient {
            return Err(CodecError::InvalidFlags {
                opcode: Self::OPCODE,
                value: flags.bits(),
            });
        }
        let mut params = Vec::with_capacity(count.min(body.remaining()));
        for _ in 0..count {
            let register = match body.read_u8()? {
                0 => None,
                reg => Some(RegisterIndex::from_u8(reg)),
            };
            params.push(RegisterParam {
                register,
                name: body.read_string(ctx)?,
            });
        }
        let code_size = body.read_u16()? as usize;
        let actions = decode_framed(rest, ctx, code_size)?;
        Ok(Self {
            name,
            register_count,
            flags,
            params,
            body: actions,
        })
    }

    fn nested_len(&self, ctx: &CodecContext) -> usize {
        actions_size(&self.body, ctx)
    }

    fn write_nested(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        write_actions(&self.body, w, ctx)
    }
}
