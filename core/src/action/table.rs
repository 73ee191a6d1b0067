use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::value::RegisterIndex;

use super::{VariableForm, opcode};

/// Defines the string table that `PushValue::Constant` indexes into.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ConstantPool {
    strings: Vec<String>,
}

impl ConstantPool {
    pub fn new(strings: Vec<String>) -> Result<Self> {
        if strings.len() > u16::MAX as usize {
            return Err(CodecError::out_of_range(
                "constant pool size",
                strings.len() as i64,
                0,
                u16::MAX as i64,
            ));
        }
        Ok(Self { strings })
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl TryFrom<Vec<String>> for ConstantPool {
    type Error = CodecError;

    fn try_from(strings: Vec<String>) -> Result<Self> {
        ConstantPool::new(strings)
    }
}

impl From<ConstantPool> for Vec<String> {
    fn from(pool: ConstantPool) -> Self {
        pool.strings
    }
}

impl VariableForm for ConstantPool {
    const OPCODE: u8 = opcode::CONSTANT_POOL;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        2 + self.strings.iter().map(|s| ctx.string_len(s)).sum::<usize>()
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_u16(self.strings.len() as u16);
        for s in &self.strings {
            w.write_string(s, ctx)?;
        }
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let count = body.read_u16()? as usize;
        let mut strings = Vec::with_capacity(count.min(body.remaining()));
        for _ in 0..count {
            strings.push(body.read_string(ctx)?);
        }
        Ok(Self { strings })
    }
}

/// Copy the top of the stack into a register without popping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRegister {
    register: RegisterIndex,
}

impl StoreRegister {
    pub fn new(register: u32) -> Result<Self> {
        Ok(Self {
            register: RegisterIndex::new(register)?,
        })
    }

    pub fn register(&self) -> RegisterIndex {
        self.register
    }
}

impl From<RegisterIndex> for StoreRegister {
    fn from(register: RegisterIndex) -> Self {
        Self { register }
    }
}

impl VariableForm for StoreRegister {
    const OPCODE: u8 = opcode::STORE_REGISTER;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        1
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        w.write_u8(self.register.get());
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, _ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            register: RegisterIndex::from_u8(body.read_u8()?),
        })
    }
}
