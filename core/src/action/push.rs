//! `Push` and its typed operand union.
//!
//! Each operand is a one-byte type tag followed by a tag-specific body. The
//! action body is a run of operands with no count; decoding stops when the
//! declared length is used up.

use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::value::{Property, RegisterIndex, TableIndex};

use super::{VariableForm, opcode};

const TAG_STRING: u8 = 0;
const TAG_PROPERTY: u8 = 1;
const TAG_NULL: u8 = 2;
const TAG_UNDEFINED: u8 = 3;
const TAG_REGISTER: u8 = 4;
const TAG_BOOLEAN: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_INTEGER: u8 = 7;
const TAG_CONSTANT8: u8 = 8;
const TAG_CONSTANT16: u8 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PushValue {
    Str(String),
    Int(i32),
    Double(f64),
    Bool(bool),
    Null,
    Undefined,
    Register(RegisterIndex),
    Constant(TableIndex),
    /// Encoded as a float bit pattern before SWF 5, as an integer after.
    Property(Property),
    /// Property operand whose float word has no exact integer code. Written
    /// back unchanged.
    PropertyWord(u32),
}

impl PushValue {
    pub fn tag(&self) -> u8 {
        match self {
            PushValue::Str(_) => TAG_STRING,
            PushValue::Property(_) | PushValue::PropertyWord(_) => TAG_PROPERTY,
            PushValue::Null => TAG_NULL,
            PushValue::Undefined => TAG_UNDEFINED,
            PushValue::Register(_) => TAG_REGISTER,
            PushValue::Bool(_) => TAG_BOOLEAN,
            PushValue::Double(_) => TAG_DOUBLE,
            PushValue::Int(_) => TAG_INTEGER,
            PushValue::Constant(index) if index.is_wide() => TAG_CONSTANT16,
            PushValue::Constant(_) => TAG_CONSTANT8,
        }
    }

    /// Tag byte plus body.
    pub fn encoded_len(&self, ctx: &CodecContext) -> usize {
        1 + match self {
            PushValue::Str(s) => ctx.string_len(s),
            PushValue::Int(_) | PushValue::Property(_) | PushValue::PropertyWord(_) => 4,
            PushValue::Double(_) => 8,
            PushValue::Bool(_) | PushValue::Register(_) => 1,
            PushValue::Null | PushValue::Undefined => 0,
            PushValue::Constant(index) if index.is_wide() => 2,
            PushValue::Constant(_) => 1,
        }
    }

    pub fn write(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_u8(self.tag());
        match self {
            PushValue::Str(s) => w.write_string(s, ctx)?,
            PushValue::Int(value) => w.write_i32(*value),
            PushValue::Double(value) => write_double(w, *value),
            PushValue::Bool(value) => w.write_u8(u8::from(*value)),
            PushValue::Null | PushValue::Undefined => {}
            PushValue::Register(register) => w.write_u8(register.get()),
            PushValue::Constant(index) if index.is_wide() => w.write_u16(index.get()),
            PushValue::Constant(index) => w.write_u8(index.get() as u8),
            PushValue::Property(property) => w.write_u32(property.to_wire(ctx.properties_as_float())),
            PushValue::PropertyWord(word) => w.write_u32(*word),
        }
        Ok(())
    }

    pub fn decode(reader: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<PushValue> {
        let tag = reader.read_u8()?;
        Ok(match tag {
            TAG_STRING => PushValue::Str(reader.read_string(ctx)?),
            TAG_PROPERTY => {
                let word = reader.read_u32()?;
                match Property::from_wire_word(word, ctx.properties_as_float()) {
                    Some(property) => PushValue::Property(property),
                    None => PushValue::PropertyWord(word),
                }
            }
            TAG_NULL => PushValue::Null,
            TAG_UNDEFINED => PushValue::Undefined,
            TAG_REGISTER => PushValue::Register(RegisterIndex::from_u8(reader.read_u8()?)),
            TAG_BOOLEAN => PushValue::Bool(reader.read_u8()? != 0),
            TAG_DOUBLE => PushValue::Double(read_double(reader)?),
            TAG_INTEGER => PushValue::Int(reader.read_i32()?),
            TAG_CONSTANT8 => PushValue::Constant(TableIndex::from_u16(reader.read_u8()? as u16)),
            TAG_CONSTANT16 => PushValue::Constant(TableIndex::from_u16(reader.read_u16()?)),
            other => return Err(CodecError::UnknownPushTag(other)),
        })
    }
}

// Doubles are stored as two little-endian 32-bit words, high word first.
fn write_double(w: &mut ByteWriter, value: f64) {
    let bits = value.to_bits();
    w.write_u32((bits >> 32) as u32);
    w.write_u32(bits as u32);
}

fn read_double(reader: &mut ByteReader<'_>) -> Result<f64> {
    let high = reader.read_u32()? as u64;
    let low = reader.read_u32()? as u64;
    Ok(f64::from_bits((high << 32) | low))
}

macro_rules! impl_push_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PushValue {
                fn from(value: $ty) -> Self {
                    PushValue::$variant(value)
                }
            }
        )*
    };
}

impl_push_value_from!(
    String => Str,
    i32 => Int,
    f64 => Double,
    bool => Bool,
    RegisterIndex => Register,
    TableIndex => Constant,
    Property => Property,
);

impl From<&str> for PushValue {
    fn from(value: &str) -> Self {
        PushValue::Str(value.to_string())
    }
}

/// Push one or more values onto the stack, in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Push {
    values: Vec<PushValue>,
}

impl Push {
    pub fn new(values: Vec<PushValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[PushValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<PushValue> {
        self.values
    }
}

impl FromIterator<PushValue> for Push {
    fn from_iter<I: IntoIterator<Item = PushValue>>(iter: I) -> Self {
        Push::new(iter.into_iter().collect())
    }
}

impl VariableForm for Push {
    const OPCODE: u8 = opcode::PUSH;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        self.values.iter().map(|v| v.encoded_len(ctx)).sum()
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        for value in &self.values {
            value.write(w, ctx)?;
        }
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let mut values = Vec::new();
        while !body.is_empty() {
            values.push(PushValue::decode(body, ctx)?);
        }
        Ok(Self { values })
    }
}
