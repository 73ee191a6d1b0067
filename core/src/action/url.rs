use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};

use super::{VariableForm, opcode};

/// Load a URL into a window or level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUrl {
    url: String,
    target: String,
}

impl GetUrl {
    pub fn new(url: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: target.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl VariableForm for GetUrl {
    const OPCODE: u8 = opcode::GET_URL;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        ctx.string_len(&self.url) + ctx.string_len(&self.target)
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_string(&self.url, ctx)?;
        w.write_string(&self.target, ctx)
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            url: body.read_string(ctx)?,
            target: body.read_string(ctx)?,
        })
    }
}

/// How `GetUrl2` sends the timeline's variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SendVarsMethod {
    #[default]
    None,
    Get,
    Post,
}

const METHOD_MASK: u8 = 0x03;
const LOAD_TARGET_FLAG: u8 = 0x40;
const LOAD_VARIABLES_FLAG: u8 = 0x80;

/// Stack-driven URL load: URL and target are popped at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUrl2 {
    method: SendVarsMethod,
    load_target: bool,
    load_variables: bool,
}

impl GetUrl2 {
    pub fn new(method: SendVarsMethod, load_target: bool, load_variables: bool) -> Self {
        Self {
            method,
            load_target,
            load_variables,
        }
    }

    pub fn method(&self) -> SendVarsMethod {
        self.method
    }

    /// Target names a sprite rather than a browser window.
    pub fn load_target(&self) -> bool {
        self.load_target
    }

    pub fn load_variables(&self) -> bool {
        self.load_variables
    }

    fn flags(&self) -> u8 {
        let mut flags = match self.method {
            SendVarsMethod::None => 0,
            SendVarsMethod::Get => 1,
            SendVarsMethod::Post => 2,
        };
        if self.load_target {
            flags |= LOAD_TARGET_FLAG;
        }
        if self.load_variables {
            flags |= LOAD_VARIABLES_FLAG;
        }
        flags
    }
}

impl VariableForm for GetUrl2 {
    const OPCODE: u8 = opcode::GET_URL2;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        1
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        w.write_u8(self.flags());
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let flags = body.read_u8()?;
        let invalid = CodecError::InvalidFlags {
            opcode: Self::OPCODE,
            value: flags as u16,
        };
        let reserved = flags & !(METHOD_MASK | LOAD_TARGET_FLAG | LOAD_VARIABLES_FLAG);
        if reserved != 0 && !ctx.lenient {
            return Err(invalid);
        }
        let method = match flags & METHOD_MASK {
            0 => SendVarsMethod::None,
            1 => SendVarsMethod::Get,
            2 => SendVarsMethod::Post,
            _ => return Err(invalid),
        };
        Ok(Self {
            method,
            load_target: flags & LOAD_TARGET_FLAG != 0,
            load_variables: flags & LOAD_VARIABLES_FLAG != 0,
        })
    }
}
