use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::io::ByteWriter;

use super::{VARIABLE_HEADER_LEN, opcode};

/// An action the codec has no variant for, preserved byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUnknown", into = "RawUnknown")]
pub struct UnknownAction {
    opcode: u8,
    body: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct RawUnknown {
    opcode: u8,
    #[serde(default)]
    body: Vec<u8>,
}

impl UnknownAction {
    /// Rejects opcodes that have a dedicated variant, bodies on fixed-form
    /// opcodes and bodies longer than a length field can describe.
    pub fn new(opcode: u8, body: Vec<u8>) -> Result<Self> {
        if opcode::is_known(opcode) {
            return Err(CodecError::ReservedOpcode(opcode));
        }
        let max_body = if opcode::is_fixed_form(opcode) { 0 } else { u16::MAX as usize };
        if body.len() > max_body {
            return Err(CodecError::out_of_range(
                "unknown action body length",
                body.len() as i64,
                0,
                max_body as i64,
            ));
        }
        Ok(Self { opcode, body })
    }

    pub(crate) fn from_wire(opcode: u8, body: Vec<u8>) -> Self {
        Self { opcode, body }
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn encoded_len(&self) -> usize {
        if opcode::is_fixed_form(self.opcode) {
            1
        } else {
            VARIABLE_HEADER_LEN + self.body.len()
        }
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u8(self.opcode);
        if opcode::is_fixed_form(self.opcode) {
            return Ok(());
        }
        let len = u16::try_from(self.body.len()).map_err(|_| CodecError::BodyTooLarge {
            opcode: self.opcode,
            len: self.body.len(),
        })?;
        w.write_u16(len);
        w.write_bytes(&self.body);
        Ok(())
    }
}

impl TryFrom<RawUnknown> for UnknownAction {
    type Error = CodecError;

    fn try_from(raw: RawUnknown) -> Result<Self> {
        UnknownAction::new(raw.opcode, raw.body)
    }
}

impl From<UnknownAction> for RawUnknown {
    fn from(action: UnknownAction) -> Self {
        RawUnknown {
            opcode: action.opcode,
            body: action.body,
        }
    }
}
