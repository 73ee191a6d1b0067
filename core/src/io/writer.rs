use crate::context::{CodecContext, TextLayout};
use crate::error::Result;

/// Growable output buffer for encoded actions.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    out: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.out.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.out.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, value: &str, ctx: &CodecContext) -> Result<()> {
        let bytes = ctx.encoding().encode(value)?;
        ctx.text.check(&bytes)?;
        match ctx.text {
            TextLayout::NulTerminated => {
                self.out.extend_from_slice(&bytes);
                self.out.push(0);
            }
            TextLayout::LengthPrefixed => {
                self.write_u16(bytes.len() as u16);
                self.out.extend_from_slice(&bytes);
            }
        }
        Ok(())
    }
}
