use crate::context::{CodecContext, TextLayout};
use crate::error::{CodecError, Result};

/// Cursor over an action stream with a stack of consumption marks.
///
/// `mark` pushes the current position, `bytes_since_mark` reports how far the
/// cursor moved since the innermost mark, and `unmark` pops it. Nested framed
/// regions each hold their own mark.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
    marks: Vec<usize>,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            cursor: 0,
            marks: Vec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    pub fn mark(&mut self) {
        self.marks.push(self.cursor);
    }

    /// Bytes consumed since the innermost mark (0 when nothing is marked).
    pub fn bytes_since_mark(&self) -> usize {
        self.marks.last().map_or(0, |start| self.cursor - start)
    }

    pub fn unmark(&mut self) {
        self.marks.pop();
    }

    /// Number of marks currently held.
    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof { what });
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, what)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take_array("u16").map(u16::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.take_array("i16").map(i16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take_array("u32").map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take_array("i32").map(i32::from_le_bytes)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.take(len, "byte block").map(<[u8]>::to_vec)
    }

    /// Split off the next `len` bytes as an independent reader.
    pub fn sub_reader(&mut self, len: usize, what: &'static str) -> Result<ByteReader<'a>> {
        self.take(len, what).map(ByteReader::new)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len, "skipped bytes").map(|_| ())
    }

    pub fn read_string(&mut self, ctx: &CodecContext) -> Result<String> {
        let raw = match ctx.text {
            TextLayout::NulTerminated => {
                let rest = &self.bytes[self.cursor..];
                let end = rest
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(CodecError::UnexpectedEof { what: "string terminator" })?;
                let raw = &rest[..end];
                self.cursor += end + 1;
                raw
            }
            TextLayout::LengthPrefixed => {
                let len = self.read_u16()? as usize;
                self.take(len, "string")?
            }
        };
        ctx.encoding().decode(raw)
    }
}
