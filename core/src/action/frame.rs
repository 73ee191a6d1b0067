//! Timeline navigation actions.

use serde::{Deserialize, Serialize};

use crate::context::CodecContext;
use crate::error::{CodecError, Result};
use crate::io::{ByteReader, ByteWriter};

use super::{VariableForm, opcode};

fn check_frame(frame: u32) -> Result<u16> {
    u16::try_from(frame).map_err(|_| CodecError::out_of_range("frame number", frame as i64, 0, u16::MAX as i64))
}

/// Jump to a zero-based frame of the current timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoFrame {
    frame: u16,
}

impl GotoFrame {
    pub fn new(frame: u32) -> Result<Self> {
        Ok(Self {
            frame: check_frame(frame)?,
        })
    }

    pub fn frame(&self) -> u16 {
        self.frame
    }
}

impl VariableForm for GotoFrame {
    const OPCODE: u8 = opcode::GOTO_FRAME;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        2
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        w.write_u16(self.frame);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, _ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            frame: body.read_u16()?,
        })
    }
}

const PLAY_FLAG: u8 = 0x01;
const SCENE_BIAS_FLAG: u8 = 0x02;

/// Jump to the frame number or label on top of the stack.
///
/// The scene bias field is written only when it is non-zero; its presence
/// flag is derived from the value at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoFrame2 {
    play: bool,
    scene_bias: u16,
}

impl GotoFrame2 {
    pub fn new(play: bool, scene_bias: i32) -> Result<Self> {
        let mut action = Self { play, scene_bias: 0 };
        action.set_scene_bias(scene_bias)?;
        Ok(action)
    }

    pub fn play(&self) -> bool {
        self.play
    }

    pub fn scene_bias(&self) -> u16 {
        self.scene_bias
    }

    pub fn set_play(&mut self, play: bool) {
        self.play = play;
    }

    pub fn set_scene_bias(&mut self, scene_bias: i32) -> Result<()> {
        self.scene_bias = u16::try_from(scene_bias)
            .map_err(|_| CodecError::out_of_range("scene bias", scene_bias as i64, 0, u16::MAX as i64))?;
        Ok(())
    }

    fn has_scene_bias(&self) -> bool {
        self.scene_bias != 0
    }
}

impl VariableForm for GotoFrame2 {
    const OPCODE: u8 = opcode::GOTO_FRAME2;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        if self.has_scene_bias() { 3 } else { 1 }
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        let mut flags = 0;
        if self.play {
            flags |= PLAY_FLAG;
        }
        if self.has_scene_bias() {
            flags |= SCENE_BIAS_FLAG;
        }
        w.write_u8(flags);
        if self.has_scene_bias() {
            w.write_u16(self.scene_bias);
        }
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        let flags = body.read_u8()?;
        if flags & !(PLAY_FLAG | SCENE_BIAS_FLAG) != 0 && !ctx.lenient {
            return Err(CodecError::InvalidFlags {
                opcode: Self::OPCODE,
                value: flags as u16,
            });
        }
        let scene_bias = if flags & SCENE_BIAS_FLAG != 0 { body.read_u16()? } else { 0 };
        Ok(Self {
            play: flags & PLAY_FLAG != 0,
            scene_bias,
        })
    }
}

/// Skip `skip_count` actions unless `frame` has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForFrame {
    frame: u16,
    skip_count: u8,
}

impl WaitForFrame {
    pub fn new(frame: u32, skip_count: u8) -> Result<Self> {
        Ok(Self {
            frame: check_frame(frame)?,
            skip_count,
        })
    }

    pub fn frame(&self) -> u16 {
        self.frame
    }

    pub fn skip_count(&self) -> u8 {
        self.skip_count
    }
}

impl VariableForm for WaitForFrame {
    const OPCODE: u8 = opcode::WAIT_FOR_FRAME;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        3
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        w.write_u16(self.frame);
        w.write_u8(self.skip_count);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, _ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            frame: body.read_u16()?,
            skip_count: body.read_u8()?,
        })
    }
}

/// Like [`WaitForFrame`], with the frame taken from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForFrame2 {
    skip_count: u8,
}

impl WaitForFrame2 {
    pub fn new(skip_count: u8) -> Self {
        Self { skip_count }
    }

    pub fn skip_count(&self) -> u8 {
        self.skip_count
    }
}

impl VariableForm for WaitForFrame2 {
    const OPCODE: u8 = opcode::WAIT_FOR_FRAME2;

    fn body_len(&self, _ctx: &CodecContext) -> usize {
        1
    }

    fn write_body(&self, w: &mut ByteWriter, _ctx: &CodecContext) -> Result<()> {
        w.write_u8(self.skip_count);
        Ok(())
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, _ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            skip_count: body.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoLabel {
    label: String,
}

impl GotoLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl VariableForm for GotoLabel {
    const OPCODE: u8 = opcode::GOTO_LABEL;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        ctx.string_len(&self.label)
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_string(&self.label, ctx)
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            label: body.read_string(ctx)?,
        })
    }
}

/// Redirect subsequent timeline actions to the named clip ("" is the owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTarget {
    target: String,
}

impl SetTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl VariableForm for SetTarget {
    const OPCODE: u8 = opcode::SET_TARGET;

    fn body_len(&self, ctx: &CodecContext) -> usize {
        ctx.string_len(&self.target)
    }

    fn write_body(&self, w: &mut ByteWriter, ctx: &CodecContext) -> Result<()> {
        w.write_string(&self.target, ctx)
    }

    fn decode_body(body: &mut ByteReader<'_>, _rest: &mut ByteReader<'_>, ctx: &CodecContext) -> Result<Self> {
        Ok(Self {
            target: body.read_string(ctx)?,
        })
    }
}
