//! Validated index wrappers and the named-property table.
//!
//! Range checks happen in the constructors. Values read off the wire are
//! built through the same constructors only where the wire type is wider
//! than the valid range.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// One of the 256 registers of an AVM1 function or the global frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RegisterIndex(u8);

impl RegisterIndex {
    pub const MAX: u32 = u8::MAX as u32;

    pub fn new(index: u32) -> Result<Self> {
        u8::try_from(index)
            .map(RegisterIndex)
            .map_err(|_| CodecError::out_of_range("register index", index as i64, 0, Self::MAX as i64))
    }

    #[inline]
    pub const fn from_u8(index: u8) -> Self {
        RegisterIndex(index)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for RegisterIndex {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self> {
        RegisterIndex::new(value)
    }
}

impl From<RegisterIndex> for u32 {
    fn from(value: RegisterIndex) -> Self {
        value.0 as u32
    }
}

impl fmt::Display for RegisterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r:{}", self.0)
    }
}

/// Index into the active constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TableIndex(u16);

impl TableIndex {
    pub const MAX: u32 = u16::MAX as u32;

    pub fn new(index: u32) -> Result<Self> {
        u16::try_from(index)
            .map(TableIndex)
            .map_err(|_| CodecError::out_of_range("table index", index as i64, 0, Self::MAX as i64))
    }

    #[inline]
    pub const fn from_u16(index: u16) -> Self {
        TableIndex(index)
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Indices up to 255 use the one-byte push form.
    #[inline]
    pub const fn is_wide(self) -> bool {
        self.0 > u8::MAX as u16
    }
}

impl TryFrom<u32> for TableIndex {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self> {
        TableIndex::new(value)
    }
}

impl From<TableIndex> for u32 {
    fn from(value: TableIndex) -> Self {
        value.0 as u32
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c:{}", self.0)
    }
}

/// A movie-clip property code, pushed for `GetProperty` / `SetProperty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Property(i32);

const PROPERTY_NAMES: [&str; 22] = [
    "_x",
    "_y",
    "_xscale",
    "_yscale",
    "_currentframe",
    "_totalframes",
    "_alpha",
    "_visible",
    "_width",
    "_height",
    "_rotation",
    "_target",
    "_framesloaded",
    "_name",
    "_droptarget",
    "_url",
    "_highquality",
    "_focusrect",
    "_soundbuftime",
    "_quality",
    "_xmouse",
    "_ymouse",
];

impl Property {
    pub const X: Property = Property(0);
    pub const Y: Property = Property(1);
    pub const X_SCALE: Property = Property(2);
    pub const Y_SCALE: Property = Property(3);
    pub const CURRENT_FRAME: Property = Property(4);
    pub const TOTAL_FRAMES: Property = Property(5);
    pub const ALPHA: Property = Property(6);
    pub const VISIBLE: Property = Property(7);
    pub const WIDTH: Property = Property(8);
    pub const HEIGHT: Property = Property(9);
    pub const ROTATION: Property = Property(10);
    pub const TARGET: Property = Property(11);
    pub const FRAMES_LOADED: Property = Property(12);
    pub const NAME: Property = Property(13);
    pub const DROP_TARGET: Property = Property(14);
    pub const URL: Property = Property(15);
    pub const HIGH_QUALITY: Property = Property(16);
    pub const FOCUS_RECT: Property = Property(17);
    pub const SOUND_BUF_TIME: Property = Property(18);
    pub const QUALITY: Property = Property(19);
    pub const X_MOUSE: Property = Property(20);
    pub const Y_MOUSE: Property = Property(21);

    /// Largest code whose pre-SWF5 float form is exact.
    pub const MAX_CODE: i32 = 1 << 24;

    pub fn new(code: i32) -> Result<Self> {
        if (0..=Self::MAX_CODE).contains(&code) {
            Ok(Property(code))
        } else {
            Err(CodecError::out_of_range(
                "property code",
                code as i64,
                0,
                Self::MAX_CODE as i64,
            ))
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }

    pub fn name(self) -> Option<&'static str> {
        usize::try_from(self.0).ok().and_then(|i| PROPERTY_NAMES.get(i)).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PROPERTY_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|i| Property(i as i32))
    }

    /// The 32-bit word this property occupies on the wire.
    pub fn to_wire(self, as_float: bool) -> u32 {
        if as_float {
            (self.0 as f32).to_bits()
        } else {
            self.0 as u32
        }
    }

    /// Code carried by a wire word, if writing that code gives the word back.
    /// Wire-decoded codes are not re-validated against the property table.
    pub fn from_wire_word(word: u32, as_float: bool) -> Option<Self> {
        let property = if as_float {
            Property(f32::from_bits(word) as i32)
        } else {
            Property(word as i32)
        };
        (property.to_wire(as_float) == word).then_some(property)
    }
}

impl TryFrom<i64> for Property {
    type Error = CodecError;

    fn try_from(value: i64) -> Result<Self> {
        let code = i32::try_from(value)
            .map_err(|_| CodecError::out_of_range("property code", value, 0, Property::MAX_CODE as i64))?;
        Property::new(code)
    }
}

impl From<Property> for i64 {
    fn from(value: Property) -> Self {
        value.0 as i64
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "prop:{name}"),
            None => write!(f, "prop:{}", self.0),
        }
    }
}
