//! Opcode numbering of the AVM1 instruction set.

use serde::{Deserialize, Serialize};

/// Opcodes up to and including this value never carry a length field.
pub const FIXED_FORM_MAX: u8 = 0x7F;

pub const GOTO_FRAME: u8 = 0x81;
pub const GET_URL: u8 = 0x83;
pub const STORE_REGISTER: u8 = 0x87;
pub const CONSTANT_POOL: u8 = 0x88;
pub const WAIT_FOR_FRAME: u8 = 0x8A;
pub const SET_TARGET: u8 = 0x8B;
pub const GOTO_LABEL: u8 = 0x8C;
pub const WAIT_FOR_FRAME2: u8 = 0x8D;
pub const DEFINE_FUNCTION2: u8 = 0x8E;
pub const TRY: u8 = 0x8F;
pub const WITH: u8 = 0x94;
pub const PUSH: u8 = 0x96;
pub const JUMP: u8 = 0x99;
pub const GET_URL2: u8 = 0x9A;
pub const DEFINE_FUNCTION: u8 = 0x9B;
pub const IF: u8 = 0x9D;
pub const CALL: u8 = 0x9E;
pub const GOTO_FRAME2: u8 = 0x9F;

const KNOWN_VARIABLE_FORM: [u8; 18] = [
    GOTO_FRAME,
    GET_URL,
    STORE_REGISTER,
    CONSTANT_POOL,
    WAIT_FOR_FRAME,
    SET_TARGET,
    GOTO_LABEL,
    WAIT_FOR_FRAME2,
    DEFINE_FUNCTION2,
    TRY,
    WITH,
    PUSH,
    JUMP,
    GET_URL2,
    DEFINE_FUNCTION,
    IF,
    CALL,
    GOTO_FRAME2,
];

#[inline]
pub const fn is_fixed_form(opcode: u8) -> bool {
    opcode <= FIXED_FORM_MAX
}

/// True when the decoder has a dedicated variant for `opcode`.
pub fn is_known(opcode: u8) -> bool {
    if is_fixed_form(opcode) {
        BasicOp::from_u8(opcode).is_some()
    } else {
        KNOWN_VARIABLE_FORM.contains(&opcode)
    }
}

macro_rules! basic_ops {
    ($($name:ident = $code:literal,)*) => {
        /// Operand-less actions, encoded as their opcode byte alone.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum BasicOp {
            $($name = $code,)*
        }

        impl BasicOp {
            pub const ALL: &'static [BasicOp] = &[$(BasicOp::$name,)*];

            pub const fn from_u8(opcode: u8) -> Option<BasicOp> {
                match opcode {
                    $($code => Some(BasicOp::$name),)*
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(BasicOp::$name => stringify!($name),)*
                }
            }
        }
    };
}

basic_ops! {
    End = 0x00,
    NextFrame = 0x04,
    PreviousFrame = 0x05,
    Play = 0x06,
    Stop = 0x07,
    ToggleQuality = 0x08,
    StopSounds = 0x09,
    Add = 0x0A,
    Subtract = 0x0B,
    Multiply = 0x0C,
    Divide = 0x0D,
    Equals = 0x0E,
    Less = 0x0F,
    And = 0x10,
    Or = 0x11,
    Not = 0x12,
    StringEquals = 0x13,
    StringLength = 0x14,
    StringExtract = 0x15,
    Pop = 0x17,
    ToInteger = 0x18,
    GetVariable = 0x1C,
    SetVariable = 0x1D,
    SetTarget2 = 0x20,
    StringAdd = 0x21,
    GetProperty = 0x22,
    SetProperty = 0x23,
    CloneSprite = 0x24,
    RemoveSprite = 0x25,
    Trace = 0x26,
    StartDrag = 0x27,
    EndDrag = 0x28,
    StringLess = 0x29,
    Throw = 0x2A,
    CastOp = 0x2B,
    ImplementsOp = 0x2C,
    RandomNumber = 0x30,
    MbStringLength = 0x31,
    CharToAscii = 0x32,
    AsciiToChar = 0x33,
    GetTime = 0x34,
    MbStringExtract = 0x35,
    MbCharToAscii = 0x36,
    MbAsciiToChar = 0x37,
    Delete = 0x3A,
    Delete2 = 0x3B,
    DefineLocal = 0x3C,
    CallFunction = 0x3D,
    Return = 0x3E,
    Modulo = 0x3F,
    NewObject = 0x40,
    DefineLocal2 = 0x41,
    InitArray = 0x42,
    InitObject = 0x43,
    TypeOf = 0x44,
    TargetPath = 0x45,
    Enumerate = 0x46,
    Add2 = 0x47,
    Less2 = 0x48,
    Equals2 = 0x49,
    ToNumber = 0x4A,
    ToString = 0x4B,
    PushDuplicate = 0x4C,
    StackSwap = 0x4D,
    GetMember = 0x4E,
    SetMember = 0x4F,
    Increment = 0x50,
    Decrement = 0x51,
    CallMethod = 0x52,
    NewMethod = 0x53,
    InstanceOf = 0x54,
    Enumerate2 = 0x55,
    BitAnd = 0x60,
    BitOr = 0x61,
    BitXor = 0x62,
    BitLShift = 0x63,
    BitRShift = 0x64,
    BitURShift = 0x65,
    StrictEquals = 0x66,
    Greater = 0x67,
    StringGreater = 0x68,
    Extends = 0x69,
}

impl BasicOp {
    #[inline]
    pub const fn opcode(self) -> u8 {
        self as u8
    }
}
