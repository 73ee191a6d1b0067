//! Bit-exact codec for SWF AVM1 action streams.
//!
//! ```
//! use avm1_core::{Action, BasicOp, CodecContext, Push, PushValue, decode_actions, encode_actions};
//!
//! let ctx = CodecContext::new(6);
//! let actions = vec![
//!     Action::Push(Push::new(vec![PushValue::from("hello")])),
//!     Action::Basic(BasicOp::Trace),
//!     Action::Basic(BasicOp::End),
//! ];
//! let bytes = encode_actions(&actions, &ctx).unwrap();
//! assert_eq!(decode_actions(&bytes, &ctx).unwrap(), actions);
//! ```

pub mod action;
pub mod context;
pub mod disasm;
mod error;
pub mod io;
pub mod value;

pub use action::{
    Action, BasicOp, CatchTarget, ConstantPool, DefineFunction, DefineFunction2, Function2Spec, FunctionFlags,
    FunctionSpec, GetUrl, GetUrl2, GotoFrame, GotoFrame2, GotoLabel, If, Jump, Push, PushValue, RegisterParam,
    MAX_NESTING_DEPTH, SendVarsMethod, SetTarget, StoreRegister, Try, TrySpec, UnknownAction, WaitForFrame,
    WaitForFrame2, With,
    actions_size, decode_action, decode_actions, decode_framed, encode_actions, write_actions,
};
pub use context::{CodecConfig, CodecContext, TextEncoding, TextLayout};
pub use error::{CodecError, Result};
pub use value::{Property, RegisterIndex, TableIndex};
