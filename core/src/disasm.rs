//! Human-readable listings of action streams.

use std::fmt::{self, Write as _};

use crate::action::{Action, CatchTarget, PushValue, RegisterParam, SendVarsMethod};

impl fmt::Display for PushValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushValue::Str(s) => write!(f, "{s:?}"),
            PushValue::Int(i) => write!(f, "{i}"),
            PushValue::Double(d) => write!(f, "{d:?}"),
            PushValue::Bool(b) => write!(f, "{b}"),
            PushValue::Null => f.write_str("null"),
            PushValue::Undefined => f.write_str("undefined"),
            PushValue::Register(r) => write!(f, "{r}"),
            PushValue::Constant(c) => write!(f, "{c}"),
            PushValue::Property(p) => write!(f, "{p}"),
            PushValue::PropertyWord(word) => write!(f, "prop:{word:#010X}"),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{item}");
    }
    out
}

fn param(p: &RegisterParam) -> String {
    match p.register {
        Some(r) => format!("{}={}", p.name, r),
        None => p.name.clone(),
    }
}

/// Single-line form of an action. Nested regions are not included.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Basic(op) => f.write_str(op.name()),
            Action::GotoFrame(a) => write!(f, "GotoFrame {}", a.frame()),
            Action::GetUrl(a) => write!(f, "GetUrl {:?}, {:?}", a.url(), a.target()),
            Action::StoreRegister(a) => write!(f, "StoreRegister {}", a.register()),
            Action::ConstantPool(a) => {
                write!(f, "ConstantPool")?;
                for (i, s) in a.strings().iter().enumerate() {
                    write!(f, "{} {s:?}", if i == 0 { "" } else { "," })?;
                }
                Ok(())
            }
            Action::WaitForFrame(a) => write!(f, "WaitForFrame {}, skip {}", a.frame(), a.skip_count()),
            Action::SetTarget(a) => write!(f, "SetTarget {:?}", a.target()),
            Action::GotoLabel(a) => write!(f, "GotoLabel {:?}", a.label()),
            Action::WaitForFrame2(a) => write!(f, "WaitForFrame2 skip {}", a.skip_count()),
            Action::DefineFunction2(a) => {
                let params: Vec<String> = a.params().iter().map(param).collect();
                write!(
                    f,
                    "DefineFunction2 {}({}) regs={} flags=0x{:03X}",
                    a.name(),
                    params.join(", "),
                    a.register_count(),
                    a.flags().bits()
                )
            }
            Action::Try(a) => match a.catch_target() {
                CatchTarget::Name(name) => write!(f, "Try catch={name:?}"),
                CatchTarget::Register(r) => write!(f, "Try catch={r}"),
            },
            Action::With(_) => f.write_str("With"),
            Action::Push(a) => write!(f, "Push {}", join(a.values())),
            Action::Jump(a) => write!(f, "Jump {}", a.offset()),
            Action::GetUrl2(a) => {
                let method = match a.method() {
                    SendVarsMethod::None => "none",
                    SendVarsMethod::Get => "GET",
                    SendVarsMethod::Post => "POST",
                };
                write!(f, "GetUrl2 method={method}")?;
                if a.load_target() {
                    f.write_str(" target")?;
                }
                if a.load_variables() {
                    f.write_str(" vars")?;
                }
                Ok(())
            }
            Action::DefineFunction(a) => write!(f, "DefineFunction {}({})", a.name(), a.params().join(", ")),
            Action::If(a) => write!(f, "If {}", a.offset()),
            Action::Call => f.write_str("Call"),
            Action::GotoFrame2(a) => {
                write!(f, "GotoFrame2")?;
                if a.play() {
                    f.write_str(" play")?;
                }
                if a.scene_bias() != 0 {
                    write!(f, " bias={}", a.scene_bias())?;
                }
                Ok(())
            }
            Action::Unknown(a) => {
                write!(f, "Unknown(0x{:02X})", a.opcode())?;
                if !a.body().is_empty() {
                    f.write_str(" [")?;
                    for (i, b) in a.body().iter().enumerate() {
                        write!(f, "{}{b:02X}", if i == 0 { "" } else { " " })?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
        }
    }
}

/// One action per line, nested regions indented under their owner.
pub fn listing(actions: &[Action]) -> String {
    let mut out = String::new();
    write_listing(&mut out, actions, 0);
    out
}

fn write_block(out: &mut String, label: &str, actions: &[Action], depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(out, "{pad}{label} {{");
    write_listing(out, actions, depth + 1);
    let _ = writeln!(out, "{pad}}}");
}

fn write_listing(out: &mut String, actions: &[Action], depth: usize) {
    let pad = "  ".repeat(depth);
    for action in actions {
        match action {
            Action::DefineFunction(func) => write_block(out, &action.to_string(), func.body(), depth),
            Action::DefineFunction2(func) => write_block(out, &action.to_string(), func.body(), depth),
            Action::With(with) => write_block(out, "With", with.body(), depth),
            Action::Try(handler) => {
                write_block(out, "try", handler.try_body(), depth);
                if !handler.catch_body().is_empty() {
                    let label = match handler.catch_target() {
                        CatchTarget::Name(name) => format!("catch ({name})"),
                        CatchTarget::Register(r) => format!("catch ({r})"),
                    };
                    write_block(out, &label, handler.catch_body(), depth);
                }
                if !handler.finally_body().is_empty() {
                    write_block(out, "finally", handler.finally_body(), depth);
                }
            }
            _ => {
                let _ = writeln!(out, "{pad}{action}");
            }
        }
    }
}
