use super::*;
use crate::context::{CodecContext, TextLayout};
use crate::error::CodecError;
use crate::io::{ByteReader, ByteWriter};
use crate::value::{Property, RegisterIndex, TableIndex};

fn declared_len(bytes: &[u8]) -> usize {
    u16::from_le_bytes([bytes[1], bytes[2]]) as usize
}

fn nested_size(action: &Action, ctx: &CodecContext) -> usize {
    match action {
        Action::DefineFunction(f) => actions_size(f.body(), ctx),
        Action::DefineFunction2(f) => actions_size(f.body(), ctx),
        Action::With(w) => actions_size(w.body(), ctx),
        Action::Try(t) => {
            actions_size(t.try_body(), ctx) + actions_size(t.catch_body(), ctx) + actions_size(t.finally_body(), ctx)
        }
        _ => 0,
    }
}

/// Encode, check the size and length-field invariants, decode back.
fn round_trip(action: &Action, ctx: &CodecContext) -> Vec<u8> {
    let bytes = action.encode(ctx).expect("encode");
    assert_eq!(bytes.len(), action.estimate_size(ctx), "estimate_size for {action}");
    assert_eq!(bytes[0], action.opcode());
    if !opcode::is_fixed_form(action.opcode()) {
        assert_eq!(
            bytes.len(),
            VARIABLE_HEADER_LEN + declared_len(&bytes) + nested_size(action, ctx),
            "declared length for {action}"
        );
    }
    let mut reader = ByteReader::new(&bytes);
    let decoded = decode_action(&mut reader, ctx).expect("decode");
    assert!(reader.is_empty(), "decoder left {} bytes of {action}", reader.remaining());
    assert_eq!(&decoded, action);
    bytes
}

fn sample_actions() -> Vec<Action> {
    let function = DefineFunction::new(FunctionSpec {
        name: "add".into(),
        params: vec!["a".into(), "b".into()],
        body: vec![
            Action::Push(Push::new(vec![PushValue::from("a")])),
            Action::Basic(BasicOp::GetVariable),
            Action::Push(Push::new(vec![PushValue::from("b")])),
            Action::Basic(BasicOp::GetVariable),
            Action::Basic(BasicOp::Add2),
            Action::Basic(BasicOp::Return),
        ],
    })
    .unwrap();
    let function2 = DefineFunction2::new(Function2Spec {
        name: String::new(),
        register_count: 4,
        flags: FunctionFlags::PRELOAD_THIS.union(FunctionFlags::SUPPRESS_ARGUMENTS),
        params: vec![
            RegisterParam::in_register(RegisterIndex::new(2).unwrap(), "x"),
            RegisterParam::named("y"),
        ],
        body: vec![
            Action::Push(Push::new(vec![PushValue::Register(RegisterIndex::new(2).unwrap())])),
            Action::Basic(BasicOp::Return),
        ],
    })
    .unwrap();
    vec![
        Action::Basic(BasicOp::Play),
        Action::GotoFrame(GotoFrame::new(12).unwrap()),
        Action::GetUrl(GetUrl::new("http://example.com/", "_blank")),
        Action::StoreRegister(StoreRegister::new(255).unwrap()),
        Action::ConstantPool(ConstantPool::new(vec!["a".into(), String::new(), "längd".into()]).unwrap()),
        Action::WaitForFrame(WaitForFrame::new(65_535, 3).unwrap()),
        Action::SetTarget(SetTarget::new("/clip")),
        Action::GotoLabel(GotoLabel::new("intro")),
        Action::WaitForFrame2(WaitForFrame2::new(1)),
        Action::DefineFunction2(function2),
        Action::Try(Try::new(TrySpec {
            try_body: vec![Action::Basic(BasicOp::Throw)],
            catch_target: CatchTarget::Register(RegisterIndex::new(1).unwrap()),
            catch_body: vec![Action::Basic(BasicOp::Pop)],
            finally_body: vec![Action::Basic(BasicOp::Stop)],
        })),
        Action::With(With::new(vec![Action::Basic(BasicOp::NextFrame)])),
        Action::Push(Push::new(vec![
            PushValue::from("s"),
            PushValue::Int(-7),
            PushValue::Double(2.25),
            PushValue::Bool(true),
            PushValue::Null,
            PushValue::Undefined,
            PushValue::Register(RegisterIndex::new(0).unwrap()),
            PushValue::Constant(TableIndex::new(300).unwrap()),
            PushValue::Property(Property::ROTATION),
        ])),
        Action::Jump(Jump::new(i16::MIN)),
        Action::GetUrl2(GetUrl2::new(SendVarsMethod::Get, true, false)),
        Action::DefineFunction(function),
        Action::If(If::new(i16::MAX)),
        Action::Call,
        Action::GotoFrame2(GotoFrame2::new(true, 2).unwrap()),
        Action::Unknown(UnknownAction::new(0xC4, vec![9, 8, 7]).unwrap()),
    ]
}

#[test]
fn every_variant_round_trips() {
    let ctx = CodecContext::default();
    for action in sample_actions() {
        round_trip(&action, &ctx);
    }
}

#[test]
fn every_variant_round_trips_with_length_prefixed_text() {
    let ctx = CodecContext::new(7).with_text_layout(TextLayout::LengthPrefixed);
    for action in sample_actions() {
        round_trip(&action, &ctx);
    }
}

#[test]
fn boundary_values_keep_length_invariant() {
    let ctx = CodecContext::default();
    let cases = vec![
        Action::Push(Push::default()),
        Action::Push(Push::new(vec![PushValue::from("")])),
        Action::Push(Push::new(vec![
            PushValue::Register(RegisterIndex::new(RegisterIndex::MAX).unwrap()),
            PushValue::Constant(TableIndex::new(TableIndex::MAX).unwrap()),
            PushValue::Constant(TableIndex::new(255).unwrap()),
        ])),
        Action::ConstantPool(ConstantPool::default()),
        Action::GotoLabel(GotoLabel::new("")),
        Action::With(With::default()),
        Action::DefineFunction(DefineFunction::new(FunctionSpec::default()).unwrap()),
        Action::Try(Try::new(TrySpec::default())),
        Action::GotoFrame2(GotoFrame2::new(false, 0).unwrap()),
        Action::GotoFrame2(GotoFrame2::new(false, 65_535).unwrap()),
    ];
    for action in cases {
        round_trip(&action, &ctx);
    }
}

#[test]
fn all_basic_ops_are_one_byte() {
    let ctx = CodecContext::default();
    for op in BasicOp::ALL {
        let bytes = round_trip(&Action::Basic(*op), &ctx);
        assert_eq!(bytes, vec![op.opcode()]);
    }
}

#[test]
fn jump_with_negative_offset() {
    let ctx = CodecContext::default();
    let bytes = round_trip(&Action::Jump(Jump::new(-100)), &ctx);
    assert_eq!(bytes, vec![0x99, 0x02, 0x00, 0x9C, 0xFF]);
    let decoded = decode_actions(&bytes, &ctx).unwrap();
    match &decoded[0] {
        Action::Jump(jump) => assert_eq!(jump.offset(), -100),
        other => panic!("expected Jump, got {other:?}"),
    }
}

#[test]
fn try_with_empty_catch_and_finally() {
    let ctx = CodecContext::default();
    let handler = Try::new(TrySpec {
        try_body: vec![Action::Push(Push::new(vec![PushValue::from("x")])), Action::Basic(BasicOp::Throw)],
        ..TrySpec::default()
    });
    let bytes = round_trip(&Action::Try(handler), &ctx);
    assert_eq!(&bytes[..3], &[0x8F, 0x08, 0x00]);
    assert_eq!(bytes[3], 0x00, "no catch/finally flags");
    assert_eq!(&bytes[4..6], &[0x07, 0x00], "try size");
    assert_eq!(&bytes[6..8], &[0x00, 0x00], "catch size");
    assert_eq!(&bytes[8..10], &[0x00, 0x00], "finally size");

    match decode_actions(&bytes, &ctx).unwrap().remove(0) {
        Action::Try(decoded) => {
            assert_eq!(decoded.try_body().len(), 2);
            assert!(decoded.catch_body().is_empty());
            assert!(decoded.finally_body().is_empty());
        }
        other => panic!("expected Try, got {other:?}"),
    }
}

#[test]
fn unknown_opcode_keeps_body_bytes() {
    let ctx = CodecContext::default();
    let bytes = [0xC0, 0x03, 0x00, 0x01, 0x02, 0x03];
    let actions = decode_actions(&bytes, &ctx).unwrap();
    assert_eq!(actions.len(), 1);
    match &actions[0] {
        Action::Unknown(unknown) => {
            assert_eq!(unknown.opcode(), 0xC0);
            assert_eq!(unknown.body(), &[0x01, 0x02, 0x03]);
        }
        other => panic!("expected Unknown, got {other:?}"),
    }
    assert_eq!(encode_actions(&actions, &ctx).unwrap(), bytes);
}

#[test]
fn fixed_form_gap_is_an_error_unless_lenient() {
    let strict = CodecContext::default();
    assert_eq!(decode_actions(&[0x01], &strict), Err(CodecError::UnknownBasicOpcode(0x01)));

    let lenient = strict.with_lenient(true);
    let actions = decode_actions(&[0x01, 0x06], &lenient).unwrap();
    assert_eq!(
        actions,
        vec![
            Action::Unknown(UnknownAction::new(0x01, Vec::new()).unwrap()),
            Action::Basic(BasicOp::Play),
        ]
    );
    assert_eq!(encode_actions(&actions, &lenient).unwrap(), vec![0x01, 0x06]);
}

#[test]
fn unknown_action_construction_is_validated() {
    assert_eq!(UnknownAction::new(0x96, vec![]), Err(CodecError::ReservedOpcode(0x96)));
    assert_eq!(UnknownAction::new(0x06, vec![]), Err(CodecError::ReservedOpcode(0x06)));
    assert!(matches!(
        UnknownAction::new(0x01, vec![1]),
        Err(CodecError::OutOfRange { .. })
    ));
}

#[test]
fn scene_bias_presence_follows_current_value() {
    let ctx = CodecContext::default();
    let mut goto = GotoFrame2::new(true, 0).unwrap();
    assert_eq!(Action::GotoFrame2(goto).estimate_size(&ctx), 4);

    // Mutate after sizing: the write must reflect the new value, not the old size.
    goto.set_scene_bias(5).unwrap();
    let bytes = Action::GotoFrame2(goto).encode(&ctx).unwrap();
    assert_eq!(bytes, vec![0x9F, 0x03, 0x00, 0x03, 0x05, 0x00]);
    assert_eq!(Action::GotoFrame2(goto).estimate_size(&ctx), bytes.len());

    goto.set_scene_bias(0).unwrap();
    let bytes = Action::GotoFrame2(goto).encode(&ctx).unwrap();
    assert_eq!(bytes, vec![0x9F, 0x01, 0x00, 0x01]);
}

#[test]
fn range_errors_surface_at_construction() {
    assert!(matches!(GotoFrame2::new(false, -1), Err(CodecError::OutOfRange { what: "scene bias", .. })));
    assert!(matches!(GotoFrame::new(65_536), Err(CodecError::OutOfRange { what: "frame number", .. })));
    assert!(matches!(WaitForFrame::new(70_000, 0), Err(CodecError::OutOfRange { .. })));
    assert!(matches!(StoreRegister::new(256), Err(CodecError::OutOfRange { .. })));

    let mut goto = GotoFrame2::new(false, 1).unwrap();
    assert!(goto.set_scene_bias(65_536).is_err());
    assert_eq!(goto.scene_bias(), 1, "failed setter leaves the value untouched");
}

#[test]
fn define_function2_validates_registers() {
    let spec = |register: u32, register_count: u8| Function2Spec {
        name: "f".into(),
        register_count,
        flags: FunctionFlags::NONE,
        params: vec![RegisterParam::in_register(RegisterIndex::new(register).unwrap(), "p")],
        body: Vec::new(),
    };
    assert!(DefineFunction2::new(spec(1, 2)).is_ok());
    assert!(matches!(
        DefineFunction2::new(spec(2, 2)),
        Err(CodecError::OutOfRange { what: "parameter register", .. })
    ));
    assert!(DefineFunction2::new(spec(0, 4)).is_err());

    let mut bad_flags = spec(1, 2);
    bad_flags.flags = FunctionFlags::from_bits(0x8000);
    assert!(matches!(DefineFunction2::new(bad_flags), Err(CodecError::InvalidFlags { .. })));
}

#[test]
fn define_function2_header_layout() {
    let ctx = CodecContext::default();
    let mut flags = FunctionFlags::PRELOAD_PARENT;
    flags.insert(FunctionFlags::PRELOAD_GLOBAL);
    let func = DefineFunction2::new(Function2Spec {
        name: "f".into(),
        register_count: 3,
        flags,
        params: vec![RegisterParam::in_register(RegisterIndex::new(1).unwrap(), "a")],
        body: vec![Action::Basic(BasicOp::Return)],
    })
    .unwrap();
    let bytes = round_trip(&Action::DefineFunction2(func), &ctx);
    assert_eq!(
        bytes,
        vec![
            0x8E, 0x0C, 0x00, // header
            b'f', 0x00, // name
            0x01, 0x00, // param count
            0x03, // register count
            0x80, 0x01, // flags
            0x01, b'a', 0x00, // param
            0x01, 0x00, // code size
            0x3E, // Return
        ]
    );
}

#[test]
fn call_tolerates_reserved_body_bytes() {
    let ctx = CodecContext::default();
    assert_eq!(round_trip(&Action::Call, &ctx), vec![0x9E, 0x00, 0x00]);

    let mut reader = ByteReader::new(&[0x9E, 0x02, 0x00, 0xAA, 0xBB, 0x06]);
    assert_eq!(decode_action(&mut reader, &ctx).unwrap(), Action::Call);
    assert_eq!(reader.position(), 5);
}

#[test]
fn trailing_body_bytes_are_rejected_or_skipped() {
    let bytes = [0x81, 0x03, 0x00, 0x01, 0x00, 0xFF];
    let strict = CodecContext::default();
    assert_eq!(
        decode_actions(&bytes, &strict),
        Err(CodecError::BodyLengthMismatch {
            opcode: 0x81,
            declared: 3,
            consumed: 2
        })
    );

    let lenient = strict.with_lenient(true);
    assert_eq!(
        decode_actions(&bytes, &lenient).unwrap(),
        vec![Action::GotoFrame(GotoFrame::new(1).unwrap())]
    );
}

#[test]
fn short_body_is_an_error() {
    let ctx = CodecContext::default();
    assert_eq!(
        decode_actions(&[0x81, 0x01, 0x00, 0x05], &ctx),
        Err(CodecError::UnexpectedEof { what: "u16" })
    );
    assert_eq!(
        decode_actions(&[0x96, 0x0A, 0x00, 0x02], &ctx),
        Err(CodecError::UnexpectedEof { what: "action body" })
    );
    assert_eq!(decode_actions(&[0x96, 0x01], &ctx), Err(CodecError::UnexpectedEof { what: "u16" }));
}

#[test]
fn get_url2_flag_bits() {
    let ctx = CodecContext::default();
    let bytes = round_trip(&Action::GetUrl2(GetUrl2::new(SendVarsMethod::Post, true, true)), &ctx);
    assert_eq!(bytes, vec![0x9A, 0x01, 0x00, 0xC2]);

    assert_eq!(
        decode_actions(&[0x9A, 0x01, 0x00, 0x03], &ctx),
        Err(CodecError::InvalidFlags {
            opcode: 0x9A,
            value: 0x03
        })
    );
    assert!(decode_actions(&[0x9A, 0x01, 0x00, 0x04], &ctx).is_err());
}

#[test]
fn oversized_body_is_reported_before_writing() {
    let ctx = CodecContext::default();
    let push = Action::Push(Push::new(vec![PushValue::Str("x".repeat(70_000))]));
    assert!(matches!(
        push.encode(&ctx),
        Err(CodecError::BodyTooLarge { opcode: 0x96, .. })
    ));
}

#[test]
fn oversized_function_body_fails_before_the_name() {
    let ctx = CodecContext::default();
    let big = || Action::Push(Push::new(vec![PushValue::Str("x".repeat(60_000))]));
    let plain = DefineFunction::new(FunctionSpec {
        name: "f".into(),
        params: vec!["a".into()],
        body: vec![big(), big()],
    })
    .unwrap();
    let mut w = ByteWriter::new();
    w.write_u8(0x06);
    assert_eq!(
        Action::DefineFunction(plain).write(&mut w, &ctx),
        Err(CodecError::BodyTooLarge { opcode: 0x9B, len: 120_010 })
    );
    // Only the action header follows what the caller had written.
    assert_eq!(w.as_bytes(), &[0x06, 0x9B, 0x08, 0x00]);

    let with_registers = DefineFunction2::new(Function2Spec {
        name: "g".into(),
        register_count: 0,
        flags: FunctionFlags::NONE,
        params: Vec::new(),
        body: vec![big(), big()],
    })
    .unwrap();
    let mut w = ByteWriter::new();
    assert!(matches!(
        Action::DefineFunction2(with_registers).write(&mut w, &ctx),
        Err(CodecError::BodyTooLarge { opcode: 0x8E, .. })
    ));
    assert_eq!(w.as_bytes(), &[0x8E, 0x09, 0x00]);
}

#[test]
fn lenient_reserved_flag_bits_are_not_preserved() {
    let ctx = CodecContext::default().with_lenient(true);
    // GetUrl2 with reserved bit 0x04 set next to the POST method.
    let actions = decode_actions(&[0x9A, 0x01, 0x00, 0x06], &ctx).unwrap();
    assert_eq!(actions, vec![Action::GetUrl2(GetUrl2::new(SendVarsMethod::Post, false, false))]);
    assert_eq!(encode_actions(&actions, &ctx).unwrap(), vec![0x9A, 0x01, 0x00, 0x02]);
}

#[test]
fn interior_nul_fails_encoding() {
    let ctx = CodecContext::default();
    let label = Action::GotoLabel(GotoLabel::new("a\0b"));
    assert!(matches!(label.encode(&ctx), Err(CodecError::InvalidText(_))));
}

#[test]
fn stream_decodes_until_input_is_exhausted() {
    let ctx = CodecContext::default();
    let actions = vec![
        Action::ConstantPool(ConstantPool::new(vec!["greeting".into()]).unwrap()),
        Action::Push(Push::new(vec![PushValue::Constant(TableIndex::new(0).unwrap())])),
        Action::Basic(BasicOp::Trace),
        Action::Basic(BasicOp::End),
    ];
    let bytes = encode_actions(&actions, &ctx).unwrap();
    assert_eq!(bytes.len(), actions_size(&actions, &ctx));
    assert_eq!(decode_actions(&bytes, &ctx).unwrap(), actions);
    assert_eq!(decode_actions(&[], &ctx).unwrap(), Vec::<Action>::new());
}

#[test]
fn json_round_trip_preserves_actions() {
    let actions = sample_actions();
    let json = serde_json::to_string(&actions).unwrap();
    let back: Vec<Action> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, actions);
}

#[test]
fn json_input_is_validated() {
    let bad_register = r#"[{"StoreRegister":{"register":256}}]"#;
    assert!(serde_json::from_str::<Vec<Action>>(bad_register).is_err());

    let bad_unknown = r#"[{"Unknown":{"opcode":150,"body":[]}}]"#;
    assert!(serde_json::from_str::<Vec<Action>>(bad_unknown).is_err());

    let ok = r#"["Call",{"Basic":"Play"},{"Jump":{"offset":-3}}]"#;
    let actions: Vec<Action> = serde_json::from_str(ok).unwrap();
    assert_eq!(
        actions,
        vec![Action::Call, Action::Basic(BasicOp::Play), Action::Jump(Jump::new(-3))]
    );
}
