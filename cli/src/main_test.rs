mod tests {
    use crate::*;
    use std::fs;

    #[test]
    fn test_sanitize_path_allows_simple_relative() {
        let p = sanitize_path("frames/do_action.bin").expect("relative path should be allowed");
        assert_eq!(p, PathBuf::from("frames/do_action.bin"));
    }

    #[test]
    fn test_sanitize_path_rejects_parent_dir() {
        let err = sanitize_path("frames/../secret.bin").unwrap_err();
        assert!(err.to_string().contains("Parent directory components"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitize_path_allows_absolute_unix() {
        let p = sanitize_path("/tmp/a.bin").expect("absolute path should be allowed");
        assert_eq!(p, PathBuf::from("/tmp/a.bin"));
    }

    #[test]
    fn test_cli_args_rejects_parent_dir() {
        let err = CliArgs::try_parse_from(["avm1", "disasm", "../a.bin"]).unwrap_err();
        assert!(err.to_string().contains("Parent directory components"));
    }

    #[test]
    fn test_cli_args_encode_output() {
        let args = CliArgs::try_parse_from(["avm1", "encode", "a.json", "-o", "out/a.swfa"]).expect("should parse");
        match args.command {
            Commands::Encode { file, output } => {
                assert_eq!(file, PathBuf::from("a.json"));
                assert_eq!(output, Some(PathBuf::from("out/a.swfa")));
            }
            other => panic!("expected encode command, got {other:?}"),
        }
    }

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(default_output(Path::new("dir/a.json")), PathBuf::from("dir/a.bin"));
        assert_eq!(default_output(Path::new("script")), PathBuf::from("script.bin"));
    }

    #[test]
    fn flags_build_context() {
        let args = CliArgs::try_parse_from([
            "avm1",
            "check",
            "a.bin",
            "--swf-version",
            "4",
            "--lenient",
            "--length-prefixed",
        ])
        .expect("should parse");
        let ctx = args.codec.resolve().expect("context");
        assert_eq!(ctx.version, 4);
        assert!(ctx.lenient);
        assert_eq!(ctx.text, TextLayout::LengthPrefixed);
    }

    #[test]
    fn defaults_without_flags() {
        let args = CliArgs::try_parse_from(["avm1", "decode", "a.bin"]).expect("should parse");
        assert_eq!(args.codec.resolve().expect("context"), CodecContext::default());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("codec.toml");
        fs::write(&path, "version = 5\ntext_layout = \"length-prefixed\"\n").expect("write config");

        let codec = CodecArgs {
            swf_version: Some(8),
            config: Some(path),
            ..CodecArgs::default()
        };
        let ctx = codec.resolve().expect("context");
        assert_eq!(ctx.version, 8);
        assert_eq!(ctx.text, TextLayout::LengthPrefixed);
        assert!(!ctx.lenient);
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("codec.toml");
        fs::write(&path, "versoin = 5\n").expect("write config");
        let codec = CodecArgs {
            config: Some(path),
            ..CodecArgs::default()
        };
        let err = codec.resolve().unwrap_err();
        assert!(err.to_string().contains("Invalid codec config"));
    }

    #[test]
    fn first_difference_reports_offset() {
        assert_eq!(first_difference(&[1, 2, 3], &[1, 2, 3]), None);
        assert_eq!(first_difference(&[1, 2, 3], &[1, 9, 3]), Some(1));
        assert_eq!(first_difference(&[1, 2, 3], &[1, 2]), Some(2));
    }

    #[test]
    fn trace_toggle_values() {
        assert!(env_toggle_enabled("1"));
        assert!(env_toggle_enabled("avm1_core=trace"));
        assert!(!env_toggle_enabled(" off "));
        assert!(!env_toggle_enabled(""));
        assert_eq!(filter_expr_from("true"), None);
        assert_eq!(filter_expr_from("avm1_core=trace"), Some("avm1_core=trace".to_string()));
    }
}
