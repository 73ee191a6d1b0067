use std::path::{Component, Path, PathBuf};
use std::sync::Once;

static PERF_TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "avm1_core=debug,avm1=info";

use anyhow::Context;
use avm1_core::{Action, CodecConfig, CodecContext, TextLayout, decode_actions, disasm, encode_actions};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

#[cfg(test)]
mod main_test;

#[derive(Debug, Parser)]
#[command(
    name = "avm1",
    author,
    version,
    about = "Inspect and rewrite SWF AVM1 action streams",
    long_about = None
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    codec: CodecArgs,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
struct CodecArgs {
    /// SWF version of the enclosing movie (affects property operands)
    #[arg(long = "swf-version", value_name = "N", global = true)]
    swf_version: Option<u8>,

    /// Accept fixed-form gaps and unread body bytes instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Strings carry a u16 length prefix instead of a NUL terminator
    #[arg(long = "length-prefixed", global = true)]
    length_prefixed: bool,

    /// TOML codec config; command-line flags take precedence
    #[arg(long, value_name = "PATH", value_parser = parse_sanitized_path, global = true)]
    config: Option<PathBuf>,
}

impl CodecArgs {
    fn resolve(&self) -> anyhow::Result<CodecContext> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => CodecConfig::default(),
        };
        if let Some(version) = self.swf_version {
            config.version = version;
        }
        if self.lenient {
            config.lenient = true;
        }
        if self.length_prefixed {
            config.text_layout = TextLayout::LengthPrefixed;
        }
        debug!(?config, "codec context resolved");
        Ok(config.into())
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print an indented listing of an action stream.
    Disasm {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
    },
    /// Print the decoded actions as JSON.
    Decode {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
    },
    /// Encode JSON actions into a binary action stream.
    Encode {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
        /// Output path (defaults to FILE with a `.bin` extension)
        #[arg(short, long, value_parser = parse_sanitized_path)]
        output: Option<PathBuf>,
    },
    /// Decode, re-encode and compare byte-for-byte.
    Check {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
    },
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

fn load_config(path: &Path) -> anyhow::Result<CodecConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read config '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid codec config '{}'", path.display()))
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn maybe_init_perf_tracing() {
    let raw = match std::env::var("AVM1_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    PERF_TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn read_stream(path: &Path, ctx: &CodecContext) -> anyhow::Result<(Vec<u8>, Vec<Action>)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read file '{}'", path.display()))?;
    let actions =
        decode_actions(&bytes, ctx).with_context(|| format!("Failed to decode action stream '{}'", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), actions = actions.len(), "decoded stream");
    Ok((bytes, actions))
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

/// Offset of the first differing byte, or the shorter length when one is a prefix.
fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(offset) => Some(offset),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

fn run_encode(file: &Path, output: Option<PathBuf>, ctx: &CodecContext) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read file '{}'", file.display()))?;
    let actions: Vec<Action> =
        serde_json::from_str(&text).with_context(|| format!("Invalid action JSON in '{}'", file.display()))?;
    let bytes = encode_actions(&actions, ctx).context("Failed to encode actions")?;
    let out = output.unwrap_or_else(|| default_output(file));
    std::fs::write(&out, &bytes).with_context(|| format!("Failed to write '{}'", out.display()))?;
    println!("wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}

fn run_check(file: &Path, ctx: &CodecContext) -> anyhow::Result<()> {
    let (original, actions) = read_stream(file, ctx)?;
    let encoded = encode_actions(&actions, ctx).context("Failed to re-encode decoded actions")?;
    if let Some(offset) = first_difference(&original, &encoded) {
        anyhow::bail!(
            "re-encoded stream differs at byte {} (input {} bytes, output {} bytes)",
            offset,
            original.len(),
            encoded.len()
        );
    }
    println!("ok: {} actions, {} bytes", actions.len(), original.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    maybe_init_perf_tracing();
    let args = CliArgs::parse();
    let ctx = args.codec.resolve()?;

    match args.command {
        Commands::Disasm { file } => {
            let (_, actions) = read_stream(&file, &ctx)?;
            print!("{}", disasm::listing(&actions));
        }
        Commands::Decode { file } => {
            let (_, actions) = read_stream(&file, &ctx)?;
            println!("{}", serde_json::to_string_pretty(&actions)?);
        }
        Commands::Encode { file, output } => run_encode(&file, output, &ctx)?,
        Commands::Check { file } => run_check(&file, &ctx)?,
    }
    Ok(())
}
