//! Encoding context threaded through every size/write/decode call.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// First SWF version with UTF-8 text.
pub const DEFAULT_VERSION: u8 = 6;

/// How text values are laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextLayout {
    /// Encoded bytes followed by a single `0x00` (what the player reads).
    #[default]
    NulTerminated,
    /// `u16` byte count followed by the encoded bytes.
    LengthPrefixed,
}

impl TextLayout {
    /// Wire size of a text value whose encoded form is `byte_len` bytes.
    #[inline]
    pub fn encoded_len(self, byte_len: usize) -> usize {
        match self {
            TextLayout::NulTerminated => byte_len + 1,
            TextLayout::LengthPrefixed => byte_len + 2,
        }
    }

    pub(crate) fn check(self, bytes: &[u8]) -> Result<()> {
        match self {
            TextLayout::NulTerminated if bytes.contains(&0) => Err(CodecError::InvalidText(format!(
                "{:?} contains a NUL byte and cannot be NUL-terminated",
                String::from_utf8_lossy(bytes)
            ))),
            TextLayout::LengthPrefixed if bytes.len() > u16::MAX as usize => {
                Err(CodecError::out_of_range("text length", bytes.len() as i64, 0, u16::MAX as i64))
            }
            _ => Ok(()),
        }
    }
}

/// Character set of text values. SWF 6 moved from a single-byte codepage
/// to UTF-8; the older codepage is read as Latin-1, which maps every byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf8,
}

impl TextEncoding {
    pub fn for_version(version: u8) -> Self {
        if version < 6 { TextEncoding::Latin1 } else { TextEncoding::Utf8 }
    }

    /// Encoded byte count of `text`. Text that cannot be encoded is still
    /// measured per character; writing it fails.
    pub fn byte_len(self, text: &str) -> usize {
        match self {
            TextEncoding::Latin1 => text.chars().count(),
            TextEncoding::Utf8 => text.len(),
        }
    }

    pub fn encode(self, text: &str) -> Result<Cow<'_, [u8]>> {
        match self {
            TextEncoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            TextEncoding::Latin1 if text.is_ascii() => Ok(Cow::Borrowed(text.as_bytes())),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c))
                        .map_err(|_| CodecError::InvalidText(format!("{c:?} has no Latin-1 encoding in {text:?}")))
                })
                .collect::<Result<Vec<u8>>>()
                .map(Cow::Owned),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::InvalidText(e.to_string()))
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Parameters the codec needs beyond the action values themselves.
///
/// The context is read-only during a call; one value can be shared across
/// threads encoding independent action trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecContext {
    pub version: u8,
    pub text: TextLayout,
    /// Decode fixed-form gaps as opaque actions, skip unread body bytes and
    /// accept reserved flag bits. Skipped bytes and reserved bits are not
    /// kept, so such input does not re-encode to the same bytes.
    pub lenient: bool,
}

impl Default for CodecContext {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl CodecContext {
    pub fn new(version: u8) -> Self {
        Self {
            version,
            text: TextLayout::NulTerminated,
            lenient: false,
        }
    }

    pub fn with_text_layout(mut self, text: TextLayout) -> Self {
        self.text = text;
        self
    }

    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Character set implied by `version`.
    #[inline]
    pub fn encoding(&self) -> TextEncoding {
        TextEncoding::for_version(self.version)
    }

    /// Encoded byte length of `text` under the active encoding and layout.
    #[inline]
    pub fn string_len(&self, text: &str) -> usize {
        self.text.encoded_len(self.encoding().byte_len(text))
    }

    /// Named properties are float bit patterns before SWF 5.
    #[inline]
    pub fn properties_as_float(&self) -> bool {
        self.version < 5
    }
}

/// File form of [`CodecContext`], as read from a TOML config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub version: u8,
    pub text_layout: TextLayout,
    pub lenient: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            text_layout: TextLayout::NulTerminated,
            lenient: false,
        }
    }
}

impl From<CodecConfig> for CodecContext {
    fn from(config: CodecConfig) -> Self {
        CodecContext::new(config.version)
            .with_text_layout(config.text_layout)
            .with_lenient(config.lenient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_len_follows_layout() {
        let ctx = CodecContext::default();
        assert_eq!(ctx.string_len("hello"), 6);
        let ctx = ctx.with_text_layout(TextLayout::LengthPrefixed);
        assert_eq!(ctx.string_len("hello"), 7);
        assert_eq!(ctx.string_len(""), 2);
    }

    #[test]
    fn property_encoding_switches_at_version_5() {
        assert!(CodecContext::new(4).properties_as_float());
        assert!(!CodecContext::new(5).properties_as_float());
    }

    #[test]
    fn nul_in_text_is_rejected_for_nul_layout() {
        assert!(TextLayout::NulTerminated.check(b"a\0b").is_err());
        assert!(TextLayout::LengthPrefixed.check(b"a\0b").is_ok());
    }

    #[test]
    fn text_before_swf6_is_latin1() {
        let old = CodecContext::new(5);
        assert_eq!(old.encoding(), TextEncoding::Latin1);
        assert_eq!(old.string_len("café"), 5);
        assert_eq!(CodecContext::new(6).string_len("café"), 6);

        assert_eq!(&*TextEncoding::Latin1.encode("café").unwrap(), b"caf\xE9");
        assert_eq!(TextEncoding::Latin1.decode(b"caf\xE9").unwrap(), "café");
        assert!(matches!(TextEncoding::Latin1.encode("€"), Err(CodecError::InvalidText(_))));
    }

    #[test]
    fn config_converts_into_context() {
        let config = CodecConfig {
            version: 4,
            text_layout: TextLayout::LengthPrefixed,
            lenient: true,
        };
        let ctx = CodecContext::from(config);
        assert_eq!(ctx.version, 4);
        assert_eq!(ctx.text, TextLayout::LengthPrefixed);
        assert!(ctx.lenient);
    }
}
