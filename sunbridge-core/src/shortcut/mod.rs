//! Decoding of the legacy host's shortcut files.
//!
//! Shortcuts are Windows Shell Link (`.lnk`) files: a fixed 76-byte header
//! with a flags bitfield, followed by optional variable-length blocks. Only
//! the pieces needed to reconstruct a launchable application are decoded;
//! everything else is skipped with its declared length.

mod decode;

pub use decode::{decode, decode_bytes, LinkFlags};

/// Everything extracted from one shortcut file.
///
/// Constructed once per source file and immutable afterwards. Optional
/// blocks that were absent in the file decode to empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutRecord {
    /// Base name of the shortcut file, extension stripped.
    pub display_name: String,
    /// Absolute path or opaque identifier extracted from the binary.
    pub target_path: String,
    /// Command-line arguments embedded in the shortcut, raw.
    pub arguments: String,
    /// May be empty; an empty working directory is valid.
    pub working_dir: String,
    /// Icon resource path, used only as a fallback artwork hint.
    pub icon_path: String,
}
