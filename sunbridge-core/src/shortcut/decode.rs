// sunbridge-core/src/shortcut/decode.rs

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use sunbridge_common::error::{Result, SunbridgeError};
use tracing::debug;

use super::ShortcutRecord;

/// Fixed size of the shell link header.
const HEADER_SIZE: usize = 0x4C;

/// Shell link class identifier, serialized little-endian:
/// `00021401-0000-0000-C000-000000000046`.
const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

/// Minimum size of the link info block (its fixed header).
const LINK_INFO_MIN_SIZE: u32 = 0x1C;

/// Link info carries a volume ID and a local base path.
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x0000_0001;

bitflags! {
    /// The header's flags bitfield: which optional blocks are present, and
    /// how string data is encoded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkFlags: u32 {
        const HAS_LINK_TARGET_ID_LIST = 0x0000_0001;
        const HAS_LINK_INFO           = 0x0000_0002;
        const HAS_NAME                = 0x0000_0004;
        const HAS_RELATIVE_PATH       = 0x0000_0008;
        const HAS_WORKING_DIR         = 0x0000_0010;
        const HAS_ARGUMENTS           = 0x0000_0020;
        const HAS_ICON_LOCATION       = 0x0000_0040;
        const IS_UNICODE              = 0x0000_0080;
    }
}

/// Decode one shortcut file into a [`ShortcutRecord`].
///
/// The display name is derived from the file's base name with the
/// extension stripped. Structural problems surface as
/// [`SunbridgeError::MalformedShortcut`] carrying the offending path.
pub fn decode(path: &Path) -> Result<ShortcutRecord> {
    let data = fs::read(path)?;
    let display_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    decode_bytes(&display_name, &data).map_err(|e| match e {
        SunbridgeError::MalformedShortcut(msg) => {
            SunbridgeError::MalformedShortcut(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Pure transformation of shortcut bytes into a [`ShortcutRecord`]; no
/// filesystem access beyond what the caller already did.
pub fn decode_bytes(display_name: &str, data: &[u8]) -> Result<ShortcutRecord> {
    let mut reader = Reader::new(data);

    let header = reader.take(HEADER_SIZE, "header")?;
    if header[0..4] != (HEADER_SIZE as u32).to_le_bytes() || header[4..20] != LINK_CLSID {
        return Err(malformed("missing shell link signature"));
    }

    let raw_flags = u32::from_le_bytes([header[20], header[21], header[22], header[23]]);
    let flags = LinkFlags::from_bits_truncate(raw_flags);
    let unicode = flags.contains(LinkFlags::IS_UNICODE);
    debug!("link flags: {flags:?}");

    if flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
        let id_list_size = reader.read_u16("target ID list size")? as usize;
        reader.skip(id_list_size, "target ID list")?;
    }

    let mut local_path = None;
    if flags.contains(LinkFlags::HAS_LINK_INFO) {
        local_path = read_link_info(&mut reader)?;
    }

    // String data blocks appear in a fixed order, each gated by its flag.
    // An unset flag means the block is absent and the field stays empty.
    if flags.contains(LinkFlags::HAS_NAME) {
        let _description = read_string_data(&mut reader, unicode, "name string")?;
    }
    let relative_path = if flags.contains(LinkFlags::HAS_RELATIVE_PATH) {
        read_string_data(&mut reader, unicode, "relative path")?
    } else {
        String::new()
    };
    let working_dir = if flags.contains(LinkFlags::HAS_WORKING_DIR) {
        read_string_data(&mut reader, unicode, "working directory")?
    } else {
        String::new()
    };
    let arguments = if flags.contains(LinkFlags::HAS_ARGUMENTS) {
        read_string_data(&mut reader, unicode, "arguments")?
    } else {
        String::new()
    };
    let icon_path = if flags.contains(LinkFlags::HAS_ICON_LOCATION) {
        read_string_data(&mut reader, unicode, "icon location")?
    } else {
        String::new()
    };

    // The local-volume path from the link info block takes precedence over
    // the relative-path string datum.
    let target_path = match local_path {
        Some(p) if !p.is_empty() => p,
        _ => relative_path,
    };

    Ok(ShortcutRecord {
        display_name: display_name.to_string(),
        target_path,
        arguments,
        working_dir,
        icon_path,
    })
}

/// Parse the link info block the reader is positioned at, returning the
/// reconstructed local path when the block carries one. The reader ends up
/// positioned just past the block regardless.
fn read_link_info(reader: &mut Reader<'_>) -> Result<Option<String>> {
    let start = reader.pos;
    let total = reader.read_u32("link info size")?;
    if total < LINK_INFO_MIN_SIZE {
        return Err(malformed(format!(
            "link info block declares impossible size {total}"
        )));
    }
    let block = reader.remainder_of(start, total as usize, "link info block")?;

    let info_flags = u32_at(block, 8, "link info flags")?;
    if info_flags & VOLUME_ID_AND_LOCAL_BASE_PATH == 0 {
        return Ok(None);
    }

    let base_offset = u32_at(block, 16, "local base path offset")? as usize;
    let suffix_offset = u32_at(block, 24, "common path suffix offset")? as usize;

    let base = cstr_at(block, base_offset, "local base path")?;
    let suffix = cstr_at(block, suffix_offset, "common path suffix")?;

    Ok(Some(format!("{base}{suffix}")))
}

/// One length-prefixed string datum. The count field is in characters;
/// Unicode mode stores fixed-width UTF-16LE code units, otherwise one byte
/// per character in the 8-bit host codepage.
fn read_string_data(reader: &mut Reader<'_>, unicode: bool, what: &str) -> Result<String> {
    let count = reader.read_u16(what)? as usize;
    if unicode {
        let bytes = reader.take(count * 2, what)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    } else {
        let bytes = reader.take(count, what)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Bounds-checked cursor over the raw file. Any read that would run past
/// end-of-file is malformed; lengths are never clamped.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| truncated(what))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize, what: &str) -> Result<()> {
        self.take(n, what).map(|_| ())
    }

    fn read_u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// The whole block that started at `start` with declared size `total`,
    /// advancing the cursor past its end.
    fn remainder_of(&mut self, start: usize, total: usize, what: &str) -> Result<&'a [u8]> {
        let end = start
            .checked_add(total)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| truncated(what))?;
        let slice = &self.buf[start..end];
        self.pos = end;
        Ok(slice)
    }
}

fn u32_at(block: &[u8], offset: usize, what: &str) -> Result<u32> {
    let end = offset.checked_add(4).filter(|&e| e <= block.len());
    match end {
        Some(end) => {
            let b = &block[offset..end];
            Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        }
        None => Err(truncated(what)),
    }
}

/// NUL-terminated 8-bit string at `offset` within `block`. Offset zero
/// means the field is absent.
fn cstr_at(block: &[u8], offset: usize, what: &str) -> Result<String> {
    if offset == 0 {
        return Ok(String::new());
    }
    if offset >= block.len() {
        return Err(truncated(what));
    }
    let tail = &block[offset..];
    let nul = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| malformed(format!("{what} is not NUL-terminated")))?;
    Ok(tail[..nul].iter().map(|&b| b as char).collect())
}

fn malformed(msg: impl Into<String>) -> SunbridgeError {
    SunbridgeError::MalformedShortcut(msg.into())
}

fn truncated(what: &str) -> SunbridgeError {
    malformed(format!("{what} runs past end of file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds synthetic shell link byte images for the decoder tests.
    struct LnkBuilder {
        flags: LinkFlags,
        body: Vec<u8>,
    }

    impl LnkBuilder {
        fn new() -> Self {
            Self {
                flags: LinkFlags::empty(),
                body: Vec::new(),
            }
        }

        fn id_list(mut self, payload: &[u8]) -> Self {
            self.flags |= LinkFlags::HAS_LINK_TARGET_ID_LIST;
            self.body
                .extend_from_slice(&(payload.len() as u16).to_le_bytes());
            self.body.extend_from_slice(payload);
            self
        }

        fn link_info(mut self, base: &str, suffix: &str) -> Self {
            self.flags |= LinkFlags::HAS_LINK_INFO;
            let base_offset = 28u32;
            let suffix_offset = base_offset + base.len() as u32 + 1;
            let total = suffix_offset + suffix.len() as u32 + 1;

            self.body.extend_from_slice(&total.to_le_bytes());
            self.body.extend_from_slice(&LINK_INFO_MIN_SIZE.to_le_bytes());
            self.body
                .extend_from_slice(&VOLUME_ID_AND_LOCAL_BASE_PATH.to_le_bytes());
            self.body.extend_from_slice(&0u32.to_le_bytes()); // volume ID offset
            self.body.extend_from_slice(&base_offset.to_le_bytes());
            self.body.extend_from_slice(&0u32.to_le_bytes()); // network relative link
            self.body.extend_from_slice(&suffix_offset.to_le_bytes());
            self.body.extend_from_slice(base.as_bytes());
            self.body.push(0);
            self.body.extend_from_slice(suffix.as_bytes());
            self.body.push(0);
            self
        }

        fn string_data(mut self, flag: LinkFlags, value: &str) -> Self {
            self.flags |= flag | LinkFlags::IS_UNICODE;
            let units: Vec<u16> = value.encode_utf16().collect();
            self.body
                .extend_from_slice(&(units.len() as u16).to_le_bytes());
            for unit in units {
                self.body.extend_from_slice(&unit.to_le_bytes());
            }
            self
        }

        fn ansi_string_data(mut self, flag: LinkFlags, value: &str) -> Self {
            self.flags |= flag;
            self.body
                .extend_from_slice(&(value.len() as u16).to_le_bytes());
            self.body.extend_from_slice(value.as_bytes());
            self
        }

        fn build(self) -> Vec<u8> {
            let mut data = Vec::with_capacity(HEADER_SIZE + self.body.len());
            data.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
            data.extend_from_slice(&LINK_CLSID);
            data.extend_from_slice(&self.flags.bits().to_le_bytes());
            data.resize(HEADER_SIZE, 0);
            data.extend_from_slice(&self.body);
            data
        }
    }

    #[test]
    fn decodes_minimal_header() {
        let data = LnkBuilder::new().build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.display_name, "Chess");
        assert_eq!(record.target_path, "");
        assert_eq!(record.arguments, "");
        assert_eq!(record.working_dir, "");
        assert_eq!(record.icon_path, "");
    }

    #[test]
    fn unset_arguments_flag_yields_empty_arguments() {
        let data = LnkBuilder::new()
            .string_data(LinkFlags::HAS_WORKING_DIR, "C:\\Games\\Chess")
            .build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.arguments, "");
        assert_eq!(record.working_dir, "C:\\Games\\Chess");
    }

    #[test]
    fn decodes_all_string_data_blocks() {
        let data = LnkBuilder::new()
            .string_data(LinkFlags::HAS_NAME, "a comment")
            .string_data(LinkFlags::HAS_RELATIVE_PATH, "..\\chess.exe")
            .string_data(LinkFlags::HAS_WORKING_DIR, "C:\\Games\\Chess")
            .string_data(LinkFlags::HAS_ARGUMENTS, "--fullscreen \"two words\"")
            .string_data(LinkFlags::HAS_ICON_LOCATION, "C:\\Games\\Chess\\chess.ico")
            .build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.target_path, "..\\chess.exe");
        assert_eq!(record.working_dir, "C:\\Games\\Chess");
        assert_eq!(record.arguments, "--fullscreen \"two words\"");
        assert_eq!(record.icon_path, "C:\\Games\\Chess\\chess.ico");
    }

    #[test]
    fn ansi_string_data_decodes_as_eight_bit() {
        let data = LnkBuilder::new()
            .ansi_string_data(LinkFlags::HAS_RELATIVE_PATH, "chess.exe")
            .build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.target_path, "chess.exe");
    }

    #[test]
    fn local_base_path_takes_precedence_over_relative_path() {
        let data = LnkBuilder::new()
            .link_info("C:\\Games\\Chess", "\\chess.exe")
            .string_data(LinkFlags::HAS_RELATIVE_PATH, "..\\chess.exe")
            .build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.target_path, "C:\\Games\\Chess\\chess.exe");
    }

    #[test]
    fn id_list_is_skipped() {
        let data = LnkBuilder::new()
            .id_list(&[0xAA; 40])
            .string_data(LinkFlags::HAS_RELATIVE_PATH, "chess.exe")
            .build();
        let record = decode_bytes("Chess", &data).unwrap();
        assert_eq!(record.target_path, "chess.exe");
    }

    #[test]
    fn rejects_bad_signature() {
        let mut data = LnkBuilder::new().build();
        data[4] = 0xFF;
        let err = decode_bytes("Chess", &data).unwrap_err();
        assert!(matches!(err, SunbridgeError::MalformedShortcut(_)));
    }

    #[test]
    fn rejects_short_file() {
        let data = vec![0x4C, 0x00, 0x00, 0x00];
        let err = decode_bytes("Chess", &data).unwrap_err();
        assert!(matches!(err, SunbridgeError::MalformedShortcut(_)));
    }

    #[test]
    fn rejects_truncated_string_data() {
        let mut data = LnkBuilder::new()
            .string_data(LinkFlags::HAS_ARGUMENTS, "--fullscreen")
            .build();
        data.truncate(data.len() - 6);
        let err = decode_bytes("Chess", &data).unwrap_err();
        assert!(matches!(err, SunbridgeError::MalformedShortcut(_)));
    }

    #[test]
    fn rejects_link_info_running_past_eof() {
        let mut data = LnkBuilder::new().link_info("C:\\Games", "").build();
        // Inflate the declared block size past the end of the buffer.
        let oversized = (data.len() as u32) * 2;
        data[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&oversized.to_le_bytes());
        let err = decode_bytes("Chess", &data).unwrap_err();
        assert!(matches!(err, SunbridgeError::MalformedShortcut(_)));
    }
}
