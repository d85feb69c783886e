//! Store serialization. Sections are written after a header whose offset
//! fields are patched once the section positions are known; the finished
//! image is committed with a temp-file rename so a failed compile never
//! leaves a partial artifact at the destination.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::automaton::Automaton;
use crate::error::Result;
use crate::store::{
    PatternRef, PatternStoreStats, FLAG_CASE_INSENSITIVE, FLAG_IGNORE_PUNCT, HEADER_LEN, MAGIC,
    VERSION,
};

/// Borrowed view of everything that goes into one store image.
pub(crate) struct StoreParts<'a> {
    pub case_insensitive: bool,
    pub ignore_punctuation: bool,
    pub stats: PatternStoreStats,
    /// Short packed keys in ascending order.
    pub short_keys: &'a [u64],
    pub auto: &'a Automaton,
    pub patterns: &'a [PatternRef],
    pub blob: &'a [u8],
}

/// Serialize a complete store image.
pub(crate) fn encode(parts: &StoreParts<'_>) -> Vec<u8> {
    let mut flags = 0u32;
    if parts.case_insensitive {
        flags |= FLAG_CASE_INSENSITIVE;
    }
    if parts.ignore_punctuation {
        flags |= FLAG_IGNORE_PUNCT;
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + parts.blob.len());
    buf.extend(&MAGIC.to_le_bytes());
    buf.extend(&VERSION.to_le_bytes());
    buf.extend(&flags.to_le_bytes());
    buf.extend(&parts.stats.stored_pattern_count.to_le_bytes());
    buf.extend(&parts.stats.short_pattern_count.to_le_bytes());
    buf.extend(&parts.stats.total_input_bytes.to_le_bytes());
    buf.extend(&parts.stats.total_stored_bytes.to_le_bytes());
    buf.extend(&parts.stats.smallest_pattern_length.to_le_bytes());
    buf.extend(&parts.stats.largest_pattern_length.to_le_bytes());
    // Section offsets, patched below.
    buf.extend(&0u64.to_le_bytes()); // short_off @ 44
    buf.extend(&0u64.to_le_bytes()); // auto_off  @ 52
    buf.extend(&0u64.to_le_bytes()); // blob_off  @ 60
    debug_assert_eq!(buf.len(), HEADER_LEN);

    let short_off = buf.len() as u64;
    buf.extend(&(parts.short_keys.len() as u32).to_le_bytes());
    for &k in parts.short_keys {
        buf.extend(&k.to_le_bytes());
    }

    let auto_off = buf.len() as u64;
    buf.extend(&(parts.auto.nodes.len() as u32).to_le_bytes());
    buf.extend(&(parts.patterns.len() as u32).to_le_bytes());
    for p in parts.patterns {
        buf.extend(&p.off.to_le_bytes());
        buf.extend(&p.len.to_le_bytes());
    }
    for node in &parts.auto.nodes {
        buf.extend(&node.fail.to_le_bytes());
        buf.extend(&(node.edges.len() as u16).to_le_bytes());
        buf.extend(&(node.outputs.len() as u16).to_le_bytes());
        for &(b, next) in &node.edges {
            buf.push(b);
            buf.extend(&next.to_le_bytes());
        }
        for &out in &node.outputs {
            buf.extend(&out.to_le_bytes());
        }
    }

    let blob_off = buf.len() as u64;
    buf.extend(&(parts.blob.len() as u64).to_le_bytes());
    buf.extend(parts.blob);

    buf[44..52].copy_from_slice(&short_off.to_le_bytes());
    buf[52..60].copy_from_slice(&auto_off.to_le_bytes());
    buf[60..68].copy_from_slice(&blob_off.to_le_bytes());
    buf
}

pub(crate) struct StoreWriter {
    path: PathBuf,
}

impl StoreWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Encode and commit the store image to `path` atomically.
    pub fn write(&self, parts: &StoreParts<'_>) -> Result<()> {
        let bytes = encode(parts);
        let tmp = tmp_path(&self.path);
        let res = (|| -> Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&bytes)?;
            f.flush()?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        })();
        if res.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        res
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
