//! Store loading: memory-map the artifact, validate the header and section
//! bounds, and parse the sections into their runtime shapes. Any structural
//! violation is an `Error::Format`; filesystem failures are `Error::Io`.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::automaton::{Automaton, Node};
use crate::error::{Error, Result};
use crate::store::{
    PatternRef, PatternStore, PatternStoreStats, FLAG_CASE_INSENSITIVE, FLAG_IGNORE_PUNCT,
    FLAG_MASK, HEADER_LEN, MAGIC, VERSION,
};

pub(crate) fn open(path: &Path) -> Result<PatternStore> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    parse(&mmap)
}

pub(crate) fn parse(buf: &[u8]) -> Result<PatternStore> {
    if buf.len() < HEADER_LEN {
        return Err(Error::Format(format!(
            "store truncated: {} bytes, header needs {}",
            buf.len(),
            HEADER_LEN
        )));
    }
    let mut cur = Cursor { buf, off: 0 };
    let magic = cur.u32()?;
    if magic != MAGIC {
        return Err(Error::Format(format!("bad magic 0x{magic:08x}")));
    }
    let version = cur.u32()?;
    if version != VERSION {
        return Err(Error::Format(format!(
            "unsupported store version {version} (expected {VERSION})"
        )));
    }
    let flags = cur.u32()?;
    if flags & !FLAG_MASK != 0 {
        return Err(Error::Format(format!("unknown flag bits 0x{flags:08x}")));
    }
    let stats = PatternStoreStats {
        stored_pattern_count: cur.u32()?,
        short_pattern_count: cur.u32()?,
        total_input_bytes: cur.u64()?,
        total_stored_bytes: cur.u64()?,
        smallest_pattern_length: cur.u32()?,
        largest_pattern_length: cur.u32()?,
    };
    let short_off = cur.u64()?;
    let auto_off = cur.u64()?;
    let blob_off = cur.u64()?;

    // Short section.
    cur.seek(short_off)?;
    let short_count = cur.u32()? as usize;
    if short_count != stats.short_pattern_count as usize {
        return Err(Error::Format("short table count disagrees with header".into()));
    }
    let mut short = HashSet::with_capacity(short_count);
    for _ in 0..short_count {
        short.insert(cur.u64()?);
    }

    // Automaton section.
    cur.seek(auto_off)?;
    let node_count = cur.u32()? as usize;
    let pattern_count = cur.u32()? as usize;
    if node_count == 0 {
        return Err(Error::Format("automaton has no root node".into()));
    }
    if pattern_count != stats.stored_pattern_count as usize {
        return Err(Error::Format("pattern count disagrees with header".into()));
    }
    let mut patterns = Vec::with_capacity(pattern_count);
    for _ in 0..pattern_count {
        patterns.push(PatternRef {
            off: cur.u32()?,
            len: cur.u32()?,
        });
    }
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let fail = cur.u32()?;
        let n_edges = cur.u16()? as usize;
        let n_outputs = cur.u16()? as usize;
        if fail as usize >= node_count {
            return Err(Error::Format("failure link out of range".into()));
        }
        let mut edges = Vec::with_capacity(n_edges);
        for _ in 0..n_edges {
            let b = cur.u8()?;
            let next = cur.u32()?;
            if next as usize >= node_count {
                return Err(Error::Format("edge target out of range".into()));
            }
            edges.push((b, next));
        }
        let mut outputs = Vec::with_capacity(n_outputs);
        for _ in 0..n_outputs {
            let p = cur.u32()?;
            if p as usize >= pattern_count {
                return Err(Error::Format("output pattern index out of range".into()));
            }
            outputs.push(p);
        }
        nodes.push(Node {
            fail,
            edges,
            outputs,
        });
    }

    // Blob section.
    cur.seek(blob_off)?;
    let blob_len = cur.u64()? as usize;
    let blob = cur.bytes(blob_len)?.to_vec();
    if blob_len as u64 != stats.total_stored_bytes {
        return Err(Error::Format("blob length disagrees with header".into()));
    }
    for p in &patterns {
        let end = p.off as usize + p.len as usize;
        if p.len == 0 || end > blob.len() {
            return Err(Error::Format("pattern blob reference out of range".into()));
        }
    }

    Ok(PatternStore {
        case_insensitive: flags & FLAG_CASE_INSENSITIVE != 0,
        ignore_punctuation: flags & FLAG_IGNORE_PUNCT != 0,
        stats,
        short,
        auto: Automaton { nodes },
        patterns,
        blob,
    })
}

struct Cursor<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> Cursor<'a> {
    fn seek(&mut self, off: u64) -> Result<()> {
        let off = off as usize;
        if off > self.buf.len() {
            return Err(Error::Format(format!(
                "section offset {off} beyond store end {}",
                self.buf.len()
            )));
        }
        self.off = off;
        Ok(())
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .off
            .checked_add(n)
            .filter(|&e| e <= self.buf.len())
            .ok_or_else(|| Error::Format(format!("store truncated at offset {}", self.off)))?;
        let out = &self.buf[self.off..end];
        self.off = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.bytes(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.bytes(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.bytes(8)?.try_into().unwrap()))
    }
}
