//! Line sources for dump files: buffered reads for small inputs, memory maps
//! for large ones. Lines come back without their terminator, with a trailing
//! `\r` and a leading UTF-8 BOM removed, and invalid UTF-8 replaced lossily.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use memmap2::Mmap;

/// Files at or above this size are memory-mapped.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

const BOM: &str = "\u{feff}";

pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

fn decode_line(bytes: &[u8], first: bool) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let line = String::from_utf8_lossy(bytes);
    let line: &str = if first {
        line.strip_prefix(BOM).unwrap_or(&line)
    } else {
        &line
    };
    line.to_string()
}

pub fn lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mut reader = BufReader::new(file);
    let mut first = true;
    let iter = std::iter::from_fn(move || {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                let bytes = buf.strip_suffix(b"\n").unwrap_or(&buf);
                let line = decode_line(bytes, first);
                first = false;
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    });
    Ok(Box::new(iter))
}

pub fn lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    // SAFETY: the map is read-only and dropped with the iterator; a dump being
    // rewritten while we read it is not supported.
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(Box::new(MmapLines { mmap, pos: 0 }))
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        let end = match memchr::memchr(b'\n', &data[start..]) {
            Some(off) => start + off,
            None => data.len(),
        };
        self.pos = end + 1;
        Some(Ok(decode_line(&data[start..end], start == 0)))
    }
}

/// Pick mmap or buffered reading by file size.
pub fn lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        debug!("mmap {} ({} bytes)", path.as_ref().display(), meta.len());
        lines_mmap(path)
    } else {
        lines_bufread(path)
    }
}
