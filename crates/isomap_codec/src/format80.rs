//! Westwood Format80 (LCW) block compression, used by the overlay packs
//!
//! Commands:
//! - `0cccpppp pppppppp` copy `ccc + 3` bytes from `p` bytes back
//! - `10cccccc` copy `c` literal bytes (`0x80` ends the stream)
//! - `11cccccc pppp` copy `c + 3` bytes from absolute position `p`
//! - `0xFE cccc vv` fill `c` bytes with `v`
//! - `0xFF cccc pppp` copy `c` bytes from absolute position `p`

use std::collections::HashMap;

use crate::{BlockFormat, CodecError};

const END: u8 = 0x80;
const MAX_LITERALS: usize = 63;
const MIN_FILL: usize = 3;
const MIN_COPY: usize = 3;
const MAX_RELATIVE_COPY: usize = 10;
const MAX_RELATIVE_BACK: usize = 0x0fff;
/// `11cccccc` with `c` below 0x3E, since 0xFE and 0xFF are other commands
const MAX_ABSOLUTE_COPY: usize = 0x3d + MIN_COPY;
const MAX_CANDIDATES: usize = 32;

fn corrupt(reason: &'static str) -> CodecError {
    CodecError::CorruptBlock {
        format: BlockFormat::Format80,
        reason,
    }
}

struct Source<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Source<'_> {
    fn byte(&mut self) -> Result<u8, CodecError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or_else(|| corrupt("input overrun"))?;
        self.pos += 1;
        Ok(b)
    }

    fn le16(&mut self) -> Result<usize, CodecError> {
        let lo = self.byte()? as usize;
        let hi = self.byte()? as usize;
        Ok(lo | (hi << 8))
    }

    fn take(&mut self, count: usize) -> Result<&[u8], CodecError> {
        let end = self.pos + count;
        let bytes = self
            .input
            .get(self.pos..end)
            .ok_or_else(|| corrupt("input overrun"))?;
        self.pos = end;
        Ok(bytes)
    }
}

fn reserve(out: &[u8], count: usize, limit: usize) -> Result<(), CodecError> {
    if out.len() + count > limit {
        Err(corrupt("output overrun"))
    } else {
        Ok(())
    }
}

fn copy_from(out: &mut Vec<u8>, start: usize, count: usize, limit: usize) -> Result<(), CodecError> {
    if start >= out.len() {
        return Err(corrupt("copy source past output"));
    }
    reserve(out, count, limit)?;
    for i in 0..count {
        let b = out[start + i];
        out.push(b);
    }
    Ok(())
}

/// Decompress one Format80 block, which must produce exactly `output_size` bytes
pub fn decompress(input: &[u8], output_size: usize) -> Result<Vec<u8>, CodecError> {
    let mut src = Source { input, pos: 0 };
    let mut out = Vec::with_capacity(output_size);

    loop {
        let cmd = src.byte()?;
        if cmd & 0x80 == 0 {
            let count = ((cmd as usize & 0x70) >> 4) + 3;
            let back = ((cmd as usize & 0x0f) << 8) | src.byte()? as usize;
            if back == 0 || back > out.len() {
                return Err(corrupt("relative copy past output"));
            }
            let start = out.len() - back;
            copy_from(&mut out, start, count, output_size)?;
        } else if cmd & 0x40 == 0 {
            if cmd == END {
                break;
            }
            let count = (cmd & 0x3f) as usize;
            reserve(&out, count, output_size)?;
            out.extend_from_slice(src.take(count)?);
        } else if cmd == 0xFE {
            let count = src.le16()?;
            let value = src.byte()?;
            reserve(&out, count, output_size)?;
            out.resize(out.len() + count, value);
        } else if cmd == 0xFF {
            let count = src.le16()?;
            let start = src.le16()?;
            copy_from(&mut out, start, count, output_size)?;
        } else {
            let count = (cmd & 0x3f) as usize + 3;
            let start = src.le16()?;
            copy_from(&mut out, start, count, output_size)?;
        }
    }

    if out.len() != output_size {
        return Err(CodecError::SizeMismatch {
            expected: output_size,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// Compress a block with Format80: fills for byte runs, copies for repeated
/// sequences and literals otherwise
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_LITERALS + 2);
    let mut finder = MatchFinder::default();
    let mut literal_start = 0usize;
    let mut pos = 0usize;

    while pos < input.len() {
        let run = input[pos..]
            .iter()
            .take(u16::MAX as usize)
            .take_while(|&&b| b == input[pos])
            .count();
        let copy = finder
            .longest(input, pos)
            .filter(|&(start, len)| worth_copying(pos - start, len));

        let step = match copy {
            Some((start, len)) if len > run => {
                flush_literals(&mut out, &input[literal_start..pos]);
                emit_copy(&mut out, pos, start, len);
                len
            }
            _ if run >= MIN_FILL => {
                flush_literals(&mut out, &input[literal_start..pos]);
                out.push(0xFE);
                out.extend_from_slice(&(run as u16).to_le_bytes());
                out.push(input[pos]);
                run
            }
            _ => {
                finder.insert(input, pos);
                pos += 1;
                continue;
            }
        };

        for p in pos..pos + step {
            finder.insert(input, p);
        }
        pos += step;
        literal_start = pos;
    }

    flush_literals(&mut out, &input[literal_start..]);
    out.push(END);
    out
}

/// A 3-byte copy only pays off in the 2-byte relative form
fn worth_copying(back: usize, len: usize) -> bool {
    len > MIN_COPY || (len == MIN_COPY && back <= MAX_RELATIVE_BACK)
}

fn emit_copy(out: &mut Vec<u8>, pos: usize, start: usize, len: usize) {
    let back = pos - start;
    if len <= MAX_RELATIVE_COPY && back <= MAX_RELATIVE_BACK {
        out.push((((len - MIN_COPY) as u8) << 4) | (back >> 8) as u8);
        out.push(back as u8);
    } else if len <= MAX_ABSOLUTE_COPY {
        out.push(0xC0 | (len - MIN_COPY) as u8);
        out.extend_from_slice(&(start as u16).to_le_bytes());
    } else {
        out.push(0xFF);
        out.extend_from_slice(&(len as u16).to_le_bytes());
        out.extend_from_slice(&(start as u16).to_le_bytes());
    }
}

/// Earlier positions of every 3-byte prefix seen so far
#[derive(Default)]
struct MatchFinder {
    chains: HashMap<[u8; 3], Vec<usize>>,
}

impl MatchFinder {
    fn key(input: &[u8], pos: usize) -> Option<[u8; 3]> {
        input.get(pos..pos + MIN_COPY)?.try_into().ok()
    }

    fn insert(&mut self, input: &[u8], pos: usize) {
        if let Some(key) = Self::key(input, pos) {
            self.chains.entry(key).or_default().push(pos);
        }
    }

    /// Longest earlier match for `input[pos..]` as `(start, len)`.
    /// Sources may overlap `pos` since the decoder copies byte by byte.
    fn longest(&self, input: &[u8], pos: usize) -> Option<(usize, usize)> {
        let chain = self.chains.get(&Self::key(input, pos)?)?;
        let mut best: Option<(usize, usize)> = None;
        for &start in chain.iter().rev().take(MAX_CANDIDATES) {
            // Absolute offsets are 16 bits wide, so far sources need the relative form
            let limit = match (start > u16::MAX as usize, pos - start > MAX_RELATIVE_BACK) {
                (false, _) => u16::MAX as usize,
                (true, false) => MAX_RELATIVE_COPY,
                (true, true) => continue,
            };
            let len = input[start..]
                .iter()
                .zip(&input[pos..])
                .take(limit)
                .take_while(|(a, b)| a == b)
                .count();
            if best.map_or(true, |(_, l)| len > l) {
                best = Some((start, len));
            }
        }
        best
    }
}

fn flush_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERALS) {
        out.push(0x80 | chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}
