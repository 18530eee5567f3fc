//! MiniLZO-compatible LZO1X block compression
//!
//! The decoder accepts any LZO1X stream produced by `lzo1x_1_compress`. The
//! encoder is a greedy single-hash LZO1X-1 style compressor; its output is
//! readable by MiniLZO.

use crate::{BlockFormat, CodecError};

const M2_MAX_LEN: usize = 8;
const M2_MAX_OFFSET: usize = 0x0800;
const M3_MAX_OFFSET: usize = 0x4000;
const M4_MAX_OFFSET: usize = 0xbfff;
const M3_MARKER: u8 = 32;
const M4_MARKER: u8 = 16;
const MIN_MATCH: usize = 3;

const HASH_BITS: u32 = 14;

fn corrupt(reason: &'static str) -> CodecError {
    CodecError::CorruptBlock {
        format: BlockFormat::MiniLzo,
        reason,
    }
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn byte(&mut self) -> Result<u8, CodecError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or_else(|| corrupt("input overrun"))?;
        self.pos += 1;
        Ok(b)
    }

    /// Byte at `pos - back`, used to read the state bits of the last instruction
    fn prev(&self, back: usize) -> u8 {
        self.input[self.pos - back]
    }

    /// Read a zero-run extended length: each zero adds 255, the final byte is added with `base`
    fn extended_len(&mut self, base: usize) -> Result<usize, CodecError> {
        let mut len = 0usize;
        loop {
            let b = self.byte()?;
            if b != 0 {
                return Ok(len + base + b as usize);
            }
            len += 255;
        }
    }

    fn le16(&mut self) -> Result<usize, CodecError> {
        let lo = self.byte()? as usize;
        let hi = self.byte()? as usize;
        Ok(lo | (hi << 8))
    }
}

struct Writer {
    out: Vec<u8>,
    limit: usize,
}

impl Writer {
    fn literals(&mut self, reader: &mut Reader<'_>, count: usize) -> Result<(), CodecError> {
        let end = reader.pos + count;
        let bytes = reader
            .input
            .get(reader.pos..end)
            .ok_or_else(|| corrupt("input overrun"))?;
        if self.out.len() + count > self.limit {
            return Err(corrupt("output overrun"));
        }
        self.out.extend_from_slice(bytes);
        reader.pos = end;
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, count: usize) -> Result<(), CodecError> {
        if distance == 0 || distance > self.out.len() {
            return Err(corrupt("lookbehind overrun"));
        }
        if self.out.len() + count > self.limit {
            return Err(corrupt("output overrun"));
        }
        let start = self.out.len() - distance;
        // Overlapping copies repeat the pattern, so go byte by byte
        for i in 0..count {
            let b = self.out[start + i];
            self.out.push(b);
        }
        Ok(())
    }
}

enum State {
    /// Read an instruction at the top of the main loop
    Top,
    /// Right after a literal run of four or more bytes
    FirstLiteralRun,
    /// Decode the match instruction `t`
    Match(u8),
    /// Copy `n` trailing literals, then read a match instruction
    MatchNext(usize),
}

/// Decompress one LZO1X block, which must produce exactly `output_size` bytes
pub fn decompress(input: &[u8], output_size: usize) -> Result<Vec<u8>, CodecError> {
    let mut r = Reader { input, pos: 0 };
    let mut w = Writer {
        out: Vec::with_capacity(output_size),
        limit: output_size,
    };

    let mut state = State::Top;
    if input.first().copied().unwrap_or(0) > 17 {
        let t = (r.byte()? - 17) as usize;
        if t < 4 {
            state = State::MatchNext(t);
        } else {
            w.literals(&mut r, t)?;
            state = State::FirstLiteralRun;
        }
    }

    loop {
        state = match state {
            State::Top => {
                let t = r.byte()?;
                if t >= 16 {
                    State::Match(t)
                } else {
                    let count = if t == 0 {
                        r.extended_len(15)?
                    } else {
                        t as usize
                    };
                    w.literals(&mut r, count + 3)?;
                    State::FirstLiteralRun
                }
            }
            State::FirstLiteralRun => {
                let t = r.byte()?;
                if t >= 16 {
                    State::Match(t)
                } else {
                    let distance = 1 + M2_MAX_OFFSET + (t as usize >> 2) + ((r.byte()? as usize) << 2);
                    w.copy_match(distance, 3)?;
                    after_match(&r)
                }
            }
            State::Match(t) => {
                if t >= 64 {
                    let distance = 1 + ((t as usize >> 2) & 7) + ((r.byte()? as usize) << 3);
                    let count = (t as usize >> 5) + 1;
                    w.copy_match(distance, count)?;
                } else if t >= 32 {
                    let mut count = (t & 31) as usize;
                    if count == 0 {
                        count = r.extended_len(31)?;
                    }
                    let distance = 1 + (r.le16()? >> 2);
                    w.copy_match(distance, count + 2)?;
                } else if t >= 16 {
                    let high = ((t & 8) as usize) << 11;
                    let mut count = (t & 7) as usize;
                    if count == 0 {
                        count = r.extended_len(7)?;
                    }
                    let distance = high + (r.le16()? >> 2);
                    if distance == 0 {
                        // End of stream marker
                        break;
                    }
                    w.copy_match(distance + 0x4000, count + 2)?;
                } else {
                    let distance = 1 + (t as usize >> 2) + ((r.byte()? as usize) << 2);
                    w.copy_match(distance, 2)?;
                }
                after_match(&r)
            }
            State::MatchNext(count) => {
                w.literals(&mut r, count)?;
                State::Match(r.byte()?)
            }
        };
    }

    if r.pos != input.len() {
        return Err(corrupt("input not fully consumed"));
    }
    if w.out.len() != output_size {
        return Err(CodecError::SizeMismatch {
            expected: output_size,
            actual: w.out.len(),
        });
    }
    Ok(w.out)
}

/// The low two bits of the instruction's last distance byte carry the
/// number of literals that follow a match.
fn after_match(r: &Reader<'_>) -> State {
    match (r.prev(2) & 3) as usize {
        0 => State::Top,
        n => State::MatchNext(n),
    }
}

/// Compress a block with LZO1X
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 16 + 64 + 3);
    let mut table = vec![usize::MAX; 1 << HASH_BITS];

    let mut literal_start = 0usize;
    let mut pos = 0usize;

    while pos + MIN_MATCH <= input.len() {
        let key = hash(&input[pos..pos + MIN_MATCH]);
        let candidate = table[key];
        table[key] = pos;

        if candidate != usize::MAX && pos - candidate <= M4_MAX_OFFSET {
            let len = match_len(input, candidate, pos);
            if len >= MIN_MATCH {
                emit_literals(&mut out, &input[literal_start..pos]);
                emit_match(&mut out, pos - candidate, len);

                // Index the skipped positions so later matches can reach them
                let end = pos + len;
                let mut p = pos + 1;
                while p < end && p + MIN_MATCH <= input.len() {
                    table[hash(&input[p..p + MIN_MATCH])] = p;
                    p += 1;
                }
                pos = end;
                literal_start = pos;
                continue;
            }
        }
        pos += 1;
    }

    emit_literals(&mut out, &input[literal_start..]);
    out.extend_from_slice(&[M4_MARKER | 1, 0, 0]);
    out
}

fn hash(bytes: &[u8]) -> usize {
    let v = (bytes[0] as u32) | ((bytes[1] as u32) << 8) | ((bytes[2] as u32) << 16);
    (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

fn match_len(input: &[u8], candidate: usize, pos: usize) -> usize {
    input[pos..]
        .iter()
        .zip(&input[candidate..])
        .take_while(|(a, b)| a == b)
        .count()
}

fn emit_literals(out: &mut Vec<u8>, literals: &[u8]) {
    let t = literals.len();
    if t == 0 {
        return;
    }

    if out.is_empty() && t <= 238 {
        out.push(17 + t as u8);
    } else if t <= 3 {
        // Carried in the state bits of the previous match instruction
        let state = out.len() - 2;
        out[state] |= t as u8;
    } else if t <= 18 {
        out.push((t - 3) as u8);
    } else {
        let mut rest = t - 18;
        out.push(0);
        while rest > 255 {
            rest -= 255;
            out.push(0);
        }
        out.push(rest as u8);
    }
    out.extend_from_slice(literals);
}

fn emit_extended(out: &mut Vec<u8>, marker: u8, mut len: usize) {
    out.push(marker);
    while len > 255 {
        len -= 255;
        out.push(0);
    }
    out.push(len as u8);
}

fn emit_match(out: &mut Vec<u8>, distance: usize, len: usize) {
    if len <= M2_MAX_LEN && distance <= M2_MAX_OFFSET {
        let off = distance - 1;
        out.push((((len - 1) << 5) | ((off & 7) << 2)) as u8);
        out.push((off >> 3) as u8);
    } else if distance <= M3_MAX_OFFSET {
        let off = distance - 1;
        if len <= 33 {
            out.push(M3_MARKER | (len - 2) as u8);
        } else {
            emit_extended(out, M3_MARKER, len - 33);
        }
        out.push(((off << 2) & 0xff) as u8);
        out.push((off >> 6) as u8);
    } else {
        let off = distance - 0x4000;
        let high = ((off & 0x4000) >> 11) as u8;
        if len <= 9 {
            out.push(M4_MARKER | high | (len - 2) as u8);
        } else {
            emit_extended(out, M4_MARKER | high, len - 9);
        }
        out.push(((off << 2) & 0xff) as u8);
        out.push(((off >> 6) & 0xff) as u8);
    }
}
