//! Block sequence framing shared by the tile and overlay packs
//!
//! A pack is a sequence of blocks, each a little-endian
//! `(input_size: u16, output_size: u16)` header followed by `input_size`
//! compressed bytes that expand to exactly `output_size` bytes.

use crate::{format80, lzo, CodecError};

/// Largest uncompressed chunk written per block
pub const MAX_BLOCK_INPUT: usize = 8192;

const HEADER_LEN: usize = 4;

/// Compression used inside each block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    /// Format tag 5: MiniLZO, used by IsoMapPack5
    MiniLzo,
    /// Format tag 80: Westwood LCW, used by the overlay packs
    Format80,
}

impl BlockFormat {
    /// Numeric format tag as used by the game tools
    pub fn tag(self) -> u8 {
        match self {
            BlockFormat::MiniLzo => 5,
            BlockFormat::Format80 => 80,
        }
    }
}

fn read_u16(data: &[u8], at: usize) -> usize {
    u16::from_le_bytes([data[at], data[at + 1]]) as usize
}

/// Decode a whole block sequence into one byte stream
pub fn decode_blocks(data: &[u8], format: BlockFormat) -> Result<Vec<u8>, CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::MissingHeader(data.len()));
    }

    let mut output = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        if pos + HEADER_LEN > data.len() {
            return Err(CodecError::TruncatedHeader(pos));
        }
        let input_size = read_u16(data, pos);
        let output_size = read_u16(data, pos + 2);
        let payload_start = pos + HEADER_LEN;
        let payload_end = payload_start + input_size;

        if payload_end > data.len() {
            return Err(CodecError::BlockOverrun {
                offset: pos,
                size: input_size,
                available: data.len() - payload_start,
            });
        }

        let payload = &data[payload_start..payload_end];
        let block = match format {
            BlockFormat::MiniLzo => lzo::decompress(payload, output_size)?,
            BlockFormat::Format80 => format80::decompress(payload, output_size)?,
        };
        output.extend_from_slice(&block);
        pos = payload_end;
    }

    Ok(output)
}

/// Encode a byte stream as a block sequence of at most [`MAX_BLOCK_INPUT`] bytes per block
pub fn encode_blocks(data: &[u8], format: BlockFormat) -> Result<Vec<u8>, CodecError> {
    let mut output = Vec::with_capacity(data.len() / 2 + HEADER_LEN);

    // An empty stream still gets one empty block so the pack has a header
    let chunks: Vec<&[u8]> = if data.is_empty() {
        vec![data]
    } else {
        data.chunks(MAX_BLOCK_INPUT).collect()
    };

    for chunk in chunks {
        let packed = match format {
            BlockFormat::MiniLzo => lzo::compress(chunk),
            BlockFormat::Format80 => format80::compress(chunk),
        };
        let packed_len = u16::try_from(packed.len())
            .map_err(|_| CodecError::BlockTooLarge(packed.len()))?;

        output.extend_from_slice(&packed_len.to_le_bytes());
        output.extend_from_slice(&(chunk.len() as u16).to_le_bytes());
        output.extend_from_slice(&packed);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_block_round_trip() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i / 7) as u8).collect();
        for format in [BlockFormat::MiniLzo, BlockFormat::Format80] {
            let encoded = encode_blocks(&data, format).unwrap();
            // 20000 bytes split into 8192 + 8192 + 3616
            let first_output = read_u16(&encoded, 2);
            assert_eq!(first_output, MAX_BLOCK_INPUT);
            assert_eq!(decode_blocks(&encoded, format).unwrap(), data);
        }
    }

    #[test]
    fn test_buffer_shorter_than_header() {
        assert!(matches!(
            decode_blocks(&[1, 0, 1], BlockFormat::MiniLzo),
            Err(CodecError::MissingHeader(3))
        ));
        assert!(matches!(
            decode_blocks(&[], BlockFormat::Format80),
            Err(CodecError::MissingHeader(0))
        ));
    }

    #[test]
    fn test_block_overrun() {
        // Header claims 10 input bytes, only 3 follow
        let data = [10, 0, 4, 0, 1, 2, 3];
        assert!(matches!(
            decode_blocks(&data, BlockFormat::MiniLzo),
            Err(CodecError::BlockOverrun { offset: 0, size: 10, available: 3 })
        ));
    }

    #[test]
    fn test_truncated_second_header() {
        let mut data = encode_blocks(&[1, 2, 3, 4, 5], BlockFormat::MiniLzo).unwrap();
        data.extend_from_slice(&[3, 0]);
        assert!(matches!(
            decode_blocks(&data, BlockFormat::MiniLzo),
            Err(CodecError::TruncatedHeader(_))
        ));
    }

    #[test]
    fn test_empty_stream_has_one_block() {
        for format in [BlockFormat::MiniLzo, BlockFormat::Format80] {
            let encoded = encode_blocks(&[], format).unwrap();
            assert_eq!(read_u16(&encoded, 2), 0);
            assert!(decode_blocks(&encoded, format).unwrap().is_empty());
        }
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(BlockFormat::MiniLzo.tag(), 5);
        assert_eq!(BlockFormat::Format80.tag(), 80);
    }
}
