//! Base64 payloads spread over numbered INI keys

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use tracing::warn;

use crate::CodecError;

/// Characters per line when writing Base64 into a section
pub const BASE64_LINE_WIDTH: usize = 70;

/// Concatenate the numbered values of a pack section and Base64-decode them.
///
/// Keys are ordered numerically (`1`, `2`, ... `10`); keys that are not
/// numbers are ignored with a warning.
pub fn decode_section_data<'a, I>(entries: I) -> Result<Vec<u8>, CodecError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut lines: Vec<(u32, &str)> = Vec::new();
    for (key, value) in entries {
        match key.trim().parse::<u32>() {
            Ok(n) => lines.push((n, value.trim())),
            Err(_) => warn!("Ignoring non-numeric pack key '{}'", key),
        }
    }
    lines.sort_by_key(|(n, _)| *n);

    let text: String = lines.into_iter().map(|(_, v)| v).collect();
    Ok(BASE64_STANDARD.decode(text.as_bytes())?)
}

/// Base64-encode data and wrap it into numbered lines starting at key `1`
pub fn encode_section_data(data: &[u8]) -> Vec<(String, String)> {
    let text = BASE64_STANDARD.encode(data);
    text.as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .enumerate()
        .map(|(i, line)| {
            // Base64 output is ASCII, so chunk boundaries are char boundaries
            let line = String::from_utf8_lossy(line).into_owned();
            ((i + 1).to_string(), line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_wrapped_and_numbered() {
        let data: Vec<u8> = (0..200u32).map(|i| i as u8).collect();
        let lines = encode_section_data(&data);

        assert_eq!(lines[0].0, "1");
        assert!(lines.iter().all(|(_, v)| v.len() <= BASE64_LINE_WIDTH));
        assert!(lines[..lines.len() - 1]
            .iter()
            .all(|(_, v)| v.len() == BASE64_LINE_WIDTH));

        let decoded =
            decode_section_data(lines.iter().map(|(k, v)| (k.as_str(), v.as_str()))).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_keys_sorted_numerically() {
        let data: Vec<u8> = (0..600u32).map(|i| (i * 13) as u8).collect();
        let mut lines = encode_section_data(&data);
        assert!(lines.len() > 10);
        lines.reverse();

        let decoded =
            decode_section_data(lines.iter().map(|(k, v)| (k.as_str(), v.as_str()))).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_malformed_base64() {
        let result = decode_section_data([("1", "not*base64!")]);
        assert!(matches!(result, Err(CodecError::Base64(_))));
    }
}
