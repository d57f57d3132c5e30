use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::prelude::*;

use crate::error::Result;

const STRICT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    NO_PAD
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Unpadded URL-safe base64: `+` becomes `-`, `/` becomes `_`, trailing `=` dropped.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(data)
}

/// Reverses [`encode`].
///
/// With `strict` set, any character outside the alphabet or a malformed
/// padding is an error. Otherwise foreign characters are skipped and a
/// dangling final symbol is discarded, the way the gateway's legacy clients
/// decode.
pub fn decode(data: &str, strict: bool) -> Result<Vec<u8>> {
    let standard: String = data
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    if strict {
        return Ok(STRICT.decode(standard)?);
    }

    let mut symbols: String = standard
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }
    Ok(LENIENT.decode(symbols)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_substitutes_and_strips_padding() {
        assert_eq!(encode([0xfbu8, 0xff]), "-_8");
        assert_eq!(encode(b"{\"sno\":\"osn\",\"items\":[]}"), "eyJzbm8iOiJvc24iLCJpdGVtcyI6W119");
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let samples: [&[u8]; 5] = [b"", b"a", b"ab", b"abc", &[0xfb, 0xff, 0x00, 0x10, 0x3e]];
        for sample in samples {
            let encoded = encode(sample);
            assert_eq!(decode(&encoded, true).unwrap(), sample);
            assert_eq!(decode(&encoded, false).unwrap(), sample);
        }
    }

    #[test]
    fn test_decode_accepts_padded_input() {
        assert_eq!(decode("YQ==", true).unwrap(), b"a");
        assert_eq!(decode("YQ", true).unwrap(), b"a");
    }

    #[test]
    fn test_strict_rejects_foreign_characters() {
        assert!(decode("YW*Jj", true).is_err());
        assert_eq!(decode("YW*Jj", false).unwrap(), b"abc");
    }

    #[test]
    fn test_lenient_drops_dangling_symbol() {
        assert!(decode("YWJjZ", true).is_err());
        assert_eq!(decode("YWJjZ", false).unwrap(), b"abc");
    }
}
