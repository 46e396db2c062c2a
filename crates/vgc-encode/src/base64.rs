//! Base64 encoding
//!
//! Hand-rolled standard-alphabet encoder. The data-URL caller passes
//! its `data:<mime>;base64,` prefix here so prefix and payload share
//! one output allocation.

const ENCODING_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Padding characters required for each value of `input_length % 3`.
const PAD_TABLE: [usize; 3] = [0, 2, 1];

/// Encode `data`, prepending `prefix` verbatim.
pub fn encode_with_prefix(prefix: &str, data: &[u8]) -> String {
    let encoded_len = 4 * data.len().div_ceil(3);
    let mut out = String::with_capacity(prefix.len() + encoded_len);
    out.push_str(prefix);

    for group in data.chunks(3) {
        let octet_a = group[0] as u32;
        let octet_b = *group.get(1).unwrap_or(&0) as u32;
        let octet_c = *group.get(2).unwrap_or(&0) as u32;

        let triple = (octet_a << 16) | (octet_b << 8) | octet_c;

        for shift in [18, 12, 6, 0] {
            out.push(ENCODING_TABLE[(triple >> shift) as usize & 0x3f] as char);
        }
    }

    let padding = PAD_TABLE[data.len() % 3];
    out.truncate(out.len() - padding);
    for _ in 0..padding {
        out.push('=');
    }

    out
}

/// Encode `data` with no prefix.
pub fn encode(data: &[u8]) -> String {
    encode_with_prefix("", data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_law() {
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
    }

    #[test]
    fn test_longer_input() {
        assert_eq!(encode(b"foob"), "Zm9vYg==");
        assert_eq!(encode(b"fooba"), "Zm9vYmE=");
        assert_eq!(encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn test_prefix_is_prepended_verbatim() {
        assert_eq!(
            encode_with_prefix("data:image/png;base64,", b"f"),
            "data:image/png;base64,Zg=="
        );
    }

    #[test]
    fn test_binary_input() {
        assert_eq!(encode(&[0x00, 0xff, 0x10]), "AP8Q");
    }
}
