//! Percent-unescaping for local source paths.

/// Decodes `%XX` escapes. Malformed escapes are kept literally; invalid UTF-8
/// is replaced lossily.
pub fn unescape(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(b);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_spaces_and_utf8() {
        assert_eq!(unescape("/tmp/my%20gems/foo-1.0.gem"), "/tmp/my gems/foo-1.0.gem");
        assert_eq!(unescape("caf%C3%A9"), "café");
    }

    #[test]
    fn keeps_malformed_escapes() {
        assert_eq!(unescape("100%"), "100%");
        assert_eq!(unescape("a%2"), "a%2");
        assert_eq!(unescape("a%zzb"), "a%zzb");
    }

    #[test]
    fn plain_path_untouched() {
        assert_eq!(unescape("/srv/gems/foo-1.0.gem"), "/srv/gems/foo-1.0.gem");
    }
}
