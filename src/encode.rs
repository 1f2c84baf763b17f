//! Percent-escaping of query parameter values.
//!
//! Every code point is written as UTF-8 style `%XX` escapes, ASCII included.
//! The split between three- and four-byte sequences happens at 0x1FFFF by
//! default, which is wider than the 0xFFFF that UTF-8 uses: code points in
//! U+10000..=U+1FFFF come out as three escapes whose lead byte is not valid
//! UTF-8. The search API has always been queried this way, so the default is
//! kept and [`Utf8Boundary::Standard`] is there for callers that want real
//! UTF-8.

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Where three-byte escapes stop and four-byte escapes start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Utf8Boundary {
    /// Three escapes up to 0x1FFFF.
    #[default]
    Legacy,
    /// Three escapes up to 0xFFFF, same bytes as `str::as_bytes`.
    Standard,
}

impl Utf8Boundary {
    fn three_byte_max(self) -> u32 {
        match self {
            Self::Legacy => 0x1FFFF,
            Self::Standard => 0xFFFF,
        }
    }
}

/// Encode `text` with the [`Utf8Boundary::Legacy`] split.
pub fn percent_encode(text: &str) -> String {
    percent_encode_with(text, Utf8Boundary::Legacy)
}

pub fn percent_encode_with(text: &str, boundary: Utf8Boundary) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for c in text.chars() {
        let cp = u32::from(c);
        if cp <= 0x7F {
            push_escape(&mut out, cp as u8);
        } else if cp <= 0x7FF {
            push_escape(&mut out, (0xC0 | (cp >> 6)) as u8);
            push_escape(&mut out, (0x80 | (cp & 0x3F)) as u8);
        } else if cp <= boundary.three_byte_max() {
            push_escape(&mut out, (0xE0 | (cp >> 12)) as u8);
            push_escape(&mut out, (0x80 | ((cp >> 6) & 0x3F)) as u8);
            push_escape(&mut out, (0x80 | (cp & 0x3F)) as u8);
        } else {
            push_escape(&mut out, (0xF0 | (cp >> 18)) as u8);
            push_escape(&mut out, (0x80 | ((cp >> 12) & 0x3F)) as u8);
            push_escape(&mut out, (0x80 | ((cp >> 6) & 0x3F)) as u8);
            push_escape(&mut out, (0x80 | (cp & 0x3F)) as u8);
        }
    }
    out
}

fn push_escape(out: &mut String, byte: u8) {
    out.push('%');
    out.push(HEX[usize::from(byte >> 4)] as char);
    out.push(HEX[usize::from(byte & 0x0F)] as char);
}
