use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

/// Bytes that separate tokens.
pub const DELIMITERS: &[u8] = b" \t\r\n";

/// A token consisting of exactly this text starts a trailing comment.
pub const COMMENT_MARKER: &[u8] = b"#";

/// Tokenizes one batch line into an argument vector.
///
/// Works on raw bytes, so tokens reach the program exactly as written even when they are
/// not UTF-8. Runs of delimiters separate tokens, so no token is ever empty. Collection
/// stops at the first bare `#` token; it and everything after it are dropped. A blank or
/// all-comment line yields an empty vector.
pub fn tokenize(line: impl AsRef<[u8]>) -> Vec<OsString> {
    line.as_ref()
        .split(|b| DELIMITERS.contains(b))
        .filter(|token| !token.is_empty())
        .take_while(|&token| token != COMMENT_MARKER)
        .map(|token| OsStr::from_bytes(token).to_os_string())
        .collect()
}
