//! Name/value splitting for option lines.

/// Bytes that separate an option name from its value. Line
/// terminators count, so a separator run may span physical lines.
pub(crate) const fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'=')
}

/// Split a raw option line into its name and value.
///
/// The split point is the first maximal run of separator bytes. A
/// double quote is stripped from each end of the value independently,
/// so one-sided quoting is tolerated. The only escape processed is
/// `\#`, which becomes a literal `#`. If the text has no separator
/// at all, the whole text is the name and the value is empty.
pub(crate) fn split_option_value(raw: &str) -> (String, String) {
    let bytes = raw.as_bytes();
    let name_end = bytes
        .iter()
        .position(|&b| is_separator(b))
        .unwrap_or(bytes.len());
    let mut value_start = name_end;
    while value_start < bytes.len() && is_separator(bytes[value_start]) {
        value_start += 1;
    }

    let mut value = &raw[value_start..];
    if let Some(rest) = value.strip_prefix('"') {
        value = rest;
    }
    if let Some(rest) = value.strip_suffix('"') {
        value = rest;
    }

    (raw[..name_end].to_string(), value.replace("\\#", "#"))
}
