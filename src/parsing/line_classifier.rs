
/// What kind of VCF line we are looking at
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass {
    /// Empty line, skipped
    Blank,
    /// `##` meta-information line
    Meta,
    /// The `#CHROM` field-name line
    ChromHeader,
    /// Starts with `#` but is neither of the above
    UnknownHeader,
    /// Anything else is a record
    Data
}

/// Classifies a single line, which must already have its line terminator removed.
/// # Arguments
/// * `line` - the line to classify
pub fn classify_line(line: &str) -> LineClass {
    if line.is_empty() {
        LineClass::Blank
    } else if line.starts_with("##") {
        LineClass::Meta
    } else if line.starts_with("#CHROM") {
        LineClass::ChromHeader
    } else if line.starts_with('#') {
        LineClass::UnknownHeader
    } else {
        LineClass::Data
    }
}

/// Removes a trailing `\n` and then a trailing `\r` from a raw line
pub fn strip_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), LineClass::Blank);
        assert_eq!(classify_line("##fileformat=VCFv4.2"), LineClass::Meta);
        assert_eq!(classify_line("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO"), LineClass::ChromHeader);
        assert_eq!(classify_line("#chrom\tpos"), LineClass::UnknownHeader);
        assert_eq!(classify_line("#"), LineClass::UnknownHeader);
        assert_eq!(classify_line("chr1\t100"), LineClass::Data);
        // whitespace is not blank
        assert_eq!(classify_line(" "), LineClass::Data);
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending(b"abc\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(strip_line_ending(b"abc"), b"abc");
        assert_eq!(strip_line_ending(b"\n"), b"");
        assert_eq!(strip_line_ending(b"abc\r"), b"abc");
    }
}
