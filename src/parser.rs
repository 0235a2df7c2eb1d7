// 🏗️ Line Classifier
// Splits raw AFD text into physical lines and reads NSR + type code from each one

use crate::layout::{LayoutSpec, RecordKind, NSR_LEN, TRAILER_SENTINEL, TYPE_OFFSET};
use std::borrow::Cow;

// ============================================================================
// PHYSICAL LINES
// ============================================================================

/// Characters stripped from both ends of a line before classification
fn is_padding(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

/// Trim a raw line the way AFD producers pad them
pub fn trim_line(raw: &str) -> &str {
    raw.trim_matches(is_padding)
}

/// Drop every carriage return; field offsets are counted without them
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace('\r', ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Physical lines of normalized input, split on '\n'.
/// Empty pieces are kept so they count toward the physical total.
pub fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
}

/// Number of physical lines, empty ones included
pub fn count_physical_lines(text: &str) -> usize {
    text.split('\n').count()
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// ClassifiedLine - NSR token and type code of one trimmed line
///
/// Classification never fails: a short line yields a truncated token and no type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// First 9 bytes (fewer when the line is shorter)
    pub token: &'a str,
    /// Token value when it is made only of ASCII digits
    pub number: Option<u64>,
    /// Record type code; None when missing or not ASCII
    pub type_code: Option<char>,
}

impl<'a> ClassifiedLine<'a> {
    pub fn is_numeric(&self) -> bool {
        self.number.is_some()
    }
}

/// Parse an NSR token. Empty or non-digit tokens stay textual.
pub fn parse_nsr(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn ascii_at(line: &str, offset: usize) -> Option<char> {
    line.as_bytes()
        .get(offset)
        .filter(|b| b.is_ascii())
        .map(|b| *b as char)
}

fn nsr_token(line: &str) -> &str {
    // Back off to a char boundary so multi-byte garbage never splits
    let mut end = NSR_LEN.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Classify a trimmed line under the given layout
pub fn classify<'a>(line: &'a str, spec: &LayoutSpec) -> ClassifiedLine<'a> {
    let token = nsr_token(line);
    let number = parse_nsr(token);

    let mut type_code = ascii_at(line, TYPE_OFFSET);

    // Trailer type marker lives after its counters
    if let Some(trailer) = &spec.trailer {
        if token == TRAILER_SENTINEL {
            if let Some(code) = spec.code_of(RecordKind::Trailer) {
                if ascii_at(line, trailer.code_offset) == Some(code) {
                    type_code = Some(code);
                }
            }
        }
    }

    ClassifiedLine {
        token,
        number,
        type_code,
    }
}

// ============================================================================
// TESTS
// ============================================================================
