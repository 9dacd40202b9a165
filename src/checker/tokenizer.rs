use std::fmt;
use std::io::{self, BufRead};
use std::ops::Deref;

/// Characters that separate tokens in both dictionaries and documents.
pub const DELIMITERS: &[char] = &[
    ' ', ',', '.', '!', '?', ';', '*', '&', '$', '#', '@', ':', '"', '(', ')', '\n', '\r', '\t',
    '-', '/', '_', '[', ']', '%',
];

/// A token that survived normalization: non-empty, lower-case, starting and
/// ending with an ASCII letter and free of digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedWord(String);

impl NormalizedWord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedWord {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedWord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Split a line into raw tokens on [`DELIMITERS`], skipping empty pieces.
pub fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_delimiter).filter(|t| !t.is_empty())
}

/// Normalize a raw token into a dictionary word.
///
/// Leading and trailing non-letters are stripped. Tokens that end up empty
/// or still contain a digit are rejected.
pub fn normalize(raw: &str) -> Option<NormalizedWord> {
    let trimmed = raw.trim_matches(|c: char| !c.is_ascii_alphabetic());
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(NormalizedWord(trimmed.to_ascii_lowercase()))
}

/// Stream every normalized word of `reader` into `f`, line by line.
///
/// Bytes that are not valid UTF-8 are replaced rather than aborting the scan.
pub fn for_each_word<R, F>(reader: R, mut f: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(NormalizedWord),
{
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        for token in tokens(&line) {
            if let Some(word) = normalize(token) {
                f(word);
            }
        }
    }
    Ok(())
}
