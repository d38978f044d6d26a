//! Text segmentation into synthesis chunks.
//!
//! Long text is cut into chunks that are synthesized one at a time, so the
//! first chunk starts playing while later ones are still being synthesized.
//! A chunk is closed only once it holds at least `min_chars` characters and
//! the scan reaches a newline or a space right after `.`, `!` or `?`; the
//! boundary character stays in the chunk that it closes.

/// Default minimum number of characters in a non-final chunk.
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 100;

/// Removes leading and trailing spaces, tabs, carriage returns and newlines.
pub fn trim_white(text: &str) -> &str {
    text.trim_matches(is_white)
}

fn is_white(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Splits text into synthesis chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    /// Minimum number of characters (Unicode scalar values) a chunk must hold
    /// before a boundary may close it. Defaults to 100.
    pub min_chars: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHUNK_CHARS,
        }
    }
}

impl Segmenter {
    /// Creates a segmenter with the given minimum chunk length.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// Trims `text` and returns an iterator over its chunks.
    ///
    /// The chunks, concatenated, reproduce the trimmed text. Empty or
    /// all-whitespace input yields exactly one empty chunk.
    pub fn segment<'a>(&self, text: &'a str) -> Segments<'a> {
        Segments {
            text: trim_white(text),
            pos: 0,
            min_chars: self.min_chars,
            after_terminator: false,
            done: false,
        }
    }
}

/// Segments `text` with the default minimum chunk length.
pub fn segment(text: &str) -> Segments<'_> {
    Segmenter::default().segment(text)
}

/// Iterator over the chunks of a trimmed text.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    min_chars: usize,
    after_terminator: bool,
    done: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }

        let rest = &self.text[self.pos..];
        let mut count = 0;
        for (i, ch) in rest.char_indices() {
            count += 1;
            let boundary = count >= self.min_chars
                && ((ch == ' ' && self.after_terminator) || ch == '\n');
            self.after_terminator = is_terminator(ch);

            if boundary {
                let end = i + ch.len_utf8();
                self.pos += end;
                if self.pos >= self.text.len() {
                    self.done = true;
                }
                return Some(&rest[..end]);
            }
        }

        self.done = true;
        Some(rest)
    }
}

impl std::iter::FusedIterator for Segments<'_> {}
