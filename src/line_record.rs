use std::cmp::Ordering;

use crate::key::Key;

/// A line without its terminator together with its sort key.
#[derive(Debug)]
pub(crate) struct LineRecord {
    line: Vec<u8>,
    key: Key,
}

impl LineRecord {
    /// Create a record from a line. A trailing `\n` or `\r\n` is dropped.
    pub(crate) fn new(mut line: Vec<u8>) -> LineRecord {
        trim_line_end(&mut line);
        let key = Key::new(&line);
        LineRecord {
            line,
            key,
        }
    }

    pub(crate) fn line(&self) -> &[u8] {
        &self.line
    }
}

fn trim_line_end(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

impl Eq for LineRecord {}

impl PartialEq<Self> for LineRecord {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
    }
}

impl PartialOrd<Self> for LineRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.compare(&self.line, &other.key, &other.line)
    }
}
