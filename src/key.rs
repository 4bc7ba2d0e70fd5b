use std::cmp::Ordering;

const PERIOD: u8 = b'.';
const SEPARATOR_LEN: usize = 2;

/// Sort key of a `<number>. <text>` record.
///
/// The key does not own the line, it only remembers where the text starts and the parsed number,
/// so it must be compared together with the line it was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Key {
    number: u64,
    text_start: usize,
}

impl Key {
    /// Decompose `line` at the first period past index 0. A line without such a period has
    /// number 0 and an empty text.
    pub(crate) fn new(line: &[u8]) -> Key {
        match line.iter().position(|b| *b == PERIOD) {
            Some(index) if index > 0 => {
                Key {
                    number: parse_number(&line[..index]),
                    text_start: (index + SEPARATOR_LEN).min(line.len()),
                }
            }
            _ => {
                Key {
                    number: 0,
                    text_start: line.len(),
                }
            }
        }
    }

    pub(crate) fn text<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        &line[self.text_start..]
    }

    /// Text first, number second, raw bytes last so that only identical lines compare equal.
    pub(crate) fn compare(&self, line: &[u8], other: &Key, other_line: &[u8]) -> Ordering {
        self.text(line).cmp(other.text(other_line))
            .then(self.number.cmp(&other.number))
            .then_with(|| line.cmp(other_line))
    }
}

// digit by digit, wrapping on overflow and on non digit bytes
fn parse_number(digits: &[u8]) -> u64 {
    digits.iter().fold(0u64, |result, b| {
        result.wrapping_mul(10).wrapping_add(b.wrapping_sub(b'0') as u64)
    })
}
