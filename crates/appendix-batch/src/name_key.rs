//! Filename ordering keys
//!
//! Appendix files are named like `Appendix B 3.jpg`, `appendix_12 (2 of 5).png`
//! or `Appendix AA.pdf`. The parser recovers three optional fields from such a
//! name: the appendix identifier, a bare part number following it, and an
//! explicit `(x of y)` part marker. The explicit marker wins over the bare
//! number.

/// Sort key derived from an appendix filename
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderingKey {
    /// Primary sort key (A=1, Z=26, AA=27, or the numeric identifier)
    pub appendix_order: u64,
    /// Identifier as written in the filename
    pub appendix_label: String,
    /// Page/part number within the appendix
    pub part_index: Option<u64>,
    /// Total parts, from an explicit `(x of y)` marker. Informational only.
    pub part_total: Option<u64>,
}

/// Parse a filename into its ordering key.
///
/// Returns `None` when the name does not follow the appendix convention.
pub fn parse_name(name: &str) -> Option<OrderingKey> {
    let base = strip_extension(name).trim();
    let mut cursor = Cursor::new(base);

    if !cursor.eat_keyword("appendix") {
        return None;
    }
    cursor.skip_while(|c| c.is_whitespace() || c == '_' || c == '-');

    let label = cursor.identifier()?;
    let appendix_order = if label.as_bytes()[0].is_ascii_digit() {
        label.parse::<u64>().ok()?
    } else {
        letters_to_order(label)?
    };

    let bare_number = cursor.bare_number();
    let explicit = cursor.part_marker();

    let (part_index, part_total) = match explicit {
        Some((x, y)) => (x, y),
        None => (bare_number, None),
    };

    Some(OrderingKey {
        appendix_order,
        appendix_label: label.to_string(),
        part_index,
        part_total,
    })
}

/// Convert an alphabetic appendix identifier to its order number.
///
/// Bijective base-26: A=1 … Z=26, AA=27 … AZ=52, BA=53. Case-insensitive.
/// Returns `None` for non-letters or on overflow.
pub fn letters_to_order(letters: &str) -> Option<u64> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u64, |acc, c| {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as u64;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Drop a trailing `.ext` (the extension may not contain `.` or `/`)
pub(crate) fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

/// Hand-rolled scanner over the filename stem
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        match rest.get(..keyword.len()) {
            Some(head) if head.eq_ignore_ascii_case(keyword) => {
                self.pos += keyword.len();
                true
            }
            _ => false,
        }
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        self.skip_while(pred);
        &self.text[start..self.pos]
    }

    /// A run of ASCII letters or a run of ASCII digits
    fn identifier(&mut self) -> Option<&'a str> {
        let token = match self.peek()? {
            c if c.is_ascii_alphabetic() => self.take_while(|c| c.is_ascii_alphabetic()),
            c if c.is_ascii_digit() => self.take_while(|c| c.is_ascii_digit()),
            _ => return None,
        };
        (!token.is_empty()).then_some(token)
    }

    /// First digit run reached before any `(`. Leaves the cursor untouched if
    /// there is none.
    fn bare_number(&mut self) -> Option<u64> {
        let rest = self.rest();
        let start = rest.find(|c: char| c.is_ascii_digit() || c == '(')?;
        if !rest[start..].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let digits_len = rest[start..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len() - start);
        let digits = &rest[start..start + digits_len];
        self.pos += start + digits_len;
        // A number too large to be a part index is still consumed as one
        Some(digits.parse().unwrap_or(u64::MAX))
    }

    /// First `(x of y)` after the cursor
    fn part_marker(&self) -> Option<(Option<u64>, Option<u64>)> {
        let rest = self.rest();
        rest.match_indices('(')
            .find_map(|(idx, _)| parse_part_marker(&rest[idx + 1..]))
            .map(|(x, y)| (Some(x), Some(y)))
    }
}

/// Parse `x of y)` (the text following an opening parenthesis)
fn parse_part_marker(text: &str) -> Option<(u64, u64)> {
    let mut cursor = Cursor::new(text);
    let x = cursor.take_while(|c| c.is_ascii_digit());
    if x.is_empty() {
        return None;
    }
    cursor.skip_while(char::is_whitespace);
    if !cursor.eat_keyword("of") {
        return None;
    }
    cursor.skip_while(char::is_whitespace);
    let y = cursor.take_while(|c| c.is_ascii_digit());
    if y.is_empty() || cursor.peek() != Some(')') {
        return None;
    }
    Some((
        x.parse().unwrap_or(u64::MAX),
        y.parse().unwrap_or(u64::MAX),
    ))
}
