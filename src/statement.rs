//! Placeholder inventory for statement text.
//!
//! A single-pass scanner over the SQL bytes that counts positional
//! placeholders (`?`, `?N`) and collects named placeholders (`:ident`),
//! skipping string literals and comments. The query executor uses the
//! positional count for its bind-arity check before anything reaches the
//! driver; the call executor validates in/out identifiers against the named
//! set.

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, u32)> {
    let mut idx = start;
    let mut value: u32 = 0;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        value = value.saturating_mul(10).saturating_add(u32::from(bytes[idx] - b'0'));
        idx += 1;
    }
    if idx == start { None } else { Some((idx, value)) }
}

fn scan_ident(bytes: &[u8], start: usize) -> Option<(usize, String)> {
    if start >= bytes.len() || !is_ident_start(bytes[start]) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && is_ident_continue(bytes[idx]) {
        idx += 1;
    }
    std::str::from_utf8(&bytes[start..idx])
        .ok()
        .map(|ident| (idx, ident.to_string()))
}

/// Placeholder inventory of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementInfo {
    /// Number of positional bind values the statement expects: the highest
    /// index in play, where a numbered placeholder (`?3`) names its index and
    /// a bare `?` takes the next index after the largest seen so far, as
    /// `SQLite` assigns them.
    pub positional: usize,
    /// Named placeholders in first-occurrence order, without the leading `:`.
    pub named: Vec<String>,
}

impl StatementInfo {
    /// Whether `ident` appears as a named placeholder in the statement.
    #[must_use]
    pub fn declares(&self, ident: &str) -> bool {
        self.named.iter().any(|n| n == ident)
    }
}

/// Scan `sql` for bind placeholders outside literals and comments.
#[must_use]
pub fn scan_placeholders(sql: &str) -> StatementInfo {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut idx = 0;

    let mut highest: u32 = 0;
    let mut named: Vec<String> = Vec::new();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => {
                    if let Some((digits_end, n)) = scan_digits(bytes, idx + 1) {
                        highest = highest.max(n);
                        idx = digits_end - 1;
                    } else {
                        highest = highest.saturating_add(1);
                    }
                }
                b':' => {
                    // `::` is a cast, not a placeholder.
                    if bytes.get(idx + 1) == Some(&b':') {
                        idx += 1;
                    } else if let Some((ident_end, ident)) = scan_ident(bytes, idx + 1) {
                        if !named.iter().any(|n| n == &ident) {
                            named.push(ident);
                        }
                        idx = ident_end - 1;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                // Both delimiters are two bytes; consume them whole so a
                // shared `/` is never counted twice.
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }

        idx += 1;
    }

    StatementInfo {
        positional: highest as usize,
        named,
    }
}
