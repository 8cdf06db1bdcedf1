//! Argument extraction from ICU message format strings.
//!
//! Only the structure needed to compare translations is understood:
//! simple arguments (`{name}`), formatted arguments (`{n, number}`), and the
//! `plural`, `selectordinal` and `select` forms whose branches are scanned
//! recursively. Apostrophe quoting follows ICU: `'{'` is a literal brace and
//! `''` is a literal apostrophe.

use std::collections::BTreeSet;

/// Names of every argument referenced by `message`, including arguments
/// nested inside plural and select branches.
pub fn placeholders(message: &str) -> BTreeSet<String> {
    let mut scanner = Scanner {
        chars: message.chars().collect(),
        pos: 0,
        names: BTreeSet::new(),
    };
    scanner.message(false);
    scanner.names
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    names: BTreeSet<String>,
}

impl Scanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Scans message text. A nested message stops before its closing brace.
    fn message(&mut self, nested: bool) {
        while let Some(c) = self.peek() {
            match c {
                '}' if nested => return,
                '\'' => self.quoted(),
                '{' => {
                    self.pos += 1;
                    self.argument();
                }
                _ => self.pos += 1,
            }
        }
    }

    fn quoted(&mut self) {
        self.pos += 1;
        match self.peek() {
            Some('\'') => self.pos += 1,
            Some('{' | '}' | '#' | '|') => {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\'' {
                        if self.peek() == Some('\'') {
                            self.pos += 1;
                        } else {
                            return;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Scans an argument after its opening brace, consuming the closing one.
    fn argument(&mut self) {
        let name = self.read_until_separator();
        if !name.is_empty() {
            self.names.insert(name);
        }
        if !self.eat_separator() {
            return;
        }

        let kind = self.read_until_separator().to_ascii_lowercase();
        if !self.eat_separator() {
            return;
        }

        if matches!(kind.as_str(), "plural" | "select" | "selectordinal") {
            self.branches();
        } else {
            self.skip_balanced();
        }
    }

    /// Reads a trimmed token up to `,` or `}` without consuming it.
    fn read_until_separator(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == '}' || c == '{' {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().trim().to_string()
    }

    /// Consumes a separator. Returns `true` if scanning of the argument
    /// should continue, `false` if it was closed or the input ended.
    fn eat_separator(&mut self) -> bool {
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                true
            }
            Some('}') => {
                self.pos += 1;
                false
            }
            Some('{') => {
                self.skip_balanced();
                false
            }
            _ => false,
        }
    }

    fn branches(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '}' => {
                    self.pos += 1;
                    return;
                }
                '{' => {
                    self.pos += 1;
                    self.message(true);
                    if self.peek() == Some('}') {
                        self.pos += 1;
                    }
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skips to the brace closing the current argument, consuming it.
    fn skip_balanced(&mut self) {
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}
