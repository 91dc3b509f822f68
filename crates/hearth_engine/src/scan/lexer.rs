//! Token-level syntax checking for JavaScript-like source text.
//!
//! Recognizes identifiers, numbers, quoted strings, template literals with
//! `${...}` substitutions, regular expression literals, line and block
//! comments, and punctuators. Bracket nesting is tracked across all of them.
//! This is not a parser: a token stream that is balanced and well-formed is
//! accepted even if a full grammar would reject it.

/// An early error found while scanning, at a byte offset into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub message: String,
    pub offset: usize,
}

/// Words after which a `/` starts a regular expression rather than a division.
const REGEX_PRECEDING_WORDS: &[&[u8]] = &[
    b"return",
    b"typeof",
    b"instanceof",
    b"in",
    b"of",
    b"new",
    b"delete",
    b"void",
    b"throw",
    b"case",
    b"do",
    b"else",
    b"yield",
    b"await",
];

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Open {
    Paren,
    Bracket,
    Brace,
    TemplateExpr,
}

impl Open {
    fn as_str(self) -> &'static str {
        match self {
            Open::Paren => "(",
            Open::Bracket => "[",
            Open::Brace => "{",
            Open::TemplateExpr => "${",
        }
    }
}

/// Scans `source` and returns the number of tokens, or the first early error.
pub(crate) fn scan(source: &str) -> Result<u32, LexError> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        stack: Vec::new(),
        tokens: 0,
        regex_allowed: true,
    };
    lexer.scan_all()
}

/// Returns `true` if `name` can be used as a function parameter name.
pub(crate) fn is_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if first == b'#' || !is_ident_start(first) {
        return false;
    }
    if !bytes[1..].iter().all(|&b| is_ident_continue(b)) {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b == b'#' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    stack: Vec<(Open, usize)>,
    tokens: u32,
    regex_allowed: bool,
}

impl Lexer<'_> {
    fn scan_all(&mut self) -> Result<u32, LexError> {
        self.skip_hashbang();
        loop {
            self.skip_whitespace_and_comments()?;
            if self.pos >= self.source.len() {
                break;
            }
            self.next_token()?;
            self.tokens += 1;
        }
        if let Some(&(open, offset)) = self.stack.last() {
            return Err(self.error_at(format!("unclosed '{}'", open.as_str()), offset));
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn error_at(&self, message: impl Into<String>, offset: usize) -> LexError {
        LexError {
            message: message.into(),
            offset,
        }
    }

    fn skip_hashbang(&mut self) {
        if self.peek() == b'#' && self.peek_at(1) == b'!' {
            while !self.at_end() && self.peek() != b'\n' {
                self.pos += 1;
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while !self.at_end() && self.peek().is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.at_end() {
                return Ok(());
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                self.pos += 2;
                while !self.at_end() && self.peek() != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.at_end() {
                        return Err(self.error_at("unterminated block comment", start));
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        match self.peek() {
            quote @ (b'"' | b'\'') => {
                self.scan_string(quote, start)?;
                self.regex_allowed = false;
            }
            b'`' => {
                self.pos += 1;
                self.scan_template(start)?;
                self.regex_allowed = false;
            }
            b'0'..=b'9' => {
                self.scan_number();
                self.regex_allowed = false;
            }
            b'.' if self.peek_at(1).is_ascii_digit() => {
                self.scan_number();
                self.regex_allowed = false;
            }
            b'\\' if self.peek_at(1) == b'u' => {
                self.scan_identifier();
                self.regex_allowed = false;
            }
            b if is_ident_start(b) => {
                self.scan_identifier();
                let word = &self.source[start..self.pos];
                self.regex_allowed = REGEX_PRECEDING_WORDS.iter().any(|w| *w == word);
            }
            b'(' => self.open(Open::Paren),
            b'[' => self.open(Open::Bracket),
            b'{' => self.open(Open::Brace),
            closer @ (b')' | b']' | b'}') => self.close(closer, start)?,
            b'/' if self.regex_allowed => {
                self.scan_regex(start)?;
                self.regex_allowed = false;
            }
            op @ (b'+' | b'-') if self.peek_at(1) == op => {
                // Update operators leave the slash context as it was: after an
                // operand they are postfix, otherwise an operand follows.
                self.pos += 2;
            }
            b if b.is_ascii_punctuation() && b != b'\\' => {
                self.pos += 1;
                self.regex_allowed = true;
            }
            b => {
                return Err(self.error_at(
                    format!("unexpected character '{}'", (b as char).escape_default()),
                    start,
                ));
            }
        }
        Ok(())
    }

    fn open(&mut self, open: Open) {
        self.stack.push((open, self.pos));
        self.pos += 1;
        self.regex_allowed = true;
    }

    fn close(&mut self, closer: u8, start: usize) -> Result<(), LexError> {
        let expected = match closer {
            b')' => Open::Paren,
            b']' => Open::Bracket,
            _ => Open::Brace,
        };
        match self.stack.pop() {
            Some((Open::TemplateExpr, open_at)) if closer == b'}' => {
                self.pos += 1;
                self.scan_template(open_at)?;
                self.regex_allowed = false;
                Ok(())
            }
            Some((open, _)) if open == expected => {
                self.pos += 1;
                // After `)` or `]` a slash divides; after `}` it usually starts a statement.
                self.regex_allowed = closer == b'}';
                Ok(())
            }
            _ => Err(self.error_at(format!("unexpected '{}'", closer as char), start)),
        }
    }

    fn scan_string(&mut self, quote: u8, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            if self.at_end() || self.peek() == b'\n' {
                return Err(self.error_at("unterminated string literal", start));
            }
            match self.peek() {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Scans template characters up to the closing backtick or the next `${`.
    fn scan_template(&mut self, start: usize) -> Result<(), LexError> {
        loop {
            if self.at_end() {
                return Err(self.error_at("unterminated template literal", start));
            }
            match self.peek() {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'$' if self.peek_at(1) == b'{' => {
                    self.stack.push((Open::TemplateExpr, self.pos));
                    self.pos += 2;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
    }

    fn scan_regex(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        let mut in_class = false;
        loop {
            if self.at_end() || self.peek() == b'\n' {
                return Err(self.error_at("unterminated regular expression literal", start));
            }
            match self.peek() {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        while !self.at_end() && is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        Ok(())
    }

    fn scan_number(&mut self) {
        while !self.at_end() {
            let b = self.peek();
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_identifier(&mut self) {
        while !self.at_end() {
            let b = self.peek();
            if b == b'\\' {
                self.pos += 2;
            } else if is_ident_continue(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}
