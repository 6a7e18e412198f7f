//! Header-only scanner for CUE sources.
//!
//! Reads the package clause and the import declarations at the top of a
//! file and stops at the first other declaration; the body is never
//! tokenized. Leading file attributes (`@if(...)`, `@extern(...)`) and
//! `//` comments are skipped.

/// Package clause and imports of one CUE file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Declared package name, empty when the file has no package clause.
    pub package: String,
    /// Quoted import paths in declaration order, verbatim.
    pub imports: Vec<String>,
}

/// A malformed file header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    /// 1-based line the error was detected on.
    pub line: usize,
    /// What was expected.
    pub message: String,
}

/// Parses the header of a CUE source file.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for a package clause without a name, an
/// import without a quoted path, an unterminated string, attribute, or
/// import group.
pub fn parse_header(src: &str) -> Result<Header, SyntaxError> {
    let mut s = Scanner { src: src.strip_prefix('\u{feff}').unwrap_or(src), pos: 0 };
    let mut header = Header::default();

    s.skip_trivia(true);
    s.skip_attributes(true)?;

    if s.keyword("package") {
        s.skip_spaces();
        let name = s.ident().ok_or_else(|| s.error("expected package name"))?;
        header.package = name.to_string();
        s.skip_trivia(false);
        s.skip_attributes(false)?;
        match s.peek() {
            None | Some('\n' | ',' | ';') => {}
            Some(c) => return Err(s.error(format!("unexpected {c:?} after package clause"))),
        }
    }

    loop {
        s.skip_trivia(true);
        s.skip_attributes(true)?;
        if !s.keyword("import") {
            break;
        }
        s.skip_spaces();
        if s.eat('(') {
            loop {
                s.skip_trivia(true);
                while s.eat(',') {
                    s.skip_trivia(true);
                }
                if s.eat(')') {
                    break;
                }
                if s.peek().is_none() {
                    return Err(s.error("unterminated import group"));
                }
                header.imports.push(s.import_spec()?);
            }
        } else {
            header.imports.push(s.import_spec()?);
        }
    }

    Ok(header)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let line = self.src[..self.pos].matches('\n').count() + 1;
        SyntaxError { line, message: message.into() }
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.pos += 1;
        }
    }

    /// Skips blanks and line comments, and newlines too when `newlines`.
    fn skip_trivia(&mut self, newlines: bool) {
        loop {
            self.skip_spaces();
            if self.src[self.pos..].starts_with("//") {
                match self.src[self.pos..].find('\n') {
                    Some(end) => self.pos += end,
                    None => self.pos = self.src.len(),
                }
            } else if !(newlines && self.eat('\n')) {
                return;
            }
        }
    }

    fn skip_attributes(&mut self, newlines: bool) -> Result<(), SyntaxError> {
        while self.peek() == Some('@') {
            self.attribute()?;
            self.skip_trivia(newlines);
        }
        Ok(())
    }

    /// Consumes `@name(...)`, balancing parentheses and skipping strings.
    fn attribute(&mut self) -> Result<(), SyntaxError> {
        let start = self.error("unterminated attribute");
        self.bump();
        if self.ident().is_none() {
            return Err(self.error("expected attribute name"));
        }
        if !self.eat('(') {
            return Err(self.error("expected '(' after attribute name"));
        }
        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                None => return Err(start),
                Some('"') => {
                    self.string_lit()?;
                }
                Some(c) => {
                    self.bump();
                    match c {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                self.bump();
            }
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
            self.bump();
        }
        Some(&self.src[start..self.pos])
    }

    /// Consumes `kw` if it is the next token and is used as a keyword
    /// rather than as a field label (`package: 1`).
    fn keyword(&mut self, kw: &str) -> bool {
        let start = self.pos;
        if self.ident() == Some(kw) {
            self.skip_spaces();
            if !matches!(self.peek(), Some(':' | '?' | '!')) {
                return true;
            }
        }
        self.pos = start;
        false
    }

    /// `[alias] "path"`
    fn import_spec(&mut self) -> Result<String, SyntaxError> {
        if self.peek() != Some('"') {
            self.ident();
            self.skip_spaces();
        }
        if self.peek() != Some('"') {
            return Err(self.error("expected quoted import path"));
        }
        self.string_lit()
    }

    fn string_lit(&mut self) -> Result<String, SyntaxError> {
        let start = self.error("unterminated string literal");
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(start),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(start),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
    }
}
