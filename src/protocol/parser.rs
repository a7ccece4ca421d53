//! Statement parser
//!
//! Turns one line of text into a [`Command`].
//!
//! ## Grammar
//! ```text
//! CREATE TABLE t ( col TYPE [PRIMARY [KEY]] , ... )
//! INSERT INTO t VALUES ( value , ... )
//! SELECT <anything> FROM t WHERE predicate
//! DELETE FROM t WHERE predicate
//! SHOW TABLES
//! SHOW [TABLE] t
//!
//! predicate := col = value | col BETWEEN value AND value
//! value     := "quoted" | 'quoted' | bare words
//! ```
//! Keywords are case-insensitive and trailing semicolons are ignored.

use crate::error::{PicoError, Result};

use super::{ColumnSpec, Command, Predicate};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    LParen,
    RParen,
    Comma,
    Eq,
    Semicolon,
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

/// Parse a single statement
pub fn parse_command(input: &str) -> Result<Command> {
    let tokens = tokenize(input)?;
    if tokens.iter().all(|t| *t == Token::Semicolon) {
        return Err(PicoError::Parse("empty statement".to_string()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let command = parser.statement()?;
    parser.finish()?;
    Ok(command)
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | ',' | '=' | ';' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    '=' => Token::Eq,
                    _ => Token::Semicolon,
                });
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    text.push(ch);
                }
                if !closed {
                    return Err(PicoError::Parse(format!("unterminated string: {}{}", c, text)));
                }
                tokens.push(Token::Quoted(text));
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || "(),=;\"'".contains(ch) {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn statement(&mut self) -> Result<Command> {
        if self.accept_keyword("CREATE") {
            self.create()
        } else if self.accept_keyword("INSERT") {
            self.insert()
        } else if self.accept_keyword("SELECT") {
            self.select()
        } else if self.accept_keyword("DELETE") {
            self.delete()
        } else if self.accept_keyword("SHOW") {
            self.show()
        } else {
            Err(self.error("unknown command"))
        }
    }

    fn create(&mut self) -> Result<Command> {
        self.expect_keyword("TABLE")?;
        let table = self.identifier()?;
        self.expect(Token::LParen, "(")?;

        let mut columns = Vec::new();
        loop {
            let name = self.identifier()?;
            let type_name = self.identifier()?;
            let mut spec = ColumnSpec::new(name, type_name);
            if self.accept_keyword("PRIMARY") {
                self.accept_keyword("KEY");
                spec = spec.primary();
            }
            columns.push(spec);

            if self.accept(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, ")")?;
            break;
        }

        Ok(Command::CreateTable { table, columns })
    }

    fn insert(&mut self) -> Result<Command> {
        self.expect_keyword("INTO")?;
        let table = self.identifier()?;
        self.expect_keyword("VALUES")?;
        self.expect(Token::LParen, "(")?;

        let mut values = Vec::new();
        if !self.accept(&Token::RParen) {
            loop {
                values.push(self.value(|t| matches!(t, Token::Comma | Token::RParen))?);
                if self.accept(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen, ")")?;
                break;
            }
        }

        Ok(Command::Insert { table, values })
    }

    fn select(&mut self) -> Result<Command> {
        // Projection is accepted but every column is returned
        while !self.peek().is_some_and(|t| t.is_keyword("FROM")) {
            if self.next().is_none() {
                return Err(self.error("expected FROM"));
            }
        }
        self.expect_keyword("FROM")?;
        let table = self.identifier()?;
        let predicate = self.where_clause()?;
        Ok(Command::Select { table, predicate })
    }

    fn delete(&mut self) -> Result<Command> {
        self.expect_keyword("FROM")?;
        let table = self.identifier()?;
        let predicate = self.where_clause()?;
        Ok(Command::Delete { table, predicate })
    }

    fn show(&mut self) -> Result<Command> {
        if self.accept_keyword("TABLES") {
            return Ok(Command::ListTables);
        }
        // `SHOW TABLE t`, unless the table itself is named "table"
        if self.peek().is_some_and(|t| t.is_keyword("TABLE"))
            && matches!(self.tokens.get(self.pos + 1), Some(Token::Word(_)))
        {
            self.pos += 1;
        }
        let table = self.identifier()?;
        Ok(Command::Show { table })
    }

    fn where_clause(&mut self) -> Result<Predicate> {
        self.expect_keyword("WHERE")?;
        let column = self.identifier()?;

        if self.accept(&Token::Eq) {
            let value = self.value(|t| *t == Token::Semicolon)?;
            return Ok(Predicate::Eq { column, value });
        }

        if self.accept_keyword("BETWEEN") {
            let low = self.value(|t| t.is_keyword("AND"))?;
            self.expect_keyword("AND")?;
            let high = self.value(|t| *t == Token::Semicolon)?;
            return Ok(Predicate::Between { column, low, high });
        }

        Err(self.error("expected = or BETWEEN"))
    }

    /// A quoted string, or bare words joined by single spaces up to `stop`
    fn value(&mut self, stop: impl Fn(&Token) -> bool) -> Result<String> {
        if let Some(Token::Quoted(text)) = self.peek() {
            let text = text.clone();
            self.pos += 1;
            return Ok(text);
        }

        let mut words = Vec::new();
        while let Some(token) = self.peek() {
            if stop(token) {
                break;
            }
            match token {
                Token::Word(w) => words.push(w.clone()),
                _ => return Err(self.error("unexpected symbol in value")),
            }
            self.pos += 1;
        }

        if words.is_empty() {
            return Err(self.error("expected a value"));
        }
        Ok(words.join(" "))
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) if is_identifier(w) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    /// Only semicolons may follow a complete statement
    fn finish(&mut self) -> Result<()> {
        while self.accept(&Token::Semicolon) {}
        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(())
    }

    // =========================================================================
    // Token Helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, display: &str) -> Result<()> {
        if self.accept(&token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", display)))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.accept_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", keyword)))
        }
    }

    fn error(&self, msg: &str) -> PicoError {
        let found = match self.peek() {
            Some(Token::Word(w)) => w.clone(),
            Some(Token::Quoted(q)) => format!("\"{}\"", q),
            Some(Token::LParen) => "(".to_string(),
            Some(Token::RParen) => ")".to_string(),
            Some(Token::Comma) => ",".to_string(),
            Some(Token::Eq) => "=".to_string(),
            Some(Token::Semicolon) => ";".to_string(),
            None => "end of input".to_string(),
        };
        PicoError::Parse(format!("{} (found {})", msg, found))
    }
}

fn is_identifier(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
