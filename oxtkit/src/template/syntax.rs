//! Template source parsing.
//!
//! A template is plain text with `${...}` directives:
//!
//! - `${name}` and `${ns:fn(arg, 'literal')}` expand to a value,
//! - `${if cond}`, `${else}`, `${end}` select a branch,
//! - `${for x in list}` ... `${end}` repeats a block per whitespace-separated item,
//! - `$${` is a literal `${`.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
    Literal(String),
    Var(String),
    Call {
        namespace: Option<String>,
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cond {
    Truthy(Expr),
    Not(Expr),
    Eq(Expr, Expr),
    Ne(Expr, Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Expr(Expr),
    If {
        cond: Cond,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    For {
        var: String,
        list: Expr,
        body: Vec<Node>,
    },
}

#[derive(Debug)]
enum TokenKind {
    Text(String),
    Expr(Expr),
    If(Cond),
    For { var: String, list: Expr },
    Else,
    End,
}

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

enum Stop {
    Else(usize),
    End(usize),
}

/// Parses template source into a node tree.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>, Error> {
    let tokens = tokenize(source)?;
    let mut iter = tokens.into_iter();
    let (nodes, stop) = block(&mut iter)?;
    match stop {
        None => Ok(nodes),
        Some(Stop::Else(offset)) => Err(Error::template_syntax(offset, "`${else}` outside `${if}`")),
        Some(Stop::End(offset)) => Err(Error::template_syntax(offset, "unmatched `${end}`")),
    }
}

fn block(iter: &mut std::vec::IntoIter<Token>) -> Result<(Vec<Node>, Option<Stop>), Error> {
    let mut nodes = Vec::new();
    while let Some(token) = iter.next() {
        let offset = token.offset;
        match token.kind {
            TokenKind::Text(text) => nodes.push(Node::Text(text)),
            TokenKind::Expr(expr) => nodes.push(Node::Expr(expr)),
            TokenKind::If(cond) => {
                let (then, stop) = block(iter)?;
                let otherwise = match stop {
                    Some(Stop::End(_)) => Vec::new(),
                    Some(Stop::Else(_)) => match block(iter)? {
                        (otherwise, Some(Stop::End(_))) => otherwise,
                        (_, Some(Stop::Else(else_offset))) => {
                            return Err(Error::template_syntax(
                                else_offset,
                                "second `${else}` in the same `${if}`",
                            ));
                        }
                        (_, None) => {
                            return Err(Error::template_syntax(offset, "`${if}` without `${end}`"));
                        }
                    },
                    None => {
                        return Err(Error::template_syntax(offset, "`${if}` without `${end}`"));
                    }
                };
                nodes.push(Node::If {
                    cond,
                    then,
                    otherwise,
                });
            }
            TokenKind::For { var, list } => {
                let (body, stop) = block(iter)?;
                match stop {
                    Some(Stop::End(_)) => nodes.push(Node::For { var, list, body }),
                    Some(Stop::Else(else_offset)) => {
                        return Err(Error::template_syntax(else_offset, "`${else}` inside `${for}`"));
                    }
                    None => {
                        return Err(Error::template_syntax(offset, "`${for}` without `${end}`"));
                    }
                }
            }
            TokenKind::Else => return Ok((nodes, Some(Stop::Else(offset)))),
            TokenKind::End => return Ok((nodes, Some(Stop::End(offset)))),
        }
    }
    Ok((nodes, None))
}

fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut text_offset = 0;
    let mut pos = 0;

    while pos < source.len() {
        let Some(found) = source[pos..].find('$') else {
            text.push_str(&source[pos..]);
            break;
        };
        let dollar = pos + found;
        text.push_str(&source[pos..dollar]);
        let rest = &source[dollar..];

        if rest.starts_with("$${") {
            text.push_str("${");
            pos = dollar + 3;
        } else if rest.starts_with("${") {
            if !text.is_empty() {
                tokens.push(Token {
                    kind: TokenKind::Text(std::mem::take(&mut text)),
                    offset: text_offset,
                });
            }
            let inner_start = dollar + 2;
            let close = find_close(source, inner_start)
                .ok_or_else(|| Error::template_syntax(dollar, "unterminated `${`"))?;
            let kind = directive(&source[inner_start..close], inner_start)?;
            tokens.push(Token {
                kind,
                offset: dollar,
            });
            pos = close + 1;
            text_offset = pos;
        } else {
            text.push('$');
            pos = dollar + 1;
        }
    }

    if !text.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Text(text),
            offset: text_offset,
        });
    }
    Ok(tokens)
}

/// Finds the `}` closing a directive, skipping quoted literals.
fn find_close(source: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in source[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '}') => return Some(from + i),
            (None, _) => {}
        }
    }
    None
}

fn directive(inner: &str, offset: usize) -> Result<TokenKind, Error> {
    let trimmed = inner.trim();
    let lead = inner.len() - inner.trim_start().len();
    let offset = offset + lead;

    if trimmed == "else" {
        return Ok(TokenKind::Else);
    }
    if trimmed == "end" {
        return Ok(TokenKind::End);
    }
    if let Some(rest) = keyword(trimmed, "if") {
        let mut cursor = ExprCursor::new(rest, offset + (trimmed.len() - rest.len()));
        let cond = cursor.condition()?;
        cursor.finish()?;
        return Ok(TokenKind::If(cond));
    }
    if let Some(rest) = keyword(trimmed, "for") {
        let base = offset + (trimmed.len() - rest.len());
        let mut cursor = ExprCursor::new(rest, base);
        cursor.skip_ws();
        let var = cursor
            .ident()
            .ok_or_else(|| cursor.error("expected a loop variable after `for`"))?
            .to_string();
        cursor.skip_ws();
        if !cursor.eat_keyword("in") {
            return Err(cursor.error("expected `in` after the loop variable"));
        }
        let list = cursor.operand()?;
        cursor.finish()?;
        return Ok(TokenKind::For { var, list });
    }

    let mut cursor = ExprCursor::new(trimmed, offset);
    let expr = cursor.operand()?;
    cursor.finish()?;
    Ok(TokenKind::Expr(expr))
}

/// Returns what follows `word` when `text` starts with it as a whole word.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

struct ExprCursor<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> ExprCursor<'a> {
    fn new(src: &'a str, base: usize) -> Self {
        Self { src, pos: 0, base }
    }

    fn error(&self, message: &str) -> Error {
        Error::template_syntax(self.base + self.pos, message)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        match keyword(self.rest(), word) {
            Some(_) => {
                self.pos += word.len();
                true
            }
            None => false,
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.skip_ws();
        if self.pos == self.src.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input in directive"))
        }
    }

    fn literal(&mut self, quote: char) -> Result<Expr, Error> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        match self.rest().find(quote) {
            Some(len) => {
                let value = self.rest()[..len].to_string();
                self.pos += len + quote.len_utf8();
                Ok(Expr::Literal(value))
            }
            None => {
                self.pos = start;
                Err(self.error("unterminated string literal"))
            }
        }
    }

    fn operand(&mut self) -> Result<Expr, Error> {
        self.skip_ws();
        match self.peek() {
            Some(q @ ('\'' | '"')) => return self.literal(q),
            Some(_) => {}
            None => return Err(self.error("expected a name or a literal")),
        }

        let first = self
            .ident()
            .ok_or_else(|| self.error("expected a name or a literal"))?
            .to_string();

        if self.eat(":") {
            let name = self
                .ident()
                .ok_or_else(|| self.error("expected a function name after the namespace"))?
                .to_string();
            if !self.eat("(") {
                return Err(self.error("expected `(` after a namespaced function name"));
            }
            let args = self.args()?;
            return Ok(Expr::Call {
                namespace: Some(first),
                name,
                args,
            });
        }

        if self.eat("(") {
            let args = self.args()?;
            return Ok(Expr::Call {
                namespace: None,
                name: first,
                args,
            });
        }

        Ok(Expr::Var(first))
    }

    fn args(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.operand()?);
            self.skip_ws();
            if self.eat(",") {
                continue;
            }
            if self.eat(")") {
                return Ok(args);
            }
            return Err(self.error("expected `,` or `)` in argument list"));
        }
    }

    fn condition(&mut self) -> Result<Cond, Error> {
        self.skip_ws();
        if self.eat("!") {
            return Ok(Cond::Not(self.operand()?));
        }
        let lhs = self.operand()?;
        self.skip_ws();
        if self.eat("==") {
            return Ok(Cond::Eq(lhs, self.operand()?));
        }
        if self.eat("!=") {
            return Ok(Cond::Ne(lhs, self.operand()?));
        }
        Ok(Cond::Truthy(lhs))
    }
}
