//! Call-expression parser for model completions.
//!
//! The endpoint replies with one line shaped like a function call:
//! `modify_instance_config(MinCount=3, InstanceType='t3.large')`. This
//! module parses exactly that grammar and nothing more:
//!
//! ```text
//! call     := name_path '(' [ kwarg (',' kwarg)* [','] ] ')' [';']
//! name_path:= ident ('.' ident)*          -- the last segment is the name
//! kwarg    := ident '=' value
//! value    := string | list | bare
//! list     := '[' [ value (',' value)* ] ']'
//! ```
//!
//! Bare (unquoted) values classify as integer, float, boolean, or the unset
//! sentinel (`None`/`null`); anything else — barewords, nested calls,
//! arbitrary expressions — is captured as its raw source text, trimmed, as a
//! string. Multiple statements, positional arguments, non-call input, and
//! unbalanced delimiters are parse failures: the caller receives `None` and
//! substitutes the out-of-scope sentinel. Parsing never panics.

use sp_protocol::{ClassifiedIntent, IntentArgs, Literal};

/// Parse one completion line into a classified intent.
///
/// Returns `None` for anything outside the grammar above; classification
/// must degrade rather than fail, so the caller maps `None` to
/// [`ClassifiedIntent::out_of_scope`].
pub fn parse_call_expression(raw: &str) -> Option<ClassifiedIntent> {
    let mut cur = Cursor::new(raw);
    cur.skip_ws();

    let name = parse_name_path(&mut cur)?;
    cur.skip_ws();
    if !cur.eat('(') {
        return None;
    }

    let mut args = IntentArgs::new();
    cur.skip_ws();
    if !cur.eat(')') {
        loop {
            cur.skip_ws();
            let key = cur.ident()?;
            cur.skip_ws();
            // A missing '=' means a positional argument or malformed input.
            if !cur.eat('=') {
                return None;
            }
            cur.skip_ws();
            let value = parse_value(&mut cur)?;
            args.insert(key.to_string(), value);

            cur.skip_ws();
            if cur.eat(',') {
                cur.skip_ws();
                // Tolerate a trailing comma before the closing paren.
                if cur.eat(')') {
                    break;
                }
                continue;
            }
            if cur.eat(')') {
                break;
            }
            return None;
        }
    }

    cur.skip_ws();
    // A single trailing statement terminator is tolerated; anything after it
    // (e.g. a second call) is not.
    cur.eat(';');
    cur.skip_ws();
    if !cur.at_end() {
        return None;
    }

    Some(ClassifiedIntent::new(name, args))
}

/// Dotted identifier path; the final segment is the intent name.
fn parse_name_path<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let mut name = cur.ident()?;
    loop {
        let checkpoint = cur.pos;
        cur.skip_ws();
        if cur.eat('.') {
            cur.skip_ws();
            name = cur.ident()?;
        } else {
            cur.pos = checkpoint;
            return Some(name);
        }
    }
}

fn parse_value(cur: &mut Cursor<'_>) -> Option<Literal> {
    match cur.peek()? {
        '\'' | '"' => parse_quoted(cur).map(Literal::Str),
        '[' => parse_list(cur),
        _ => parse_bare(cur),
    }
}

/// Single- or double-quoted string with backslash escapes.
fn parse_quoted(cur: &mut Cursor<'_>) -> Option<String> {
    let quote = cur.bump()?;
    let mut out = String::new();
    loop {
        match cur.bump()? {
            '\\' => match cur.bump()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                c if c == quote || c == '\\' => out.push(c),
                c => {
                    // Unknown escape: keep it verbatim.
                    out.push('\\');
                    out.push(c);
                }
            },
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

fn parse_list(cur: &mut Cursor<'_>) -> Option<Literal> {
    debug_assert_eq!(cur.peek(), Some('['));
    cur.bump();
    let mut items = Vec::new();
    cur.skip_ws();
    if cur.eat(']') {
        return Some(Literal::List(items));
    }
    loop {
        cur.skip_ws();
        items.push(parse_value(cur)?);
        cur.skip_ws();
        if cur.eat(',') {
            cur.skip_ws();
            if cur.eat(']') {
                break;
            }
            continue;
        }
        if cur.eat(']') {
            break;
        }
        return None;
    }
    Some(Literal::List(items))
}

/// Unquoted value: captured up to the next delimiter at nesting depth zero,
/// then classified as int, float, bool, unset, or raw-text string.
fn parse_bare(cur: &mut Cursor<'_>) -> Option<Literal> {
    let start = cur.pos;
    let mut depth: u32 = 0;
    while let Some(c) = cur.peek() {
        match c {
            ',' | ')' | ']' if depth == 0 => break,
            '(' | '[' => {
                depth += 1;
                cur.bump();
            }
            ')' | ']' => {
                depth -= 1;
                cur.bump();
            }
            '\'' | '"' => {
                // A quote inside a raw expression: skip to its mate so
                // delimiters inside it do not terminate the capture.
                parse_quoted(cur)?;
            }
            _ => {
                cur.bump();
            }
        }
    }
    if depth != 0 {
        return None;
    }
    let raw = cur.src[start..cur.pos].trim();
    if raw.is_empty() {
        return None;
    }
    Some(classify_bare(raw))
}

fn classify_bare(raw: &str) -> Literal {
    match raw {
        "True" | "true" => return Literal::Bool(true),
        "False" | "false" => return Literal::Bool(false),
        "None" | "null" => return Literal::Unset,
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Literal::Int(n);
    }
    // Guard with a digit check so words f64 happens to accept ("inf", "NaN")
    // stay raw text.
    if raw.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(x) = raw.parse::<f64>() {
            return Literal::Float(x);
        }
    }
    Literal::Str(raw.to_string())
}

/// Byte-position scanner over the completion line.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// ASCII identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.bump();
            }
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        Some(&self.src[start..self.pos])
    }
}
