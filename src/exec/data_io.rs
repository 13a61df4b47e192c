use std::io::Read as _;

use crate::error::{BasicError, ErrorCode};
use crate::eval::Evaluator;
use crate::interpreter::Interpreter;
use crate::lexer::{self, Token};
use crate::value::Value;

use super::Flow;

/// `DIM <name>(<dims>)[, <name>(<dims>)...]`
pub(crate) fn run_dim(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        let name = match tok {
            Token::Ident(n) => {
                *pos = next;
                n
            }
            _ => return Err(BasicError::new(ErrorCode::Syntax)),
        };
        super::expect(text, pos, &Token::LParen)?;
        let mut dims = vec![];
        loop {
            let n = super::eval_number(interp, text, pos)?;
            if n < 0.0 {
                return Err(BasicError::new(ErrorCode::IllegalQuantity));
            }
            dims.push(n as usize);
            let (tok, next) = lexer::peek_token(text, *pos)?;
            if tok == Token::Comma {
                *pos = next;
                continue;
            }
            break;
        }
        super::expect(text, pos, &Token::RParen)?;
        interp.vars.dim(&name, dims)?;

        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Comma {
            *pos = next;
            continue;
        }
        break;
    }
    Ok(Flow::FallThrough)
}

/// At execution time `DATA` is a no-op: the pool is already populated by
/// [`collect_data_literals`] at `RUN`/load time. This just skips the raw text so
/// the dispatcher can continue past it.
pub(crate) fn run_data(text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (_, after) = raw_until_colon_or_eol(text, *pos);
    *pos = after;
    Ok(Flow::FallThrough)
}

/// `READ <var>[, <var>...]`. Numeric targets parse the stored literal strictly
/// (unlike `VAL`, which tolerates trailing garbage); a non-numeric literal read
/// into a numeric target is `TYPE_MISMATCH`.
pub(crate) fn run_read(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        let name = match tok {
            Token::Ident(n) => {
                *pos = next;
                n
            }
            _ => return Err(BasicError::new(ErrorCode::Syntax)),
        };

        let (peek_tok, _) = lexer::peek_token(text, *pos)?;
        let raw = interp.data.read()?;
        let raw_str = raw.as_str()?.to_owned();
        let value = if name.ends_with('$') {
            Value::string(raw_str)
        } else {
            let n: f64 = raw_str
                .trim()
                .parse()
                .map_err(|_| BasicError::new(ErrorCode::TypeMismatch))?;
            Value::number(n)
        };

        if peek_tok == Token::LParen {
            let subs = {
                let mut ctx = interp.eval_ctx();
                let evaluator = Evaluator::new(text);
                evaluator.parse_arg_list(pos, &mut ctx)?
            };
            interp.vars.assign_array(&name, &subs, value)?;
        } else {
            interp.vars.assign_scalar(&name, value)?;
        }

        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Comma {
            *pos = next;
            continue;
        }
        break;
    }
    Ok(Flow::FallThrough)
}

pub(crate) fn run_restore(interp: &mut Interpreter, _pos: &mut usize) -> Result<Flow, BasicError> {
    interp.data.restore();
    Ok(Flow::FallThrough)
}

/// `INPUT [<prompt$>(;|,)] <var>[, <var>...]`. A `;`-separated prompt replaces
/// the default `? `; a `,`-separated one is printed with `? ` still appended.
pub(crate) fn run_input(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    let mut prompt: Option<String> = None;
    let mut append_question = true;
    if let Token::Str(s) = tok {
        let (sep_tok, sep_next) = lexer::peek_token(text, next)?;
        if sep_tok == Token::Semicolon {
            prompt = Some(s);
            append_question = false;
            *pos = sep_next;
        } else if sep_tok == Token::Comma {
            prompt = Some(s);
            *pos = sep_next;
        }
    }

    let mut names = vec![];
    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        match tok {
            Token::Ident(n) => {
                *pos = next;
                names.push(n);
            }
            _ => return Err(BasicError::new(ErrorCode::Syntax)),
        }
        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Comma {
            *pos = next;
            continue;
        }
        break;
    }

    loop {
        match &prompt {
            Some(p) => {
                interp.write_out(p)?;
                if append_question {
                    interp.write_out("? ")?;
                }
            }
            None => interp.write_out("? ")?,
        }
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(|_| BasicError::new(ErrorCode::OutOfMemory))?;
        let line = line.trim_end_matches(['\n', '\r']);
        let fields = split_input_fields(line);

        if fields.len() < names.len() {
            interp.write_out("?Redo from start\n")?;
            continue;
        }

        let mut values = Vec::with_capacity(names.len());
        let mut ok = true;
        for (name, field) in names.iter().zip(fields.iter()) {
            if name.ends_with('$') {
                values.push(Value::string(field.clone()));
            } else {
                match field.trim().parse::<f64>() {
                    Ok(n) => values.push(Value::number(n)),
                    Err(_) => {
                        ok = false;
                        break;
                    }
                }
            }
        }
        if !ok {
            interp.write_out("?Redo from start\n")?;
            continue;
        }

        for (name, value) in names.iter().zip(values) {
            interp.vars.assign_scalar(name, value)?;
        }
        break;
    }
    Ok(Flow::FallThrough)
}

/// `GET <var>`: one byte from stdin if buffered input is available, else 0.
pub(crate) fn run_get(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    let name = match tok {
        Token::Ident(n) => {
            *pos = next;
            n
        }
        _ => return Err(BasicError::new(ErrorCode::Syntax)),
    };

    let mut buf = [0u8; 1];
    let n = std::io::stdin().read(&mut buf).unwrap_or(0);
    let value = if name.ends_with('$') {
        if n == 0 {
            Value::string("")
        } else {
            Value::string((buf[0] as char).to_string())
        }
    } else {
        Value::number(if n == 0 { 0.0 } else { buf[0] as f64 })
    };
    interp.vars.assign_scalar(&name, value)?;
    Ok(Flow::FallThrough)
}

/// Pre-scan every `DATA` statement in `text` (which may hold several, separated
/// by `:`) into the interpreter's DATA pool, in left-to-right order. `DATA`
/// arguments are raw text, not tokenized expressions: an unquoted item runs to
/// the next top-level comma, a quoted one honors `""` as an escaped quote.
pub(crate) fn collect_data_literals(interp: &mut Interpreter, text: &str, _line: u16) {
    for clause in split_top_level(text, b':') {
        let trimmed = clause.trim_start();
        let prefix: String = trimmed.chars().take(4).collect::<String>().to_ascii_uppercase();
        if prefix != "DATA" {
            continue;
        }
        let boundary_ok = trimmed
            .as_bytes()
            .get(4)
            .map_or(true, |c| !c.is_ascii_alphanumeric() && *c != b'$');
        if !boundary_ok {
            continue;
        }
        for item in split_data_items(&trimmed[4..]) {
            interp.data.push(Value::string(item));
        }
    }
}

fn split_top_level(text: &str, sep: u8) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut parts = vec![];
    let mut start = 0;
    let mut in_quotes = false;
    for (i, b) in bytes.iter().enumerate() {
        match *b {
            b'"' => in_quotes = !in_quotes,
            b if b == sep && !in_quotes => {
                parts.push(text[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].to_string());
    parts
}

fn split_data_items(rest: &str) -> Vec<String> {
    let bytes = rest.as_bytes();
    let mut items = vec![];
    let mut i = 0;
    loop {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            let mut field = String::new();
            while i < bytes.len() {
                if bytes[i] == b'"' {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                        field.push('"');
                        i += 2;
                    } else {
                        i += 1;
                        break;
                    }
                } else {
                    let start = i;
                    i += 1;
                    field.push_str(&rest[start..i]);
                }
            }
            while i < bytes.len() && bytes[i] != b',' {
                i += 1;
            }
            items.push(field);
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != b',' {
                i += 1;
            }
            items.push(rest[start..i].trim().to_string());
        }
        if i < bytes.len() && bytes[i] == b',' {
            i += 1;
        } else {
            break;
        }
    }
    items
}

fn split_input_fields(line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut fields = vec![];
    let mut i = 0;
    loop {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            let mut field = String::new();
            while i < bytes.len() {
                if bytes[i] == b'"' {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                        field.push('"');
                        i += 2;
                    } else {
                        i += 1;
                        break;
                    }
                } else {
                    let start = i;
                    i += 1;
                    field.push_str(&line[start..i]);
                }
            }
            while i < bytes.len() && bytes[i] != b',' {
                i += 1;
            }
            fields.push(field);
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != b',' {
                i += 1;
            }
            fields.push(line[start..i].trim().to_string());
        }
        if i < bytes.len() && bytes[i] == b',' {
            i += 1;
        } else {
            break;
        }
    }
    fields
}

fn raw_until_colon_or_eol(text: &str, start: usize) -> (String, usize) {
    let bytes = text.as_bytes();
    let mut i = start;
    let mut in_quotes = false;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                in_quotes = !in_quotes;
                i += 1;
            }
            b':' if !in_quotes => break,
            _ => i += 1,
        }
    }
    (text[start..i].to_string(), i)
}
