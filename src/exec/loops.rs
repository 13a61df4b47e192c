use crate::error::{BasicError, ErrorCode};
use crate::interpreter::Interpreter;
use crate::lexer::{self, Keyword, Token};
use crate::program::ForFrame;
use crate::value::Value;
use crate::vars::intern;

use super::Flow;

/// `FOR <var> = <start> TO <limit> [STEP <step>]`. The frame is always pushed,
/// so the body runs at least once; whether it runs again is decided entirely
/// at `NEXT`.
pub(crate) fn run_for(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    let var_name = match tok {
        Token::Ident(name) => {
            *pos = next;
            name
        }
        _ => return Err(BasicError::new(ErrorCode::Syntax)),
    };

    super::expect(text, pos, &Token::Equal)?;
    let start = super::eval_number(interp, text, pos)?;
    super::expect_keyword(text, pos, Keyword::To)?;
    let limit = super::eval_number(interp, text, pos)?;

    let step = {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Keyword(Keyword::Step) {
            *pos = next;
            super::eval_number(interp, text, pos)?
        } else {
            1.0
        }
    };

    interp.vars.assign_scalar(&var_name, Value::number(start))?;
    let header_end = *pos;
    let from_line = interp.current_line.unwrap_or(0);

    interp.for_stack.push(ForFrame {
        var_name: intern(&var_name),
        limit,
        step,
        line: from_line,
        resume_position: header_end,
    });
    Ok(Flow::FallThrough)
}

/// `NEXT [var[, var...]]`. Bare `NEXT` matches the innermost open loop; a named
/// `NEXT` pops every frame above (and including) the one whose variable matches.
pub(crate) fn run_next(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let mut names: Vec<Option<String>> = vec![];
    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        match tok {
            Token::Ident(name) => {
                *pos = next;
                names.push(Some(name));
            }
            _ => break,
        }
        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Comma {
            *pos = next;
            continue;
        }
        break;
    }
    if names.is_empty() {
        names.push(None);
    }

    for name in names {
        if advance_one(interp, name.as_deref())? {
            return Ok(Flow::Jumped);
        }
    }
    Ok(Flow::FallThrough)
}

/// Advances the matched frame's variable by its step; returns `true` if the loop
/// continues (and the interpreter has been jumped back into its body).
fn advance_one(interp: &mut Interpreter, name: Option<&str>) -> Result<bool, BasicError> {
    let target = name.map(intern);
    let stack_pos = interp
        .for_stack
        .iter()
        .rposition(|f| target.as_deref().map_or(true, |t| f.var_name == t))
        .ok_or_else(|| BasicError::new(ErrorCode::NextWithoutFor))?;
    interp.for_stack.truncate(stack_pos + 1);

    let frame = interp.for_stack.last().unwrap().clone();
    let current = interp.vars.read_scalar(&frame.var_name)?.as_number()?;
    let next_value = current + frame.step;
    let in_range = if frame.step < 0.0 {
        next_value >= frame.limit
    } else {
        next_value <= frame.limit
    };
    interp
        .vars
        .assign_scalar(&frame.var_name, Value::number(next_value))?;

    if in_range {
        interp.current_line = Some(frame.line);
        interp.current_position = frame.resume_position;
        Ok(true)
    } else {
        interp.for_stack.pop();
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp_at(line: u16, text: &str) -> Interpreter {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.program.set_line(line, text.to_owned());
        interp.current_line = Some(line);
        interp.current_position = 0;
        interp
    }

    #[test]
    fn for_with_ascending_range_pushes_a_frame_and_falls_through() {
        let mut interp = interp_at(10, "FOR I = 1 TO 5");
        let mut pos = 0;
        run_for(&mut interp, "I = 1 TO 5", &mut pos).unwrap();
        assert_eq!(interp.for_stack.len(), 1);
        assert_eq!(interp.vars.read_scalar("I").unwrap(), Value::number(1.0));
    }

    #[test]
    fn for_with_an_empty_range_still_pushes_a_frame() {
        let mut interp = interp_at(10, "FOR I = 5 TO 1");
        let mut pos = 0;
        run_for(&mut interp, "I = 5 TO 1", &mut pos).unwrap();
        assert_eq!(interp.for_stack.len(), 1);
        assert_eq!(interp.vars.read_scalar("I").unwrap(), Value::number(5.0));
    }

    #[test]
    fn next_without_for_is_an_error() {
        let mut interp = interp_at(10, "NEXT I");
        let mut pos = 0;
        let err = run_next(&mut interp, "I", &mut pos).unwrap_err();
        assert_eq!(err.code, ErrorCode::NextWithoutFor);
    }

    #[test]
    fn advance_one_stops_once_the_limit_is_passed() {
        let mut interp = interp_at(10, "");
        interp.vars.assign_scalar("I", Value::number(5.0)).unwrap();
        interp.for_stack.push(ForFrame {
            var_name: intern("I"),
            limit: 5.0,
            step: 1.0,
            line: 10,
            resume_position: 0,
        });
        let looped = advance_one(&mut interp, Some("I")).unwrap();
        assert!(!looped);
        assert!(interp.for_stack.is_empty());
    }
}
