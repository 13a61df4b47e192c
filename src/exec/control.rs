use crate::error::{BasicError, ErrorCode};
use crate::interpreter::Interpreter;
use crate::lexer::{self, Keyword, Token};
use crate::program::GosubFrame;

use super::Flow;

fn eval_line_number(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<u16, BasicError> {
    let n = super::eval_number(interp, text, pos)?;
    if !(0.0..=u16::MAX as f64).contains(&n) {
        return Err(BasicError::new(ErrorCode::UndefStatement));
    }
    Ok(n.round() as u16)
}

fn jump_to(interp: &mut Interpreter, line: u16) -> Result<(), BasicError> {
    if interp.program.index_of(line).is_none() {
        return Err(BasicError::new(ErrorCode::UndefStatement));
    }
    interp.current_line = Some(line);
    interp.current_position = 0;
    Ok(())
}

pub(crate) fn run_goto(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let line = eval_line_number(interp, text, pos)?;
    jump_to(interp, line)?;
    Ok(Flow::Jumped)
}

pub(crate) fn run_gosub(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let target = eval_line_number(interp, text, pos)?;
    let return_line = interp
        .current_line
        .ok_or_else(|| BasicError::new(ErrorCode::Syntax))?;
    interp.gosub_stack.push(GosubFrame {
        line: return_line,
        resume_position: *pos,
    });
    jump_to(interp, target)?;
    Ok(Flow::Jumped)
}

pub(crate) fn run_return(interp: &mut Interpreter, _pos: &mut usize) -> Result<Flow, BasicError> {
    let frame = interp
        .gosub_stack
        .pop()
        .ok_or_else(|| BasicError::new(ErrorCode::ReturnWithoutGosub))?;
    interp.current_line = Some(frame.line);
    interp.current_position = frame.resume_position;
    Ok(Flow::Jumped)
}

/// `IF <expr> THEN <linenum>|<statement>`. A false condition discards the rest
/// of the line, including anything after a trailing `:`.
pub(crate) fn run_if(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let cond = super::eval_expr(interp, text, pos)?;
    let truthy = cond.is_truthy()?;

    super::expect_keyword(text, pos, Keyword::Then)?;

    if !truthy {
        *pos = text.len();
        return Ok(Flow::FallThrough);
    }

    let (tok, next) = lexer::peek_token(text, *pos)?;
    match tok {
        Token::Number(n) => {
            *pos = next;
            if !(0.0..=u16::MAX as f64).contains(&n) {
                return Err(BasicError::new(ErrorCode::UndefStatement));
            }
            jump_to(interp, n.round() as u16)?;
            Ok(Flow::Jumped)
        }
        _ => super::dispatch_one(interp, text, pos),
    }
}

/// `ON <expr> GOTO|GOSUB <line>[,<line>...]`. Out-of-range falls through with
/// no error.
pub(crate) fn run_on(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let index = super::eval_number(interp, text, pos)?;

    let (tok, next) = lexer::peek_token(text, *pos)?;
    let is_gosub = match tok {
        Token::Keyword(Keyword::Goto) => false,
        Token::Keyword(Keyword::Gosub) => true,
        _ => return Err(BasicError::new(ErrorCode::Syntax)),
    };
    *pos = next;

    let mut lines = vec![];
    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        match tok {
            Token::Number(n) => {
                *pos = next;
                lines.push(n as u16);
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

    let i = index.round() as i64;
    if i < 1 || i as usize > lines.len() {
        return Ok(Flow::FallThrough);
    }
    let target = lines[(i - 1) as usize];

    if is_gosub {
        let return_line = interp
            .current_line
            .ok_or_else(|| BasicError::new(ErrorCode::Syntax))?;
        interp.gosub_stack.push(GosubFrame {
            line: return_line,
            resume_position: *pos,
        });
    }
    jump_to(interp, target)?;
    Ok(Flow::Jumped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp_at(line: u16, other_line: u16, other_text: &str) -> Interpreter {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.program.set_line(line, String::new());
        interp.program.set_line(other_line, other_text.to_owned());
        interp.current_line = Some(line);
        interp.current_position = 0;
        interp
    }

    #[test]
    fn goto_jumps_to_an_existing_line() {
        let mut interp = interp_at(10, 20, "PRINT 1");
        let mut pos = 0;
        run_goto(&mut interp, "20", &mut pos).unwrap();
        assert_eq!(interp.current_line, Some(20));
        assert_eq!(interp.current_position, 0);
    }

    #[test]
    fn goto_an_undefined_line_is_an_error() {
        let mut interp = interp_at(10, 20, "PRINT 1");
        let mut pos = 0;
        let err = run_goto(&mut interp, "999", &mut pos).unwrap_err();
        assert_eq!(err.code, ErrorCode::UndefStatement);
    }

    #[test]
    fn gosub_then_return_restores_the_call_site() {
        let mut interp = interp_at(10, 20, "PRINT 1");
        let mut pos = 5;
        run_gosub(&mut interp, "20", &mut pos).unwrap();
        assert_eq!(interp.current_line, Some(20));
        assert_eq!(interp.gosub_stack.len(), 1);

        let mut pos2 = 0;
        run_return(&mut interp, &mut pos2).unwrap();
        assert_eq!(interp.current_line, Some(10));
        assert_eq!(interp.current_position, 5);
        assert!(interp.gosub_stack.is_empty());
    }

    #[test]
    fn return_without_a_matching_gosub_is_an_error() {
        let mut interp = interp_at(10, 20, "PRINT 1");
        let mut pos = 0;
        let err = run_return(&mut interp, &mut pos).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReturnWithoutGosub);
    }
}
