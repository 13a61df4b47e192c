mod control;
pub(crate) mod data_io;
mod let_stmt;
mod loops;
mod print;
mod system;

use crate::error::{BasicError, ErrorCode};
use crate::eval::Evaluator;
use crate::interpreter::Interpreter;
use crate::lexer::{self, Keyword, Token};
use crate::value::Value;

/// Whether a statement handler completed normally (the dispatcher should keep
/// walking the same line's text, expecting `:` or end-of-line next) or performed
/// a jump (the handler has already set `current_line`/`current_position`, and the
/// dispatcher must stop here without touching them further).
pub(crate) enum Flow {
    FallThrough,
    Jumped,
}

pub(crate) fn run_line(interp: &mut Interpreter, text: &str) -> Result<(), BasicError> {
    run_line_from(interp, text, 0)
}

/// Drive the statement dispatcher across one line's text, starting at `start`.
/// Returns once end-of-line is reached or a handler jumps elsewhere.
pub(crate) fn run_line_from(
    interp: &mut Interpreter,
    text: &str,
    start: usize,
) -> Result<(), BasicError> {
    let mut pos = start;
    loop {
        let (tok, next) = lexer::peek_token(text, pos)?;
        match tok {
            Token::Eol => {
                interp.current_position = pos;
                return Ok(());
            }
            Token::Colon => {
                pos = next;
                continue;
            }
            _ => {}
        }

        let flow = dispatch_one(interp, text, &mut pos)?;

        if !interp.running {
            interp.current_position = pos;
            return Ok(());
        }

        match flow {
            Flow::Jumped => return Ok(()),
            Flow::FallThrough => {
                let (tok, next) = lexer::peek_token(text, pos)?;
                match tok {
                    Token::Eol => {
                        interp.current_position = pos;
                        return Ok(());
                    }
                    Token::Colon => pos = next,
                    _ => return Err(BasicError::new(ErrorCode::Syntax)),
                }
            }
        }
    }
}

/// Parse and dispatch exactly one statement starting at `*pos`. Used both by the
/// top-level per-line loop and by `IF...THEN <statement>`, which recursively
/// dispatches whatever follows `THEN`.
pub(crate) fn dispatch_one(
    interp: &mut Interpreter,
    text: &str,
    pos: &mut usize,
) -> Result<Flow, BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    match tok {
        Token::Keyword(kw) => {
            *pos = next;
            dispatch_keyword(interp, kw, text, pos)
        }
        Token::Ident(name) => {
            *pos = next;
            let_stmt::run_implicit(interp, text, pos, &name)
        }
        _ => Err(BasicError::new(ErrorCode::Syntax)),
    }
}

fn dispatch_keyword(
    interp: &mut Interpreter,
    kw: Keyword,
    text: &str,
    pos: &mut usize,
) -> Result<Flow, BasicError> {
    use Keyword::*;
    match kw {
        Print => print::run(interp, text, pos),
        Let => let_stmt::run_explicit(interp, text, pos),
        If => control::run_if(interp, text, pos),
        Goto => control::run_goto(interp, text, pos),
        Gosub => control::run_gosub(interp, text, pos),
        Return => control::run_return(interp, pos),
        On => control::run_on(interp, text, pos),
        For => loops::run_for(interp, text, pos),
        Next => loops::run_next(interp, text, pos),
        Dim => data_io::run_dim(interp, text, pos),
        Data => data_io::run_data(text, pos),
        Read => data_io::run_read(interp, text, pos),
        Restore => data_io::run_restore(interp, pos),
        Input => data_io::run_input(interp, text, pos),
        Get => data_io::run_get(interp, text, pos),
        Poke => system::run_poke(interp, text, pos),
        Wait => system::run_wait(interp, text, pos),
        Rem => system::run_rem(text, pos),
        Stop => system::run_stop(interp, pos),
        End => system::run_end(interp),
        Cont => system::run_cont(interp),
        Clear => system::run_clear(interp),
        New => system::run_new(interp),
        List => system::run_list(interp),
        Run => system::run_run(interp, text, pos),
        _ => Err(BasicError::new(ErrorCode::Syntax)),
    }
}

pub(crate) fn eval_expr(
    interp: &mut Interpreter,
    text: &str,
    pos: &mut usize,
) -> Result<Value, BasicError> {
    let mut ctx = interp.eval_ctx();
    let evaluator = Evaluator::new(text);
    evaluator.evaluate(pos, &mut ctx)
}

pub(crate) fn eval_number(
    interp: &mut Interpreter,
    text: &str,
    pos: &mut usize,
) -> Result<f64, BasicError> {
    eval_expr(interp, text, pos)?.as_number()
}

pub(crate) fn expect(text: &str, pos: &mut usize, expected: &Token) -> Result<(), BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    if &tok == expected {
        *pos = next;
        Ok(())
    } else {
        Err(BasicError::new(ErrorCode::Syntax))
    }
}

pub(crate) fn expect_keyword(text: &str, pos: &mut usize, kw: Keyword) -> Result<(), BasicError> {
    expect(text, pos, &Token::Keyword(kw))
}
