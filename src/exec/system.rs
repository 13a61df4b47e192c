use crate::error::BasicError;
use crate::interpreter::{Interpreter, StoppedAt};
use crate::lexer::{self, Token};

use super::Flow;

pub(crate) fn run_poke(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let addr = super::eval_number(interp, text, pos)?;
    super::expect(text, pos, &Token::Comma)?;
    let value = super::eval_number(interp, text, pos)?;
    interp.memory.poke(addr as i64, value as i64);
    Ok(Flow::FallThrough)
}

pub(crate) fn run_wait(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let addr = super::eval_number(interp, text, pos)?;
    super::expect(text, pos, &Token::Comma)?;
    let mask = super::eval_number(interp, text, pos)?;
    let invert = {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        if tok == Token::Comma {
            *pos = next;
            super::eval_number(interp, text, pos)?
        } else {
            0.0
        }
    };
    if !interp
        .memory
        .wait_satisfied(addr as i64, mask as i64, invert as i64)
    {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    Ok(Flow::FallThrough)
}

pub(crate) fn run_rem(text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    *pos = text.len();
    Ok(Flow::FallThrough)
}

pub(crate) fn run_stop(interp: &mut Interpreter, pos: &mut usize) -> Result<Flow, BasicError> {
    interp.running = false;
    if let Some(line) = interp.current_line {
        interp.stopped_at = Some(StoppedAt {
            line,
            position: *pos,
        });
        interp.write_out(&format!("BREAK IN {line}\n"))?;
    }
    Ok(Flow::FallThrough)
}

pub(crate) fn run_end(interp: &mut Interpreter) -> Result<Flow, BasicError> {
    interp.running = false;
    Ok(Flow::FallThrough)
}

pub(crate) fn run_cont(interp: &mut Interpreter) -> Result<Flow, BasicError> {
    interp.cont()?;
    Ok(Flow::Jumped)
}

pub(crate) fn run_clear(interp: &mut Interpreter) -> Result<Flow, BasicError> {
    interp.clear_runtime_state();
    Ok(Flow::FallThrough)
}

pub(crate) fn run_new(interp: &mut Interpreter) -> Result<Flow, BasicError> {
    interp.new_program();
    Ok(Flow::FallThrough)
}

pub(crate) fn run_list(interp: &mut Interpreter) -> Result<Flow, BasicError> {
    let lines: Vec<(u16, String)> = interp
        .program
        .iter()
        .map(|l| (l.number, l.text.clone()))
        .collect();
    for (number, text) in lines {
        interp.write_out(&format!("{number} {text}\n"))?;
    }
    Ok(Flow::FallThrough)
}

pub(crate) fn run_run(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (tok, _) = lexer::peek_token(text, *pos)?;
    let from_line = match tok {
        Token::Eol | Token::Colon => None,
        _ => Some(super::eval_number(interp, text, pos)?.round() as u16),
    };
    interp.run(from_line)?;
    Ok(Flow::Jumped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poke_then_peek_round_trips_through_memory() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        let mut pos = 0;
        run_poke(&mut interp, "1024, 42", &mut pos).unwrap();
        assert_eq!(interp.memory.peek(1024), 42);
    }

    #[test]
    fn stop_records_a_resumable_position() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.program.set_line(10, "STOP".to_owned());
        interp.current_line = Some(10);
        interp.running = true;
        let mut pos = 4;
        run_stop(&mut interp, &mut pos).unwrap();
        assert!(!interp.running);
        assert_eq!(interp.stopped_at.unwrap().line, 10);
        assert_eq!(interp.stopped_at.unwrap().position, 4);
    }

    #[test]
    fn end_stops_the_interpreter() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.running = true;
        run_end(&mut interp).unwrap();
        assert!(!interp.running);
    }

    #[test]
    fn new_clears_program_and_data() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.program.set_line(10, "PRINT 1".to_owned());
        run_new(&mut interp).unwrap();
        assert!(interp.program.is_empty());
    }
}
