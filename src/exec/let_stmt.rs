use crate::error::{BasicError, ErrorCode};
use crate::eval::Evaluator;
use crate::interpreter::Interpreter;
use crate::lexer::{self, Token};

use super::Flow;

/// Explicit `LET <name>[(subscripts)] = <expr>`.
pub(crate) fn run_explicit(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let (tok, next) = lexer::peek_token(text, *pos)?;
    let name = match tok {
        Token::Ident(n) => {
            *pos = next;
            n
        }
        _ => return Err(BasicError::new(ErrorCode::Syntax)),
    };
    assign(interp, text, pos, &name)?;
    Ok(Flow::FallThrough)
}

/// Implicit assignment: a bare identifier at statement position with `LET` elided.
pub(crate) fn run_implicit(
    interp: &mut Interpreter,
    text: &str,
    pos: &mut usize,
    name: &str,
) -> Result<Flow, BasicError> {
    assign(interp, text, pos, name)?;
    Ok(Flow::FallThrough)
}

fn assign(interp: &mut Interpreter, text: &str, pos: &mut usize, name: &str) -> Result<(), BasicError> {
    let (tok, _) = lexer::peek_token(text, *pos)?;
    if tok == Token::LParen {
        let subs = {
            let mut ctx = interp.eval_ctx();
            let evaluator = Evaluator::new(text);
            evaluator.parse_arg_list(pos, &mut ctx)?
        };
        super::expect(text, pos, &Token::Equal)?;
        let value = super::eval_expr(interp, text, pos)?;
        interp.vars.assign_array(name, &subs, value)?;
    } else {
        super::expect(text, pos, &Token::Equal)?;
        let value = super::eval_expr(interp, text, pos)?;
        interp.vars.assign_scalar(name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn explicit_let_assigns_a_scalar() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        let mut pos = 0;
        run_explicit(&mut interp, "X = 5", &mut pos).unwrap();
        assert_eq!(interp.vars.read_scalar("X").unwrap(), Value::number(5.0));
    }

    #[test]
    fn implicit_let_assigns_without_the_keyword() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        let mut pos = 0;
        run_implicit(&mut interp, "= 7", &mut pos, "Y").unwrap();
        assert_eq!(interp.vars.read_scalar("Y").unwrap(), Value::number(7.0));
    }

    #[test]
    fn assigning_into_a_subscript_targets_the_array() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.vars.dim("A", vec![4]).unwrap();
        let mut pos = 0;
        run_explicit(&mut interp, "A(2) = 9", &mut pos).unwrap();
        assert_eq!(
            interp.vars.read_array("A", &[2.0]).unwrap(),
            Value::number(9.0)
        );
    }
}
