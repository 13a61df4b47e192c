use crate::error::{BasicError, ErrorCode};
use crate::eval::Evaluator;
use crate::interpreter::Interpreter;
use crate::lexer::{self, Keyword, Token};

use super::Flow;

/// `PRINT [expr|TAB(n)] [(,|;) expr|TAB(n)]... [,|;]`
///
/// A trailing `,` or `;` suppresses the newline that otherwise closes the
/// statement; anything else (including a bare `PRINT`) ends with one.
pub(crate) fn run(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<Flow, BasicError> {
    let mut column: usize = 0;
    let mut pending_newline = true;

    loop {
        let (tok, next) = lexer::peek_token(text, *pos)?;
        match tok {
            Token::Eol | Token::Colon => break,
            Token::Comma => {
                *pos = next;
                interp.write_out("\t")?;
                pending_newline = false;
            }
            Token::Semicolon => {
                *pos = next;
                pending_newline = false;
            }
            Token::Keyword(Keyword::Tab) => {
                *pos = next;
                let target = parse_tab_arg(interp, text, pos)?;
                if target > column {
                    let pad = target - column;
                    interp.write_out(&" ".repeat(pad))?;
                    column += pad;
                }
                pending_newline = true;
            }
            _ => {
                let value = super::eval_expr(interp, text, pos)?;
                let s = value.display();
                interp.write_out(&s)?;
                column += s.chars().count();
                pending_newline = true;
            }
        }
    }

    if pending_newline {
        interp.write_out("\n")?;
    }
    Ok(Flow::FallThrough)
}

fn parse_tab_arg(interp: &mut Interpreter, text: &str, pos: &mut usize) -> Result<usize, BasicError> {
    super::expect(text, pos, &Token::LParen)?;
    let n = {
        let mut ctx = interp.eval_ctx();
        let evaluator = Evaluator::new(text);
        evaluator.evaluate(pos, &mut ctx)?.as_number()?
    };
    super::expect(text, pos, &Token::RParen)?;
    if n < 0.0 {
        return Err(BasicError::new(ErrorCode::IllegalQuantity));
    }
    Ok(n as usize)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn printed(text: &str) -> String {
        let buf = SharedBuf::default();
        let reader = buf.clone();
        let mut interp = Interpreter::with_output(Box::new(buf));
        let mut pos = 0;
        run(&mut interp, text, &mut pos).unwrap();
        String::from_utf8(reader.0.borrow().clone()).unwrap()
    }

    #[test]
    fn bare_print_ends_with_a_newline() {
        assert_eq!(printed(""), "\n");
    }

    #[test]
    fn comma_emits_a_single_tab_character() {
        assert_eq!(printed("\"A\",\"B\""), "A\tB\n");
    }

    #[test]
    fn semicolon_joins_values_without_padding() {
        assert_eq!(printed("1;2"), "12\n");
    }

    #[test]
    fn trailing_semicolon_suppresses_the_newline() {
        assert_eq!(printed("1;"), "1");
    }

    #[test]
    fn tab_pads_with_spaces_up_to_the_target_column() {
        assert_eq!(printed("TAB(5)\"X\""), format!("{}X\n", " ".repeat(5)));
    }

    #[test]
    fn tab_that_is_behind_the_current_column_is_a_no_op() {
        assert_eq!(printed("\"LONGSTRING\"TAB(2)\"X\""), "LONGSTRINGX\n");
    }
}
