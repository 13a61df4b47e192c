use crate::error::{BasicError, ErrorCode};
use crate::lexer::{Keyword, LexError, Lexer, Token};
use crate::memory::VirtualMemory;
use crate::rng::Rng;
use crate::value::{self, Value};
use crate::vars::VariableStore;

impl From<LexError> for BasicError {
    fn from(_: LexError) -> Self {
        BasicError::new(ErrorCode::Syntax)
    }
}

const UNARY_PRECEDENCE: u8 = 125;

fn binary_precedence(tok: &Token) -> Option<(u8, bool /* right_assoc */)> {
    use Token::*;
    Some(match tok {
        Caret => (127, true),
        Star | Slash => (123, false),
        Plus | Minus => (121, false),
        Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual => (100, false),
        Keyword(Keyword::And) => (90, false),
        Keyword(Keyword::Or) => (80, false),
        _ => return None,
    })
}

/// Everything a running expression needs besides the line text itself.
pub struct EvalContext<'a> {
    pub vars: &'a mut VariableStore,
    pub memory: &'a mut VirtualMemory,
    pub rng: &'a mut Rng,
}

/// Precedence-climbing evaluator driven by an external byte cursor, so callers can
/// resume lexing exactly where an expression left off (e.g. to find a trailing `,`).
pub struct Evaluator<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lexer: Lexer::new(text),
        }
    }

    fn peek(&self, pos: usize) -> Result<(Token, usize), BasicError> {
        let mut p = pos;
        let tok = self.lexer.next_token(&mut p)?;
        Ok((tok, p))
    }

    pub fn peek_token(&self, pos: usize) -> Result<Token, BasicError> {
        Ok(self.peek(pos)?.0)
    }

    fn expect(&self, pos: &mut usize, expected: &Token) -> Result<(), BasicError> {
        let (tok, next) = self.peek(*pos)?;
        if &tok == expected {
            *pos = next;
            Ok(())
        } else {
            Err(BasicError::new(ErrorCode::Syntax))
        }
    }

    pub fn evaluate(&self, pos: &mut usize, ctx: &mut EvalContext) -> Result<Value, BasicError> {
        self.evaluate_prec(pos, ctx, 0)
    }

    fn evaluate_prec(
        &self,
        pos: &mut usize,
        ctx: &mut EvalContext,
        min_prec: u8,
    ) -> Result<Value, BasicError> {
        let mut lhs = self.evaluate_unary(pos, ctx)?;

        loop {
            let (tok, next) = self.peek(*pos)?;
            let Some((prec, right_assoc)) = binary_precedence(&tok) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            *pos = next;
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.evaluate_prec(pos, ctx, next_min)?;
            lhs = apply_binary(&tok, &lhs, &rhs)?;
        }

        Ok(lhs)
    }

    fn evaluate_unary(&self, pos: &mut usize, ctx: &mut EvalContext) -> Result<Value, BasicError> {
        let (tok, next) = self.peek(*pos)?;
        match tok {
            Token::Minus => {
                *pos = next;
                let operand = self.evaluate_prec(pos, ctx, UNARY_PRECEDENCE)?;
                operand.negate()
            }
            Token::Plus => {
                *pos = next;
                self.evaluate_prec(pos, ctx, UNARY_PRECEDENCE)
            }
            Token::Keyword(Keyword::Not) => {
                *pos = next;
                let operand = self.evaluate_prec(pos, ctx, UNARY_PRECEDENCE)?;
                operand.not()
            }
            _ => self.evaluate_primary(pos, ctx),
        }
    }

    fn evaluate_primary(&self, pos: &mut usize, ctx: &mut EvalContext) -> Result<Value, BasicError> {
        let (tok, next) = self.peek(*pos)?;
        match tok {
            Token::Number(n) => {
                *pos = next;
                Ok(Value::number(n))
            }
            Token::Str(s) => {
                *pos = next;
                Ok(Value::string(s))
            }
            Token::LParen => {
                *pos = next;
                let inner = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                *pos = next;
                self.evaluate_variable(pos, ctx, &name)
            }
            Token::Keyword(kw) => {
                *pos = next;
                self.evaluate_function(pos, ctx, kw)
            }
            _ => Err(BasicError::new(ErrorCode::Syntax)),
        }
    }

    fn evaluate_variable(
        &self,
        pos: &mut usize,
        ctx: &mut EvalContext,
        name: &str,
    ) -> Result<Value, BasicError> {
        let (tok, _) = self.peek(*pos)?;
        if tok != Token::LParen {
            return ctx.vars.read_scalar(name);
        }
        let subs = self.parse_arg_list(pos, ctx)?;
        ctx.vars.read_array(name, &subs)
    }

    /// Parse a parenthesized, comma-separated argument list, evaluating each as a
    /// number (used both for array subscripts and most built-in function arguments).
    pub(crate) fn parse_arg_list(
        &self,
        pos: &mut usize,
        ctx: &mut EvalContext,
    ) -> Result<Vec<f64>, BasicError> {
        self.expect(pos, &Token::LParen)?;
        let mut args = vec![];
        loop {
            let v = self.evaluate_prec(pos, ctx, 0)?;
            args.push(v.as_number()?);
            let (tok, next) = self.peek(*pos)?;
            if tok == Token::Comma {
                *pos = next;
                continue;
            }
            break;
        }
        self.expect(pos, &Token::RParen)?;
        Ok(args)
    }

    fn evaluate_function(
        &self,
        pos: &mut usize,
        ctx: &mut EvalContext,
        kw: Keyword,
    ) -> Result<Value, BasicError> {
        use Keyword::*;
        match kw {
            Sgn | Int | Abs | Sqr | Rnd | Log | Exp | Cos | Sin | Tan | Atn | Peek | Fre => {
                let arg = if matches!(kw, Fre) {
                    self.parse_arg_list(pos, ctx)?.pop().unwrap_or(0.0)
                } else {
                    self.parse_arg_list(pos, ctx)?
                        .pop()
                        .ok_or_else(|| BasicError::new(ErrorCode::Syntax))?
                };
                Ok(Value::number(match kw {
                    Sgn => {
                        if arg > 0.0 {
                            1.0
                        } else if arg < 0.0 {
                            -1.0
                        } else {
                            0.0
                        }
                    }
                    Int => arg.floor(),
                    Abs => arg.abs(),
                    Sqr => {
                        if arg < 0.0 {
                            return Err(BasicError::new(ErrorCode::IllegalQuantity));
                        }
                        arg.sqrt()
                    }
                    Rnd => ctx.rng.rnd(arg),
                    Log => {
                        if arg <= 0.0 {
                            return Err(BasicError::new(ErrorCode::IllegalQuantity));
                        }
                        arg.ln()
                    }
                    Exp => {
                        if arg > 88.0 {
                            1.7e38
                        } else if arg < -88.0 {
                            0.0
                        } else {
                            arg.exp()
                        }
                    }
                    Cos => arg.cos(),
                    Sin => arg.sin(),
                    Tan => arg.tan(),
                    Atn => arg.atan(),
                    Peek => ctx.memory.peek(arg as i64) as f64,
                    Fre => 32768.0,
                    _ => unreachable!(),
                }))
            }
            Pos => {
                self.expect(pos, &Token::LParen)?;
                // argument is conventionally a dummy 0; ignored.
                self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                Ok(Value::number(0.0))
            }
            Len => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                Ok(Value::number(s.as_str()?.len() as f64))
            }
            Asc => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                let s = s.as_str()?;
                match s.bytes().next() {
                    Some(b) => Ok(Value::number(b as f64)),
                    None => Err(BasicError::new(ErrorCode::IllegalQuantity)),
                }
            }
            ChrDollar => {
                let code = self.parse_arg_list(pos, ctx)?;
                let code = *code.first().ok_or_else(|| BasicError::new(ErrorCode::Syntax))?;
                if !(0.0..=255.0).contains(&code) {
                    return Err(BasicError::new(ErrorCode::IllegalQuantity));
                }
                Ok(Value::string((code as u8 as char).to_string()))
            }
            StrDollar => {
                self.expect(pos, &Token::LParen)?;
                let n = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                Ok(Value::string(value::format_number(n.as_number()?)))
            }
            Val => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                Ok(Value::number(parse_leading_number(s.as_str()?)))
            }
            LeftDollar => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::Comma)?;
                let n = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                let s = s.as_str()?;
                let n = (n.as_number()?.max(0.0) as usize).min(s.len());
                Ok(Value::string(&s[..n]))
            }
            RightDollar => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::Comma)?;
                let n = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::RParen)?;
                let s = s.as_str()?;
                let n = (n.as_number()?.max(0.0) as usize).min(s.len());
                Ok(Value::string(&s[s.len() - n..]))
            }
            MidDollar => {
                self.expect(pos, &Token::LParen)?;
                let s = self.evaluate_prec(pos, ctx, 0)?;
                self.expect(pos, &Token::Comma)?;
                let start = self.evaluate_prec(pos, ctx, 0)?;
                let (tok, next) = self.peek(*pos)?;
                let len = if tok == Token::Comma {
                    *pos = next;
                    Some(self.evaluate_prec(pos, ctx, 0)?.as_number()?)
                } else {
                    None
                };
                self.expect(pos, &Token::RParen)?;
                let s = s.as_str()?;
                let start = (start.as_number()?.max(1.0) as usize) - 1;
                if start >= s.len() {
                    return Ok(Value::string(""));
                }
                let available = s.len() - start;
                let take = len.map(|l| (l.max(0.0) as usize).min(available)).unwrap_or(available);
                Ok(Value::string(&s[start..start + take]))
            }
            _ => Err(BasicError::new(ErrorCode::UndefFunction)),
        }
    }
}

fn apply_binary(tok: &Token, lhs: &Value, rhs: &Value) -> Result<Value, BasicError> {
    use Token::*;
    match tok {
        Plus => lhs.add(rhs),
        Minus => lhs.subtract(rhs),
        Star => lhs.multiply(rhs),
        Slash => lhs.divide(rhs),
        Caret => lhs.power(rhs),
        Equal => lhs.equal(rhs),
        NotEqual => lhs.not_equal(rhs),
        Less => lhs.less_than(rhs),
        Greater => lhs.greater_than(rhs),
        LessEqual => lhs.less_equal(rhs),
        GreaterEqual => lhs.greater_equal(rhs),
        Keyword(Keyword::And) => lhs.and(rhs),
        Keyword(Keyword::Or) => lhs.or(rhs),
        _ => Err(BasicError::new(ErrorCode::Syntax)),
    }
}

/// Tolerant leading-number parse for `VAL`: a sign, digits, optional fraction and
/// exponent from the front of the string; anything unparseable yields 0.
fn parse_leading_number(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut saw_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        saw_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            saw_digit = true;
        }
    }
    if saw_digit && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut look = end + 1;
        if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
            look += 1;
        }
        let exp_start = look;
        while look < bytes.len() && bytes[look].is_ascii_digit() {
            look += 1;
        }
        if look > exp_start {
            end = look;
        }
    }
    if !saw_digit {
        return 0.0;
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(text: &str) -> Value {
        let mut vars = VariableStore::new();
        let mut memory = VirtualMemory::new();
        let mut rng = Rng::new();
        let mut ctx = EvalContext {
            vars: &mut vars,
            memory: &mut memory,
            rng: &mut rng,
        };
        let evaluator = Evaluator::new(text);
        let mut pos = 0;
        evaluator.evaluate(&mut pos, &mut ctx).unwrap()
    }

    #[test]
    fn precedence_climbing_respects_multiplication_over_addition() {
        assert_eq!(eval_str("2+3*4"), Value::number(14.0));
    }

    #[test]
    fn exponent_is_right_associative() {
        assert_eq!(eval_str("2^3^2"), Value::number(512.0));
    }

    #[test]
    fn unary_minus_binds_inside_exponent() {
        assert_eq!(eval_str("-2^2"), Value::number(-4.0));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval_str("\"AB\"+\"CD\""), Value::string("ABCD"));
    }

    #[test]
    fn division_by_zero_errors() {
        let mut vars = VariableStore::new();
        let mut memory = VirtualMemory::new();
        let mut rng = Rng::new();
        let mut ctx = EvalContext {
            vars: &mut vars,
            memory: &mut memory,
            rng: &mut rng,
        };
        let evaluator = Evaluator::new("1/0");
        let mut pos = 0;
        assert!(evaluator.evaluate(&mut pos, &mut ctx).is_err());
    }

    #[test]
    fn val_is_tolerant_of_trailing_garbage() {
        assert_eq!(eval_str("VAL(\"12ABC\")"), Value::number(12.0));
    }

    #[test]
    fn left_and_right_clamp_past_the_end() {
        assert_eq!(eval_str("LEFT$(\"HI\",10)"), Value::string("HI"));
        assert_eq!(eval_str("RIGHT$(\"HI\",10)"), Value::string("HI"));
    }
}
