use crate::error::{BasicError, ErrorCode};

pub const MAX_STRING_LENGTH: usize = 255;
const EQUALITY_EPSILON: f64 = 1e-9;

/// BASIC's sentinel-truth convention: -1.0 is true, 0.0 is false.
pub const TRUE: f64 = -1.0;
pub const FALSE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        let mut s = s.into();
        s.truncate(MAX_STRING_LENGTH);
        Value::Str(s)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn as_number(&self) -> Result<f64, BasicError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Str(_) => Err(BasicError::new(ErrorCode::TypeMismatch)),
        }
    }

    pub fn as_str(&self) -> Result<&str, BasicError> {
        match self {
            Value::Str(s) => Ok(s),
            Value::Number(_) => Err(BasicError::new(ErrorCode::TypeMismatch)),
        }
    }

    /// Numeric truthiness: any non-zero number is true, matching the reference's
    /// acceptance of arbitrary non-zero conditions, not only the -1 sentinel.
    pub fn is_truthy(&self) -> Result<bool, BasicError> {
        Ok(self.as_number()? != 0.0)
    }

    fn sentinel(b: bool) -> Value {
        Value::Number(if b { TRUE } else { FALSE })
    }

    pub fn add(&self, other: &Value) -> Result<Value, BasicError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => {
                let mut s = a.clone();
                s.push_str(b);
                Ok(Value::string(s))
            }
            _ => Err(BasicError::new(ErrorCode::TypeMismatch)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::Number(self.as_number()? - other.as_number()?))
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::Number(self.as_number()? * other.as_number()?))
    }

    pub fn divide(&self, other: &Value) -> Result<Value, BasicError> {
        let (a, b) = (self.as_number()?, other.as_number()?);
        if b == 0.0 {
            return Err(BasicError::new(ErrorCode::DivisionByZero));
        }
        Ok(Value::Number(a / b))
    }

    /// `0^y` for `y<=0` and a negative base with a non-integer exponent both
    /// return 0 rather than raising, matching the reference's `math_power`.
    pub fn power(&self, other: &Value) -> Result<Value, BasicError> {
        let (base, exp) = (self.as_number()?, other.as_number()?);
        if base == 0.0 && exp <= 0.0 {
            return Ok(Value::Number(0.0));
        }
        if base < 0.0 && exp != exp.floor() {
            return Ok(Value::Number(0.0));
        }
        Ok(Value::Number(base.powf(exp)))
    }

    pub fn negate(&self) -> Result<Value, BasicError> {
        Ok(Value::Number(-self.as_number()?))
    }

    fn compare(&self, other: &Value) -> Result<std::cmp::Ordering, BasicError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if (a - b).abs() < EQUALITY_EPSILON {
                    Ok(std::cmp::Ordering::Equal)
                } else {
                    Ok(a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                }
            }
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            _ => Err(BasicError::new(ErrorCode::TypeMismatch)),
        }
    }

    pub fn equal(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? == std::cmp::Ordering::Equal))
    }

    pub fn not_equal(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? != std::cmp::Ordering::Equal))
    }

    pub fn less_than(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? == std::cmp::Ordering::Less))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? == std::cmp::Ordering::Greater))
    }

    pub fn less_equal(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? != std::cmp::Ordering::Greater))
    }

    pub fn greater_equal(&self, other: &Value) -> Result<Value, BasicError> {
        Ok(Value::sentinel(self.compare(other)? != std::cmp::Ordering::Less))
    }

    pub fn and(&self, other: &Value) -> Result<Value, BasicError> {
        let (a, b) = (self.as_number()? as i32, other.as_number()? as i32);
        Ok(Value::Number((a & b) as f64))
    }

    pub fn or(&self, other: &Value) -> Result<Value, BasicError> {
        let (a, b) = (self.as_number()? as i32, other.as_number()? as i32);
        Ok(Value::Number((a | b) as f64))
    }

    pub fn not(&self) -> Result<Value, BasicError> {
        let a = self.as_number()? as i32;
        Ok(Value::Number((!a) as f64))
    }

    /// Render the way `PRINT` renders a number: no leading space, matching the
    /// reference's `cmd_print`'s `printf("%g", val)`.
    pub fn display(&self) -> String {
        match self {
            Value::Number(n) => format_number_body(*n),
            Value::Str(s) => s.clone(),
        }
    }
}

fn format_number_body(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Render the way `STR$` renders a number: a leading space for non-negative
/// values, matching the reference's `func_str`'s `sprintf(" %g", val)`.
pub fn format_number(n: f64) -> String {
    let body = format_number_body(n);
    if n >= 0.0 {
        format!(" {body}")
    } else {
        body
    }
}
