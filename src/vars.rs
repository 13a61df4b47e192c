use crate::error::{BasicError, ErrorCode};
use crate::value::Value;

const DEFAULT_ARRAY_SIZE: usize = 10;
const MAX_DIMENSIONS: usize = 8;

/// A name truncated to its first two significant characters plus an optional
/// trailing `$`, and uppercased — so `COUNTER` and `CO` are the same variable.
pub(crate) fn intern(name: &str) -> String {
    let is_string = name.ends_with('$');
    let base = if is_string { &name[..name.len() - 1] } else { name };
    let truncated: String = base.chars().take(2).collect();
    if is_string {
        format!("{truncated}$")
    } else {
        truncated
    }
}

#[derive(Debug, Clone)]
enum Storage {
    Scalar(Value),
    Array { dims: Vec<usize>, data: Vec<Value> },
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    is_string: bool,
    storage: Storage,
}

fn row_major_index(dims: &[usize], subscripts: &[usize]) -> Result<usize, BasicError> {
    if subscripts.len() != dims.len() {
        return Err(BasicError::new(ErrorCode::SubscriptOutOfRange));
    }
    let mut index = 0usize;
    for (dim, sub) in dims.iter().zip(subscripts) {
        if *sub > *dim {
            return Err(BasicError::new(ErrorCode::SubscriptOutOfRange));
        }
        index = index * (dim + 1) + sub;
    }
    Ok(index)
}

fn array_size(dims: &[usize]) -> usize {
    dims.iter().fold(1usize, |acc, d| acc * (d + 1))
}

/// Instance-owned, indexed-arena variable/array table (a flat `Vec` rather than the
/// reference's intrusive linked list — nothing here is cyclic).
#[derive(Debug, Default)]
pub struct VariableStore {
    vars: Vec<Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }

    /// Read a scalar, yielding the type-appropriate zero value without creating the
    /// variable if it is undefined.
    pub fn read_scalar(&self, raw_name: &str) -> Result<Value, BasicError> {
        let name = intern(raw_name);
        let is_string = name.ends_with('$');
        match self.find(&name) {
            Some(idx) => match &self.vars[idx].storage {
                Storage::Scalar(v) => Ok(v.clone()),
                Storage::Array { .. } => Err(BasicError::new(ErrorCode::TypeMismatch)),
            },
            None => Ok(if is_string {
                Value::string("")
            } else {
                Value::number(0.0)
            }),
        }
    }

    pub fn assign_scalar(&mut self, raw_name: &str, value: Value) -> Result<(), BasicError> {
        let name = intern(raw_name);
        let is_string = name.ends_with('$');
        if is_string != value.is_string() {
            return Err(BasicError::new(ErrorCode::TypeMismatch));
        }
        match self.find(&name) {
            Some(idx) => match &mut self.vars[idx].storage {
                Storage::Scalar(slot) => {
                    *slot = value;
                    Ok(())
                }
                Storage::Array { .. } => Err(BasicError::new(ErrorCode::TypeMismatch)),
            },
            None => {
                self.vars.push(Variable {
                    name,
                    is_string,
                    storage: Storage::Scalar(value),
                });
                Ok(())
            }
        }
    }

    pub fn dim(&mut self, raw_name: &str, dims: Vec<usize>) -> Result<(), BasicError> {
        if dims.is_empty() || dims.len() > MAX_DIMENSIONS {
            return Err(BasicError::new(ErrorCode::IllegalQuantity));
        }
        let name = intern(raw_name);
        if self.find(&name).is_some() {
            return Err(BasicError::new(ErrorCode::RedimensionedArray));
        }
        let is_string = name.ends_with('$');
        let size = array_size(&dims);
        let fill = if is_string {
            Value::string("")
        } else {
            Value::number(0.0)
        };
        self.vars.push(Variable {
            name,
            is_string,
            storage: Storage::Array {
                dims,
                data: vec![fill; size],
            },
        });
        Ok(())
    }

    /// Auto-allocate a default array (each dimension sized `DEFAULT_ARRAY_SIZE`) the
    /// first time a name is used with subscripts but was never `DIM`ed.
    fn ensure_array(&mut self, raw_name: &str, dimensionality: usize) -> Result<usize, BasicError> {
        let name = intern(raw_name);
        if let Some(idx) = self.find(&name) {
            match &self.vars[idx].storage {
                Storage::Array { .. } => Ok(idx),
                Storage::Scalar(_) => Err(BasicError::new(ErrorCode::TypeMismatch)),
            }
        } else {
            let is_string = name.ends_with('$');
            let dims = vec![DEFAULT_ARRAY_SIZE; dimensionality.max(1)];
            let size = array_size(&dims);
            let fill = if is_string {
                Value::string("")
            } else {
                Value::number(0.0)
            };
            self.vars.push(Variable {
                name,
                is_string,
                storage: Storage::Array {
                    dims,
                    data: vec![fill; size],
                },
            });
            Ok(self.vars.len() - 1)
        }
    }

    pub fn read_array(&mut self, raw_name: &str, subscripts: &[f64]) -> Result<Value, BasicError> {
        let subs = to_indices(subscripts)?;
        let idx = self.ensure_array(raw_name, subs.len())?;
        let Storage::Array { dims, data } = &self.vars[idx].storage else {
            unreachable!()
        };
        let flat = row_major_index(dims, &subs)?;
        Ok(data[flat].clone())
    }

    pub fn assign_array(
        &mut self,
        raw_name: &str,
        subscripts: &[f64],
        value: Value,
    ) -> Result<(), BasicError> {
        let subs = to_indices(subscripts)?;
        let idx = self.ensure_array(raw_name, subs.len())?;
        let is_string = self.vars[idx].is_string;
        if is_string != value.is_string() {
            return Err(BasicError::new(ErrorCode::TypeMismatch));
        }
        let Storage::Array { dims, data } = &mut self.vars[idx].storage else {
            unreachable!()
        };
        let flat = row_major_index(dims, &subs)?;
        data[flat] = value;
        Ok(())
    }
}

fn to_indices(subscripts: &[f64]) -> Result<Vec<usize>, BasicError> {
    subscripts
        .iter()
        .map(|n| {
            if *n < 0.0 {
                Err(BasicError::new(ErrorCode::IllegalQuantity))
            } else {
                Ok(*n as usize)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_scalar_reads_as_zero_without_creating() {
        let store = VariableStore::new();
        assert_eq!(store.read_scalar("X").unwrap(), Value::number(0.0));
    }

    #[test]
    fn name_truncation_aliases_long_names() {
        let mut store = VariableStore::new();
        store
            .assign_scalar("COUNTER", Value::number(5.0))
            .unwrap();
        assert_eq!(store.read_scalar("CO").unwrap(), Value::number(5.0));
    }

    #[test]
    fn redim_is_an_error() {
        let mut store = VariableStore::new();
        store.dim("A", vec![5]).unwrap();
        assert!(store.dim("A", vec![10]).is_err());
    }

    #[test]
    fn inclusive_upper_bound_is_in_range() {
        let mut store = VariableStore::new();
        store.dim("A", vec![5]).unwrap();
        assert!(store.assign_array("A", &[5.0], Value::number(1.0)).is_ok());
        assert!(store.assign_array("A", &[6.0], Value::number(1.0)).is_err());
    }
}
