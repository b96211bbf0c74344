use crate::language::patterns::{escape, FALSE_LITERAL, NIL_LITERAL, TRUE_LITERAL};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use std::any::Any;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Nil,
    Invalid,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::String => "string",
            VariableType::Integer => "integer",
            VariableType::Float => "float",
            VariableType::Boolean => "boolean",
            VariableType::Array => "array",
            VariableType::Nil => "nil",
            VariableType::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<Variable>),
    Nil,
    Invalid,
}

impl Value {
    pub fn variable_type(&self) -> VariableType {
        match self {
            Value::String(_) => VariableType::String,
            Value::Integer(_) => VariableType::Integer,
            Value::Float(_) => VariableType::Float,
            Value::Boolean(_) => VariableType::Boolean,
            Value::Array(_) => VariableType::Array,
            Value::Nil => VariableType::Nil,
            Value::Invalid => VariableType::Invalid,
        }
    }
}

/// One step of a path into a composite value: `arr[0]`, `obj["k"]`, `obj.field`.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Index(usize),
    Key(String),
    Field(String),
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub base_name: Option<String>,
    pub value: Value,
    pub selectors: Vec<Selector>,
}

/// Variables compare by what they hold; the name they are bound under does
/// not take part.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.selectors == other.selectors
    }
}

impl Variable {
    pub fn new(value: Value) -> Self {
        Self {
            base_name: None,
            value,
            selectors: Vec::new(),
        }
    }

    pub fn nil() -> Self {
        Self::new(Value::Nil)
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            base_name: Some(name.into()),
            value,
            selectors: Vec::new(),
        }
    }

    /// Wraps a host value, inferring its type with [`determine_variable_type`].
    pub fn from_host(raw: &dyn Any) -> Self {
        let value = if let Some(s) = raw.downcast_ref::<String>() {
            Value::String(s.clone())
        } else if let Some(s) = raw.downcast_ref::<&str>() {
            Value::String((*s).to_string())
        } else if let Some(n) = host_integer(raw) {
            Value::Integer(n)
        } else if let Some(x) = raw.downcast_ref::<f64>() {
            Value::Float(*x)
        } else if let Some(x) = raw.downcast_ref::<f32>() {
            Value::Float(f64::from(*x))
        } else if let Some(b) = raw.downcast_ref::<bool>() {
            Value::Boolean(*b)
        } else if let Some(items) = raw.downcast_ref::<Vec<Variable>>() {
            Value::Array(items.clone())
        } else if raw.downcast_ref::<()>().is_some() {
            Value::Nil
        } else {
            Value::Invalid
        };
        Self::new(value)
    }

    pub fn variable_type(&self) -> VariableType {
        self.value.variable_type()
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Follows the selector path. Arrays support index selectors; there is no
    /// object type yet, so key and field selectors always fail.
    pub fn resolve(&self) -> RuntimeResult<Variable> {
        let mut current = Variable::new(self.value.clone());
        for selector in &self.selectors {
            current = match (selector, &current.value) {
                (Selector::Index(index), Value::Array(items)) => {
                    items
                        .get(*index)
                        .cloned()
                        .ok_or_else(|| RuntimeError::Unsupported {
                            message: format!(
                                "index {index} out of bounds for array of length {}",
                                items.len()
                            ),
                        })?
                }
                (selector, value) => {
                    return Err(RuntimeError::Unsupported {
                        message: format!(
                            "cannot apply {selector:?} to {}",
                            value.variable_type()
                        ),
                    })
                }
            };
        }
        Ok(current)
    }

    pub fn to_string_value(&self) -> RuntimeResult<String> {
        match &self.value {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(x) => Ok(format_float(*x)),
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(RuntimeError::Conversion {
                from: other.variable_type(),
                to: VariableType::String,
            }),
        }
    }

    pub fn to_int(&self) -> RuntimeResult<i64> {
        match &self.value {
            Value::String(s) => s
                .parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|x| x as i64))
                .map_err(|_| RuntimeError::Unparsable {
                    text: s.clone(),
                    to: VariableType::Integer,
                }),
            Value::Integer(n) => Ok(*n),
            Value::Float(x) => Ok(*x as i64),
            Value::Boolean(b) => Ok(i64::from(*b)),
            other => Err(RuntimeError::Conversion {
                from: other.variable_type(),
                to: VariableType::Integer,
            }),
        }
    }

    pub fn to_float(&self) -> RuntimeResult<f64> {
        match &self.value {
            Value::String(s) => s.parse::<f64>().map_err(|_| RuntimeError::Unparsable {
                text: s.clone(),
                to: VariableType::Float,
            }),
            Value::Integer(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(RuntimeError::Conversion {
                from: other.variable_type(),
                to: VariableType::Float,
            }),
        }
    }

    pub fn to_bool(&self) -> RuntimeResult<bool> {
        match &self.value {
            Value::String(s) if s == TRUE_LITERAL => Ok(true),
            Value::String(s) if s == FALSE_LITERAL => Ok(false),
            Value::String(s) => Err(RuntimeError::Unparsable {
                text: s.clone(),
                to: VariableType::Boolean,
            }),
            Value::Integer(n) => Ok(*n != 0),
            Value::Float(x) => Ok(*x != 0.0),
            Value::Boolean(b) => Ok(*b),
            other => Err(RuntimeError::Conversion {
                from: other.variable_type(),
                to: VariableType::Boolean,
            }),
        }
    }

    /// Converts into a new variable of `target` type.
    pub fn cast_to(&self, target: VariableType) -> RuntimeResult<Variable> {
        let value = match target {
            VariableType::String => Value::String(self.to_string_value()?),
            VariableType::Integer => Value::Integer(self.to_int()?),
            VariableType::Float => Value::Float(self.to_float()?),
            VariableType::Boolean => Value::Boolean(self.to_bool()?),
            other => {
                return Err(RuntimeError::Conversion {
                    from: self.variable_type(),
                    to: other,
                })
            }
        };
        Ok(Variable::new(value))
    }

    /// Renders the value in source literal syntax. Strings are quoted and
    /// escaped, so the output parses back to an equal variable.
    pub fn to_literal(&self) -> String {
        match &self.value {
            Value::String(s) => format!("\"{}\"", escape(s)),
            Value::Nil => NIL_LITERAL.to_string(),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(Variable::to_literal).collect();
                format!("[{}]", inner.join(", "))
            }
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Nil => write!(f, "{NIL_LITERAL}"),
            Value::Invalid => write!(f, "<invalid>"),
        }
    }
}

/// Canonical decimal form: integral floats keep a trailing `.0` so they read
/// back as floats.
pub fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn host_integer(raw: &dyn Any) -> Option<i64> {
    macro_rules! try_int {
        ($($ty:ty),*) => {
            $(
                if let Some(n) = raw.downcast_ref::<$ty>() {
                    return i64::try_from(*n).ok();
                }
            )*
        };
    }
    try_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
    None
}

/// Infers the type tag for a host-supplied value.
pub fn determine_variable_type(raw: &dyn Any) -> VariableType {
    Variable::from_host(raw).variable_type()
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable::new(Value::String(value.to_string()))
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Variable::new(Value::String(value))
    }
}

impl From<i64> for Variable {
    fn from(value: i64) -> Self {
        Variable::new(Value::Integer(value))
    }
}

impl From<f64> for Variable {
    fn from(value: f64) -> Self {
        Variable::new(Value::Float(value))
    }
}

impl From<bool> for Variable {
    fn from(value: bool) -> Self {
        Variable::new(Value::Boolean(value))
    }
}

impl From<Vec<Variable>> for Variable {
    fn from(items: Vec<Variable>) -> Self {
        Variable::new(Value::Array(items))
    }
}
