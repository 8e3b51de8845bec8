// orchis/src/core/params.rs

//! Typed parameter values for pipeline packages.
//!
//! Packages declare their configurable parameters at bind time as an
//! explicit name -> value table; these are the values that table holds.

/// A configuration value a package declares and a caller may override.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
  /// Declared but not set; the step runner decides what that means.
  None,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<String>),
}

impl ParamValue {
  pub fn is_none(&self) -> bool {
    matches!(self, ParamValue::None)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      ParamValue::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      ParamValue::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      ParamValue::Float(v) => Some(*v),
      ParamValue::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      ParamValue::Str(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[String]> {
    match self {
      ParamValue::List(l) => Some(l.as_slice()),
      _ => None,
    }
  }
}

impl std::fmt::Display for ParamValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ParamValue::None => write!(f, "None"),
      ParamValue::Bool(b) => write!(f, "{}", b),
      ParamValue::Int(i) => write!(f, "{}", i),
      ParamValue::Float(v) => write!(f, "{}", v),
      ParamValue::Str(s) => write!(f, "{}", s),
      ParamValue::List(l) => write!(f, "[{}]", l.join(", ")),
    }
  }
}

impl From<bool> for ParamValue {
  fn from(v: bool) -> Self {
    ParamValue::Bool(v)
  }
}

impl From<i64> for ParamValue {
  fn from(v: i64) -> Self {
    ParamValue::Int(v)
  }
}

impl From<i32> for ParamValue {
  fn from(v: i32) -> Self {
    ParamValue::Int(v as i64)
  }
}

impl From<f64> for ParamValue {
  fn from(v: f64) -> Self {
    ParamValue::Float(v)
  }
}

impl From<&str> for ParamValue {
  fn from(v: &str) -> Self {
    ParamValue::Str(v.to_string())
  }
}

impl From<String> for ParamValue {
  fn from(v: String) -> Self {
    ParamValue::Str(v)
  }
}

impl From<Vec<String>> for ParamValue {
  fn from(v: Vec<String>) -> Self {
    ParamValue::List(v)
  }
}

impl From<Vec<&str>> for ParamValue {
  fn from(v: Vec<&str>) -> Self {
    ParamValue::List(v.into_iter().map(String::from).collect())
  }
}

impl<T> From<Option<T>> for ParamValue
where
  T: Into<ParamValue>,
{
  fn from(v: Option<T>) -> Self {
    match v {
      Some(inner) => inner.into(),
      None => ParamValue::None,
    }
  }
}
