//! Dynamically typed argument values

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array1, Array2};

use crate::aggregate::Aggregation;
use crate::series::{TimeFrame, TimeSeries};

/// Runtime type of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Array,
    Matrix,
    Series,
    /// Multi-column table sharing one index
    Frame,
    DateTime,
    Callable,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "None",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Array => "ndarray",
            Self::Matrix => "ndarray2",
            Self::Series => "Series",
            Self::Frame => "DataFrame",
            Self::DateTime => "datetime",
            Self::Callable => "callable",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single argument passed to a [`Tool`](super::Tool)
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<f64>),
    Array(Array1<f64>),
    Matrix(Array2<f64>),
    Series(TimeSeries),
    /// Named columns over a shared index; casts to `Matrix`, and to `Series`
    /// when it has a single column
    Frame(TimeFrame),
    DateTime(NaiveDateTime),
    Callable(Aggregation),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Array(_) => Kind::Array,
            Self::Matrix(_) => Kind::Matrix,
            Self::Series(_) => Kind::Series,
            Self::Frame(_) => Kind::Frame,
            Self::DateTime(_) => Kind::DateTime,
            Self::Callable(_) => Kind::Callable,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to build a value of kind `target` from this one.
    ///
    /// Returns `None` when no sensible conversion exists; the caller decides
    /// whether that is fatal.
    pub fn cast(&self, target: Kind) -> Option<Value> {
        if self.kind() == target {
            return Some(self.clone());
        }
        match (self, target) {
            (Self::Int(i), Kind::Float) => Some(Self::Float(*i as f64)),
            (Self::Bool(b), Kind::Float) => Some(Self::Float(f64::from(u8::from(*b)))),
            (Self::Str(s), Kind::Float) => s.trim().parse().ok().map(Self::Float),

            (Self::Float(x), Kind::Int) if x.is_finite() => Some(Self::Int(x.trunc() as i64)),
            (Self::Bool(b), Kind::Int) => Some(Self::Int(i64::from(*b))),
            (Self::Str(s), Kind::Int) => s.trim().parse().ok().map(Self::Int),

            (Self::Int(i), Kind::Bool) => Some(Self::Bool(*i != 0)),
            (Self::Float(x), Kind::Bool) => Some(Self::Bool(*x != 0.0)),
            (Self::Str(s), Kind::Bool) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Self::Bool(true)),
                "false" | "0" | "no" => Some(Self::Bool(false)),
                _ => None,
            },

            (Self::Bool(b), Kind::Str) => Some(Self::Str(b.to_string())),
            (Self::Int(i), Kind::Str) => Some(Self::Str(i.to_string())),
            (Self::Float(x), Kind::Str) => Some(Self::Str(x.to_string())),
            (Self::DateTime(t), Kind::Str) => Some(Self::Str(t.to_string())),
            (Self::Callable(a), Kind::Str) => Some(Self::Str(a.name().to_string())),

            (Self::Int(_) | Self::Float(_), Kind::List) => {
                self.as_float().map(|x| Self::List(vec![x]))
            }
            (Self::Array(a), Kind::List) => Some(Self::List(a.to_vec())),
            (Self::Series(s), Kind::List) => Some(Self::List(s.values().to_vec())),

            (Self::List(v), Kind::Array) => Some(Self::Array(Array1::from(v.clone()))),
            (Self::Series(s), Kind::Array) => Some(Self::Array(Array1::from(s.values().to_vec()))),
            (Self::Matrix(m), Kind::Array) if m.ncols() == 1 => {
                Some(Self::Array(m.column(0).to_owned()))
            }

            (Self::List(v), Kind::Matrix) => {
                Array2::from_shape_vec((v.len(), 1), v.clone()).ok().map(Self::Matrix)
            }
            (Self::Array(a), Kind::Matrix) => a
                .clone()
                .into_shape((a.len(), 1))
                .ok()
                .map(Self::Matrix),
            (Self::Frame(f), Kind::Matrix) => Some(Self::Matrix(f.to_array2())),

            (Self::List(v), Kind::Series) => Some(Self::Series(TimeSeries::from_values(v.clone()))),
            (Self::Array(a), Kind::Series) => Some(Self::Series(TimeSeries::from_values(a.to_vec()))),
            (Self::Frame(f), Kind::Series) if f.n_columns() == 1 => {
                f.column_at(0).and_then(|(name, _)| f.series(name)).map(Self::Series)
            }

            (Self::Series(s), Kind::Frame) => Some(Self::Frame(TimeFrame::from(s.clone()))),

            (Self::Str(s), Kind::DateTime) => parse_datetime(s).map(Self::DateTime),
            (Self::Str(s), Kind::Callable) => s.parse().ok().map(Self::Callable),

            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&TimeSeries> {
        match self {
            Self::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&TimeFrame> {
        match self {
            Self::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Self::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Aggregation from a callable or a function name
    pub fn as_aggregation(&self) -> Option<Aggregation> {
        match self {
            Self::Callable(a) => Some(a.clone()),
            Self::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// One-dimensional numeric data from a list, array or series
    pub fn to_vec(&self) -> Option<Vec<f64>> {
        match self {
            Self::List(v) => Some(v.clone()),
            Self::Array(a) => Some(a.to_vec()),
            Self::Series(s) => Some(s.values().to_vec()),
            _ => None,
        }
    }
}

/// Parse `YYYYMMDD`, `YYYYMMDDhhmmss`, ISO date or ISO date-time strings
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const FORMATS: [&str; 4] = [
        "%Y%m%d%H%M%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            ["%Y%m%d", "%Y-%m-%d"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::List(v)
    }
}

impl From<Array1<f64>> for Value {
    fn from(v: Array1<f64>) -> Self {
        Self::Array(v)
    }
}

impl From<Array2<f64>> for Value {
    fn from(v: Array2<f64>) -> Self {
        Self::Matrix(v)
    }
}

impl From<TimeSeries> for Value {
    fn from(v: TimeSeries) -> Self {
        Self::Series(v)
    }
}

impl From<TimeFrame> for Value {
    fn from(v: TimeFrame) -> Self {
        Self::Frame(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Aggregation> for Value {
    fn from(v: Aggregation) -> Self {
        Self::Callable(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
