//! Type specifications and the `accept`/`enforce` checks

use std::collections::BTreeMap;

use tracing::debug;

use super::value::{Kind, Value};
use crate::{Error, Result};

/// Declared parameter order of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    function: String,
    params: Vec<String>,
}

impl Signature {
    pub fn new<I, S>(function: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Position of `name` in the parameter list
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// Allowed runtime types for one argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    kinds: Vec<Kind>,
    nullable: bool,
    callable: bool,
}

impl TypeSpec {
    /// Exactly one kind
    pub fn of(kind: Kind) -> Self {
        Self::any_of([kind])
    }

    /// Any of the listed kinds
    pub fn any_of(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            nullable: false,
            callable: false,
        }
    }

    /// Only callables
    pub fn callable() -> Self {
        Self {
            kinds: Vec::new(),
            nullable: false,
            callable: true,
        }
    }

    /// Additionally accept `Null`
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Additionally accept callables
    pub fn or_callable(mut self) -> Self {
        self.callable = true;
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether `value` satisfies this specification
    pub fn check(&self, value: &Value) -> bool {
        let kind = value.kind();
        match kind {
            Kind::Null => self.nullable || self.kinds.contains(&Kind::Null),
            Kind::Callable if self.callable => true,
            _ => self.kinds.contains(&kind),
        }
    }

    /// Human readable form, e.g. `(int, float, None)`
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = self.kinds.iter().map(Kind::name).collect();
        if self.callable {
            names.push("callable");
        }
        if self.nullable && !self.kinds.contains(&Kind::Null) {
            names.push("None");
        }
        format!("({})", names.join(", "))
    }
}

impl From<Kind> for TypeSpec {
    fn from(kind: Kind) -> Self {
        Self::of(kind)
    }
}

/// Ordered mapping from parameter name to its [`TypeSpec`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSpec {
    entries: Vec<(String, TypeSpec)>,
}

impl ParamSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        self.entries.push((name.into(), spec.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered mapping from parameter name to the kind it should be coerced to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastSpec {
    entries: Vec<(String, Kind)>,
}

impl CastSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, kind: Kind) -> Self {
        self.entries.push((name.into(), kind));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Kind)> {
        self.entries.iter().map(|(n, k)| (n.as_str(), *k))
    }
}

/// Arguments of one call: positional values plus keyword values
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Resolve `name`: keyword first, then its position in `signature`.
    ///
    /// `None` means the caller relies on the default.
    pub fn get(&self, signature: &Signature, name: &str) -> Option<&Value> {
        self.keyword.get(name).or_else(|| {
            signature
                .position(name)
                .and_then(|pos| self.positional.get(pos))
        })
    }

    /// Like [`get`](Self::get), treating an explicit `Null` as absent
    pub fn get_some(&self, signature: &Signature, name: &str) -> Option<&Value> {
        self.get(signature, name).filter(|v| !v.is_null())
    }

    fn get_mut(&mut self, signature: &Signature, name: &str) -> Option<&mut Value> {
        if self.keyword.contains_key(name) {
            return self.keyword.get_mut(name);
        }
        let pos = signature.position(name)?;
        self.positional.get_mut(pos)
    }
}

/// Check every argument named in `spec` against its allowed kinds.
///
/// Arguments that were not supplied are skipped. The first mismatch is
/// returned as [`Error::TypeMismatch`].
pub fn accept(signature: &Signature, spec: &ParamSpec, args: &CallArgs) -> Result<()> {
    for (name, type_spec) in spec.iter() {
        if !signature.contains(name) {
            return Err(Error::UnknownArgument {
                function: signature.function().to_string(),
                argument: name.to_string(),
            });
        }
        let Some(value) = args.get(signature, name) else {
            continue;
        };
        if !type_spec.check(value) {
            return Err(Error::TypeMismatch {
                function: signature.function().to_string(),
                argument: name.to_string(),
                actual: value.kind().name().to_string(),
                expected: type_spec.describe(),
            });
        }
    }
    Ok(())
}

/// Best-effort coercion of the arguments named in `casts`.
///
/// A value that cannot be converted is kept as it was; this never fails.
pub fn enforce(signature: &Signature, casts: &CastSpec, mut args: CallArgs) -> CallArgs {
    for (name, kind) in casts.iter() {
        let Some(value) = args.get_mut(signature, name) else {
            continue;
        };
        if value.kind() == kind {
            continue;
        }
        match value.cast(kind) {
            Some(cast) => *value = cast,
            None => debug!(
                function = signature.function(),
                argument = name,
                from = value.kind().name(),
                to = kind.name(),
                "coercion failed, keeping original value"
            ),
        }
    }
    args
}
