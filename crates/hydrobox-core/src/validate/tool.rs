//! Callable tools and the validating wrappers around them

use std::marker::PhantomData;

use super::spec::{accept, enforce, CallArgs, CastSpec, ParamSpec, Signature};
use crate::Error;

/// A function invoked with dynamically typed arguments
pub trait Tool {
    type Output;
    type Error: From<Error>;

    /// Parameter order of the wrapped function
    fn signature(&self) -> &Signature;

    fn call(&self, args: CallArgs) -> Result<Self::Output, Self::Error>;
}

/// Rejects calls whose arguments do not match a [`ParamSpec`]
#[derive(Debug, Clone)]
pub struct Accept<T> {
    inner: T,
    spec: ParamSpec,
}

impl<T: Tool> Accept<T> {
    pub fn new(inner: T, spec: ParamSpec) -> Self {
        Self { inner, spec }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Tool> Tool for Accept<T> {
    type Output = T::Output;
    type Error = T::Error;

    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, args: CallArgs) -> Result<Self::Output, Self::Error> {
        accept(self.signature(), &self.spec, &args)?;
        self.inner.call(args)
    }
}

/// Coerces arguments according to a [`CastSpec`] before calling
#[derive(Debug, Clone)]
pub struct Enforce<T> {
    inner: T,
    casts: CastSpec,
}

impl<T: Tool> Enforce<T> {
    pub fn new(inner: T, casts: CastSpec) -> Self {
        Self { inner, casts }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Tool> Tool for Enforce<T> {
    type Output = T::Output;
    type Error = T::Error;

    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, args: CallArgs) -> Result<Self::Output, Self::Error> {
        let args = enforce(self.signature(), &self.casts, args);
        self.inner.call(args)
    }
}

/// A closure with an explicit signature
pub struct FnTool<F, O, E> {
    signature: Signature,
    func: F,
    _marker: PhantomData<fn() -> (O, E)>,
}

impl<F, O, E> FnTool<F, O, E>
where
    F: Fn(&Signature, CallArgs) -> Result<O, E>,
    E: From<Error>,
{
    pub fn new(signature: Signature, func: F) -> Self {
        Self {
            signature,
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, O, E> Tool for FnTool<F, O, E>
where
    F: Fn(&Signature, CallArgs) -> Result<O, E>,
    E: From<Error>,
{
    type Output = O;
    type Error = E;

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: CallArgs) -> Result<O, E> {
        (self.func)(&self.signature, args)
    }
}

/// Builder-style wrapping of any [`Tool`]
pub trait ToolExt: Tool + Sized {
    fn accept(self, spec: ParamSpec) -> Accept<Self> {
        Accept::new(self, spec)
    }

    fn enforce(self, casts: CastSpec) -> Enforce<Self> {
        Enforce::new(self, casts)
    }
}

impl<T: Tool> ToolExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{Kind, TypeSpec, Value};
    use crate::Result;

    fn scale_tool() -> impl Tool<Output = f64, Error = Error> {
        FnTool::new(
            Signature::new("scale", ["x", "factor", "offset"]),
            |sig: &Signature, args: CallArgs| -> Result<f64> {
                let x = args.get(sig, "x").and_then(Value::as_float).unwrap_or(0.0);
                let factor = args.get(sig, "factor").and_then(Value::as_float).unwrap_or(1.0);
                Ok(x * factor)
            },
        )
    }

    #[test]
    fn test_stacked_wrappers_use_innermost_signature() {
        let tool = scale_tool()
            .enforce(CastSpec::new().param("factor", Kind::Float))
            .accept(ParamSpec::new().param("factor", TypeSpec::of(Kind::Float)));

        assert_eq!(tool.signature().params(), &["x", "factor", "offset"]);
        // position 1 resolves to `factor` through both layers
        let args = CallArgs::new().arg(2.0).arg(3.0);
        assert_eq!(tool.call(args).unwrap(), 6.0);

        let args = CallArgs::new().arg(2.0).arg("three");
        assert!(matches!(tool.call(args), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_enforce_inside_accept_order() {
        // accept checks first, so an int factor is rejected before coercion
        let strict = scale_tool()
            .enforce(CastSpec::new().param("factor", Kind::Float))
            .accept(ParamSpec::new().param("factor", Kind::Float));
        assert!(strict.call(CallArgs::new().arg(1.0).arg(2)).is_err());

        // coercion outside the check makes the same call pass
        let lenient = scale_tool()
            .accept(ParamSpec::new().param("factor", Kind::Float))
            .enforce(CastSpec::new().param("factor", Kind::Float));
        assert_eq!(lenient.call(CallArgs::new().arg(1.0).arg(2)).unwrap(), 2.0);
    }
}
