//! Runtime argument validation
//!
//! Tools declare their parameter order with a [`Signature`]. An [`Accept`]
//! layer checks supplied arguments against a [`ParamSpec`] and fails hard;
//! an [`Enforce`] layer coerces arguments with [`Value::cast`] and keeps the
//! original value when a conversion is impossible. Layers forward the
//! signature of the tool they wrap, so positional arguments always resolve
//! against the innermost function.
//!
//! ```
//! use hydrobox_core::validate::{CallArgs, FnTool, Kind, ParamSpec, Signature, Tool, ToolExt, TypeSpec, Value};
//! use hydrobox_core::{Error, Result};
//!
//! let tool = FnTool::new(Signature::new("double", ["x"]), |sig: &Signature, args: CallArgs| -> Result<f64> {
//!     Ok(2.0 * args.get(sig, "x").and_then(Value::as_float).unwrap_or_default())
//! })
//! .accept(ParamSpec::new().param("x", TypeSpec::of(Kind::Float)));
//!
//! assert_eq!(tool.call(CallArgs::new().arg(1.5)).unwrap(), 3.0);
//! assert!(matches!(tool.call(CallArgs::new().arg("1.5")), Err(Error::TypeMismatch { .. })));
//! ```

mod spec;
mod tool;
mod value;

pub use spec::{accept, enforce, CallArgs, CastSpec, ParamSpec, Signature, TypeSpec};
pub use tool::{Accept, Enforce, FnTool, Tool, ToolExt};
pub use value::{parse_datetime, Kind, Value};
