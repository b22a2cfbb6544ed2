//! Integration tests for argument validation across wrapped tools

use hydrobox_core::validate::{
    CallArgs, CastSpec, FnTool, Kind, ParamSpec, Signature, Tool, ToolExt, TypeSpec, Value,
};
use hydrobox_core::{Error, Result};
use proptest::prelude::*;

fn echo_tool() -> impl Tool<Output = Option<Value>, Error = Error> {
    FnTool::new(
        Signature::new("echo", ["data", "window", "label"]),
        |sig: &Signature, args: CallArgs| -> Result<Option<Value>> {
            Ok(args.get(sig, "window").cloned())
        },
    )
}

#[test]
fn nullable_spec_accepts_missing_and_null() {
    let tool = echo_tool().accept(
        ParamSpec::new().param("window", TypeSpec::any_of([Kind::Int, Kind::Float]).nullable()),
    );

    assert!(tool.call(CallArgs::new().arg(vec![1.0])).is_ok());
    assert!(tool.call(CallArgs::new().arg(vec![1.0]).arg(Value::Null)).is_ok());
    assert!(tool
        .call(CallArgs::new().kwarg("window", Value::Null))
        .is_ok());
}

#[test]
fn non_nullable_spec_rejects_null() {
    let tool = echo_tool().accept(ParamSpec::new().param("window", Kind::Int));
    let err = tool
        .call(CallArgs::new().arg(vec![1.0]).arg(Value::Null))
        .unwrap_err();
    match err {
        Error::TypeMismatch {
            function,
            argument,
            actual,
            expected,
        } => {
            assert_eq!(function, "echo");
            assert_eq!(argument, "window");
            assert_eq!(actual, "None");
            assert_eq!(expected, "(int)");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn three_layers_resolve_against_innermost_signature() {
    let tool = echo_tool()
        .accept(ParamSpec::new().param("label", Kind::Str))
        .enforce(CastSpec::new().param("window", Kind::Int))
        .accept(ParamSpec::new().param("window", TypeSpec::of(Kind::Str).nullable()));

    assert_eq!(tool.signature().function(), "echo");
    let out = tool
        .call(CallArgs::new().arg(vec![1.0]).arg("7").arg("q"))
        .unwrap();
    assert!(matches!(out, Some(Value::Int(7))));

    // the innermost layer still sees `label` at position 2
    let err = tool
        .call(CallArgs::new().arg(vec![1.0]).arg("7").arg(3))
        .unwrap_err();
    assert!(err.to_string().contains("arg label"));
}

proptest! {
    #[test]
    fn enforce_never_fails(text in "\\PC*") {
        let tool = echo_tool().enforce(CastSpec::new().param("window", Kind::Float));
        let out = tool.call(CallArgs::new().kwarg("window", text.clone())).unwrap();
        match out {
            Some(Value::Float(_)) => prop_assert!(text.trim().parse::<f64>().is_ok()),
            Some(Value::Str(s)) => prop_assert_eq!(s, text),
            other => prop_assert!(false, "unexpected value {:?}", other),
        }
    }

    #[test]
    fn average_ranks_sum_is_triangular(values in proptest::collection::vec(-100i32..100, 1..50)) {
        let data: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
        let ranks = hydrobox_core::numeric::average_ranks(&data);
        let n = data.len() as f64;
        prop_assert!((ranks.iter().sum::<f64>() - n * (n + 1.0) / 2.0).abs() < 1e-9);
    }
}
