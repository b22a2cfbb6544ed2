//! Named tools with dynamically typed arguments
//!
//! Every built-in tool wraps one typed hydrobox function in the argument
//! validator: arguments are first coerced ([`Enforce`]) and then checked
//! ([`Accept`]) before the function runs. Tools that can plot take a `plot`
//! flag and render through the process-wide backend.
//!
//! ```rust
//! use hydrobox::toolbox::{Output, Toolbox};
//! use hydrobox::validate::CallArgs;
//!
//! let toolbox = Toolbox::builtin();
//! let out = toolbox
//!     .call("richards_baker", CallArgs::new().arg(vec![1.0, 3.0, 2.0]))
//!     .unwrap();
//! assert!(matches!(out, Output::Float(x) if x > 0.0));
//!
//! // "3" is not a list, array or series
//! assert!(toolbox.call("richards_baker", CallArgs::new().arg("3")).is_err());
//! ```
//!
//! [`Enforce`]: hydrobox_core::validate::Enforce
//! [`Accept`]: hydrobox_core::validate::Accept

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use tracing::debug;

use hydrobox_core::validate::{CallArgs, CastSpec, FnTool, Kind, ParamSpec, Signature, Tool, ToolExt, TypeSpec, Value};
use hydrobox_core::{Aggregation, Error as CoreError, TimeFrame, TimeSeries};
use hydrobox_discharge::{Percentiles, RegimeOptions};
use hydrobox_geostat::{Estimator, Maxlag, Model, VariogramConfig, VariogramDescription, VariogramPlotType};
use hydrobox_plotting::{plotting_backend, Backend, Figure, PlotContext, PlotOptions};
use hydrobox_preprocessing::Bound;
use hydrobox_signal::SimplifyOptions;
use hydrobox_stats::{LinearRegression, WindowType};

use crate::{Error, Result};

/// Result of a dynamic tool call
#[derive(Debug)]
pub enum Output {
    Float(f64),
    Values(Vec<f64>),
    Matrix(Array2<f64>),
    Series(TimeSeries),
    Frame(TimeFrame),
    Regression(LinearRegression),
    Variogram(VariogramDescription),
    Backend(Backend),
    Figure(Figure),
    Figures(Vec<Figure>),
}

impl Output {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
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

    pub fn as_figure(&self) -> Option<&Figure> {
        match self {
            Self::Figure(f) => Some(f),
            _ => None,
        }
    }
}

/// A tool as stored in a [`Toolbox`]
pub type DynTool = Box<dyn Tool<Output = Output, Error = Error> + Send + Sync>;

/// Arguments of one call, resolved against the tool signature
struct Args<'a> {
    signature: &'a Signature,
    args: &'a CallArgs,
}

impl<'a> Args<'a> {
    fn new(signature: &'a Signature, args: &'a CallArgs) -> Self {
        Self { signature, args }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.args.get_some(self.signature, name)
    }

    fn mismatch(&self, name: &str, value: &Value, expected: &str) -> Error {
        CoreError::TypeMismatch {
            function: self.signature.function().to_string(),
            argument: name.to_string(),
            actual: value.kind().name().to_string(),
            expected: expected.to_string(),
        }
        .into()
    }

    fn required(&self, name: &str) -> Result<&'a Value> {
        self.get(name).ok_or_else(|| {
            CoreError::InvalidParameter(format!("{}(...): arg {name} is required", self.signature.function()))
                .into()
        })
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    fn float(&self, name: &str, default: f64) -> f64 {
        self.get(name).and_then(Value::as_float).unwrap_or(default)
    }

    fn size(&self, name: &str) -> Result<Option<usize>> {
        self.get(name)
            .map(|v| match v.as_int() {
                Some(i) if i >= 0 => Ok(i as usize),
                _ => Err(self.mismatch(name, v, "a non-negative int")),
            })
            .transpose()
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        Error: From<T::Err>,
    {
        self.get(name)
            .map(|v| match v.as_str() {
                Some(s) => Ok(s.parse::<T>()?),
                None => Err(self.mismatch(name, v, "str")),
            })
            .transpose()
    }

    fn values(&self, name: &str) -> Result<Vec<f64>> {
        let v = self.required(name)?;
        v.to_vec().ok_or_else(|| self.mismatch(name, v, "list, ndarray or Series"))
    }

    fn series(&self, name: &str) -> Result<&'a TimeSeries> {
        let v = self.required(name)?;
        v.as_series().ok_or_else(|| self.mismatch(name, v, "Series"))
    }

    fn aggregation(&self, name: &str, default: Aggregation) -> Result<Aggregation> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Str(s)) => Ok(s.parse()?),
            Some(v) => v.as_aggregation().ok_or_else(|| self.mismatch(name, v, "str or callable")),
        }
    }

    fn bound(&self, name: &str) -> Option<Bound> {
        self.get(name).and_then(|v| match v {
            Value::DateTime(t) => Some(Bound::At(*t)),
            Value::Str(s) => Some(Bound::Str(s.clone())),
            _ => None,
        })
    }
}

fn tool<F>(function: &str, params: &[&str], func: F) -> FnTool<F, Output, Error>
where
    F: Fn(&Signature, CallArgs) -> Result<Output>,
{
    FnTool::new(Signature::new(function, params.iter().copied()), func)
}

fn one_dimensional() -> TypeSpec {
    TypeSpec::any_of([Kind::List, Kind::Array, Kind::Series])
}

fn context() -> Result<(PlotContext, PlotOptions)> {
    Ok((PlotContext::current()?, PlotOptions::default()))
}

fn flow_duration_curve_tool() -> DynTool {
    let tool = tool("flow_duration_curve", &["x", "non_exceeding", "log", "plot"], |sig, args| {
        let a = Args::new(sig, &args);
        let non_exceeding = a.flag("non_exceeding", true);
        let plot = a.flag("plot", false);
        let x = a.required("x")?;

        if let Some(matrix) = x.as_matrix().cloned().or_else(|| x.as_frame().map(TimeFrame::to_array2)) {
            if plot {
                let (ctx, options) = context()?;
                let figure = hydrobox_discharge::plot_flow_duration_curves(
                    matrix.view(),
                    non_exceeding,
                    a.flag("log", false),
                    &ctx,
                    &options,
                )?;
                return Ok(Output::Figure(figure));
            }
            return Ok(Output::Matrix(hydrobox_discharge::flow_duration_curves(
                matrix.view(),
                non_exceeding,
            )?));
        }

        let x = a.values("x")?;
        if plot {
            let (ctx, options) = context()?;
            let figure =
                hydrobox_discharge::plot_flow_duration_curve(&x, non_exceeding, a.flag("log", false), &ctx, &options)?;
            return Ok(Output::Figure(figure));
        }
        let curve = hydrobox_discharge::flow_duration_curve(&x, non_exceeding)?;
        Ok(Output::Frame(TimeFrame::from_columns(vec![
            ("probability", curve.probability),
            ("discharge", curve.discharge),
        ])?))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("x", TypeSpec::any_of([Kind::List, Kind::Array, Kind::Matrix, Kind::Series, Kind::Frame]))
                .param("non_exceeding", Kind::Bool)
                .param("log", Kind::Bool)
                .param("plot", Kind::Bool),
        )
        .enforce(
            CastSpec::new()
                .param("non_exceeding", Kind::Bool)
                .param("log", Kind::Bool)
                .param("plot", Kind::Bool),
        ),
    )
}

fn regime_tool() -> DynTool {
    let tool = tool("regime", &["x", "percentiles", "normalize", "agg", "plot"], |sig, args| {
        let a = Args::new(sig, &args);
        let x = a.series("x")?;
        let mut options = RegimeOptions::default()
            .with_normalize(a.flag("normalize", false))
            .with_agg(a.aggregation("agg", Aggregation::NanMedian)?);
        match a.get("percentiles") {
            Some(Value::Int(n)) => {
                let n = usize::try_from(*n).map_err(|_| {
                    CoreError::InvalidParameter(format!("regime(...): arg percentiles: {n} is negative"))
                })?;
                options = options.with_percentiles(Percentiles::Count(n));
            }
            Some(v) => {
                if let Some(list) = v.to_vec() {
                    options = options.with_percentiles(Percentiles::List(list));
                }
            }
            None => {}
        }

        if a.flag("plot", false) {
            let (ctx, plot_options) = context()?;
            return Ok(Output::Figure(hydrobox_discharge::plot_regime(x, &options, &ctx, &plot_options)?));
        }
        let table = hydrobox_discharge::regime(x, &options)?;
        let months: Vec<f64> = table.months.iter().map(|m| f64::from(*m)).collect();
        let columns: Vec<(String, Vec<f64>)> =
            std::iter::once(("month".to_string(), months)).chain(table.columns).collect();
        Ok(Output::Frame(TimeFrame::from_columns(columns)?))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("x", Kind::Series)
                .param("percentiles", TypeSpec::any_of([Kind::Int, Kind::List, Kind::Array]).nullable())
                .param("normalize", Kind::Bool)
                .param("agg", TypeSpec::of(Kind::Str).or_callable())
                .param("plot", Kind::Bool),
        )
        .enforce(CastSpec::new().param("normalize", Kind::Bool).param("plot", Kind::Bool)),
    )
}

fn richards_baker_tool() -> DynTool {
    let tool = tool("richards_baker", &["x"], |sig, args| {
        let x = Args::new(sig, &args).values("x")?;
        Ok(Output::Float(hydrobox_discharge::richards_baker(&x)?))
    });
    Box::new(tool.accept(ParamSpec::new().param("x", one_dimensional())))
}

fn simplify_tool() -> DynTool {
    let tool = tool("simplify", &["x", "flatten", "threshold"], |sig, args| {
        let a = Args::new(sig, &args);
        let options = SimplifyOptions::default()
            .with_flatten(a.flag("flatten", true))
            .with_threshold(a.float("threshold", 0.0));
        Ok(Output::Values(hydrobox_signal::simplify(&a.values("x")?, &options)?))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("x", one_dimensional())
                .param("flatten", Kind::Bool)
                .param("threshold", Kind::Float),
        )
        .enforce(CastSpec::new().param("threshold", Kind::Float)),
    )
}

fn aggregate_tool() -> DynTool {
    let tool = tool("aggregate", &["x", "by", "agg"], |sig, args| {
        let a = Args::new(sig, &args);
        let by = a.required("by")?;
        let by = by.as_str().ok_or_else(|| a.mismatch("by", by, "str"))?;
        let agg = a.aggregation("agg", Aggregation::Mean)?;
        Ok(Output::Series(hydrobox_preprocessing::aggregate(a.series("x")?, by, &agg)?))
    });
    Box::new(tool.accept(
        ParamSpec::new()
            .param("x", Kind::Series)
            .param("by", Kind::Str)
            .param("agg", TypeSpec::of(Kind::Str).or_callable()),
    ))
}

fn cut_tool() -> DynTool {
    let tool = tool("cut", &["x", "start", "stop"], |sig, args| {
        let a = Args::new(sig, &args);
        let out = hydrobox_preprocessing::cut(a.series("x")?, a.bound("start"), a.bound("stop"))?;
        Ok(Output::Series(out))
    });
    let bound = || TypeSpec::any_of([Kind::Str, Kind::DateTime]).nullable();
    Box::new(tool.accept(
        ParamSpec::new()
            .param("x", Kind::Series)
            .param("start", bound())
            .param("stop", bound()),
    ))
}

fn moving_window_tool() -> DynTool {
    let tool = tool("moving_window", &["x", "window_size", "window_type", "func"], |sig, args| {
        let a = Args::new(sig, &args);
        let window_size = a.size("window_size")?.unwrap_or(5);
        let window_type = a.parse::<WindowType>("window_type")?;
        let func = a.aggregation("func", Aggregation::NanMean)?;
        let out = hydrobox_stats::moving_window(a.series("x")?, window_size, window_type, &func)?;
        Ok(Output::Series(out))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("x", Kind::Series)
                .param("window_size", Kind::Int)
                .param("window_type", TypeSpec::of(Kind::Str).nullable())
                .param("func", TypeSpec::of(Kind::Str).or_callable()),
        )
        .enforce(CastSpec::new().param("window_size", Kind::Int)),
    )
}

fn linear_regression_tool() -> DynTool {
    let tool = tool("linear_regression", &["x", "plot"], |sig, args| {
        let a = Args::new(sig, &args);
        let x = a.required("x")?;
        let frame = x.as_frame().ok_or_else(|| a.mismatch("x", x, "DataFrame"))?;
        if a.flag("plot", false) {
            let (ctx, options) = context()?;
            return Ok(Output::Figures(hydrobox_stats::plot_regression_grid(frame, &ctx, &options)?));
        }
        Ok(Output::Regression(hydrobox_stats::linear_regression(frame)?))
    });
    Box::new(
        tool.accept(ParamSpec::new().param("x", Kind::Frame).param("plot", Kind::Bool))
            .enforce(CastSpec::new().param("plot", Kind::Bool)),
    )
}

fn gamma_series_tool() -> DynTool {
    let tool = tool("gamma_series", &["shape", "scale", "size", "seed"], |sig, args| {
        let a = Args::new(sig, &args);
        let size = a.size("size")?.unwrap_or(100);
        let seed = a.size("seed")?.map(|s| s as u64);
        let values = hydrobox_sample::gamma_series(a.float("shape", 2.0), a.float("scale", 1.0), size, seed)?;
        Ok(Output::Values(values))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("shape", Kind::Float)
                .param("scale", Kind::Float)
                .param("size", Kind::Int)
                .param("seed", TypeSpec::of(Kind::Int).nullable()),
        )
        .enforce(CastSpec::new().param("shape", Kind::Float).param("scale", Kind::Float)),
    )
}

fn variogram_tool() -> DynTool {
    let params = [
        "coordinates",
        "values",
        "model",
        "estimator",
        "n_lags",
        "maxlag",
        "use_nugget",
        "plot",
    ];
    let tool = tool("variogram", &params, |sig, args| {
        let a = Args::new(sig, &args);
        let coordinates = a.required("coordinates")?;
        let coordinates = coordinates
            .as_matrix()
            .ok_or_else(|| a.mismatch("coordinates", coordinates, "ndarray2"))?;
        let values = a.values("values")?;

        let mut config = VariogramConfig::default().with_nugget(a.flag("use_nugget", false));
        if let Some(model) = a.parse::<Model>("model")? {
            config = config.with_model(model);
        }
        if let Some(estimator) = a.parse::<Estimator>("estimator")? {
            config = config.with_estimator(estimator);
        }
        if let Some(n_lags) = a.size("n_lags")? {
            config = config.with_n_lags(n_lags);
        }
        match a.get("maxlag") {
            Some(Value::Str(s)) => config = config.with_maxlag(s.parse::<Maxlag>()?),
            Some(v) => {
                if let Some(x) = v.as_float() {
                    config = config.with_maxlag(x.to_string().parse::<Maxlag>()?);
                }
            }
            None => {}
        }

        let v = hydrobox_geostat::variogram(coordinates.view(), &values, config)?;
        debug!(model = %v.model(), rmse = v.rmse(), "variogram fitted");
        if a.flag("plot", false) {
            let (ctx, options) = context()?;
            let figure = hydrobox_geostat::plot_variogram(&v, VariogramPlotType::Plot, &ctx, &options)?;
            return Ok(Output::Figure(figure));
        }
        Ok(Output::Variogram(v.describe()))
    });
    Box::new(
        tool.accept(
            ParamSpec::new()
                .param("coordinates", Kind::Matrix)
                .param("values", one_dimensional())
                .param("model", Kind::Str)
                .param("estimator", Kind::Str)
                .param("n_lags", Kind::Int)
                .param("maxlag", TypeSpec::any_of([Kind::Str, Kind::Float, Kind::Int]).nullable())
                .param("use_nugget", Kind::Bool)
                .param("plot", Kind::Bool),
        )
        .enforce(
            CastSpec::new()
                .param("coordinates", Kind::Matrix)
                .param("n_lags", Kind::Int)
                .param("use_nugget", Kind::Bool)
                .param("plot", Kind::Bool),
        ),
    )
}

fn plotting_backend_tool() -> DynTool {
    let tool = tool("plotting_backend", &["backend"], |sig, args| {
        let name = Args::new(sig, &args).get("backend").and_then(Value::as_str);
        Ok(Output::Backend(plotting_backend(name)?))
    });
    Box::new(tool.accept(ParamSpec::new().param("backend", TypeSpec::of(Kind::Str).nullable())))
}

/// Registry of named tools
#[derive(Default)]
pub struct Toolbox {
    tools: BTreeMap<String, DynTool>,
}

impl Toolbox {
    /// Empty toolbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Toolbox with every built-in tool
    pub fn builtin() -> Self {
        [
            flow_duration_curve_tool(),
            regime_tool(),
            richards_baker_tool(),
            simplify_tool(),
            aggregate_tool(),
            cut_tool(),
            moving_window_tool(),
            linear_regression_tool(),
            gamma_series_tool(),
            variogram_tool(),
            plotting_backend_tool(),
        ]
        .into_iter()
        .fold(Self::new(), |toolbox, tool| toolbox.with_boxed(tool))
    }

    fn with_boxed(mut self, tool: DynTool) -> Self {
        self.tools.insert(tool.signature().function().to_string(), tool);
        self
    }

    /// Add `tool` under its signature's function name, replacing any tool
    /// of the same name
    pub fn with_tool<T>(self, tool: T) -> Self
    where
        T: Tool<Output = Output, Error = Error> + Send + Sync + 'static,
    {
        self.with_boxed(Box::new(tool))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&DynTool> {
        self.tools.get(name)
    }

    /// Call the tool `name` with `args`
    pub fn call(&self, name: &str, args: CallArgs) -> Result<Output> {
        let tool = self.get(name).ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        debug!(tool = name, "calling tool");
        tool.call(args)
    }
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbox").field("tools", &self.tools.keys().collect::<Vec<_>>()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let toolbox = Toolbox::builtin();
        let names: Vec<&str> = toolbox.names().collect();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"variogram"));
        assert!(matches!(
            toolbox.call("hydrograph", CallArgs::new()),
            Err(Error::UnknownTool(name)) if name == "hydrograph"
        ));
    }

    #[test]
    fn test_simplify_coerces_threshold() {
        let toolbox = Toolbox::builtin();
        let args = CallArgs::new().arg(vec![1.0, 1.0, 2.0, 5.0, 5.0]).kwarg("threshold", "1.5");
        match toolbox.call("simplify", args).unwrap() {
            Output::Values(v) => assert_eq!(v, vec![1.0, 5.0]),
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_argument() {
        let err = Toolbox::builtin().call("richards_baker", CallArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: richards_baker(...): arg x is required");
    }

    #[test]
    fn test_backend_must_be_a_string() {
        let err = Toolbox::builtin()
            .call("plotting_backend", CallArgs::new().arg(3))
            .unwrap_err();
        assert!(matches!(err, Error::Core(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn test_custom_tool() {
        let double = tool("double", &["x"], |sig, args| {
            Ok(Output::Float(Args::new(sig, &args).float("x", 0.0) * 2.0))
        });
        let toolbox = Toolbox::new().with_tool(double.accept(ParamSpec::new().param("x", Kind::Float)));
        assert_eq!(toolbox.call("double", CallArgs::new().arg(2.5)).unwrap().as_float(), Some(5.0));
        assert!(toolbox.call("double", CallArgs::new().arg("2.5")).is_err());
    }
}
