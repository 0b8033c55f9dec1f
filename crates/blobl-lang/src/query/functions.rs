use compact_str::CompactString;
use smallvec::SmallVec;
use thiserror::Error;

use crate::number::Number;
use crate::query::context::Context;
use crate::query::error::EvalError;
use crate::query::{EvalResult, Function, Parsed};
use crate::value::{Object, Value};

/// A failed function-call resolution, surfaced as a hard parse failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum FunctionError {
    #[error("unrecognised function \"{0}\"")]
    Unknown(CompactString),
    #[error("invalid arguments for function \"{name}\": expected {expected}")]
    BadArguments {
        name: CompactString,
        expected: &'static str,
    },
}

/// Resolves a function call at parse time. Builtins take literal arguments
/// only; a dynamic argument is rejected here rather than deferred.
pub(crate) fn resolve(name: &str, args: Vec<Parsed>) -> Result<Box<dyn Function>, FunctionError> {
    let mut values: SmallVec<[Value; 2]> = SmallVec::with_capacity(args.len());
    for arg in args {
        match arg {
            Parsed::Static(value) => values.push(value),
            Parsed::Dynamic(_) => {
                return Err(FunctionError::BadArguments {
                    name: name.into(),
                    expected: "literal arguments",
                });
            }
        }
    }

    match name {
        "content" => no_args(name, &values).map(|_| boxed(Content)),
        "json" => optional_string_arg(name, values).map(|path| boxed(Json::new(path))),
        "meta" => optional_string_arg(name, values).map(|key| {
            boxed(Meta {
                key: key.map(CompactString::from),
            })
        }),
        "batch_index" => no_args(name, &values).map(|_| boxed(BatchIndex)),
        "timestamp_unix" => no_args(name, &values).map(|_| boxed(TimestampUnix)),
        _ => Err(FunctionError::Unknown(name.into())),
    }
}

fn boxed(function: impl Function + 'static) -> Box<dyn Function> {
    Box::new(function)
}

fn no_args(name: &str, values: &[Value]) -> Result<(), FunctionError> {
    if values.is_empty() {
        Ok(())
    } else {
        Err(FunctionError::BadArguments {
            name: name.into(),
            expected: "no arguments",
        })
    }
}

fn optional_string_arg(
    name: &str,
    values: SmallVec<[Value; 2]>,
) -> Result<Option<String>, FunctionError> {
    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (None, _) => Ok(None),
        (Some(Value::String(s)), None) => Ok(Some(s)),
        _ => Err(FunctionError::BadArguments {
            name: name.into(),
            expected: "at most one string argument",
        }),
    }
}

/// `content()`: the message payload rendered as text.
#[derive(Debug)]
struct Content;

impl Function for Content {
    fn exec(&self, ctx: &Context) -> EvalResult {
        match ctx.value() {
            Some(value) => EvalResult::Value(Value::String(value.to_string())),
            None => EvalResult::Error(EvalError::NoInput),
        }
    }
}

/// `json()` / `json("dot.path")`: payload lookup by dot path. Numeric
/// segments index arrays. A missing path recovers with `null`.
#[derive(Debug)]
struct Json {
    segments: SmallVec<[String; 4]>,
}

impl Json {
    fn new(path: Option<String>) -> Self {
        Self {
            segments: path
                .map(|path| path.split('.').map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn lookup<'a>(&self, mut value: &'a Value) -> Option<&'a Value> {
        for segment in &self.segments {
            value = match value {
                Value::Object(fields) => fields.get(segment)?,
                Value::Array(values) => values.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }
}

impl Function for Json {
    fn exec(&self, ctx: &Context) -> EvalResult {
        let Some(value) = ctx.value() else {
            return EvalResult::Error(EvalError::NoInput);
        };
        match self.lookup(value) {
            Some(found) => EvalResult::Value(found.clone()),
            None => EvalResult::Recovered {
                partial: Value::Null,
                cause: EvalError::PathNotFound(self.segments.join(".")),
            },
        }
    }
}

/// `meta()` / `meta("key")`: metadata lookup. A missing key recovers with
/// `null`; the bare form yields all metadata as an object.
#[derive(Debug)]
struct Meta {
    key: Option<CompactString>,
}

impl Function for Meta {
    fn exec(&self, ctx: &Context) -> EvalResult {
        match &self.key {
            Some(key) => match ctx.metadata().and_then(|metadata| metadata.get(key.as_str())) {
                Some(value) => EvalResult::Value(Value::String(value.clone())),
                None => EvalResult::Recovered {
                    partial: Value::Null,
                    cause: EvalError::MetaNotFound(key.clone()),
                },
            },
            None => {
                let fields: Object = ctx
                    .metadata()
                    .map(|metadata| {
                        metadata
                            .iter()
                            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                            .collect()
                    })
                    .unwrap_or_default();
                EvalResult::Value(Value::Object(fields))
            }
        }
    }
}

/// `batch_index()`: the message's index within its batch.
#[derive(Debug)]
struct BatchIndex;

impl Function for BatchIndex {
    fn exec(&self, ctx: &Context) -> EvalResult {
        EvalResult::Value(Value::Number(Number::Int(ctx.index() as i64)))
    }
}

/// `timestamp_unix()`: the current Unix timestamp in seconds.
#[derive(Debug)]
struct TimestampUnix;

impl Function for TimestampUnix {
    fn exec(&self, _ctx: &Context) -> EvalResult {
        EvalResult::Value(Value::Number(Number::Int(chrono::Utc::now().timestamp())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::context::Metadata;
    use rstest::rstest;

    fn exec(name: &str, args: Vec<Parsed>, ctx: &Context) -> EvalResult {
        resolve(name, args).unwrap().exec(ctx)
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            resolve("nope", vec![]).unwrap_err(),
            FunctionError::Unknown("nope".into())
        );
    }

    #[test]
    fn test_dynamic_argument_rejected() {
        let dynamic = Parsed::Dynamic(resolve("batch_index", vec![]).unwrap());
        assert_eq!(
            resolve("json", vec![dynamic]).unwrap_err(),
            FunctionError::BadArguments {
                name: "json".into(),
                expected: "literal arguments",
            }
        );
    }

    #[rstest]
    #[case("content", vec![Parsed::Static(Value::from(1))])]
    #[case("batch_index", vec![Parsed::Static(Value::from(1))])]
    #[case("json", vec![Parsed::Static(Value::from(1))])]
    fn test_bad_arguments(#[case] name: &str, #[case] args: Vec<Parsed>) {
        assert!(matches!(
            resolve(name, args),
            Err(FunctionError::BadArguments { .. })
        ));
    }

    #[test]
    fn test_json_lookup() {
        let payload: Value = serde_json::from_str(r#"{"doc": {"tags": ["a", "b"]}}"#).unwrap();
        let ctx = Context::new().with_value(&payload);

        assert_eq!(
            exec("json", vec![Parsed::Static(Value::from("doc.tags.1"))], &ctx),
            EvalResult::Value(Value::from("b"))
        );
        assert_eq!(
            exec("json", vec![], &ctx),
            EvalResult::Value(payload.clone())
        );
    }

    #[test]
    fn test_json_missing_path_recovers() {
        let payload: Value = serde_json::from_str(r#"{"doc": {}}"#).unwrap();
        let ctx = Context::new().with_value(&payload);

        assert_eq!(
            exec("json", vec![Parsed::Static(Value::from("doc.id"))], &ctx),
            EvalResult::Recovered {
                partial: Value::Null,
                cause: EvalError::PathNotFound("doc.id".to_string()),
            }
        );
    }

    #[test]
    fn test_json_without_payload() {
        assert_eq!(
            exec("json", vec![], &Context::new()),
            EvalResult::Error(EvalError::NoInput)
        );
    }

    #[test]
    fn test_meta() {
        let mut metadata = Metadata::default();
        metadata.insert("topic".to_string(), "events".to_string());
        let ctx = Context::new().with_metadata(&metadata);

        assert_eq!(
            exec("meta", vec![Parsed::Static(Value::from("topic"))], &ctx),
            EvalResult::Value(Value::from("events"))
        );
        assert_eq!(
            exec("meta", vec![Parsed::Static(Value::from("missing"))], &ctx),
            EvalResult::Recovered {
                partial: Value::Null,
                cause: EvalError::MetaNotFound("missing".into()),
            }
        );

        let mut expected = Object::default();
        expected.insert("topic".to_string(), Value::from("events"));
        assert_eq!(
            exec("meta", vec![], &ctx),
            EvalResult::Value(Value::Object(expected))
        );
    }

    #[test]
    fn test_batch_index() {
        let ctx = Context::new().with_index(3);
        assert_eq!(
            exec("batch_index", vec![], &ctx),
            EvalResult::Value(Value::from(3i64))
        );
    }

    #[test]
    fn test_content() {
        let payload = Value::from("plain");
        let ctx = Context::new().with_value(&payload);
        assert_eq!(
            exec("content", vec![], &ctx),
            EvalResult::Value(Value::from("\"plain\""))
        );
        assert_eq!(
            exec("content", vec![], &Context::new()),
            EvalResult::Error(EvalError::NoInput)
        );
    }
}
