use rustc_hash::FxHashMap;

use crate::query::context::Context;
use crate::query::{EvalResult, Function, Parsed};
use crate::value::{Object, Value};

/// Wraps a value resolved at parse time. Evaluation clones the value and
/// never fails.
#[derive(Debug)]
pub(crate) struct LiteralValue(Value);

impl LiteralValue {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }
}

impl Function for LiteralValue {
    fn exec(&self, _ctx: &Context) -> EvalResult {
        EvalResult::Value(self.0.clone())
    }
}

/// An array literal holding at least one deferred element, evaluated per
/// message in element order.
#[derive(Debug)]
pub(crate) struct ArrayLiteral {
    elements: Vec<Parsed>,
}

impl ArrayLiteral {
    /// Resolves the array at parse time when no element is dynamic.
    pub(crate) fn fold(elements: Vec<Parsed>) -> Parsed {
        if elements.iter().any(|element| !element.is_static()) {
            return Parsed::Dynamic(Box::new(ArrayLiteral { elements }));
        }
        let values = elements
            .into_iter()
            .filter_map(|element| match element {
                Parsed::Static(value) => Some(value),
                Parsed::Dynamic(_) => None,
            })
            .collect();
        Parsed::Static(Value::Array(values))
    }
}

impl Function for ArrayLiteral {
    fn exec(&self, ctx: &Context) -> EvalResult {
        // Unvisited slots keep their null placeholder when evaluation stops
        // early on a recoverable failure.
        let mut values = vec![Value::Null; self.elements.len()];
        for (i, element) in self.elements.iter().enumerate() {
            match element {
                Parsed::Static(value) => values[i] = value.clone(),
                Parsed::Dynamic(function) => match function.exec(ctx) {
                    EvalResult::Value(value) => values[i] = value,
                    EvalResult::Recovered { partial, cause } => {
                        values[i] = partial;
                        return EvalResult::Recovered {
                            partial: Value::Array(values),
                            cause,
                        };
                    }
                    EvalResult::Error(cause) => return EvalResult::Error(cause),
                },
            }
        }
        EvalResult::Value(Value::Array(values))
    }
}

/// An object literal holding at least one deferred value.
///
/// Key visitation order follows the underlying map and is unspecified; when
/// several values can fail, which failure surfaces first is undefined.
#[derive(Debug)]
pub(crate) struct MapLiteral {
    fields: FxHashMap<String, Parsed>,
}

impl MapLiteral {
    /// Resolves the object at parse time when no value is dynamic. Duplicate
    /// keys collapse last-write-wins before the fold.
    pub(crate) fn fold(pairs: Vec<(String, Parsed)>) -> Parsed {
        let mut fields = FxHashMap::default();
        for (key, value) in pairs {
            fields.insert(key, value);
        }
        if fields.values().any(|value| !value.is_static()) {
            return Parsed::Dynamic(Box::new(MapLiteral { fields }));
        }
        let values = fields
            .into_iter()
            .filter_map(|(key, value)| match value {
                Parsed::Static(value) => Some((key, value)),
                Parsed::Dynamic(_) => None,
            })
            .collect();
        Parsed::Static(Value::Object(values))
    }
}

impl Function for MapLiteral {
    fn exec(&self, ctx: &Context) -> EvalResult {
        let mut fields = Object::default();
        for (key, value) in &self.fields {
            match value {
                Parsed::Static(value) => {
                    fields.insert(key.clone(), value.clone());
                }
                Parsed::Dynamic(function) => match function.exec(ctx) {
                    EvalResult::Value(value) => {
                        fields.insert(key.clone(), value);
                    }
                    EvalResult::Recovered { partial, cause } => {
                        fields.insert(key.clone(), partial);
                        return EvalResult::Recovered {
                            partial: Value::Object(fields),
                            cause,
                        };
                    }
                    EvalResult::Error(cause) => return EvalResult::Error(cause),
                },
            }
        }
        EvalResult::Value(Value::Object(fields))
    }
}
