pub mod context;
pub mod error;
pub(crate) mod functions;
pub(crate) mod literal;

use std::fmt::Debug;

use crate::value::Value;
use self::context::Context;
use self::error::EvalError;

/// An evaluable unit of a mapping: a wrapped literal, a builtin function
/// call, or a container holding a mixture of both.
///
/// Implementations are immutable after parsing and must not retain or mutate
/// shared state across evaluations, so the same node can be evaluated for
/// many messages concurrently.
pub trait Function: Debug + Send + Sync {
    /// Evaluates the node against one message's execution context.
    fn exec(&self, ctx: &Context) -> EvalResult;
}

/// The outcome of evaluating a [`Function`] against one message.
#[must_use]
#[derive(Debug, PartialEq)]
pub enum EvalResult {
    /// Evaluation produced a value.
    Value(Value),
    /// Evaluation failed, but `partial` is a best-effort value with the same
    /// shape a success would have had. Aggregate evaluators re-wrap the
    /// partial at their own level; a fallback operator may consume it.
    Recovered { partial: Value, cause: EvalError },
    /// Evaluation failed with no usable value.
    Error(EvalError),
}

impl EvalResult {
    /// Collapses to a plain result. A recoverable failure surfaces its cause;
    /// the partial value is dropped.
    pub fn into_result(self) -> Result<Value, EvalError> {
        match self {
            EvalResult::Value(value) => Ok(value),
            EvalResult::Recovered { cause, .. } => Err(cause),
            EvalResult::Error(cause) => Err(cause),
        }
    }
}

/// A parsed literal element: either resolved to a concrete value at parse
/// time, or deferred to per-message evaluation.
///
/// A container literal folds to `Static` only when every element is
/// `Static`; one dynamic element keeps the whole container dynamic.
#[derive(Debug)]
pub(crate) enum Parsed {
    Static(Value),
    Dynamic(Box<dyn Function>),
}

impl Parsed {
    pub(crate) fn is_static(&self) -> bool {
        matches!(self, Parsed::Static(_))
    }

    /// Exposes any parsed literal uniformly as a [`Function`]: dynamic nodes
    /// pass through, concrete values are wrapped in a node that returns them
    /// unchanged and never fails.
    pub(crate) fn into_function(self) -> Box<dyn Function> {
        match self {
            Parsed::Dynamic(function) => function,
            Parsed::Static(value) => Box::new(literal::LiteralValue::new(value)),
        }
    }
}
