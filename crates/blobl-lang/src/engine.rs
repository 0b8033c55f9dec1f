use crate::error::Error;
use crate::parser;
use crate::query::context::{Context, Metadata};
use crate::query::{EvalResult, Function};
use crate::value::Value;

/// A parsed mapping: immutable after parsing and safe to evaluate for many
/// messages concurrently.
#[derive(Debug)]
pub struct Mapping {
    root: Box<dyn Function>,
}

impl Mapping {
    pub(crate) fn new(root: Box<dyn Function>) -> Self {
        Self { root }
    }

    /// Evaluates the mapping against one message's context, exposing the
    /// full three-state result so callers can consume partial values.
    pub fn exec(&self, ctx: &Context) -> EvalResult {
        self.root.exec(ctx)
    }
}

/// Parses mappings and applies them to streams of messages.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    metadata: Metadata,
}

impl Engine {
    /// Attaches a metadata entry to every message evaluated by this engine,
    /// queryable with `meta()`.
    pub fn define_metadata(&mut self, name: &str, value: &str) {
        self.metadata.insert(name.to_string(), value.to_string());
    }

    pub fn parse(&self, code: &str) -> Result<Mapping, Error> {
        crate::parse(code)
    }

    /// Parses `code` once and evaluates it against each input message in
    /// order, producing one output value per message.
    ///
    /// A recoverable failure surfaces its underlying error here: this
    /// grammar has no fallback operator to consume the partial value.
    pub fn eval<I: IntoIterator<Item = Value>>(
        &self,
        code: &str,
        input: I,
    ) -> Result<Vec<Value>, Error> {
        let mapping = self.parse(code)?;
        let mut output = Vec::new();
        for (index, message) in input.into_iter().enumerate() {
            let ctx = Context::new()
                .with_value(&message)
                .with_metadata(&self.metadata)
                .with_index(index);
            match mapping.exec(&ctx).into_result() {
                Ok(value) => output.push(value),
                Err(cause) => return Err(Error::from_eval(code, cause)),
            }
        }
        Ok(output)
    }
}

pub(crate) fn parse(code: &str) -> Result<Mapping, Error> {
    parser::parse_mapping(code)
        .map(Mapping::new)
        .map_err(|err| Error::from_parse(code, err))
}
