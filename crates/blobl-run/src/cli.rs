use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use blobl_lang::{Engine, Value};
use clap::Parser;
use miette::{IntoDiagnostic, Report};

#[derive(Parser, Debug)]
#[command(name = "blobl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To reshape NDJSON messages from stdin:\n\
    blobl '{\"id\": json(\"doc.id\")}' < input.ndjson\n\n\
    ## To read the mapping from a file:\n\
    blobl -f mapping.blobl input.ndjson\n\n\
    ## To attach metadata readable with meta():\n\
    blobl -M topic events '[meta(\"topic\"), json(\"doc.id\")]'")]
#[command(
    about = "blobl applies a mapping to a stream of JSON messages, one document per line.",
    long_about = None
)]
pub struct Cli {
    /// Load the mapping from a file instead of the first argument
    #[arg(short, long, default_value_t = false)]
    from_file: bool,

    /// Attach a metadata entry readable with meta()
    #[arg(short = 'M', long = "metadata", value_names = ["NAME", "VALUE"], num_args = 2)]
    metadata: Option<Vec<String>>,

    /// Run the mapping once against a null message instead of reading input
    #[arg(short = 'n', long, default_value_t = false)]
    null_input: bool,

    /// Pretty-print output documents
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    #[arg(value_name = "MAPPING OR FILE")]
    mapping: String,

    files: Option<Vec<PathBuf>>,
}

impl Cli {
    pub fn run(self) -> miette::Result<()> {
        let code = if self.from_file {
            fs::read_to_string(&self.mapping).into_diagnostic()?
        } else {
            self.mapping.clone()
        };

        let mut engine = Engine::default();
        if let Some(metadata) = &self.metadata {
            for pair in metadata.chunks(2) {
                if let [name, value] = pair {
                    engine.define_metadata(name, value);
                }
            }
        }

        let messages = self.read_messages()?;
        let output = engine.eval(&code, messages).map_err(Report::new)?;
        self.write_output(output)
    }

    fn read_messages(&self) -> miette::Result<Vec<Value>> {
        if self.null_input {
            return Ok(vec![Value::Null]);
        }

        let mut lines = Vec::new();
        match &self.files {
            Some(files) => {
                for file in files {
                    for line in fs::read_to_string(file).into_diagnostic()?.lines() {
                        lines.push(line.to_string());
                    }
                }
            }
            None => {
                for line in io::stdin().lock().lines() {
                    lines.push(line.into_diagnostic()?);
                }
            }
        }

        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).into_diagnostic())
            .collect()
    }

    fn write_output(&self, output: Vec<Value>) -> miette::Result<()> {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        for value in output {
            let rendered = if self.pretty {
                serde_json::to_string_pretty(&value).into_diagnostic()?
            } else {
                serde_json::to_string(&value).into_diagnostic()?
            };
            writeln!(writer, "{}", rendered).into_diagnostic()?;
        }
        writer.flush().into_diagnostic()
    }
}
