//! Command-line front end for the operation-chain engine.
//!
//! Pipelines are given as repeated `--step` arguments. Each step is the
//! registry name of an operation followed by `key=value` parameters, e.g.
//!
//!   opchain run --input "Hello World" \
//!       --step base64_encode \
//!       --step "aes_encrypt key=000102030405060708090a0b0c0d0e0f mode=ecb"

use std::collections::BTreeMap;
use std::fs;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use opchain_core::buffer::{ByteBuffer, FormatTag};
use opchain_core::pipeline::{self, OperationDescriptor, REGISTRY};
use opchain_core::sbox::SBoxStore;

#[derive(Parser)]
#[command(name = "opchain", version, about = "Operation-chain runner with rebuildable cipher internals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline of operations over an input
    Run {
        /// Input text; mutually exclusive with --input-file
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the input from a file instead
        #[arg(long)]
        input_file: Option<String>,

        /// How the input text is interpreted
        #[arg(long, value_enum, default_value = "utf8")]
        format: FormatArg,

        /// How the final buffer is rendered
        #[arg(long, value_enum, default_value = "hex")]
        output_format: FormatArg,

        /// Pipeline step: an operation name followed by key=value parameters
        #[arg(long = "step", required = true)]
        steps: Vec<String>,

        /// Print every intermediate buffer, not just the final one
        #[arg(long)]
        trace: bool,

        /// Load a named S-box from a hex file (NAME=PATH); repeatable
        #[arg(long = "sbox-file")]
        sbox_files: Vec<String>,
    },
    /// List the operations the registry knows about
    Ops,
    /// List the S-boxes available to cipher steps
    Sboxes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Utf8,
    Hex,
    AsciiArray,
}

impl From<FormatArg> for FormatTag {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Utf8 => FormatTag::Utf8,
            FormatArg::Hex => FormatTag::Hex,
            FormatArg::AsciiArray => FormatTag::AsciiArray,
        }
    }
}

fn main() {
    if let Err(message) = run(Cli::parse()) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Run {
            input,
            input_file,
            format,
            output_format,
            steps,
            trace,
            sbox_files,
        } => {
            let text = match (input, input_file) {
                (Some(text), None) => text,
                (None, Some(path)) => {
                    fs::read_to_string(&path).map_err(|e| format!("reading {path}: {e}"))?
                }
                _ => return Err("either --input or --input-file is required".into()),
            };

            let store = SBoxStore::with_standards();
            for entry in &sbox_files {
                load_sbox(&store, entry)?;
            }

            let buffer = ByteBuffer::parse(text.trim_end_matches('\n'), format.into())
                .map_err(|e| e.to_string())?;
            let descriptors = steps
                .iter()
                .map(|s| parse_step(s))
                .collect::<Result<Vec<_>, String>>()?;

            match pipeline::run(buffer, &descriptors, &store) {
                Ok(outcome) => {
                    if trace {
                        for (i, step) in outcome.trace.iter().enumerate() {
                            let rendered = step.clone().with_format(output_format.into()).render();
                            println!("[{}] {rendered}", i + 1);
                        }
                    }
                    println!(
                        "{}",
                        outcome.buffer.with_format(output_format.into()).render()
                    );
                    Ok(())
                }
                Err(failure) => {
                    for (i, step) in failure.trace.iter().enumerate() {
                        let rendered = step.clone().with_format(output_format.into()).render();
                        eprintln!("[{}] {rendered}", i + 1);
                    }
                    Err(format!("step {} failed: {}", failure.step, failure.error))
                }
            }
        }
        Commands::Ops => {
            for spec in REGISTRY {
                println!("{}", spec.name);
                for param in spec.params {
                    let requirement = if param.required { "required" } else { "optional" };
                    println!("    {} ({requirement}): {}", param.name, param.description);
                }
            }
            Ok(())
        }
        Commands::Sboxes => {
            let store = SBoxStore::with_standards();
            for name in store.list_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// Parse one `--step` argument: a registry name, then `key=value` pairs.
fn parse_step(text: &str) -> Result<OperationDescriptor, String> {
    let mut tokens = text.split_whitespace();
    let name = tokens.next().ok_or_else(|| "empty step".to_string())?;

    let mut params = BTreeMap::new();
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("step parameter `{token}` is not key=value"))?;
        params.insert(key.to_string(), value.to_string());
    }

    let mut descriptor = OperationDescriptor::new(name);
    descriptor.params = params;
    Ok(descriptor)
}

/// Load a `NAME=PATH` S-box entry: the file holds 256 bytes as hex.
fn load_sbox(store: &SBoxStore, entry: &str) -> Result<(), String> {
    let (name, path) = entry
        .split_once('=')
        .ok_or_else(|| format!("--sbox-file `{entry}` is not NAME=PATH"))?;
    let text = fs::read_to_string(path).map_err(|e| format!("reading {path}: {e}"))?;
    let bytes =
        hex::decode(text.split_whitespace().collect::<String>()).map_err(|e| e.to_string())?;
    let forward: [u8; 256] = bytes
        .try_into()
        .map_err(|_| format!("S-box `{name}` is not 256 bytes"))?;
    store.save(name, forward).map_err(|e| e.to_string())
}
