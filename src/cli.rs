//! CLI: Go sources or JSON declarations → (generate | records | check)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;

use crate::decl::{SourceFile, TypeDecl};
use crate::diagnostics::Diagnostics;
use crate::eval::{evaluate, Verdict};
use crate::pipeline::{self, GenerateOptions, DEFAULT_PACKAGE};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Go `Validate() error` methods from `validate:"..."` struct tags
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// print debug diagnostics to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the Go source file with every Validate method
    Generate(GenerateOut),
    /// print the record model as JSON
    Records(RecordsOut),
    /// dry-run the generated checks against JSON samples
    Check(CheckSamples),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the declaration document inside each JSON input (e.g. /data/decls)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns.
    ///
    /// Files ending in `.go` are scanned as Go source, anything else is read as JSON declarations.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// package clause of the generated file
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    outpkg: String,

    /// output .go file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct RecordsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckSamples {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON file mapping record names to arrays of sample objects
    #[arg(long)]
    samples: PathBuf,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_decls(&self, log: &dyn Diagnostics) -> anyhow::Result<Vec<TypeDecl>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut decls = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            log.debug("loading", &[("path", &source_path_str)]);

            let found = if is_go_source(&source_path) {
                crate::scan::scan_go(&source, log)
                    .with_context(|| format!("failed to scan Go source file ({source_path_str})"))?
            } else {
                SourceFile::from_json(&source, self.json_pointer.as_deref())
                    .with_context(|| format!("failed to parse declaration file ({source_path_str})"))?
                    .types
            };
            decls.extend(found);
        }
        Ok(decls)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self, log: &dyn Diagnostics) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let decls = target.input_settings.load_decls(log)?;
                let options = GenerateOptions { package: target.outpkg.clone() };
                let go_src = pipeline::generate(&decls, &options, log)?;
                write_output(target.out.as_deref(), &go_src)
            }
            Command::Records(target) => {
                let decls = target.input_settings.load_decls(log)?;
                let records = crate::model::build_records(&decls, log)?;
                let json_src = serde_json::to_string_pretty(&records)?;
                write_output(target.out.as_deref(), &json_src)
            }
            Command::Check(target) => {
                let decls = target.input_settings.load_decls(log)?;
                let batch = pipeline::lower(&decls, log)?;

                let samples_src = std::fs::read_to_string(&target.samples).with_context(|| {
                    format!("failed to read samples file {}", target.samples.display())
                })?;
                let samples: IndexMap<String, Vec<serde_json::Value>> =
                    crate::decl::from_str_with_path(&samples_src)
                        .with_context(|| format!("failed to parse samples file {}", target.samples.display()))?;

                let mut invalid = 0usize;
                for (record, values) in &samples {
                    let Some(procedure) = batch.procedures.iter().find(|p| &p.record == record) else {
                        bail!("no record named {record:?} in the inputs");
                    };
                    for (index, value) in values.iter().enumerate() {
                        match evaluate(procedure, value)
                            .with_context(|| format!("{record}[{index}]"))?
                        {
                            Verdict::Valid => println!("{} {record}[{index}]", "valid".green().bold()),
                            Verdict::Invalid(message) => {
                                invalid += 1;
                                println!("{} {record}[{index}]: {message}", "invalid".red().bold());
                            }
                        }
                    }
                }
                if invalid > 0 {
                    bail!("{invalid} sample(s) failed validation");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

/// Writes to `out` (creating parent directories) or prints to stdout.
fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        print!("{contents}");
        if !contents.ends_with('\n') {
            println!();
        }
        return Ok(());
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
