//! `nobundle resolve|request|normalize|relative|public|bare` implementation.
//!
//! Each subcommand runs one resolver operation against the project at `--cwd`
//! and prints the result. With `--json` the output is a single object:
//!
//! ```json
//! {"ok":true,"op":"resolve","input":"/src/main","result":"/abs/src/main.ts"}
//! ```

use miette::{IntoDiagnostic, Result};
use nobundle_core::paths::{normalize_path, slash};
use nobundle_core::{Error, ModuleResolver};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Exit code when the resolver reports an internal-consistency error.
const EXIT_INTERNAL: i32 = 70;

/// One resolver operation.
#[derive(Debug)]
pub enum ResolveAction {
    RequestToFile { public_path: String },
    FileToRequest { file: PathBuf },
    Normalize { public_path: String },
    Relative { importer: String, importee: String },
    Public { public_path: String },
    Bare { importer: String, id: String },
}

impl ResolveAction {
    /// Subcommand name, used as `op` in JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestToFile { .. } => "resolve",
            Self::FileToRequest { .. } => "request",
            Self::Normalize { .. } => "normalize",
            Self::Relative { .. } => "relative",
            Self::Public { .. } => "public",
            Self::Bare { .. } => "bare",
        }
    }

    fn input(&self) -> Value {
        match self {
            Self::RequestToFile { public_path }
            | Self::Normalize { public_path }
            | Self::Public { public_path } => Value::from(public_path.as_str()),
            Self::FileToRequest { file } => Value::from(slash(file)),
            Self::Relative { importer, importee } => {
                serde_json::json!({ "importer": importer, "importee": importee })
            }
            Self::Bare { importer, id } => serde_json::json!({ "importer": importer, "id": id }),
        }
    }
}

#[derive(Serialize)]
struct ResolveOutput {
    ok: bool,
    op: &'static str,
    input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ResolveError>,
}

#[derive(Serialize)]
struct ResolveError {
    code: &'static str,
    message: String,
}

/// Run one resolver operation for the project at `cwd`.
pub fn run(cwd: &Path, config: Option<&Path>, action: ResolveAction, json: bool) -> Result<()> {
    let root = dunce::canonicalize(cwd).into_diagnostic()?;
    let resolver = ModuleResolver::from_root(&root, config).into_diagnostic()?;
    tracing::debug!(root = %root.display(), op = action.name(), "running resolver operation");

    match execute(&resolver, &action) {
        Ok(result) => {
            if json {
                let output = ResolveOutput {
                    ok: true,
                    op: action.name(),
                    input: action.input(),
                    result: Some(result),
                    error: None,
                };
                println!("{}", serde_json::to_string(&output).into_diagnostic()?);
            } else {
                print_human(&result);
            }
            Ok(())
        }
        Err(err) if json => {
            let output = ResolveOutput {
                ok: false,
                op: action.name(),
                input: action.input(),
                result: None,
                error: Some(ResolveError {
                    code: error_code(&err),
                    message: err.to_string(),
                }),
            };
            println!("{}", serde_json::to_string(&output).into_diagnostic()?);
            std::process::exit(exit_code(&err));
        }
        Err(err) if err.is_internal() => {
            eprintln!("{:?}", miette::Report::msg(err.to_string()));
            std::process::exit(EXIT_INTERNAL);
        }
        Err(err) => Err(err).into_diagnostic(),
    }
}

fn execute(resolver: &ModuleResolver, action: &ResolveAction) -> nobundle_core::Result<Value> {
    let value = match action {
        ResolveAction::RequestToFile { public_path } => {
            Value::from(slash(&resolver.request_to_file(public_path)))
        }
        ResolveAction::FileToRequest { file } => {
            let file = if file.is_absolute() {
                file.clone()
            } else {
                resolver.root().join(file)
            };
            Value::from(resolver.file_to_request(&normalize_path(&file)))
        }
        ResolveAction::Normalize { public_path } => {
            Value::from(resolver.normalize_public_path(public_path)?)
        }
        ResolveAction::Relative { importer, importee } => {
            let resolved = resolver.resolve_relative_request(importer, importee);
            serde_json::to_value(resolved).map_err(|e| Error::other(e.to_string()))?
        }
        ResolveAction::Public { public_path } => {
            Value::from(resolver.is_public_request(public_path))
        }
        ResolveAction::Bare { importer, id } => {
            Value::from(resolver.resolve_bare_module_request(importer, id))
        }
    };
    Ok(value)
}

fn print_human(result: &Value) {
    match result {
        Value::String(s) => println!("{s}"),
        Value::Object(map) => {
            let pathname = map.get("pathname").and_then(Value::as_str).unwrap_or("");
            let query = map.get("query").and_then(Value::as_str).unwrap_or("");
            println!("{pathname}{query}");
        }
        other => println!("{other}"),
    }
}

fn error_code(err: &Error) -> &'static str {
    match err {
        Error::InconsistentNormalization { .. } => "INCONSISTENT_NORMALIZATION",
        Error::PackageJsonNotFound { .. } => "PACKAGE_JSON_NOT_FOUND",
        Error::ConfigRead { .. } => "CONFIG_READ",
        Error::ConfigParse { .. } => "CONFIG_PARSE",
        Error::Other(_) => "OTHER",
    }
}

fn exit_code(err: &Error) -> i32 {
    if err.is_internal() {
        EXIT_INTERNAL
    } else {
        1
    }
}
