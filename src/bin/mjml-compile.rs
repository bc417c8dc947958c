use mjml_compiler::{compile_with_options, CompileError, CompileOptions};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

struct Args {
    files: Vec<String>,
    config: Option<String>,
    out_dir: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Some(args) => args,
        None => {
            eprintln!("Usage: mjml-compile <file.mjml>... [--config options.yaml] [--out-dir DIR]");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  mjml-compile newsletter.mjml");
            eprintln!("  mjml-compile *.mjml --out-dir dist");
            process::exit(1);
        }
    };

    let options = match &args.config {
        Some(path) => match load_options(path) {
            Ok(options) => options,
            Err(message) => {
                eprintln!("✗ {}: {}", path, message);
                process::exit(1);
            }
        },
        None => CompileOptions::default(),
    };

    let mut exit_code = 0;
    for file_path in &args.files {
        match compile_file(file_path, &options, args.out_dir.as_deref()) {
            Ok(output) => {
                println!("✓ {} -> {}", file_path, output.display());
            }
            Err(e) => {
                eprintln!("✗ {} failed:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Option<Args> {
    let mut args = Args {
        files: Vec::new(),
        config: None,
        out_dir: None,
    };
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => args.config = Some(raw.next()?),
            "--out-dir" => args.out_dir = Some(PathBuf::from(raw.next()?)),
            "-h" | "--help" => return None,
            _ => args.files.push(arg),
        }
    }
    if args.files.is_empty() {
        return None;
    }
    Some(args)
}

fn load_options(path: &str) -> Result<CompileOptions, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    CompileOptions::from_yaml(&content).map_err(|e| format!("Invalid config: {}", e))
}

fn compile_file(
    path: &str,
    options: &CompileOptions,
    out_dir: Option<&Path>,
) -> Result<PathBuf, CompileError> {
    let content = fs::read_to_string(path)?;
    let html = compile_with_options(&content, options)?;

    let input = Path::new(path);
    let file_name = input.with_extension("html");
    let output = match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    };
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir)?;
    }
    fs::write(&output, html)?;
    Ok(output)
}

fn print_error(error: &CompileError) {
    match error {
        CompileError::Parse { message } => {
            eprintln!("  Parse error:");
            eprintln!("    {}", message);
        }
        CompileError::InvalidChild {
            parent,
            child,
            allowed,
        } => {
            eprintln!("  Invalid child <{}> in <{}>:", child, parent);
            eprintln!("    Allowed children: {}", allowed);
        }
        CompileError::Validation {
            component,
            field,
            reason,
        } => {
            eprintln!("  Invalid attribute '{}' on <{}>:", field, component);
            eprintln!("    {}", reason);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
