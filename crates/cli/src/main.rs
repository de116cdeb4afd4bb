mod config;
mod render;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use smali_syntax::{lex, parse_str, Diagnostic, ParseOutput, ParserConfig};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Front end for smali-style Dalvik assembly.
#[derive(Parser)]
#[command(name = "smali-parse", version, about = "Parse smali assembly into a syntax tree")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file with a [parser] table of settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Full token dumps and the rule stack in diagnostics
    #[arg(long, global = true)]
    verbose_errors: bool,

    /// Accept optimized (odex) instructions where the API level allows them
    #[arg(long, global = true)]
    allow_odex: bool,

    /// Target API level for optimized-instruction eligibility
    #[arg(long, global = true)]
    api_level: Option<u32>,

    /// Maximum nesting depth of literals and annotations
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print its syntax tree
    Parse {
        /// Path to the .smali source file
        file: PathBuf,
    },

    /// Parse files and report diagnostics only
    Check {
        /// Paths to .smali source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the token stream of a file
    Tokens {
        /// Path to the .smali source file
        file: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let overrides = config::Overrides {
        verbose_errors: cli.verbose_errors,
        allow_odex: cli.allow_odex,
        api_level: cli.api_level,
        max_depth: cli.max_depth,
    };
    let parser_config = match config::resolve(cli.config.as_deref(), overrides) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Parse { file } => cmd_parse(&file, &parser_config, cli.output, cli.quiet),
        Commands::Check { files } => cmd_check(&files, &parser_config, cli.output, cli.quiet),
        Commands::Tokens { file } => cmd_tokens(&file, cli.output, cli.quiet),
    }
}

// ──────────────────────────────────────────────
// Commands
// ──────────────────────────────────────────────

fn cmd_parse(file: &Path, config: &ParserConfig, output: OutputFormat, quiet: bool) {
    let out = parse_file(file, config, output, quiet);

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&out)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            print!("{}", render::tree(&out.root));
            print_diagnostics(file, &out.diagnostics, quiet);
        }
    }

    if !out.is_success() {
        process::exit(1);
    }
}

fn cmd_check(files: &[PathBuf], config: &ParserConfig, output: OutputFormat, quiet: bool) {
    let mut failed = 0usize;
    let mut results = Vec::new();

    for file in files {
        let src = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                let msg = format!("could not read '{}': {}", file.display(), e);
                report_error(&msg, output, quiet);
                failed += 1;
                if output == OutputFormat::Json {
                    results.push(serde_json::json!({
                        "file": file.display().to_string(),
                        "ok": false,
                        "error": msg,
                    }));
                }
                continue;
            }
        };
        log::debug!("parsing {} ({} bytes)", file.display(), src.len());
        let out = parse_str(&src, config);
        log::info!("{}: {} diagnostic(s)", file.display(), out.diagnostics.len());
        if !out.is_success() {
            failed += 1;
        }
        match output {
            OutputFormat::Json => results.push(serde_json::json!({
                "file": file.display().to_string(),
                "ok": out.is_success(),
                "diagnostics": out.diagnostics.iter().map(Diagnostic::to_json_value).collect::<Vec<_>>(),
            })),
            OutputFormat::Text => print_diagnostics(file, &out.diagnostics, quiet),
        }
    }

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&results)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "{} file(s) checked, {} ok, {} with errors",
                    files.len(),
                    files.len() - failed,
                    failed
                );
            }
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

fn cmd_tokens(file: &Path, output: OutputFormat, quiet: bool) {
    let src = read_source(file, output, quiet);
    let tokens = lex(&src);
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tokens)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", render::tokens(&tokens)),
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn read_source(file: &Path, output: OutputFormat, quiet: bool) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            report_error(
                &format!("could not read '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

fn parse_file(file: &Path, config: &ParserConfig, output: OutputFormat, quiet: bool) -> ParseOutput {
    let src = read_source(file, output, quiet);
    log::debug!("parsing {} ({} bytes)", file.display(), src.len());
    parse_str(&src, config)
}

/// Diagnostics go to stderr as `file:line:column: kind: message`.
fn print_diagnostics(file: &Path, diagnostics: &[Diagnostic], quiet: bool) {
    if quiet {
        return;
    }
    for d in diagnostics {
        eprintln!("{}:{}", file.display(), d.render());
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
