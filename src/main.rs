use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Once;

use anyhow::{Context, Result, bail};
use ember::{Engine, ExitStatus};

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status {
        ExitStatus::Ok => ExitCode::SUCCESS,
        ExitStatus::SyntaxErrorOccurred => ExitCode::from(1),
        ExitStatus::RuntimeErrorOccurred => ExitCode::from(2),
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let mut check_only = false;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" => check_only = true,
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let engine = Engine::new();
    if check_only {
        return Ok(match engine.compile(&source) {
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("{error}");
                exit_code(error.status())
            }
        });
    }

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let result = engine.run(&source, &mut output);
    output.flush().context("Flushing stdout")?;
    match result {
        Ok(completion) => Ok(ExitCode::from(completion.exit_code())),
        Err(error) => {
            eprintln!("{error}");
            Ok(exit_code(error.status()))
        }
    }
}
