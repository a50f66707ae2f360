//! Command line runner for jsstep
//!
//! Usage: jsstep [options] [file]
//!
//! Runs the file (or stdin) to completion and prints the final value.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use jsstep::{Interpreter, InterpreterConfig, JsError, RegexMode, Value};
use log::{LevelFilter, Log, Metadata, Record};

#[derive(Parser)]
#[command(name = "jsstep", about = "Run ES5 code on the step-driven interpreter")]
struct Cli {
    /// Script to run; reads stdin when omitted
    file: Option<PathBuf>,

    /// Drive the program one step at a time and report the step count
    #[arg(long)]
    step: bool,

    /// 0 refuses regular expressions, 1 runs them inline, 2 on a worker thread
    #[arg(long, value_enum, default_value = "2")]
    regex_mode: RegexModeArg,

    /// Time limit for one regex operation in thread mode
    #[arg(long, default_value_t = 1000)]
    regex_timeout_ms: u64,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

#[derive(Clone, Copy, ValueEnum)]
enum RegexModeArg {
    #[value(name = "0", alias = "refuse")]
    Refuse,
    #[value(name = "1", alias = "inline")]
    Inline,
    #[value(name = "2", alias = "thread")]
    Thread,
}

impl From<RegexModeArg> for RegexMode {
    fn from(arg: RegexModeArg) -> Self {
        match arg {
            RegexModeArg::Refuse => RegexMode::Refuse,
            RegexModeArg::Inline => RegexMode::Inline,
            RegexModeArg::Thread => RegexMode::Thread,
        }
    }
}

/// Writes log records to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let cli = Cli::parse();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(cli.log_level);
    }

    if let Err(e) = run(&cli) {
        eprintln!("Uncaught {}", e);
        std::process::exit(1);
    }
}

fn read_source(cli: &Cli) -> Result<String, String> {
    match &cli.file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e)),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            Ok(source)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(cli)?;
    let config = InterpreterConfig {
        regex_mode: cli.regex_mode.into(),
        regex_timeout: Duration::from_millis(cli.regex_timeout_ms),
        ..InterpreterConfig::default()
    };

    let started = Instant::now();
    let mut interp = Interpreter::with_config(&source, config)?;

    if cli.step {
        let mut steps: u64 = 0;
        while interp.step()? {
            steps += 1;
            if interp.is_paused() {
                return Err("program paused on an asynchronous call nobody will resume".into());
            }
        }
        eprintln!("{} steps in {:?}", steps, started.elapsed());
    } else if interp.run()? {
        return Err("program paused on an asynchronous call nobody will resume".into());
    }

    print_value(&interp, &interp.value())?;
    Ok(())
}

fn print_value(interp: &Interpreter, value: &Value) -> Result<(), JsError> {
    match value {
        Value::Undefined => {}
        Value::String(s) => println!("{}", s),
        other => println!("{}", interp.to_string(other)?),
    }
    Ok(())
}
