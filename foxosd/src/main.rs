//! # FoxOS Host Daemon
//!
//! Main entry point for the FoxOS host runtime.

use foxosd::{HostRuntime, HostRuntimeConfig, StdoutConsole};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("foxosd");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    let mut runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to boot: {}", e);
        process::exit(1);
    });

    if let Err(e) = runtime.run(&mut StdoutConsole) {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

/// Builds the config: defaults, then the `--config` file, then flags
fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = match find_value(args, "--config", "-c")? {
        Some(path) => HostRuntimeConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => HostRuntimeConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
            }
            "--script" | "-s" => {
                i += 1;
                let script_path = value(args, i, "--script")?;
                let script_text = fs::read_to_string(script_path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(script_text);
            }
            "--disk" | "-d" => {
                i += 1;
                config.disk = Some(value(args, i, "--disk")?.into());
            }
            "--no-autosave" => {
                config.autosave = false;
            }
            "--log-level" => {
                i += 1;
                let level = value(args, i, "--log-level")?;
                config.log_level = level.parse().map_err(|e| format!("{}", e))?;
            }
            "--max-lines" => {
                i += 1;
                let n = value(args, i, "--max-lines")?;
                config.max_lines = n
                    .parse()
                    .map_err(|_| format!("Invalid max-lines value: {}", n))?;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn find_value<'a>(args: &'a [String], long: &str, short: &str) -> Result<Option<&'a str>, String> {
    match args.iter().position(|a| a == long || a == short) {
        Some(i) => value(args, i + 1, long).map(Some),
        None => Ok(None),
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --script <FILE>      Input script file (stdin lines otherwise)");
    eprintln!("  -d, --disk <FILE>        Disk image holding the file system");
    eprintln!("  -c, --config <FILE>      JSON config file, overridden by flags");
    eprintln!("  --no-autosave            Only save on `sync`");
    eprintln!("  --log-level <LEVEL>      debug, info, warn or error (default info)");
    eprintln!("  --max-lines <N>          Maximum command lines to run (0 = unlimited)");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --disk fox.img", program);
    eprintln!("  {} --disk fox.img --script demos/tour.foxkeys", program);
}
