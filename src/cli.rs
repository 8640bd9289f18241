//! CLI argument parsing and configuration.

use std::io;
use std::time::Duration;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bounded wait for one forwarding poll iteration, in milliseconds.
const DEFAULT_POLL_MS: u64 = 100;

/// Configuration from CLI arguments
pub struct CliConfig {
    pub command: String,
    pub use_pty: bool,
    pub poll_interval: Duration,
}

/// Print usage information
pub fn print_usage() {
    eprintln!("shellbot - run interactive commands under a pseudo-terminal");
    eprintln!();
    eprintln!("Usage: shellbot -c <command> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>  The command to wrap (required)");
    eprintln!("  --no-pty             Pipe stdout/stderr instead of allocating a pty");
    eprintln!("                       (for non-interactive commands or non-terminal use)");
    eprintln!("  --poll-ms <N>        Forwarding poll interval in milliseconds (default: 100)");
    eprintln!("  -h, --help           Show this help message");
    eprintln!("  -V, --version        Show version");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  shellbot -c ./adding_game.py       # Interactive program under a pty");
    eprintln!("  shellbot -c \"ls -la | head\"        # Shell constructs go through $SHELL -c");
    eprintln!("  shellbot -c \"make test\" --no-pty   # Non-interactive fallback");
}

/// Parse CLI arguments and return configuration
pub fn parse_args() -> io::Result<CliConfig> {
    let args: Vec<String> = std::env::args().collect();
    parse_from(&args)
}

fn parse_from(args: &[String]) -> io::Result<CliConfig> {
    let mut command: Option<String> = None;
    let mut use_pty = true;
    let mut poll_ms = DEFAULT_POLL_MS;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "-h" || arg == "--help" {
            print_usage();
            std::process::exit(0);
        } else if arg == "-V" || arg == "--version" {
            println!("shellbot {}", VERSION);
            std::process::exit(0);
        } else if arg == "--no-pty" {
            use_pty = false;
            i += 1;
        } else if arg == "-c" || arg == "--command" {
            i += 1;
            if i >= args.len() {
                print_usage();
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Missing value for --command",
                ));
            }
            command = Some(args[i].clone());
            i += 1;
        } else if arg == "--poll-ms" {
            i += 1;
            if i >= args.len() {
                print_usage();
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Missing value for --poll-ms",
                ));
            }
            // Zero would turn the forwarding loop into a busy spin.
            poll_ms = match args[i].parse() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("Invalid poll-ms value: {}", args[i]),
                    ));
                }
            };
            i += 1;
        } else {
            print_usage();
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Unknown argument: {}", arg),
            ));
        }
    }

    let command = match command {
        Some(c) if !c.trim().is_empty() => c,
        Some(_) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Command must not be empty",
            ));
        }
        None => {
            print_usage();
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Missing required --command argument",
            ));
        }
    };

    Ok(CliConfig {
        command,
        use_pty,
        poll_interval: Duration::from_millis(poll_ms),
    })
}
