use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod error;
mod payload;
mod sender;

use config::{SenderConfig, DEFAULT_HOST, DEFAULT_PORT};
use error::SendError;
use payload::{Payload, Record};
use sender::{SendReport, Sender};

/// Send one JSON record over a TCP connection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host to connect to
    #[arg(env = "LOGSEND_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(short, long, env = "LOGSEND_PORT", value_parser = port_in_range, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Text to send instead of the built-in record
    #[arg(long, env = "LOGSEND_PAYLOAD", conflicts_with_all = ["payload_file", "id"])]
    payload: Option<String>,

    /// Read the payload from a file ("-" for stdin)
    #[arg(short = 'f', long, conflicts_with = "id")]
    payload_file: Option<PathBuf>,

    /// Build the record from these fields
    #[arg(long, requires_all = ["name", "email"])]
    id: Option<String>,

    #[arg(long, requires = "id")]
    name: Option<String>,

    #[arg(long, requires = "id")]
    email: Option<String>,

    /// Append '\n' to the payload
    #[arg(short, long)]
    newline: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    wait_for_enter: bool,

    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn build_payload(&self) -> Result<Payload, SendError> {
        let payload = if let Some(text) = &self.payload {
            Payload::new(text.as_str())
        } else if let Some(path) = &self.payload_file {
            Payload::from_file(path)?
        } else if let (Some(id), Some(name), Some(email)) = (&self.id, &self.name, &self.email) {
            Payload::from_record(&Record {
                id: id.clone(),
                name: name.clone(),
                email: email.clone(),
            })?
        } else {
            Payload::default()
        };

        Ok(match self.newline {
            true => payload.with_newline(),
            false => payload,
        })
    }

    fn sender_config(&self) -> Result<SenderConfig, SendError> {
        Ok(SenderConfig::new(self.host.as_str(), self.port, self.build_payload()?))
    }
}

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("{} is not a valid port number", s))?;

    // port is a u16 value. Only 0 is an invalid port
    if port == 0 {
        Err(format!("{} is not a valid port number", s))
    } else {
        Ok(port)
    }
}

/// RUST_LOG wins, otherwise -v picks the level. Silent by default.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "off",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn wait_for_enter() {
    let mut line = String::new();
    if let Err(e) = BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        debug!(error = %e, "failed to read from stdin");
    }
}

/// One `[ERROR]` line, coloured only when stderr is a terminal.
fn error_line(message: &dyn Display, colorize: bool) -> String {
    let tag = match colorize {
        true => "[ERROR]".red().to_string(),
        false => "[ERROR]".to_string(),
    };
    format!("{} {}", tag, message)
}

fn report_error(message: &dyn Display) {
    eprintln!("{}", error_line(message, io::stderr().is_terminal()));
}

/// First line of a clap error, without clap's own `error:` label.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

async fn send(config: SenderConfig, wait: bool) -> Result<SendReport, SendError> {
    let sender = Sender::new(config);
    debug!(addr = %sender.config().addr(), bytes = sender.config().payload.len(), "sending");
    let report = sender.run().await?;

    println!(
        "Data sent to {} ({} bytes)",
        report.peer.to_string().green(),
        report.bytes
    );

    if wait {
        wait_for_enter().await;
    }

    Ok(report)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                report_error(&usage_error(&e));
                return ExitCode::from(2);
            }
        },
    };
    init_tracing(cli.verbose);

    // payload files and stdin are read before any runtime exists
    let result = cli.sender_config().and_then(|config| {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SendError::other)?
            .block_on(send(config, cli.wait_for_enter))
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "send failed");
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn port_zero_is_rejected() {
        assert_eq!(port_in_range("50000"), Ok(50000));
        assert!(port_in_range("0").is_err());
        assert!(port_in_range("65536").is_err());
        assert!(port_in_range("http").is_err());
    }

    #[test]
    fn record_flags_build_payload() {
        let cli = Cli::try_parse_from([
            "logsend",
            "--id",
            "1",
            "--name",
            "mahla soleimani",
            "--email",
            "mahla.sol2@gmail.com",
        ])
        .unwrap();

        let payload = cli.build_payload().unwrap();
        assert_eq!(
            payload.as_str(),
            r#"{"id":"1","name":"mahla soleimani","email":"mahla.sol2@gmail.com"}"#
        );
    }

    #[test]
    fn usage_errors_fit_on_one_line() {
        let e = Cli::try_parse_from(["logsend", "-p", "abc"]).unwrap_err();
        let message = usage_error(&e);
        assert!(!message.contains('\n'));
        assert!(!message.starts_with("error:"));
        assert!(message.contains("abc is not a valid port number"));
    }

    #[test]
    fn error_line_is_plain_unless_colorized() {
        let line = error_line(&"failed to connect", false);
        assert_eq!(line, "[ERROR] failed to connect");
    }

    #[test]
    fn payload_sources_conflict() {
        assert!(Cli::try_parse_from(["logsend", "--payload", "x", "-f", "y.json"]).is_err());
        assert!(Cli::try_parse_from(["logsend", "--id", "1"]).is_err());
    }
}
