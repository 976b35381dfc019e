// Аргументы командной строки
//
// Позиционные аргументы идут от частного к общему: один аргумент — режим,
// каждый следующий добавляет слева порт или хост.

use crate::config::Config;
use crate::protocol::mode::{mode_from_string, Mode};
use crate::utils::error::{ChannelError, Result};
use clap::Parser;
use std::path::PathBuf;

pub const SENDER_USAGE: &str = "sender [[[host] port] mode]";
pub const RECEIVER_USAGE: &str = "receiver [[port] mode]";
pub const ADVERSARY_USAGE: &str = "adversary [[[[host] receiver_port] listen_port] mode]";

/// Общие аргументы всех исполняемых файлов
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = "Secure point-to-point channel lab")]
pub struct Args {
    /// Positional arguments: host, ports and mode, depending on the role
    pub positional: Vec<String>,

    /// Directory holding the long-term key files
    #[arg(long)]
    pub keys_dir: Option<PathBuf>,

    /// Tracing filter for diagnostics on stderr
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    /// Перенести опции в конфигурацию
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.keys_dir {
            config.keys_dir = dir.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderArgs {
    pub host: String,
    pub port: u16,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverArgs {
    pub port: u16,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdversaryArgs {
    pub host: String,
    pub receiver_port: u16,
    pub listen_port: u16,
    pub mode: Mode,
}

pub fn sender_args(positional: &[String], config: &Config) -> Result<SenderArgs> {
    let mut args = SenderArgs {
        host: config.default_host.clone(),
        port: config.sender_port,
        mode: Mode::Plaintext,
    };
    match positional {
        [] => {}
        [mode] => args.mode = mode_from_string(mode),
        [port, mode] => {
            args.port = parse_port(port, SENDER_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        [host, port, mode] => {
            args.host = host.clone();
            args.port = parse_port(port, SENDER_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        _ => return Err(usage(SENDER_USAGE, "too many arguments")),
    }
    Ok(args)
}

pub fn receiver_args(positional: &[String], config: &Config) -> Result<ReceiverArgs> {
    let mut args = ReceiverArgs {
        port: config.receiver_port,
        mode: Mode::Plaintext,
    };
    match positional {
        [] => {}
        [mode] => args.mode = mode_from_string(mode),
        [port, mode] => {
            args.port = parse_port(port, RECEIVER_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        _ => return Err(usage(RECEIVER_USAGE, "too many arguments")),
    }
    Ok(args)
}

pub fn adversary_args(positional: &[String], config: &Config) -> Result<AdversaryArgs> {
    let mut args = AdversaryArgs {
        host: config.default_host.clone(),
        receiver_port: config.relay_target_port,
        listen_port: config.relay_listen_port,
        mode: Mode::Plaintext,
    };
    match positional {
        [] => {}
        [mode] => args.mode = mode_from_string(mode),
        [listen, mode] => {
            args.listen_port = parse_port(listen, ADVERSARY_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        [target, listen, mode] => {
            args.receiver_port = parse_port(target, ADVERSARY_USAGE)?;
            args.listen_port = parse_port(listen, ADVERSARY_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        [host, target, listen, mode] => {
            args.host = host.clone();
            args.receiver_port = parse_port(target, ADVERSARY_USAGE)?;
            args.listen_port = parse_port(listen, ADVERSARY_USAGE)?;
            args.mode = mode_from_string(mode);
        }
        _ => return Err(usage(ADVERSARY_USAGE, "too many arguments")),
    }
    Ok(args)
}

fn parse_port(value: &str, usage_line: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| usage(usage_line, &format!("invalid port {:?}", value)))
}

fn usage(usage_line: &str, problem: &str) -> ChannelError {
    ChannelError::Configuration(format!("{}\nUsage: {}", problem, usage_line))
}
