mod config;
mod driver;
mod exit;
mod logging;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::DriverConfig;
use crate::driver::DriverOptions;
use crate::exit::SUCCESS;
use crate::logging::{init_logging, LogFormat, LogLevel};

const USAGE_HINT: &str = "usage: vgport <WIDTH> <HEIGHT> <TITLE> <RESIZABLE>\n\
    vgport is started by its host application and talks to it over stdin/stdout.";

#[derive(Parser, Debug)]
#[command(
    name = "vgport",
    version,
    about = "Display-side GUI driver for a framed stdin/stdout protocol"
)]
struct Cli {
    /// Initial window width.
    width: u32,

    /// Initial window height.
    height: u32,

    /// Window title.
    title: String,

    /// `true` makes the window resizable.
    resizable: String,

    /// JSON file overriding driver defaults.
    #[arg(long, value_name = "PATH", env = "VGPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Write the last rendered scene as JSON on exit.
    #[arg(long, value_name = "PATH")]
    dump_scene: Option<PathBuf>,

    /// Log output format. Overrides the config file.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Log level. Overrides the config file.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

impl Cli {
    fn options(&self) -> DriverOptions {
        DriverOptions {
            width: self.width,
            height: self.height,
            title: self.title.clone(),
            resizable: self.resizable.starts_with("true"),
            dump_scene: self.dump_scene.clone(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(SUCCESS);
            }
            _ => {
                eprintln!("{err}");
                println!("{USAGE_HINT}");
                std::process::exit(SUCCESS);
            }
        },
    };

    let result = DriverConfig::load(cli.config.as_deref()).and_then(|config| {
        init_logging(config.log.overridden(cli.log_format, cli.log_level));
        driver::run(&cli.options(), &config)
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positionals() {
        let cli = Cli::try_parse_from(["vgport", "800", "600", "Demo", "true"]).unwrap();
        let options = cli.options();
        assert_eq!((options.width, options.height), (800, 600));
        assert_eq!(options.title, "Demo");
        assert!(options.resizable);
        assert!(options.dump_scene.is_none());
        assert!(cli.log_format.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn anything_but_true_is_fixed_size() {
        let cli = Cli::try_parse_from(["vgport", "800", "600", "Demo", "false"]).unwrap();
        assert!(!cli.options().resizable);
        let cli = Cli::try_parse_from(["vgport", "800", "600", "Demo", "1"]).unwrap();
        assert!(!cli.options().resizable);
    }

    #[test]
    fn missing_positional_is_an_error() {
        let err = Cli::try_parse_from(["vgport", "800", "600"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn non_numeric_size_is_an_error() {
        let err = Cli::try_parse_from(["vgport", "wide", "600", "Demo", "true"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "vgport",
            "640",
            "480",
            "Demo",
            "true",
            "--log-format",
            "json",
            "--log-level",
            "debug",
            "--dump-scene",
            "/tmp/scene.json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.dump_scene, Some(PathBuf::from("/tmp/scene.json")));
    }
}
