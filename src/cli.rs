use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::config::{ConfigError, GeneratorConfig};

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub seed: Option<u64>,
    pub missing_rate: Option<f64>,
    pub outlier_rate: Option<f64>,
    pub out_dir: PathBuf,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<Command, String> {
    let mut opts = CliOptions {
        config: None,
        preset: None,
        start: None,
        end: None,
        seed: None,
        missing_rate: None,
        outlier_rate: None,
        out_dir: PathBuf::from("output"),
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "--config", "a TOML file path")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "--preset", "a preset name")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--start" => {
                i += 1;
                opts.start = Some(parse_value(&args, i, "--start", "a YYYY-MM-DD date")?);
            }
            "--end" => {
                i += 1;
                opts.end = Some(parse_value(&args, i, "--end", "a YYYY-MM-DD date")?);
            }
            "--seed" => {
                i += 1;
                opts.seed = Some(parse_value(&args, i, "--seed", "a u64")?);
            }
            "--missing-rate" => {
                i += 1;
                opts.missing_rate = Some(parse_value(&args, i, "--missing-rate", "a number")?);
            }
            "--outlier-rate" => {
                i += 1;
                opts.outlier_rate = Some(parse_value(&args, i, "--outlier-rate", "a number")?);
            }
            "--out-dir" => {
                i += 1;
                opts.out_dir = PathBuf::from(args.next_or_err(i, "--out-dir", "a directory")?);
            }
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                opts.port = parse_value(&args, i, "--port", "a u16")?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(Command::Run(opts))
}

impl CliOptions {
    /// Loads the selected configuration source (file, preset, or baseline)
    /// and applies the command-line overrides on top.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file or preset cannot be loaded.
    pub fn load_config(&self) -> Result<GeneratorConfig, ConfigError> {
        let mut cfg = if let Some(ref path) = self.config {
            GeneratorConfig::from_toml_file(path)?
        } else if let Some(ref name) = self.preset {
            GeneratorConfig::from_preset(name)?
        } else {
            GeneratorConfig::baseline()
        };
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    fn apply_overrides(&self, cfg: &mut GeneratorConfig) {
        if let Some(start) = self.start {
            cfg.run.start_date = start;
        }
        if let Some(end) = self.end {
            cfg.run.end_date = end;
        }
        if let Some(seed) = self.seed {
            cfg.run.seed = Some(seed);
        }
        if let Some(rate) = self.missing_rate {
            cfg.quality.missing_rate = rate;
        }
        if let Some(rate) = self.outlier_rate {
            cfg.quality.outlier_rate = rate;
        }
    }
}

fn parse_value<T: FromStr>(args: &[String], i: usize, flag: &str, expected: &str) -> Result<T, String> {
    let raw = args.next_or_err(i, flag, expected)?;
    raw.parse::<T>()
        .map_err(|_| format!("{flag} value \"{raw}\" is not {expected}"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, flag: &str, expected: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, flag: &str, expected: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("missing value for {flag} (expected {expected})"))
    }
}

pub fn print_usage() {
    eprintln!("renewables-synth - synthetic renewable-energy dataset generator");
    eprintln!();
    eprintln!("Usage: renewables-synth [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        GeneratorConfig::PRESETS.join(", ")
    );
    eprintln!("  --start <YYYY-MM-DD>     First day to generate");
    eprintln!("  --end <YYYY-MM-DD>       Last day to generate (inclusive)");
    eprintln!("  --seed <u64>             Master random seed");
    eprintln!("  --missing-rate <f64>     Share of numeric cells nulled (0.0-1.0)");
    eprintln!("  --outlier-rate <f64>     Share of numeric cells replaced by outliers (0.0-1.0)");
    eprintln!("  --out-dir <path>         Output directory (default: output)");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Serve the dataset over HTTP after generation");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the baseline preset is used.");
}
