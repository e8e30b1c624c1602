//! Command-line argument parsing
//!
//! Supports:
//! - Breakouts and hidden values applied before printing
//! - Compact (collapsed) records and offset windows
//! - Export mode for the round-tripped flat objects
//! - Extra framework listings for the registry

use clap::Parser;
use std::path::PathBuf;

use crate::model::RecordField;

/// Capability mapping file viewer
#[derive(Parser, Debug)]
#[command(name = "crossmap", version, about = "Project a capability mapping file")]
pub struct CliArgs {
    /// Mapping file document (JSON)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Group records by FIELD (repeatable, outermost first)
    #[arg(long = "breakout", value_name = "FIELD")]
    pub breakouts: Vec<String>,

    /// Hide records whose FIELD equals VALUE (empty VALUE hides "no value")
    #[arg(long = "hide", value_name = "FIELD=VALUE")]
    pub hidden: Vec<String>,

    /// Print records at their compact height
    #[arg(short = 'c', long)]
    pub collapse: bool,

    /// Only print items visible in the offset window BEG:END
    #[arg(long, value_name = "BEG:END")]
    pub window: Option<String>,

    /// Print the flat export instead of the view
    #[arg(short = 'e', long)]
    pub export: bool,

    /// Print the view as JSON
    #[arg(long, conflicts_with = "export")]
    pub json: bool,

    /// Register a framework listing (repeatable)
    #[arg(long = "framework", value_name = "FILE")]
    pub frameworks: Vec<PathBuf>,

    /// More console logging (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What the run prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Indented text listing of the projected view
    Text,
    /// JSON dump of the projected view
    Json,
    /// Flat mapping objects
    Export,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file: PathBuf,
    pub breakouts: Vec<RecordField>,
    /// `(field, value)` pairs to hide; `None` is the "no value" bucket
    pub hidden: Vec<(RecordField, Option<String>)>,
    pub collapse: bool,
    pub window: Option<(usize, usize)>,
    pub output: OutputMode,
    pub frameworks: Vec<PathBuf>,
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        let breakouts = self
            .breakouts
            .iter()
            .map(|name| RecordField::parse(name).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        let hidden = self
            .hidden
            .iter()
            .map(|arg| parse_hidden(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let window = self.window.as_deref().map(parse_window).transpose()?;

        let output = if self.export {
            OutputMode::Export
        } else if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        Ok(RunConfig {
            file: self.file,
            breakouts,
            hidden,
            collapse: self.collapse,
            window,
            output,
            frameworks: self.frameworks,
        })
    }
}

fn parse_hidden(arg: &str) -> Result<(RecordField, Option<String>), String> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("Expected FIELD=VALUE, got '{}'", arg))?;
    let field = RecordField::parse(field.trim()).map_err(|e| e.to_string())?;
    let value = value.trim();
    Ok((field, (!value.is_empty()).then(|| value.to_string())))
}

fn parse_window(arg: &str) -> Result<(usize, usize), String> {
    let (beg, end) = arg
        .split_once(':')
        .ok_or_else(|| format!("Expected BEG:END, got '{}'", arg))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("Invalid offset '{}': {}", s, e))
    };
    let (beg, end) = (parse(beg)?, parse(end)?);
    if end < beg {
        return Err(format!("Window end {} is before its beginning {}", end, beg));
    }
    Ok((beg, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["crossmap"];
        argv.extend_from_slice(extra);
        argv.push("mapping.json");
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults_print_text() {
        let config = args(&[]).into_config().unwrap();
        assert_eq!(config.file, PathBuf::from("mapping.json"));
        assert!(config.breakouts.is_empty());
        assert!(!config.collapse);
        assert_eq!(config.window, None);
        assert_eq!(config.output, OutputMode::Text);
    }

    #[test]
    fn test_breakouts_keep_order() {
        let config = args(&["--breakout", "mapping_status", "--breakout", "source_object"])
            .into_config()
            .unwrap();
        assert_eq!(
            config.breakouts,
            vec![RecordField::MappingStatus, RecordField::SourceObject]
        );
    }

    #[test]
    fn test_unknown_breakout_field() {
        assert!(args(&["--breakout", "colour"]).into_config().is_err());
    }

    #[test]
    fn test_hide_with_empty_value_means_no_value() {
        let config = args(&["--hide", "mapping_status=", "--hide", "author=Ada"])
            .into_config()
            .unwrap();
        assert_eq!(
            config.hidden,
            vec![
                (RecordField::MappingStatus, None),
                (RecordField::Author, Some("Ada".to_string())),
            ]
        );
    }

    #[test]
    fn test_hide_requires_equals() {
        assert!(args(&["--hide", "author"]).into_config().is_err());
    }

    #[test]
    fn test_window_parsing() {
        let config = args(&["--window", "100:400"]).into_config().unwrap();
        assert_eq!(config.window, Some((100, 400)));
        assert!(args(&["--window", "400:100"]).into_config().is_err());
        assert!(args(&["--window", "abc"]).into_config().is_err());
    }

    #[test]
    fn test_export_mode() {
        let config = args(&["--export", "--collapse"]).into_config().unwrap();
        assert_eq!(config.output, OutputMode::Export);
        assert!(config.collapse);
    }

    #[test]
    fn test_verbose_counts() {
        assert_eq!(args(&[]).verbose, 0);
        assert_eq!(args(&["-vv"]).verbose, 2);
    }
}
