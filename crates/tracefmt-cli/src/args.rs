use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tracefmt")]
#[command(about = "Format binary execution-trace files into readable text", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(help = "Trace file, or a generation family with '#' in place of the generation digit")]
    pub input: String,

    #[arg(help = "Formatted output file [default: <input>.fmt]")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the trace summary only; no output file is written")]
    pub summary: bool,

    #[arg(
        long,
        visible_alias = "datdir",
        help = "Directory searched first for message catalogs"
    )]
    pub catalog_dir: Option<PathBuf>,

    #[arg(long, help = "Runtime home; catalogs are also read from <home>/lib")]
    pub runtime_home: Option<PathBuf>,

    #[arg(
        long,
        visible_alias = "uservmid",
        help = "Tag inserted into every formatted line"
    )]
    pub user_tag: Option<String>,

    #[arg(
        long = "thread",
        value_name = "IDS",
        help = "Only format these threads (hex ids, comma separated; repeatable)"
    )]
    pub threads: Vec<String>,

    #[arg(long, help = "Indent entry and exit tracepoints by nesting depth")]
    pub indent: bool,

    #[arg(
        long,
        visible_alias = "overridetimezone",
        allow_negative_numbers = true,
        value_name = "HOURS",
        help = "Hours added to UTC for the time column"
    )]
    pub timezone_offset: Option<i32>,

    #[arg(long, help = "Decode with the legacy buffer layout regardless of version")]
    pub legacy: bool,

    #[arg(long, help = "Append the source file and offset of each record")]
    pub debug: bool,

    #[arg(short, long, help = "Log per-buffer and per-lookup detail")]
    pub verbose: bool,

    #[arg(long, help = "Config file [default: <config dir>/tracefmt/config.toml]")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "plain")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "tracefmt",
            "run#.trc",
            "out.txt",
            "--datdir",
            "cats",
            "--uservmid",
            "jvm1",
            "--thread",
            "0x1a,2b",
            "--thread",
            "3c",
            "--overridetimezone",
            "-5",
            "--indent",
            "--legacy",
        ])
        .unwrap();
        assert_eq!(cli.input, "run#.trc");
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.catalog_dir, Some(PathBuf::from("cats")));
        assert_eq!(cli.user_tag.as_deref(), Some("jvm1"));
        assert_eq!(cli.threads, vec!["0x1a,2b", "3c"]);
        assert_eq!(cli.timezone_offset, Some(-5));
        assert!(cli.indent && cli.legacy);
        assert_eq!(cli.format, OutputFormat::Plain);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["tracefmt"]).is_err());
    }
}
