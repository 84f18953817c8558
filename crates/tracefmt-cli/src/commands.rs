use crate::args::{Cli, OutputFormat};
use crate::report;
use anyhow::{Result, bail};
use std::io;
use tracefmt_runtime::{Config, FormatOptions, TraceFormatter};
use tracefmt_types::ThreadFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let options = build_options(&cli)?;
    let cancel = options.cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || cancel.cancel()) {
        log::warn!("Cannot install Ctrl-C handler: {}", err);
    }

    let mut formatter = TraceFormatter::new(options)?;
    match cli.format {
        OutputFormat::Plain => {
            let report = formatter.run()?;
            report::print_plain(&report);
        }
        OutputFormat::Json => {
            let report = formatter.run_with(&mut io::sink())?;
            report::print_json(&report)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

fn build_options(cli: &Cli) -> Result<FormatOptions> {
    let config = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                bail!("config file {} not found", path.display());
            }
            Config::load_from(path)?
        }
        None => Config::load()?,
    };

    let mut options = FormatOptions::new(cli.input.clone());
    options.output = cli.output.clone();
    options.catalog_dir = cli.catalog_dir.clone();
    options.runtime_home = cli.runtime_home.clone();
    options.user_tag = cli.user_tag.clone();
    options.threads = if cli.threads.is_empty() {
        ThreadFilter::all()
    } else {
        ThreadFilter::parse_list(&cli.threads.join(","))?
    };
    options.timezone_offset_hours = cli.timezone_offset;
    options.indent = cli.indent;
    options.force_legacy = cli.legacy;
    options.summary_only = cli.summary;
    options.debug = cli.debug;
    options.verbose = cli.verbose;
    options.apply_config(&config);

    Ok(options)
}
