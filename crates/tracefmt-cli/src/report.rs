use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io;
use tracefmt_engine::RunContext;
use tracefmt_runtime::RunReport;

/// Console report after a run. Summary-only runs already printed the summary.
pub fn print_plain(report: &RunReport) {
    let Some(output) = &report.output else {
        return;
    };
    let color = io::stdout().is_terminal();
    let ctx = &report.context;

    let done = format!(
        "Formatted {} tracepoints from {} threads",
        ctx.tracepoints_formatted,
        report.summary.threads.len()
    );
    if color {
        println!("{}", done.green());
    } else {
        println!("{}", done);
    }
    println!("Output written to {}", output.display());

    for warning in warnings(ctx) {
        if color {
            println!("{}", warning.yellow());
        } else {
            println!("{}", warning);
        }
    }
}

pub fn print_json(report: &RunReport) -> Result<()> {
    let value = match &report.output {
        None => serde_json::to_value(&report.summary)?,
        Some(output) => serde_json::json!({
            "output": output,
            "summary": report.summary,
            "context": report.context,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn warnings(ctx: &RunContext) -> Vec<String> {
    let mut out = Vec::new();
    if ctx.lost_records > 0 {
        out.push(format!(
            "Warning: {} records were discarded during trace generation",
            ctx.lost_records
        ));
    }
    if ctx.invalid_buffers > 0 {
        out.push(format!(
            "Warning: {} of {} buffers failed validation",
            ctx.invalid_buffers, ctx.buffers_total
        ));
    }
    for missing in &ctx.missing_generations {
        out.push(format!("Warning: trace file {} is missing", missing.display()));
    }
    for clamped in &ctx.clamped_files {
        out.push(format!(
            "Warning: {} holds more buffers than can be indexed; the rest were skipped",
            clamped.display()
        ));
    }
    for empty in &ctx.empty_files {
        out.push(format!(
            "Warning: {} contains no trace data",
            empty.display()
        ));
    }
    if ctx.truncated {
        out.push("Warning: trace data is truncated or corrupted".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_clean_run_has_no_warnings() {
        assert!(warnings(&RunContext::new()).is_empty());
    }

    #[test]
    fn test_degraded_run_warnings() {
        let mut ctx = RunContext::new();
        ctx.lost_records = 2;
        ctx.invalid_buffers = 1;
        ctx.buffers_total = 4;
        ctx.missing_generations = vec![PathBuf::from("t1.trc")];
        ctx.clamped_files = vec![PathBuf::from("t0.trc")];
        ctx.truncated = true;
        assert_eq!(
            warnings(&ctx),
            vec![
                "Warning: 2 records were discarded during trace generation",
                "Warning: 1 of 4 buffers failed validation",
                "Warning: trace file t1.trc is missing",
                "Warning: t0.trc holds more buffers than can be indexed; the rest were skipped",
                "Warning: trace data is truncated or corrupted",
            ]
        );
    }
}
