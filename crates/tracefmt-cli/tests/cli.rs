use assert_cmd::Command;
use predicates::prelude::*;
use tracefmt_testing::{BufferSpec, CatalogBuilder, RecordSpec, TestWorld, TraceFileBuilder};
use tracefmt_types::TracePointType;

fn sample() -> TraceFileBuilder {
    TraceFileBuilder::current()
        .version(5, 0)
        .pointer_width(4)
        .buffer(
            BufferSpec::new(0x10, "main")
                .record(RecordSpec::event("vm", 1, 0x100))
                .record(RecordSpec::event("vm", 1, 0x300)),
        )
        .buffer(BufferSpec::new(0x20, "worker").record(RecordSpec::event("vm", 2, 0x200)))
}

fn setup() -> TestWorld {
    let world = TestWorld::new();
    world.write_trace("run.trc", &sample()).unwrap();
    world
        .install_catalog(
            "RuntimeTraceFormat.dat",
            &CatalogBuilder::new()
                .entry("vm", 1, TracePointType::Normal, "main tick")
                .entry("vm", 2, TracePointType::Normal, "worker tick"),
        )
        .unwrap();
    world
}

#[test]
#[allow(deprecated)]
fn test_help_lists_options() {
    Command::cargo_bin("tracefmt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--catalog-dir"))
        .stdout(predicate::str::contains("--timezone-offset"))
        .stdout(predicate::str::contains("--summary"));
}

#[test]
fn test_format_to_default_output() {
    let world = setup();
    let result = world.run(&["run.trc"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Formatted 3 tracepoints from 2 threads"));
    assert!(result.stdout().contains("run.trc.fmt"));

    let text = world.read("run.trc.fmt").unwrap();
    let lines: Vec<&str> = text.lines().filter(|l| l.contains(" vm.")).collect();
    assert_eq!(
        lines,
        vec![
            "0000000000000100 *0x00000010 vm.1           Event      main tick",
            "0000000000000200 *0x00000020 vm.2           Event      worker tick",
            "0000000000000300 *0x00000010 vm.1           Event      main tick",
        ]
    );
    assert!(text.ends_with("*** Formatting complete: 3 tracepoints formatted\n"));
}

#[test]
fn test_explicit_output_and_options() {
    let world = setup();
    let result = world
        .run(&[
            "run.trc",
            "out/formatted.txt",
            "--user-tag",
            "vm7",
            "--thread",
            "0x20",
        ])
        .unwrap();
    // The output directory does not exist.
    assert!(!result.success());
    assert!(result.stderr().contains("cannot create out/formatted.txt"));

    std::fs::create_dir_all(world.path("out")).unwrap();
    let result = world
        .run(&[
            "run.trc",
            "out/formatted.txt",
            "--user-tag",
            "vm7",
            "--thread",
            "0x20",
        ])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let text = world.read("out/formatted.txt").unwrap();
    assert!(text.contains("0000000000000200 vm7 *0x00000020 vm.2"));
    assert!(!text.contains("0x00000010 vm.1"));
}

#[test]
fn test_summary_only_prints_to_console() {
    let world = setup();
    let result = world.run(&["run.trc", "--summary"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Trace Summary"));
    assert!(result.stdout().contains("Buffers          : 2 of 2"));
    assert!(result.stdout().contains("        0x00000020  worker"));
    assert!(!world.path("run.trc.fmt").exists());
}

#[test]
fn test_summary_as_json() {
    let world = setup();
    let result = world
        .run(&["run.trc", "--summary", "--format", "json"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let json: serde_json::Value = serde_json::from_str(result.stdout()).unwrap();
    assert_eq!(json["pointer_width"], 4);
    assert_eq!(json["threads"][0]["id"], "0x00000010");
    assert_eq!(json["threads"][1]["name"], "worker");
    assert_eq!(json["version"], "5.0");
}

#[test]
fn test_run_as_json_reports_context() {
    let world = setup();
    let result = world.run(&["run.trc", "--format", "json"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let json: serde_json::Value = serde_json::from_str(result.stdout()).unwrap();
    assert_eq!(json["context"]["tracepoints_formatted"], 3);
    assert!(json["output"].as_str().unwrap().ends_with("run.trc.fmt"));
}

#[test]
fn test_missing_input_fails() {
    let world = TestWorld::new();
    let result = world.run(&["absent.trc"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("Error: Trace file absent.trc not found"));
}

#[test]
fn test_bad_header_fails() {
    let world = TestWorld::new();
    world
        .write_trace("bad.trc", &sample().magic(*b"XXXX"))
        .unwrap();
    let result = world.run(&["bad.trc"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("bad.trc"));
}

#[test]
fn test_invalid_options_are_rejected() {
    let world = setup();

    let result = world.run(&["run.trc", "--timezone-offset", "25"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("timezone offset 25"));

    let result = world.run(&["run.trc", "--thread", "zz"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("Error: "));
    assert!(result.stderr().contains("zz"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let world = setup();
    std::fs::write(world.path("tracefmt.toml"), "user_tag = \"cfg\"\n").unwrap();

    let result = world
        .run(&["run.trc", "--config", "tracefmt.toml"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let text = world.read("run.trc.fmt").unwrap();
    assert!(text.contains("0000000000000100 cfg *0x00000010"));
}

#[test]
fn test_degraded_run_warns_but_succeeds() {
    let world = TestWorld::new();
    world
        .write_trace(
            "run.trc",
            &sample()
                .buffer(BufferSpec::new(0x30, "broken").corrupt())
                .trailing_bytes(10),
        )
        .unwrap();

    let result = world.run(&["run.trc"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Warning: 1 of 3 buffers failed validation"));
    assert!(result.stdout().contains("Warning: trace data is truncated or corrupted"));

    let text = world.read("run.trc.fmt").unwrap();
    assert!(text.contains("*** 2/3 buffers processed successfully"));
    assert!(text.contains("unformatted tracepoint"));
}

#[test]
fn test_catalog_dir_alias() {
    let world = TestWorld::new();
    world.write_trace("run.trc", &sample()).unwrap();
    world
        .write_catalog(
            "cats/TraceFormat.dat",
            &CatalogBuilder::new().entry("vm", 2, TracePointType::Normal, "from override"),
        )
        .unwrap();

    let result = world.run(&["run.trc", "--datdir", "cats"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let text = world.read("run.trc.fmt").unwrap();
    assert!(text.contains("Event      from override"));
}
