use tracefmt_decoder::{
    DecodedBuffer, DecoderKind, Error, TraceFile, TraceType, generation_name, open_generations,
};
use tracefmt_testing::{BufferSpec, Params, RecordSpec, TestWorld, TraceFileBuilder};
use tracefmt_types::{ThreadId, TimeValue, TracePointKind, TracePointType};

fn decode_all(file: &mut TraceFile, kind: DecoderKind) -> Vec<Result<DecodedBuffer, Error>> {
    let decoder = kind.decoder();
    let layout = file.geometry().layout();
    (0..layout.count)
        .map(|i| file.read_buffer(i).and_then(|raw| decoder.decode(raw)))
        .collect()
}

#[test]
fn test_current_file_header_and_records() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "run.trc",
            &TraceFileBuilder::current()
                .start(1_000, 1_700_000_000_000)
                .external()
                .buffer(
                    BufferSpec::new(0x10, "main")
                        .last_write(5_000, 1_700_000_000_004)
                        .record(RecordSpec::entry("vm", 1, 1_100).with_params(Params::new().u32(7)))
                        .record(RecordSpec::exit("vm", 2, 1_200)),
                ),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    let header = file.header().clone();
    assert!(header.version.supports_dual_clock());
    assert_eq!(header.trace_type, TraceType::External);
    assert_eq!(header.service_level, "R51");
    assert_eq!(header.start_platform, TimeValue::new(1_000));

    let buffers = decode_all(&mut file, DecoderKind::Current);
    assert_eq!(buffers.len(), 1);
    let buffer = buffers.into_iter().next().unwrap().unwrap();
    assert_eq!(buffer.header().thread_id, ThreadId::new(0x10));
    assert_eq!(&*buffer.header().thread_name, "main");
    assert_eq!(
        buffer.header().last_write,
        Some((TimeValue::new(5_000), TimeValue::new(1_700_000_000_004)))
    );
    assert_eq!(buffer.scan().first, Some(TimeValue::new(1_100)));
    assert_eq!(buffer.scan().last, Some(TimeValue::new(1_200)));

    let records: Vec<_> = buffer.records().collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tp_type(), Some(TracePointType::Entry));
    assert_eq!(records[0].params(), &7u32.to_le_bytes()[..]);
    assert_eq!(records[1].tp_type(), Some(TracePointType::Exit));
    // Record offsets point into the file: header, buffer header, then records.
    assert_eq!(records[0].source.offset, 64 + 64);
}

#[test]
fn test_wrapped_buffer_yields_logical_order() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "wrap.trc",
            &TraceFileBuilder::current().buffer(
                BufferSpec::new(1, "ring")
                    .records([
                        RecordSpec::event("gc", 1, 10),
                        RecordSpec::event("gc", 2, 20),
                        RecordSpec::event("gc", 3, 30),
                    ])
                    .wrapped_after(2),
            ),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    let buffer = decode_all(&mut file, DecoderKind::Current)
        .into_iter()
        .next()
        .unwrap()
        .unwrap();
    assert!(buffer.header().wrapped);
    let times: Vec<u64> = buffer.records().map(|tp| tp.platform.as_u64()).collect();
    assert_eq!(times, vec![10, 20, 30]);
}

#[test]
fn test_corrupt_buffer_is_isolated() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "corrupt.trc",
            &TraceFileBuilder::current()
                .buffer(BufferSpec::new(1, "good").record(RecordSpec::event("vm", 1, 10)))
                .buffer(BufferSpec::new(2, "bad").corrupt())
                .buffer(BufferSpec::new(3, "also-good").record(RecordSpec::event("vm", 1, 30))),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    let results = decode_all(&mut file, DecoderKind::Current);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(Error::InvalidBuffer { offset, .. }) if offset == 64 + 512
    ));
    assert!(results[2].is_ok());
}

#[test]
fn test_lost_and_wrap_markers_are_counted() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "lost.trc",
            &TraceFileBuilder::current().buffer(
                BufferSpec::new(1, "main")
                    .record(RecordSpec::lost(12, 5))
                    .record(RecordSpec::wrap(6))
                    .record(RecordSpec::event("vm", 1, 7)),
            ),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    let buffer = decode_all(&mut file, DecoderKind::Current)
        .into_iter()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(buffer.scan().lost_records, 12);
    let kinds: Vec<_> = buffer.records().map(|tp| tp.kind).collect();
    assert!(matches!(kinds[0], TracePointKind::LostRecords { count: 12 }));
    assert!(matches!(kinds[1], TracePointKind::BufferWrap));
    assert!(matches!(kinds[2], TracePointKind::Tracepoint { tp_id: 1, .. }));
}

#[test]
fn test_trailing_partial_buffer_is_truncated() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "short.trc",
            &TraceFileBuilder::current()
                .buffer(BufferSpec::new(1, "a"))
                .buffer(BufferSpec::new(2, "b"))
                .trailing_bytes(100),
        )
        .unwrap();

    let file = TraceFile::open(&path).unwrap();
    let layout = file.geometry().layout();
    assert_eq!(layout.count, 2);
    assert!(layout.truncated);
}

#[test]
fn test_legacy_layout_decodes_until_terminator() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "old.trc",
            &TraceFileBuilder::legacy().buffer(
                BufferSpec::new(0xABC, "legacy")
                    .record(RecordSpec::event("io", 4, 40))
                    .record(RecordSpec::event("io", 5, 50)),
            ),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    assert!(file.header().version.is_legacy());
    let buffer = decode_all(&mut file, DecoderKind::Legacy)
        .into_iter()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(buffer.header().last_write, None);
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.records().next().unwrap().source.offset, 64 + 40);
}

#[test]
fn test_legacy_overrun_is_rejected() {
    let world = TestWorld::new();
    let path = world
        .write_trace(
            "old-bad.trc",
            &TraceFileBuilder::legacy().buffer(BufferSpec::new(1, "x").corrupt()),
        )
        .unwrap();

    let mut file = TraceFile::open(&path).unwrap();
    let results = decode_all(&mut file, DecoderKind::Legacy);
    assert!(matches!(results[0], Err(Error::InvalidBuffer { .. })));
}

#[test]
fn test_bad_magic_names_the_file() {
    let world = TestWorld::new();
    let path = world
        .write_trace("junk.trc", &TraceFileBuilder::current().magic(*b"NOPE"))
        .unwrap();

    let err = TraceFile::open(&path).unwrap_err();
    match err {
        Error::InvalidHeader { path: Some(p), .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_generation_gap_is_skipped_and_reported() {
    let world = TestWorld::new();
    let family = world.path("gen#.trc");
    let family = family.to_str().unwrap();
    let builder = TraceFileBuilder::current().generations(3);
    world
        .write_trace("gen0.trc", &builder.clone().buffer(BufferSpec::new(1, "a")))
        .unwrap();
    world
        .write_trace("gen2.trc", &builder.buffer(BufferSpec::new(2, "b")))
        .unwrap();

    let generations = open_generations(family).unwrap();
    assert_eq!(generations.declared, 3);
    assert_eq!(generations.files.len(), 2);
    assert_eq!(generations.missing.len(), 1);
    assert_eq!(
        generations.missing[0].to_str().unwrap(),
        generation_name(family, 1)
    );
    assert!(!generations.is_complete());
}

#[test]
fn test_undeclared_family_stops_at_first_gap() {
    let world = TestWorld::new();
    let family = world.path("roll#.trc");
    let family = family.to_str().unwrap();
    let builder = TraceFileBuilder::current();
    world.write_trace("roll0.trc", &builder).unwrap();
    world.write_trace("roll1.trc", &builder).unwrap();
    world.write_trace("roll3.trc", &builder).unwrap();

    let generations = open_generations(family).unwrap();
    assert_eq!(generations.files.len(), 2);
    assert_eq!(generations.declared, 2);
    assert!(generations.is_complete());
}
