use crate::buffer::{RecordClass, RecordMeta};
use crate::bytes::ByteReader;
use tracefmt_types::{TimeValue, TracePointType};

/// Fixed part of every record, up to and including the component length byte.
pub const RECORD_HEADER_LEN: usize = 25;

const KIND_TRACEPOINT: u8 = 0;
const KIND_LOST: u8 = 1;
const KIND_WRAP: u8 = 2;

/// Index records that must exactly tile `start..end`.
pub(crate) fn scan_segment(
    bytes: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<RecordMeta>,
) -> Result<(), String> {
    let mut pos = start;
    while pos < end {
        let meta = scan_record(bytes, pos, end)?.ok_or_else(|| {
            format!("zero-length record at data offset {} inside a used segment", pos)
        })?;
        pos = meta.params.end;
        out.push(meta);
    }
    Ok(())
}

/// Index records from `start` until a zero length or the end of `limit`.
pub(crate) fn scan_until_terminator(
    bytes: &[u8],
    start: usize,
    limit: usize,
    out: &mut Vec<RecordMeta>,
) -> Result<(), String> {
    let mut pos = start;
    while pos + 2 <= limit {
        match scan_record(bytes, pos, limit)? {
            Some(meta) => {
                pos = meta.params.end;
                out.push(meta);
            }
            None => break,
        }
    }
    Ok(())
}

/// Validate the record at `pos`; `Ok(None)` marks a zero-length terminator.
fn scan_record(bytes: &[u8], pos: usize, limit: usize) -> Result<Option<RecordMeta>, String> {
    let mut r = ByteReader::at(&bytes[..limit], pos);
    let short = || format!("record at {} runs past the end of its segment", pos);

    let len = r.u16().ok_or_else(short)? as usize;
    if len == 0 {
        return Ok(None);
    }
    if len < RECORD_HEADER_LEN {
        return Err(format!("record at {} has impossible length {}", pos, len));
    }
    if pos + len > limit {
        return Err(short());
    }

    let kind = r.u8().ok_or_else(short)?;
    let type_code = r.u8().ok_or_else(short)?;
    let tp_id = r.u32().ok_or_else(short)?;
    let platform = TimeValue::new(r.u64().ok_or_else(short)?);
    let system = TimeValue::new(r.u64().ok_or_else(short)?);
    let component_len = r.u8().ok_or_else(short)? as usize;

    let component_start = r.position();
    let params_start = component_start + component_len;
    let record_end = pos + len;
    if params_start > record_end {
        return Err(format!(
            "record at {} component name overruns the record",
            pos
        ));
    }

    let class = match kind {
        KIND_TRACEPOINT => RecordClass::Tracepoint(
            TracePointType::from_code(type_code).map_err(|e| format!("record at {}: {}", pos, e))?,
        ),
        KIND_LOST => {
            let count = ByteReader::at(&bytes[..record_end], params_start)
                .u32()
                .ok_or_else(|| format!("lost-records marker at {} has no count", pos))?;
            RecordClass::Lost(count)
        }
        KIND_WRAP => RecordClass::Wrap,
        other => return Err(format!("record at {} has unknown kind {}", pos, other)),
    };

    Ok(Some(RecordMeta {
        offset: pos,
        class,
        tp_id,
        platform,
        system,
        component: component_start..params_start,
        params: params_start..record_end,
    }))
}
