use crate::{BufferGeometry, Error, HEADER_LEN, RawBuffer, Result, TraceFileHeader};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// An open trace file with its parsed header.
///
/// The handle is released when the value is dropped, including on early
/// return from a failed header parse.
#[derive(Debug)]
pub struct TraceFile {
    path: Arc<Path>,
    header: TraceFileHeader,
    len: u64,
    file: File,
}

impl TraceFile {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(err),
        })?;
        let len = file.metadata()?.len();

        let mut head = Vec::with_capacity(HEADER_LEN);
        (&mut file).take(HEADER_LEN as u64).read_to_end(&mut head)?;
        let header = TraceFileHeader::parse(&head).map_err(|err| err.with_path(path))?;

        Ok(Self {
            path: Arc::from(path),
            header,
            len,
            file,
        })
    }

    pub fn path(&self) -> &Arc<Path> {
        &self.path
    }

    pub fn header(&self) -> &TraceFileHeader {
        &self.header
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn geometry(&self) -> BufferGeometry {
        BufferGeometry {
            data_start: self.header.data_start,
            buffer_size: self.header.buffer_size as u64,
            file_len: self.len,
        }
    }

    /// Read whole buffer `index`. The caller guarantees it lies inside the file.
    pub fn read_buffer(&mut self, index: u64) -> Result<RawBuffer> {
        let offset = self.geometry().offset_of(index);
        let mut bytes = vec![0u8; self.header.buffer_size as usize];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut bytes)?;

        Ok(RawBuffer {
            file: Arc::clone(&self.path),
            index,
            offset,
            sequence: 0,
            bytes,
        })
    }
}
