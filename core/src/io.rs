//! Normalized I/O for whole frames.
//!
//! The codec itself works on in-memory blobs. This layer moves one frame
//! across `Read`/`Write`, sizing the read from the header so the reader
//! never pulls more than the frame it was asked for.

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::trace;

use crate::config::{FrameOptions, ReadLimits};
use crate::constants::{HEADER_LEN, MIN_FRAME_LEN};
use crate::framing::decode::{parse_frame_header, ValidatedFrame};
use crate::framing::encode::pack_with;
use crate::framing::{FrameError, IntoRecord, Record};
use crate::types::StreamError;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, StreamError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(std::fs::File::open(p)?),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize output sink into a boxed writer.
///
/// For `OutputSink::Memory` the second element is the buffer the writer
/// appends to.
pub fn open_output(
    sink: OutputSink,
) -> Result<(Box<dyn Write + Send>, Option<Arc<Mutex<Vec<u8>>>>), StreamError> {
    match sink {
        OutputSink::Writer(w) => Ok((w, None)),
        OutputSink::File(p) => Ok((Box::new(std::fs::File::create(p)?), None)),
        OutputSink::Memory => {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter { buf: buf.clone() };
            Ok((Box::new(writer), Some(buf)))
        }
    }
}

pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared buffer poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ================= Frames =================

/// Pack `records` and write the complete frame. Returns bytes written.
///
/// Nothing is written when packing fails.
pub fn write_frame<W, I>(w: &mut W, records: I, opts: &FrameOptions) -> Result<usize, StreamError>
where
    W: Write + ?Sized,
    I: IntoIterator,
    I::Item: IntoRecord,
{
    let blob = pack_with(records, opts)?;
    w.write_all(&blob)?;
    w.flush()?;
    trace!("wrote frame: {} bytes", blob.len());
    Ok(blob.len())
}

/// Read until `buf` is full or the reader hits EOF. Returns bytes read.
fn fill<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read exactly one frame from `r` and validate it.
///
/// - The header sizes the read; counts above `limits.max_records` are
///   refused before anything is allocated for them.
/// - EOF before the declared length is `TruncatedFrame`.
/// - The returned frame has passed every check `iter_records` performs.
pub fn read_validated_frame<R>(r: &mut R, limits: &ReadLimits) -> Result<ValidatedFrame, StreamError>
where
    R: Read + ?Sized,
{
    let mut blob = vec![0u8; HEADER_LEN];
    let got = fill(r, &mut blob)?;
    if got < HEADER_LEN {
        return Err(FrameError::TruncatedFrame { need: MIN_FRAME_LEN, have: got }.into());
    }

    let header = parse_frame_header(&blob)?;
    trace!("read frame header: {}", header.summary());

    let limit_err = FrameError::RecordLimitExceeded {
        count: header.count,
        max: limits.max_records,
    };
    if header.count > limits.max_records {
        return Err(limit_err.into());
    }
    let frame_len = header.frame_len().ok_or(limit_err)?;

    blob.resize(frame_len, 0);
    let got = fill(r, &mut blob[HEADER_LEN..])?;
    if HEADER_LEN + got < frame_len {
        return Err(FrameError::TruncatedFrame {
            need: frame_len,
            have: HEADER_LEN + got,
        }
        .into());
    }

    Ok(ValidatedFrame::new(blob)?)
}

/// [`read_validated_frame`], returning the raw bytes.
pub fn read_frame<R>(r: &mut R, limits: &ReadLimits) -> Result<Vec<u8>, StreamError>
where
    R: Read + ?Sized,
{
    read_validated_frame(r, limits).map(ValidatedFrame::into_bytes)
}

/// Read one frame and decode all of its records.
pub fn read_records<R>(r: &mut R, limits: &ReadLimits) -> Result<Vec<Record>, StreamError>
where
    R: Read + ?Sized,
{
    let frame = read_validated_frame(r, limits)?;
    Ok(frame.records().collect())
}
