use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use serde::Serialize;

use pxstream_core::config::{FrameOptions, ReadLimits};
use pxstream_core::constants::{CHECKSUM_LEN, FRAME_MAGIC};
use pxstream_core::framing::decode::{parse_frame_header, validate_frame};
use pxstream_core::framing::{pack_with, FrameError, FrameVersion};
use pxstream_core::io::{open_input, open_output, read_validated_frame, InputSource, OutputSink};
use pxstream_core::telemetry::{Stage, TelemetryCounters, TelemetryTimer};
use pxstream_core::utils::{compute_checksum, enum_name_or_hex, fmt_bytes};
use pxstream_core::window::{moving_average, sliding_window};

use crate::input;

/// Counters and stage timings gathered over one invocation.
#[derive(Debug, Default)]
pub struct RunStats {
    pub counters: TelemetryCounters,
    pub timer: TelemetryTimer,
}

#[derive(Serialize)]
struct RecordRow {
    timestamp: u32,
    value: i16,
}

#[derive(Serialize)]
struct DumpJson {
    version: u8,
    count: u32,
    records: Vec<RecordRow>,
}

pub fn pack(
    source: &str,
    output: &Path,
    version: u8,
    stats: &mut RunStats,
    out: &mut impl Write,
) -> Result<()> {
    let src = if source == "-" {
        InputSource::Reader(Box::new(io::stdin()))
    } else {
        InputSource::File(source.into())
    };
    let reader = open_input(src).with_context(|| format!("opening {source}"))?;
    let pairs = stats
        .timer
        .time(Stage::Read, || input::parse_records(BufReader::new(reader)))
        .with_context(|| format!("parsing {source}"))?;

    // Pack before the output exists; a failed pack must not touch it.
    let opts = FrameOptions::with_version(version);
    let blob = stats
        .timer
        .time(Stage::Encode, || pack_with(&pairs, &opts))
        .context("packing records")?;

    let (sink, _) = open_output(OutputSink::File(output.to_path_buf()))
        .with_context(|| format!("creating {}", output.display()))?;
    let mut sink = BufWriter::new(sink);
    stats
        .timer
        .time(Stage::Write, || {
            sink.write_all(&blob)?;
            sink.flush()
        })
        .with_context(|| format!("writing {}", output.display()))?;

    let written = blob.len();
    stats.counters.add_encoded_frame(pairs.len(), written);
    writeln!(
        out,
        "packed {} records ({} bytes) into {}",
        pairs.len(),
        written,
        output.display()
    )?;
    Ok(())
}

pub fn dump(
    input: &Path,
    limits: &ReadLimits,
    json: bool,
    stats: &mut RunStats,
    out: &mut impl Write,
) -> Result<()> {
    let mut reader = open_input(InputSource::File(input.to_path_buf()))
        .with_context(|| format!("opening {}", input.display()))?;

    let frame = match stats.timer.time(Stage::Read, || read_validated_frame(&mut reader, limits)) {
        Ok(frame) => frame,
        Err(e) => {
            if matches!(e.as_frame_error(), Some(FrameError::ChecksumMismatch { .. })) {
                stats.counters.add_checksum_failure();
            }
            return Err(e).with_context(|| format!("reading frame from {}", input.display()));
        }
    };

    let header = frame.header();
    let records = frame.records();
    stats.counters.add_decoded_frame(records.len(), frame.as_bytes().len());

    if json {
        let rows: Vec<RecordRow> = stats.timer.time(Stage::Decode, || {
            records
                .map(|r| RecordRow { timestamp: r.timestamp, value: r.value })
                .collect()
        });
        let doc = DumpJson {
            version: header.version,
            count: header.count,
            records: rows,
        };
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
    } else {
        for r in records {
            writeln!(out, "{}\t{}", r.timestamp, r.value)?;
        }
    }
    Ok(())
}

/// Describe a frame file field by field. Corruption is reported, not raised.
pub fn inspect(input: &Path, stats: &mut RunStats, out: &mut impl Write) -> Result<()> {
    let blob = stats
        .timer
        .time(Stage::Read, || fs::read(input))
        .with_context(|| format!("reading {}", input.display()))?;
    writeln!(out, "file:      {} ({} bytes)", input.display(), blob.len())?;

    match parse_frame_header(&blob) {
        Ok(header) => {
            let magic_note = if header.has_valid_magic() { "ok" } else { "BAD" };
            writeln!(out, "magic:     {} ({magic_note})", fmt_bytes(&header.magic))?;
            writeln!(
                out,
                "version:   {} ({})",
                header.version,
                enum_name_or_hex::<FrameVersion>(header.version)
            )?;
            writeln!(out, "count:     {}", header.count)?;
            match header.frame_len() {
                Some(need) => writeln!(out, "length:    declared {need}, actual {}", blob.len())?,
                None => writeln!(out, "length:    declared count overflows")?,
            }
        }
        Err(_) => writeln!(
            out,
            "header:    too short (expected magic {})",
            fmt_bytes(&FRAME_MAGIC)
        )?,
    }

    if blob.len() >= CHECKSUM_LEN {
        let (payload, trailer) = blob.split_at(blob.len() - CHECKSUM_LEN);
        let stored = LittleEndian::read_u32(trailer);
        let computed = compute_checksum(payload);
        let note = if stored == computed { "ok" } else { "MISMATCH" };
        writeln!(out, "checksum:  stored {stored:#010x}, computed {computed:#010x} ({note})")?;
    }

    let verdict = stats.timer.time(Stage::Validate, || validate_frame(&blob));
    match verdict {
        Ok(header) => {
            stats.counters.add_decoded_frame(header.count as usize, blob.len());
            writeln!(out, "status:    valid")?;
        }
        Err(e) => {
            if matches!(e, FrameError::ChecksumMismatch { .. }) {
                stats.counters.add_checksum_failure();
            }
            debug!("inspect {}: {e}", input.display());
            writeln!(out, "status:    invalid: {e}")?;
        }
    }
    Ok(())
}

pub fn window(
    width: usize,
    average: bool,
    values: Vec<f64>,
    stats: &mut RunStats,
    out: &mut impl Write,
) -> Result<()> {
    let values = if values.is_empty() {
        stats
            .timer
            .time(Stage::Read, || input::parse_values(io::stdin().lock()))
            .context("reading values from stdin")?
    } else {
        values
    };

    let mut lines = Vec::new();
    stats.timer.time(Stage::Window, || -> Result<()> {
        if average {
            for avg in moving_average(values, width)? {
                lines.push(avg.to_string());
            }
        } else {
            for w in sliding_window(values, width)? {
                let parts: Vec<String> = w.iter().map(f64::to_string).collect();
                lines.push(format!("({})", parts.join(", ")));
            }
        }
        Ok(())
    })?;

    stats.counters.add_windows(lines.len());
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn frame(records: Vec<(u32, i16)>) -> Vec<u8> {
        pxstream_core::framing::pack(records).unwrap()
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pxstream-cli-{}-{name}", std::process::id()))
    }

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&mut RunStats, &mut Vec<u8>) -> Result<()>,
    {
        let mut stats = RunStats::default();
        let mut out = Vec::new();
        f(&mut stats, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn window_prints_tuples() {
        let text = run(|s, o| window(3, false, vec![10.0, 11.0, 13.0, 12.0], s, o));
        assert_eq!(text, "(10, 11, 13)\n(11, 13, 12)\n");
    }

    #[test]
    fn window_prints_averages() {
        let text = run(|s, o| window(2, true, vec![1.0, 3.0, 5.0], s, o));
        assert_eq!(text, "2\n4\n");
    }

    #[test]
    fn window_rejects_zero_width() {
        let mut stats = RunStats::default();
        let err = window(0, false, vec![1.0], &mut stats, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid parameter `k`"), "{err:#}");
    }

    #[test]
    fn pack_then_dump() {
        let src = scratch("pack.txt");
        let bin = scratch("pack.px");
        fs::write(&src, "# sample\n1,120\n2,-50\n3,999\n4,0\n").unwrap();

        let mut stats = RunStats::default();
        let mut out = Vec::new();
        pack(src.to_str().unwrap(), &bin, 1, &mut stats, &mut out).unwrap();
        assert_eq!(fs::read(&bin).unwrap(), frame(vec![(1, 120), (2, -50), (3, 999), (4, 0)]));
        assert_eq!(stats.counters.records_encoded, 4);

        let text = run(|s, o| dump(&bin, &ReadLimits::default(), false, s, o));
        assert_eq!(text, "1\t120\n2\t-50\n3\t999\n4\t0\n");

        let json = run(|s, o| dump(&bin, &ReadLimits::default(), true, s, o));
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["count"], 4);
        assert_eq!(doc["records"][1]["value"], -50);

        fs::remove_file(src).ok();
        fs::remove_file(bin).ok();
    }

    #[test]
    fn failed_pack_leaves_output_untouched() {
        let src = scratch("bad.txt");
        let fresh = scratch("bad-fresh.px");
        let existing = scratch("bad-existing.px");
        fs::write(&src, "1,1\n2,99999\n").unwrap();
        fs::write(&existing, b"previous contents").unwrap();

        let mut stats = RunStats::default();
        let err = pack(src.to_str().unwrap(), &fresh, 1, &mut stats, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("record 1: value 99999 does not fit i16"), "{err:#}");
        assert!(!fresh.exists());

        pack(src.to_str().unwrap(), &existing, 1, &mut stats, &mut Vec::new()).unwrap_err();
        assert_eq!(fs::read(&existing).unwrap(), b"previous contents");
        assert_eq!(stats.counters.frames_encoded, 0);

        fs::remove_file(src).ok();
        fs::remove_file(existing).ok();
    }

    #[test]
    fn dump_counts_decoded_frame() {
        let bin = scratch("counted.px");
        fs::write(&bin, frame(vec![(7, 70), (8, 80)])).unwrap();

        let mut stats = RunStats::default();
        let mut out = Vec::new();
        dump(&bin, &ReadLimits::default(), false, &mut stats, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "7\t70\n8\t80\n");
        assert_eq!(stats.counters.frames_decoded, 1);
        assert_eq!(stats.counters.records_decoded, 2);
        assert_eq!(stats.counters.bytes_decoded, 23);

        fs::remove_file(bin).ok();
    }

    #[test]
    fn inspect_reports_corruption_without_failing() {
        let bin = scratch("corrupt.px");
        let mut blob = frame(vec![(1, 1), (2, 2)]);
        blob[8] ^= 0xFF;
        fs::write(&bin, &blob).unwrap();

        let mut stats = RunStats::default();
        let mut out = Vec::new();
        inspect(&bin, &mut stats, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("MISMATCH"), "{text}");
        assert!(text.contains("status:    invalid: checksum mismatch"), "{text}");
        assert_eq!(stats.counters.checksum_failures, 1);

        fs::remove_file(bin).ok();
    }

    #[test]
    fn inspect_names_known_version() {
        let bin = scratch("ok.px");
        fs::write(&bin, frame(Vec::new())).unwrap();

        let text = run(|s, o| inspect(&bin, s, o));
        assert!(text.contains("version:   1 (V1)"), "{text}");
        assert!(text.contains("length:    declared 11, actual 11"), "{text}");
        assert!(text.contains("status:    valid"), "{text}");

        fs::remove_file(bin).ok();
    }
}
