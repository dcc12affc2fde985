//! Text input parsing for the CLI.
//!
//! Records are read as `timestamp,value` lines and kept wide (`i64`); the
//! codec performs the range checks so errors carry the record index.

use std::io::BufRead;

use anyhow::{anyhow, Context, Result};

/// Parse `timestamp,value` lines. Blank lines and `#` comments are skipped.
pub fn parse_records<R: BufRead>(r: R) -> Result<Vec<(i64, i64)>> {
    let mut out = Vec::new();
    for (idx, line) in r.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.with_context(|| format!("reading line {lineno}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (ts, val) = line
            .split_once(',')
            .ok_or_else(|| anyhow!("line {lineno}: expected `timestamp,value`, got {line:?}"))?;
        let ts: i64 = ts
            .trim()
            .parse()
            .with_context(|| format!("line {lineno}: bad timestamp {:?}", ts.trim()))?;
        let val: i64 = val
            .trim()
            .parse()
            .with_context(|| format!("line {lineno}: bad value {:?}", val.trim()))?;
        out.push((ts, val));
    }
    Ok(out)
}

/// Parse numbers separated by whitespace and/or commas.
pub fn parse_values<R: BufRead>(r: R) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in r.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", idx + 1))?;
        for tok in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let v: f64 = tok
                .parse()
                .with_context(|| format!("line {}: bad number {tok:?}", idx + 1))?;
            out.push(v);
        }
    }
    Ok(out)
}
