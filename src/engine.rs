//! Streaming transform engine.
//!
//! Reads the input in fixed-size chunks, feeds them through the cipher
//! stream and writes whatever comes out, counting bytes on both sides. A
//! path of `-` selects the standard stream on either side. Informational
//! lines (the effective parameters and the byte counts) normally go to
//! standard output; when the payload itself is written to standard output
//! they move to standard error so the two never interleave.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::config::BUFFER_SIZE;
use crate::crypto;
use crate::hex;
use crate::options::ResolvedOptions;
use crate::suite::Mode;

/// Destination for informational lines.
#[derive(Clone, Copy)]
enum InfoSink {
    Stdout,
    Stderr,
}

impl InfoSink {
    fn line(self, text: &str) -> Result<()> {
        match self {
            Self::Stdout => writeln!(io::stdout(), "{text}")?,
            Self::Stderr => writeln!(io::stderr(), "{text}")?,
        }
        Ok(())
    }
}

/// Runs the configured transformation from input to output.
pub fn run(options: &ResolvedOptions) -> Result<()> {
    let mut input = open_input(&options.input)?;
    let (mut output, info) = open_output(&options.output, options.overwrite)?;

    print_parameters(options, info)?;
    debug!(suite = %options.suite, input = %options.input, output = %options.output, "transforming");

    let mut stream = crypto::open_stream(options)?;
    if let Some(aad) = options.aad.as_deref() {
        stream.bind_aad(aad)?;
    }

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut read_total: u64 = 0;
    let mut written_total: u64 = 0;
    loop {
        let n = input.read(&mut buffer).context("Failed to read input.")?;
        if n == 0 {
            break;
        }
        read_total += n as u64;
        let out = stream.update(&buffer[..n])?;
        output.write_all(&out).context("Failed to write output.")?;
        written_total += out.len() as u64;
    }
    info.line(&format!("{} in", count(read_total)))?;

    let tail = stream.finalize()?;
    output.write_all(&tail).context("Failed to write output.")?;
    written_total += tail.len() as u64;
    output.flush().context("Failed to write output.")?;
    info.line(&format!("{} out", count(written_total)))?;

    Ok(())
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        return Ok(Box::new(io::stdin()));
    }
    if !Path::new(path).exists() {
        bail!("Input file does not exist.");
    }
    let file = File::open(path).with_context(|| format!("Failed to open {path}."))?;
    Ok(Box::new(file))
}

fn open_output(path: &str, overwrite: bool) -> Result<(Box<dyn Write>, InfoSink)> {
    if path == "-" {
        return Ok((Box::new(io::stdout()), InfoSink::Stderr));
    }
    if !overwrite && Path::new(path).exists() {
        bail!("Output file already exists.");
    }
    let file = File::create(path).with_context(|| format!("Failed to create {path}."))?;
    Ok((Box::new(file), InfoSink::Stdout))
}

/// Prints the effective cipher parameters, labels right-aligned per mode.
fn print_parameters(options: &ResolvedOptions, info: InfoSink) -> Result<()> {
    match options.suite.mode() {
        Mode::Cbc | Mode::Cfb | Mode::Ofb => {
            info.line(&format!("KEY {}", hex::encode(&options.key)))?;
            info.line(&format!(" IV {}", hex::encode(options.iv.as_deref().unwrap_or_default())))?;
        }
        Mode::Ecb => {
            info.line(&format!("KEY {}", hex::encode(&options.key)))?;
        }
        Mode::Gcm => {
            info.line(&format!("  KEY {}", hex::encode(&options.key)))?;
            info.line(&format!("NONCE {}", hex::encode(options.nonce.as_deref().unwrap_or_default())))?;
            if let Some(aad) = options.aad.as_deref() {
                info.line(&format!("  AAD {}", hex::encode(aad)))?;
            }
        }
    }
    Ok(())
}

fn count(n: u64) -> String {
    format!("{n} {}", if n > 1 { "bytes" } else { "byte" })
}
