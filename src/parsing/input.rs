
use anyhow::Context;
use flate2::read::MultiGzDecoder;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// First two bytes of any gzip member, BGZF included
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Read buffer size for the input stream
const INPUT_BUFFER_SIZE: usize = 1 << 20;

/// Opens the VCF input, either a file or stdin when no path is given.
/// Compression is detected from the content, so gzip/BGZF on stdin works as well.
/// # Arguments
/// * `filename` - optional path to a .vcf or .vcf.gz file
/// # Errors
/// * if the file cannot be opened or the first bytes cannot be read
pub fn open_vcf_input(filename: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match filename {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Error while opening {path:?}:"))?;
            wrap_decompression(BufReader::with_capacity(INPUT_BUFFER_SIZE, file))
                .with_context(|| format!("Error while reading {path:?}:"))
        },
        None => {
            wrap_decompression(BufReader::with_capacity(INPUT_BUFFER_SIZE, std::io::stdin()))
                .context("Error while reading stdin:")
        }
    }
}

/// Peeks at the buffered bytes and adds a gzip decoder if the stream is compressed.
/// # Arguments
/// * `reader` - the raw buffered stream
pub fn wrap_decompression<R: BufRead + 'static>(mut reader: R) -> std::io::Result<Box<dyn BufRead>> {
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        debug!("Detected gzip compressed input");
        Ok(Box::new(BufReader::with_capacity(INPUT_BUFFER_SIZE, MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Iterates over the raw lines of a stream, line terminators included.
/// A single buffer is reused for every line.
pub struct RawLineReader<R: BufRead> {
    /// The underlying stream
    reader: R,
    /// The current line
    buffer: Vec<u8>,
    /// 1-based number of the current line
    line_number: usize
}

impl<R: BufRead> RawLineReader<R> {
    /// Constructor
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(1024),
            line_number: 0
        }
    }

    /// Reads the next line into the internal buffer.
    /// Returns the 1-based line number and the raw bytes, or None at the end of the stream.
    /// # Errors
    /// * if the underlying stream fails
    pub fn next_line(&mut self) -> std::io::Result<Option<(usize, &[u8])>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if bytes_read == 0 {
            Ok(None)
        } else {
            self.line_number += 1;
            Ok(Some((self.line_number, &self.buffer)))
        }
    }
}
