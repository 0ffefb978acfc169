use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Line-oriented view over a gzip file on disk.
///
/// Every call to [`Decompressor::lines`] starts a fresh decode from the first
/// byte, so a counting pass and a processing pass each get their own stream.
#[derive(Debug, Clone)]
pub struct Decompressor {
    path: PathBuf,
}

impl Decompressor {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> Result<LineStream> {
        let file = File::open(&self.path)?;
        let decoder = MultiGzDecoder::new(file);
        Ok(LineStream {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder),
            line_number: 0,
        })
    }
}

/// Forward-only, finite sequence of raw lines with the terminator removed.
///
/// Lines are yielded as bytes; decoding to text is the parser's business.
pub struct LineStream {
    reader: BufReader<MultiGzDecoder<File>>,
    line_number: u64,
}

impl LineStream {
    /// 1-based number of the most recently returned line.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl Iterator for LineStream {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(ProcessingError::Decompression(e))),
        }
    }
}
