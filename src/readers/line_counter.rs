use crate::archive::Decompressor;
use crate::error::Result;
use tracing::info;

/// Full read of the decompressed stream to learn the line total.
///
/// This is a second complete decode of the archive; callers that can live
/// with an unknown denominator skip it.
pub struct LineCounter<'a> {
    decompressor: &'a Decompressor,
}

impl<'a> LineCounter<'a> {
    pub fn new(decompressor: &'a Decompressor) -> Self {
        Self { decompressor }
    }

    pub fn count(&self) -> Result<u64> {
        let mut total = 0u64;
        for line in self.decompressor.lines()? {
            line?;
            total += 1;
        }
        info!(lines = total, "Total lines in data file");
        Ok(total)
    }
}
