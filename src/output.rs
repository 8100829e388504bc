use crate::error::FileAccessError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Opens the destination for collected logs. `-` means stdout.
pub fn open_sink(path: &Path) -> Result<Box<dyn Write>, FileAccessError> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }

    // Create or truncate, one file per collection run.
    let file = File::create(path).map_err(|e| FileAccessError::from_io(path, e))?;
    Ok(Box::new(BufWriter::new(file)))
}
