use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::constants::{INP_BYTES_PER_SAMPLE, INP_TIMEBASE};
use super::digital_event::DigitalEvent;
use super::error::WriterError;

/// Write the digital event log in the .inp layout: three ASCII header
/// lines, the `data_start` token, the packed 7-byte records back to back,
/// and the closing `data_end` token.
pub fn write_inp_file(path: &Path, events: &[DigitalEvent]) -> Result<(), WriterError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "bytes_per_sample {}", INP_BYTES_PER_SAMPLE)?;
    writeln!(writer, "timebase {}", INP_TIMEBASE)?;
    writeln!(writer, "num_inp_samples {}", events.len())?;
    write!(writer, "data_start")?;
    for event in events.iter() {
        writer.write_all(&event.pack())?;
    }
    write!(writer, "data_end")?;
    writer.flush()?;
    Ok(())
}
