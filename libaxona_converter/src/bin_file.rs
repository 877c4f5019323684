use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::channel_map::ChannelMap;
use super::chunk::Chunk;
use super::constants::*;
use super::error::BinFileError;

/// Sequential reader over the chunks of a .bin recording.
///
/// The chunk count is fixed up front from the file size; a trailing partial
/// chunk does not count and is never decoded.
#[derive(Debug)]
pub struct BinFile {
    reader: BufReader<File>,
    map: ChannelMap,
    path: PathBuf,
    size_bytes: u64,
    total_chunks: u64,
    chunks_read: u64,
}

impl BinFile {
    /// Open a .bin recording for chunked reading.
    pub fn open(path: &Path, map: ChannelMap) -> Result<Self, BinFileError> {
        if !path.exists() {
            return Err(BinFileError::BadFilePath(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let size_bytes = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            map,
            path: PathBuf::from(path),
            size_bytes,
            total_chunks: size_bytes / CHUNK_SIZE as u64,
            chunks_read: 0,
        })
    }

    /// Read and decode the next chunk.
    ///
    /// Returns a `Result<Option<Chunk>>`. The Option is None once every
    /// complete chunk has been consumed; a truncated final chunk is dropped.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, BinFileError> {
        if self.chunks_read >= self.total_chunks {
            return Ok(None);
        }
        let mut buffer = [0u8; CHUNK_SIZE];
        match self.reader.read_exact(&mut buffer) {
            Ok(()) => (),
            // The file shrank under us; treat the ragged tail like any
            // other partial chunk and stop.
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(BinFileError::IOError(e)),
        }
        self.chunks_read += 1;
        Ok(Some(Chunk::read_from(&buffer, &self.map)?))
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Complete chunks in the file.
    pub fn chunk_count(&self) -> u64 {
        self.total_chunks
    }

    /// Total decodable samples per channel in the file.
    pub fn total_samples(&self) -> usize {
        self.total_chunks as usize * SAMPLES_PER_CHUNK
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
