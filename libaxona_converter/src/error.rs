use std::path::PathBuf;
use thiserror::Error;

use super::constants::*;
use super::conversion_status::ConversionStatus;

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("Channel permutation tables are not mutually inverse at physical channel {0}")]
    BrokenInverse(usize),
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("Failed to parse buffer into Chunk: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BinFileError {
    #[error("Error when parsing Chunk from BinFile: {0}")]
    BadChunk(#[from] ChunkError),
    #[error("Could not open BinFile because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("BinFile failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SetFileError {
    #[error("Could not open SetFile because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("SetFile failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("SetFile failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
    #[error("SetFile contained a malformed reference line: {0}")]
    BadLineFormat(String),
    #[error("Reference channel out of range for channel {0}; base slot {1} exceeds the {max} slot table", max=NUM_BASE_REFS)]
    ReferenceOutOfRange(usize, usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config was given an invalid argument: {0}")]
    BadArgument(String),
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Writer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to ChannelMap error: {0}")]
    MapError(#[from] ChannelMapError),
    #[error("Processor failed due to BinFile error: {0}")]
    BinError(#[from] BinFileError),
    #[error("Processor failed due to SetFile error: {0}")]
    SetError(#[from] SetFileError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Writer error: {0}")]
    WriterError(#[from] WriterError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<ConversionStatus>),
}
