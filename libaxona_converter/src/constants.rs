//! Fixed layout constants of the Axona .bin recording format and the
//! derived output files. The format supports exactly one chunk layout;
//! none of these are configurable at runtime.

/// Total size of one recording chunk in bytes.
pub const CHUNK_SIZE: usize = 432;
/// Bytes of chunk header preceding the sample payload.
pub const HEADER_BYTES: usize = 32;
/// Bytes of chunk trailer following the sample payload.
pub const TRAILER_BYTES: usize = 16;
/// Bytes per recorded sample.
pub const SAMPLE_BYTES: usize = 2;
/// Acquisition channels present in every chunk.
pub const NUM_CHANNELS: usize = 64;
/// Interleaved samples per channel in one chunk.
pub const SAMPLES_PER_CHUNK: usize = 3;
/// Sample payload bytes in one chunk.
pub const PAYLOAD_BYTES: usize = CHUNK_SIZE - HEADER_BYTES - TRAILER_BYTES;
/// Byte offset of the digital input register (little-endian u16).
pub const INPUT_STATE_OFFSET: usize = 8;
/// Byte offset of the digital output register (little-endian u16).
pub const OUTPUT_STATE_OFFSET: usize = 416;

/// Rows of samples held in memory per block when writing time-major output.
pub const TRANSPOSE_BLOCK_SIZE: usize = 2_880_000;
/// Channels in one tetrode group.
pub const TETRODE_SIZE: usize = 4;
/// File name of each per-tetrode split output.
pub const SPLIT_FILE_NAME: &str = "recording.dat";

/// Initial register history value. Outside the range the hardware produces
/// in practice, so the first chunk registers as a change for both registers.
pub const DIGITAL_STATE_SENTINEL: u16 = 1000;
/// Width of one packed digital event record in the .inp file.
pub const INP_BYTES_PER_SAMPLE: usize = 7;
/// Sample timebase written to the .inp header, in Hz.
pub const INP_TIMEBASE: u32 = 16000;

/// Slots in the base reference table of a .set file.
pub const NUM_BASE_REFS: usize = 8;
