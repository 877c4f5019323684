use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::channel_map::ChannelMap;
use super::constants::*;
use super::error::ChunkError;

/// One decoded 432-byte recording chunk.
///
/// A chunk is a 32-byte header, a payload of 3 interleaved samples for each
/// of the 64 channels, and a 16-byte trailer. The header carries the digital
/// input register and the trailer the digital output register, both
/// little-endian u16. Samples are stored here in logical channel order,
/// i.e. the channel permutation has already been applied.
///
/// The format carries no checksum or magic number, so no structural
/// validation is possible; any full-sized block decodes.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub input_state: u16,
    pub output_state: u16,
    pub samples: [[i16; NUM_CHANNELS]; SAMPLES_PER_CHUNK],
}

impl Chunk {
    /// Decode one chunk-sized buffer, placing each payload sample at its
    /// logical channel position.
    pub fn read_from(buffer: &[u8; CHUNK_SIZE], map: &ChannelMap) -> Result<Self, ChunkError> {
        let mut cursor = Cursor::new(&buffer[..]);

        cursor.set_position(INPUT_STATE_OFFSET as u64);
        let input_state = cursor.read_u16::<LittleEndian>()?;

        cursor.set_position(HEADER_BYTES as u64);
        let mut samples = [[0i16; NUM_CHANNELS]; SAMPLES_PER_CHUNK];
        for slot in 0..(SAMPLES_PER_CHUNK * NUM_CHANNELS) {
            let value = cursor.read_i16::<LittleEndian>()?;
            let time_offset = slot / NUM_CHANNELS;
            let physical = slot % NUM_CHANNELS;
            samples[time_offset][map.logical_channel(physical)] = value;
        }

        cursor.set_position(OUTPUT_STATE_OFFSET as u64);
        let output_state = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            input_state,
            output_state,
            samples,
        })
    }
}
