use byteorder::{ByteOrder, LittleEndian};

use super::chunk::Chunk;
use super::constants::{DIGITAL_STATE_SENTINEL, INP_BYTES_PER_SAMPLE};

/// Which digital register an event was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalSource {
    Input,
    Output,
}

impl DigitalSource {
    /// The ASCII tag byte used in the packed record.
    pub fn tag(&self) -> u8 {
        match self {
            DigitalSource::Input => b'I',
            DigitalSource::Output => b'O',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'I' => Some(DigitalSource::Input),
            b'O' => Some(DigitalSource::Output),
            _ => None,
        }
    }
}

/// One recorded change of a digital register, timestamped by chunk index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalEvent {
    pub timestamp: u32,
    pub source: DigitalSource,
    pub value: u16,
}

impl DigitalEvent {
    pub fn new(timestamp: u32, source: DigitalSource, value: u16) -> Self {
        Self {
            timestamp,
            source,
            value,
        }
    }

    /// Pack into the 7-byte .inp record: `timestamp << 24 | tag << 16 | value`,
    /// little-endian.
    pub fn pack(&self) -> [u8; INP_BYTES_PER_SAMPLE] {
        let packed = ((self.timestamp as u64) << 24)
            | ((self.source.tag() as u64) << 16)
            | (self.value as u64);
        let mut bytes = [0u8; INP_BYTES_PER_SAMPLE];
        LittleEndian::write_uint(&mut bytes, packed, INP_BYTES_PER_SAMPLE);
        bytes
    }

    /// Decode a packed 7-byte record. Returns None if the tag byte is not a
    /// known register tag.
    pub fn unpack(bytes: &[u8; INP_BYTES_PER_SAMPLE]) -> Option<Self> {
        let packed = LittleEndian::read_uint(bytes, INP_BYTES_PER_SAMPLE);
        let source = DigitalSource::from_tag(((packed >> 16) & 0xFF) as u8)?;
        Some(Self {
            timestamp: (packed >> 24) as u32,
            source,
            value: (packed & 0xFFFF) as u16,
        })
    }
}

/// Detects digital register changes across consecutive chunks.
///
/// Both histories start at [`DIGITAL_STATE_SENTINEL`], so the first chunk of
/// a run normally emits one event per register. A register that genuinely
/// holds the sentinel value is indistinguishable from an unset history and
/// is reported only once it changes away from it; the original acquisition
/// software behaves the same way.
///
/// This is the single extraction routine shared by the events-only pass and
/// the full conversion pass.
#[derive(Debug)]
pub struct DigitalEventExtractor {
    last_input_state: u16,
    last_output_state: u16,
}

impl Default for DigitalEventExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalEventExtractor {
    pub fn new() -> Self {
        Self {
            last_input_state: DIGITAL_STATE_SENTINEL,
            last_output_state: DIGITAL_STATE_SENTINEL,
        }
    }

    /// Compare one chunk's registers against the last-seen values, appending
    /// an event per changed register. Input is checked before Output.
    pub fn observe(&mut self, timestamp: u32, chunk: &Chunk, log: &mut Vec<DigitalEvent>) {
        if chunk.input_state != self.last_input_state {
            log.push(DigitalEvent::new(
                timestamp,
                DigitalSource::Input,
                chunk.input_state,
            ));
            self.last_input_state = chunk.input_state;
        }
        if chunk.output_state != self.last_output_state {
            log.push(DigitalEvent::new(
                timestamp,
                DigitalSource::Output,
                chunk.output_state,
            ));
            self.last_output_state = chunk.output_state;
        }
    }
}
