// The Axona acquisition hardware stripes its 64 channels across the chunk
// payload in a fixed shuffled order, so the channel seen at physical slot i
// is not recording channel i. The two tables below are the acquisition
// permutation and its inverse; the decoder only ever applies the reverse
// table, but both are kept so the relationship can be checked on startup.
use super::constants::NUM_CHANNELS;
use super::error::ChannelMapError;

/// Logical recording channel -> physical payload slot.
const REMAP_CHANNELS: [usize; NUM_CHANNELS] = [
    32, 33, 34, 35, 36, 37, 38, 39, 0, 1, 2, 3, 4, 5, 6, 7, 40, 41, 42, 43, 44, 45, 46, 47, 8, 9,
    10, 11, 12, 13, 14, 15, 48, 49, 50, 51, 52, 53, 54, 55, 16, 17, 18, 19, 20, 21, 22, 23, 56,
    57, 58, 59, 60, 61, 62, 63, 24, 25, 26, 27, 28, 29, 30, 31,
];

/// Physical payload slot -> logical recording channel.
const REVERSE_CHANNELS: [usize; NUM_CHANNELS] = [
    8, 9, 10, 11, 12, 13, 14, 15, 24, 25, 26, 27, 28, 29, 30, 31, 40, 41, 42, 43, 44, 45, 46, 47,
    56, 57, 58, 59, 60, 61, 62, 63, 0, 1, 2, 3, 4, 5, 6, 7, 16, 17, 18, 19, 20, 21, 22, 23, 32,
    33, 34, 35, 36, 37, 38, 39, 48, 49, 50, 51, 52, 53, 54, 55,
];

/// ChannelMap holds the fixed permutation between the physical payload slot
/// of a sample within a chunk and its logical recording channel.
///
/// Construction verifies that the two compile-time tables are mutually
/// inverse; the pipeline refuses to start on a broken pair.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMap {}

impl ChannelMap {
    /// Create a new ChannelMap, validating the permutation tables.
    pub fn new() -> Result<Self, ChannelMapError> {
        for physical in 0..NUM_CHANNELS {
            if REMAP_CHANNELS[REVERSE_CHANNELS[physical]] != physical
                || REVERSE_CHANNELS[REMAP_CHANNELS[physical]] != physical
            {
                return Err(ChannelMapError::BrokenInverse(physical));
            }
        }
        Ok(Self {})
    }

    /// The logical recording channel for a physical payload slot.
    pub fn logical_channel(&self, physical: usize) -> usize {
        REVERSE_CHANNELS[physical]
    }

    /// The physical payload slot carrying a logical recording channel.
    pub fn physical_channel(&self, logical: usize) -> usize {
        REMAP_CHANNELS[logical]
    }
}
