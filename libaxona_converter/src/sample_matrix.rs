use ndarray::{s, Array2, ArrayView2};

use super::constants::NUM_CHANNELS;

/// Accumulator for decoded samples, in one of the two output orientations.
///
/// Channel-major holds the entire recording in memory ([64][total_samples])
/// and is written once at the end of the run. Time-major holds a bounded
/// block ([block_size][64]) that is flushed at every block boundary, keeping
/// memory independent of recording length at the cost of more frequent I/O.
#[derive(Debug)]
pub enum SampleMatrix {
    ChannelMajor { data: Array2<i16> },
    TimeMajor { block: Array2<i16>, block_size: usize },
}

impl SampleMatrix {
    /// Whole-file channel-major matrix. Memory grows with recording length.
    pub fn channel_major(total_samples: usize) -> Self {
        Self::ChannelMajor {
            data: Array2::zeros((NUM_CHANNELS, total_samples)),
        }
    }

    /// Bounded time-major block. Rows wrap modulo `block_size`; the caller
    /// flushes at block boundaries before any row is overwritten.
    pub fn time_major(block_size: usize) -> Self {
        Self::TimeMajor {
            block: Array2::zeros((block_size, NUM_CHANNELS)),
            block_size,
        }
    }

    /// Store one sample at its (channel, global time) coordinate.
    pub fn place(&mut self, channel: usize, sample_index: usize, value: i16) {
        match self {
            Self::ChannelMajor { data } => data[[channel, sample_index]] = value,
            Self::TimeMajor { block, block_size } => {
                block[[sample_index % *block_size, channel]] = value
            }
        }
    }

    /// How many rows of the live block are due to be written after the chunk
    /// that brought the running count to `sample_count`.
    ///
    /// Time-major flushes on exact block multiples and at the final chunk
    /// (possibly a partial block); a final chunk landing exactly on a block
    /// boundary flushes the full block once. Channel-major never flushes
    /// incrementally.
    pub fn rows_to_flush(&self, sample_count: usize, is_final: bool) -> Option<usize> {
        match self {
            Self::ChannelMajor { .. } => None,
            Self::TimeMajor { block_size, .. } => {
                let remainder = sample_count % *block_size;
                if remainder == 0 || is_final {
                    let rows = if remainder == 0 { *block_size } else { remainder };
                    Some(rows)
                } else {
                    None
                }
            }
        }
    }

    /// View of the first `rows` rows of the live block.
    ///
    /// After a flush the block is only logically reset: rows past the next
    /// flush count are overwritten before they are ever read again.
    pub fn live_rows(&self, rows: usize) -> ArrayView2<i16> {
        match self {
            Self::ChannelMajor { data } => data.slice(s![..rows, ..]),
            Self::TimeMajor { block, .. } => block.slice(s![..rows, ..]),
        }
    }

    /// View of the full matrix, for the end-of-run channel-major write.
    pub fn view(&self) -> ArrayView2<i16> {
        match self {
            Self::ChannelMajor { data } => data.view(),
            Self::TimeMajor { block, .. } => block.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SAMPLES_PER_CHUNK;

    #[test]
    fn test_channel_major_placement() {
        let mut matrix = SampleMatrix::channel_major(6);
        matrix.place(5, 0, -42);
        matrix.place(5, 5, 17);
        let view = matrix.view();
        assert_eq!(view[[5, 0]], -42);
        assert_eq!(view[[5, 5]], 17);
        assert_eq!(view[[4, 0]], 0);
    }

    #[test]
    fn test_time_major_rows_wrap_per_block() {
        let mut matrix = SampleMatrix::time_major(6);
        matrix.place(0, 2, 11);
        // Sample index 8 lands on row 2 of the second block.
        matrix.place(0, 8, 22);
        assert_eq!(matrix.view()[[2, 0]], 22);
    }

    #[test]
    fn test_flush_cadence_exact_multiple() {
        // 12 samples through a block of 6: two full flushes, no remainder.
        let matrix = SampleMatrix::time_major(6);
        let mut flushes = Vec::new();
        let total = 12;
        let mut count = 0;
        while count < total {
            count += SAMPLES_PER_CHUNK;
            if let Some(rows) = matrix.rows_to_flush(count, count == total) {
                flushes.push(rows);
            }
        }
        assert_eq!(flushes, vec![6, 6]);
    }

    #[test]
    fn test_flush_cadence_with_remainder() {
        // 12 samples through a block of 9: one full flush, then 3 rows.
        let matrix = SampleMatrix::time_major(9);
        let mut flushes = Vec::new();
        let total = 12;
        let mut count = 0;
        while count < total {
            count += SAMPLES_PER_CHUNK;
            if let Some(rows) = matrix.rows_to_flush(count, count == total) {
                flushes.push(rows);
            }
        }
        assert_eq!(flushes, vec![9, 3]);
    }

    #[test]
    fn test_channel_major_never_flushes_incrementally() {
        let matrix = SampleMatrix::channel_major(12);
        assert_eq!(matrix.rows_to_flush(6, false), None);
        assert_eq!(matrix.rows_to_flush(12, true), None);
    }
}
