use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use ndarray::ArrayView2;

use super::config::ConversionConfig;
use super::constants::{NUM_CHANNELS, TETRODE_SIZE};
use super::error::WriterError;

/// Writes the reorganized sample stream and, when enabled, the per-tetrode
/// split files.
///
/// The primary output is raw little-endian i16 samples with no header. In
/// time-major mode blocks are appended flush by flush; in channel-major mode
/// the whole matrix is written once at the end of the run. Split files get
/// one file per tetrode group; in channel-major mode only the first
/// `chans_per_tetrode` channels of each group are retained (or interleaved
/// when split-transpose is set), while time-major flushes always interleave.
///
/// Split output directories are never created here. A tetrode file that
/// cannot be opened is skipped without surfacing an error; downstream tools
/// are expected to lay the directories out beforehand.
#[derive(Debug)]
pub struct ShuffWriter {
    shuff_path: PathBuf,
    split_paths: Vec<PathBuf>,
    chans_per_tetrode: usize,
    split_transpose: bool,
}

impl ShuffWriter {
    /// Create the writer, truncating the primary output. Any split files
    /// left over from an earlier run are truncated too so appends start
    /// from zero.
    pub fn new(config: &ConversionConfig) -> Result<Self, WriterError> {
        let shuff_path = config.shuff_file_path();
        File::create(&shuff_path)?;

        let split_paths: Vec<PathBuf> = if config.split {
            (0..NUM_CHANNELS / TETRODE_SIZE)
                .filter_map(|tetrode| config.split_file_path(tetrode))
                .collect()
        } else {
            Vec::new()
        };
        for path in split_paths.iter() {
            File::create(path).ok();
        }

        Ok(Self {
            shuff_path,
            split_paths,
            chans_per_tetrode: config.chans_per_tetrode,
            split_transpose: config.split_transpose,
        })
    }

    /// Append one flushed block of time-major rows to the primary output.
    /// The file handle is reopened per flush and closed on return.
    pub fn append_block(&self, rows: ArrayView2<i16>) -> Result<(), WriterError> {
        let file = OpenOptions::new().append(true).open(&self.shuff_path)?;
        let mut writer = BufWriter::new(file);
        for row in rows.rows() {
            for &value in row.iter() {
                writer.write_i16::<LittleEndian>(value)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one flushed block to every tetrode file, interleaving the
    /// retained channels of each group sample by sample.
    pub fn append_block_split(&self, rows: ArrayView2<i16>) {
        for (tetrode, path) in self.split_paths.iter().enumerate() {
            // Missing directories fail the open; skip the group quietly.
            self.append_one_split_block(path, tetrode, rows).ok();
        }
    }

    fn append_one_split_block(
        &self,
        path: &Path,
        tetrode: usize,
        rows: ArrayView2<i16>,
    ) -> std::io::Result<()> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut writer = BufWriter::new(file);
        let first_channel = tetrode * TETRODE_SIZE;
        for row in rows.rows() {
            for local in 0..self.chans_per_tetrode {
                writer.write_i16::<LittleEndian>(row[first_channel + local])?;
            }
        }
        writer.flush()
    }

    /// Write the whole channel-major matrix to the primary output: for each
    /// channel, all of its samples contiguously.
    pub fn write_channel_major(&self, matrix: ArrayView2<i16>) -> Result<(), WriterError> {
        let file = OpenOptions::new().append(true).open(&self.shuff_path)?;
        let mut writer = BufWriter::new(file);
        for row in matrix.rows() {
            for &value in row.iter() {
                writer.write_i16::<LittleEndian>(value)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the channel-major split files. Without split-transpose each
    /// tetrode file holds its retained channels back to back; with it the
    /// retained channels are interleaved sample by sample.
    pub fn write_channel_major_split(&self, matrix: ArrayView2<i16>) {
        for (tetrode, path) in self.split_paths.iter().enumerate() {
            self.write_one_split_file(path, tetrode, matrix).ok();
        }
    }

    fn write_one_split_file(
        &self,
        path: &Path,
        tetrode: usize,
        matrix: ArrayView2<i16>,
    ) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let first_channel = tetrode * TETRODE_SIZE;
        let total_samples = matrix.ncols();
        if self.split_transpose {
            for sample in 0..total_samples {
                for local in 0..self.chans_per_tetrode {
                    writer.write_i16::<LittleEndian>(matrix[[first_channel + local, sample]])?;
                }
            }
        } else {
            for local in 0..self.chans_per_tetrode {
                for &value in matrix.row(first_channel + local).iter() {
                    writer.write_i16::<LittleEndian>(value)?;
                }
            }
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::path::PathBuf;

    fn scratch_config(name: &str, split: bool, split_transpose: bool) -> ConversionConfig {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let set_path = dir.join("recording.set");
        std::fs::write(&set_path, "").unwrap();
        ConversionConfig {
            set_file_path: set_path,
            chans_per_tetrode: 2,
            transpose: false,
            split,
            split_transpose,
            split_data_dir: split.then(|| String::from("split")),
        }
    }

    fn read_samples(path: &PathBuf) -> Vec<i16> {
        std::fs::read(path)
            .unwrap()
            .chunks(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// Channel-major matrix where channel c sample t is c * 100 + t.
    fn channel_major_matrix(total_samples: usize) -> Array2<i16> {
        Array2::from_shape_fn((NUM_CHANNELS, total_samples), |(channel, sample)| {
            (channel * 100 + sample) as i16
        })
    }

    #[test]
    fn test_channel_major_write_order() {
        let config = scratch_config("axona_shuff_writer_major", false, false);
        let writer = ShuffWriter::new(&config).unwrap();
        let matrix = channel_major_matrix(3);
        writer.write_channel_major(matrix.view()).unwrap();
        let samples = read_samples(&config.shuff_file_path());
        assert_eq!(samples.len(), NUM_CHANNELS * 3);
        assert_eq!(&samples[..6], &[0, 1, 2, 100, 101, 102]);
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_append_block_rows() {
        let config = scratch_config("axona_shuff_writer_block", false, false);
        let writer = ShuffWriter::new(&config).unwrap();
        let block = Array2::from_shape_fn((4, NUM_CHANNELS), |(row, channel)| {
            (row * 1000 + channel) as i16
        });
        writer.append_block(block.slice(ndarray::s![..2, ..])).unwrap();
        let samples = read_samples(&config.shuff_file_path());
        assert_eq!(samples.len(), 2 * NUM_CHANNELS);
        assert_eq!(samples[0], 0);
        assert_eq!(samples[NUM_CHANNELS], 1000);
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_split_retains_leading_channels_of_each_group() {
        let config = scratch_config("axona_shuff_writer_split", true, false);
        for tetrode in 0..NUM_CHANNELS / TETRODE_SIZE {
            let path = config.split_file_path(tetrode).unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        }
        let writer = ShuffWriter::new(&config).unwrap();
        let matrix = channel_major_matrix(3);
        writer.write_channel_major_split(matrix.view());

        // With 2 retained channels, tetrode 1 carries channels 4 and 5;
        // channels 6 and 7 are discarded.
        let samples = read_samples(&config.split_file_path(1).unwrap());
        assert_eq!(samples, vec![400, 401, 402, 500, 501, 502]);
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_split_transpose_interleaves_samples() {
        let config = scratch_config("axona_shuff_writer_split_tp", true, true);
        for tetrode in 0..NUM_CHANNELS / TETRODE_SIZE {
            let path = config.split_file_path(tetrode).unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        }
        let writer = ShuffWriter::new(&config).unwrap();
        let matrix = channel_major_matrix(2);
        writer.write_channel_major_split(matrix.view());

        let samples = read_samples(&config.split_file_path(0).unwrap());
        assert_eq!(samples, vec![0, 100, 1, 101]);
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_missing_split_directory_skipped_quietly() {
        let config = scratch_config("axona_shuff_writer_nodir", true, false);
        // Deliberately no split directories created.
        let writer = ShuffWriter::new(&config).unwrap();
        let matrix = channel_major_matrix(2);
        writer.write_channel_major_split(matrix.view());
        assert!(!config.split_file_path(0).unwrap().exists());
        std::fs::remove_dir_all(config.output_dir()).ok();
    }
}
