use std::sync::mpsc::Sender;
use std::time::Instant;

use super::bin_file::BinFile;
use super::channel_map::ChannelMap;
use super::config::ConversionConfig;
use super::constants::{CHUNK_SIZE, SAMPLES_PER_CHUNK, TRANSPOSE_BLOCK_SIZE};
use super::conversion_status::{ConversionPhase, ConversionStatus};
use super::digital_event::{DigitalEvent, DigitalEventExtractor};
use super::error::ProcessorError;
use super::inp_writer::write_inp_file;
use super::references::resolve_references;
use super::sample_matrix::SampleMatrix;
use super::shuff_writer::ShuffWriter;

/// The main loop of the converter.
///
/// Takes a validated config (and a progress channel) and runs the whole
/// pipeline: resolve the reference table from the .set file, then one
/// sequential pass over the .bin chunks feeding the digital event extractor
/// and the sample matrix, then the mode-dependent writes and the .inp log.
///
/// Everything runs on the calling thread; the progress channel exists so a
/// front end on another thread can draw a bar.
pub fn process_conversion(
    config: &ConversionConfig,
    tx: &Sender<ConversionStatus>,
) -> Result<(), ProcessorError> {
    config.validate()?;

    // Computed for its validation and for downstream referencing tools;
    // conversion itself does not subtract references.
    let _reference_table = resolve_references(&config.set_file_path)?;
    spdlog::info!(
        "Resolved reference channel table from {}",
        config.set_file_path.to_string_lossy()
    );

    let map = ChannelMap::new()?;
    let mut bin_file = BinFile::open(&config.bin_file_path(), map)?;
    spdlog::info!(
        "Converting {} ({})",
        bin_file.path().to_string_lossy(),
        human_bytes::human_bytes(bin_file.size_bytes() as f64)
    );
    let total_samples = bin_file.total_samples();
    spdlog::info!("Total samples: {}", total_samples);
    if bin_file.chunk_count() == 0 {
        spdlog::warn!(
            "No complete chunks in {}",
            bin_file.path().to_string_lossy()
        );
    }

    let mut matrix = if config.transpose {
        SampleMatrix::time_major(TRANSPOSE_BLOCK_SIZE)
    } else {
        SampleMatrix::channel_major(total_samples)
    };
    let writer = ShuffWriter::new(config)?;
    let mut extractor = DigitalEventExtractor::new();
    let mut events: Vec<DigitalEvent> = Vec::new();

    let flush_frac: f32 = 0.01;
    let flush_val = (bin_file.size_bytes() as f64 * flush_frac as f64) as u64;
    let mut count: u64 = 0;
    let mut progress: f32 = 0.0;
    tx.send(ConversionStatus::new(0.0, ConversionPhase::Decode))?;

    let start = Instant::now();
    let mut sample_count: usize = 0;
    let mut chunk_index: u32 = 0;
    while let Some(chunk) = bin_file.next_chunk()? {
        extractor.observe(chunk_index, &chunk, &mut events);

        for (time_offset, row) in chunk.samples.iter().enumerate() {
            for (channel, &value) in row.iter().enumerate() {
                matrix.place(channel, sample_count + time_offset, value);
            }
        }
        sample_count += SAMPLES_PER_CHUNK;
        chunk_index += 1;

        if let Some(rows) = matrix.rows_to_flush(sample_count, sample_count == total_samples) {
            spdlog::debug!("Writing {} samples this block", rows);
            writer.append_block(matrix.live_rows(rows))?;
            writer.append_block_split(matrix.live_rows(rows));
        }

        count += CHUNK_SIZE as u64;
        if count > flush_val {
            count = 0;
            progress += flush_frac;
            tx.send(ConversionStatus::new(progress, ConversionPhase::Decode))?;
        }
    }
    spdlog::info!(
        "Elapsed time to read channel data: {:.3} s",
        start.elapsed().as_secs_f64()
    );

    let write_start = Instant::now();
    if !config.transpose {
        tx.send(ConversionStatus::new(0.0, ConversionPhase::WriteChannels))?;
        writer.write_channel_major(matrix.view())?;
        writer.write_channel_major_split(matrix.view());
        tx.send(ConversionStatus::new(1.0, ConversionPhase::WriteChannels))?;
    }

    spdlog::info!("Number of input output samples: {}", events.len());
    tx.send(ConversionStatus::new(0.0, ConversionPhase::WriteEvents))?;
    write_inp_file(&config.inp_file_path(), &events)?;
    spdlog::info!(
        "Elapsed time to write: {:.3} s",
        write_start.elapsed().as_secs_f64()
    );
    spdlog::info!(
        "Channel data is at: {}",
        config.shuff_file_path().to_string_lossy()
    );
    spdlog::info!(
        "Input data is at: {}",
        config.inp_file_path().to_string_lossy()
    );
    tx.send(ConversionStatus::new(1.0, ConversionPhase::Done))?;
    Ok(())
}

/// Scan the recording for digital register changes only, skipping the sample
/// matrix entirely, and write the .inp log.
///
/// Unused by the bundled CLI, which always does the full conversion, but the
/// event scan is much cheaper and useful on its own.
pub fn extract_events_only(
    config: &ConversionConfig,
    tx: &Sender<ConversionStatus>,
) -> Result<(), ProcessorError> {
    config.validate()?;

    let map = ChannelMap::new()?;
    let mut bin_file = BinFile::open(&config.bin_file_path(), map)?;
    spdlog::info!(
        "Scanning {} ({}) for digital events",
        bin_file.path().to_string_lossy(),
        human_bytes::human_bytes(bin_file.size_bytes() as f64)
    );

    let mut extractor = DigitalEventExtractor::new();
    let mut events: Vec<DigitalEvent> = Vec::new();
    tx.send(ConversionStatus::new(0.0, ConversionPhase::Decode))?;
    let start = Instant::now();
    let mut chunk_index: u32 = 0;
    while let Some(chunk) = bin_file.next_chunk()? {
        extractor.observe(chunk_index, &chunk, &mut events);
        chunk_index += 1;
    }
    spdlog::info!(
        "Elapsed time to read: {:.3} s",
        start.elapsed().as_secs_f64()
    );
    spdlog::info!("Number of input output samples: {}", events.len());

    tx.send(ConversionStatus::new(0.0, ConversionPhase::WriteEvents))?;
    write_inp_file(&config.inp_file_path(), &events)?;
    spdlog::info!(
        "Result is at: {}",
        config.inp_file_path().to_string_lossy()
    );
    tx.send(ConversionStatus::new(1.0, ConversionPhase::Done))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        HEADER_BYTES, INPUT_STATE_OFFSET, NUM_CHANNELS, OUTPUT_STATE_OFFSET, SAMPLE_BYTES,
    };
    use crate::digital_event::DigitalSource;
    use std::path::PathBuf;
    use std::sync::mpsc::channel;

    /// Sample value written at payload slot s of chunk k.
    fn sample_value(chunk: usize, slot: usize) -> i16 {
        (chunk * 200 + slot) as i16
    }

    fn chunk_bytes(chunk: usize, input_state: u16, output_state: u16) -> Vec<u8> {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        buffer[INPUT_STATE_OFFSET..INPUT_STATE_OFFSET + 2]
            .copy_from_slice(&input_state.to_le_bytes());
        buffer[OUTPUT_STATE_OFFSET..OUTPUT_STATE_OFFSET + 2]
            .copy_from_slice(&output_state.to_le_bytes());
        for slot in 0..(SAMPLES_PER_CHUNK * NUM_CHANNELS) {
            let offset = HEADER_BYTES + slot * SAMPLE_BYTES;
            buffer[offset..offset + 2].copy_from_slice(&sample_value(chunk, slot).to_le_bytes());
        }
        buffer
    }

    /// Lay out a 3-chunk recording with input register 0, 7, 0 and output
    /// register constant 0 in its own scratch directory.
    fn scratch_recording(name: &str, transpose: bool, split: bool) -> ConversionConfig {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        let set_path = dir.join("recording.set");
        std::fs::write(&set_path, "ref_0 2\nb_in_ch_0 0\n").unwrap();

        let mut bin_bytes = Vec::new();
        for (chunk, input_state) in [0u16, 7, 0].iter().enumerate() {
            bin_bytes.extend_from_slice(&chunk_bytes(chunk, *input_state, 0));
        }
        std::fs::write(dir.join("recording.bin"), &bin_bytes).unwrap();

        ConversionConfig {
            set_file_path: set_path,
            chans_per_tetrode: 2,
            transpose,
            split,
            split_transpose: false,
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

    fn read_inp_events(path: &PathBuf) -> Vec<DigitalEvent> {
        let bytes = std::fs::read(path).unwrap();
        let start = bytes
            .windows(b"data_start".len())
            .position(|window| window == b"data_start")
            .unwrap()
            + b"data_start".len();
        let end = bytes.len() - b"data_end".len();
        bytes[start..end]
            .chunks(7)
            .map(|record| DigitalEvent::unpack(record.try_into().unwrap()).unwrap())
            .collect()
    }

    /// What the converted output should hold for logical channel c at
    /// global sample index t.
    fn expected_value(map: &ChannelMap, channel: usize, t: usize) -> i16 {
        let chunk = t / SAMPLES_PER_CHUNK;
        let time_offset = t % SAMPLES_PER_CHUNK;
        let slot = time_offset * NUM_CHANNELS + map.physical_channel(channel);
        sample_value(chunk, slot)
    }

    #[test]
    fn test_end_to_end_channel_major() {
        let config = scratch_recording("axona_process_e2e_major", false, false);
        let (tx, rx) = channel();
        process_conversion(&config, &tx).unwrap();
        drop(rx);

        let map = ChannelMap::new().unwrap();
        let total_samples = 3 * SAMPLES_PER_CHUNK;
        let samples = read_samples(&config.shuff_file_path());
        assert_eq!(samples.len(), NUM_CHANNELS * total_samples);
        for channel in 0..NUM_CHANNELS {
            for t in 0..total_samples {
                assert_eq!(
                    samples[channel * total_samples + t],
                    expected_value(&map, channel, t)
                );
            }
        }

        let events = read_inp_events(&config.inp_file_path());
        assert_eq!(
            events,
            vec![
                DigitalEvent::new(0, DigitalSource::Input, 0),
                DigitalEvent::new(0, DigitalSource::Output, 0),
                DigitalEvent::new(1, DigitalSource::Input, 7),
                DigitalEvent::new(2, DigitalSource::Input, 0),
            ]
        );
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_end_to_end_time_major() {
        let config = scratch_recording("axona_process_e2e_transpose", true, false);
        let (tx, rx) = channel();
        process_conversion(&config, &tx).unwrap();
        drop(rx);

        let map = ChannelMap::new().unwrap();
        let total_samples = 3 * SAMPLES_PER_CHUNK;
        let samples = read_samples(&config.shuff_file_path());
        assert_eq!(samples.len(), NUM_CHANNELS * total_samples);
        for t in 0..total_samples {
            for channel in 0..NUM_CHANNELS {
                assert_eq!(
                    samples[t * NUM_CHANNELS + channel],
                    expected_value(&map, channel, t)
                );
            }
        }
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_end_to_end_split_retention() {
        let config = scratch_recording("axona_process_e2e_split", false, true);
        for tetrode in 0..NUM_CHANNELS / crate::constants::TETRODE_SIZE {
            let path = config.split_file_path(tetrode).unwrap();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        }
        let (tx, rx) = channel();
        process_conversion(&config, &tx).unwrap();
        drop(rx);

        // chans_per_tetrode = 2: tetrode 1 keeps channels 4 and 5, drops 6
        // and 7.
        let map = ChannelMap::new().unwrap();
        let total_samples = 3 * SAMPLES_PER_CHUNK;
        let samples = read_samples(&config.split_file_path(1).unwrap());
        assert_eq!(samples.len(), 2 * total_samples);
        for t in 0..total_samples {
            assert_eq!(samples[t], expected_value(&map, 4, t));
            assert_eq!(samples[total_samples + t], expected_value(&map, 5, t));
        }
        std::fs::remove_dir_all(config.output_dir()).ok();
    }

    #[test]
    fn test_events_only_pass_matches_full_pass() {
        let config = scratch_recording("axona_process_events_only", false, false);
        let (tx, rx) = channel();
        extract_events_only(&config, &tx).unwrap();
        drop(rx);

        let events = read_inp_events(&config.inp_file_path());
        assert_eq!(events.len(), 4);
        assert_eq!(events[2], DigitalEvent::new(1, DigitalSource::Input, 7));
        std::fs::remove_dir_all(config.output_dir()).ok();
    }
}
