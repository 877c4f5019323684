//! # axona_converter
//!
//! axona_converter reorganizes raw Axona .bin recordings into the layouts
//! expected by spike-sorting tools. It takes the .bin data file produced by
//! a 64-channel Axona acquisition system (together with its .set metadata
//! file) and writes a headerless, channel-remapped sample stream plus a
//! compact .inp log of every digital input/output register change.
//!
//! ## The recording format
//!
//! A .bin recording is a sequence of fixed 432-byte chunks:
//!
//! ```text
//! | 32 byte header | 384 byte payload | 16 byte trailer |
//! ```
//!
//! The payload interleaves 3 consecutive samples for all 64 channels as
//! little-endian signed 16-bit values, striped in the acquisition hardware's
//! shuffled channel order. Bytes 8-9 of the header hold the digital input
//! register and bytes 416-417 the digital output register. There is no
//! checksum or magic number; the only possible defect is a truncated final
//! chunk, which is dropped.
//!
//! ## Outputs
//!
//! - `<base>_shuff.bin`: raw i16 samples with the channel permutation
//!   undone. Channel-major by default (each channel's samples contiguous);
//!   time-major when the transpose flag is set, written in bounded blocks so
//!   memory stays flat for arbitrarily long recordings.
//! - `<base>.inp`: ASCII header (`bytes_per_sample 7`, `timebase 16000`,
//!   `num_inp_samples N`), the token `data_start`, N packed 7-byte event
//!   records, and the token `data_end`. Each record packs
//!   `timestamp << 24 | tag << 16 | value` little-endian, where the tag is
//!   `'I'` or `'O'` and the timestamp is the chunk index.
//! - Optional per-tetrode split files at
//!   `<dir>/<split-subdir>/<tetrode>/recording.dat`, retaining or
//!   interleaving a configurable number of channels per group of 4. The
//!   split directories must already exist; the writer will not create them.
//!
//! ## Usage
//!
//! The CLI takes the .set file path and the output-shaping flags as
//! positional arguments:
//!
//! ```text
//! axona_converter_cli path/to/recording.set 4 F F
//! axona_converter_cli path/to/recording.set 2 T T T sorted
//! ```
//!
//! Runs can also be described as YAML and passed with `--config`; use the
//! `new` subcommand to generate a template:
//!
//! ```yml
//! set_file_path: None
//! chans_per_tetrode: 4
//! transpose: false
//! split: false
//! split_transpose: false
//! split_data_dir: null
//! ```
//!
//! ## Reference channels
//!
//! The .set metadata declares, per channel, an index into an 8-slot base
//! reference table. The converter resolves the full 64-entry reference
//! table up front and aborts on any slot index outside the table; the
//! resolved table is reported for downstream referencing tools but is not
//! applied to the samples during conversion.
pub mod bin_file;
pub mod channel_map;
pub mod chunk;
pub mod config;
pub mod constants;
pub mod conversion_status;
pub mod digital_event;
pub mod error;
pub mod inp_writer;
pub mod process;
pub mod references;
pub mod sample_matrix;
pub mod shuff_writer;
