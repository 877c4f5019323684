use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{SPLIT_FILE_NAME, TETRODE_SIZE};
use super::error::ConfigError;

/// Structure representing one conversion run. Contains the .set file path and
/// the output-shaping flags; every output path is derived from the .set path.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub set_file_path: PathBuf,
    pub chans_per_tetrode: usize,
    pub transpose: bool,
    pub split: bool,
    pub split_transpose: bool,
    pub split_data_dir: Option<String>,
}

impl Default for ConversionConfig {
    /// Generate a new ConversionConfig. The path field will be empty/invalid
    fn default() -> Self {
        Self {
            set_file_path: PathBuf::from("None"),
            chans_per_tetrode: TETRODE_SIZE,
            transpose: false,
            split: false,
            split_transpose: false,
            split_data_dir: None,
        }
    }
}

impl ConversionConfig {
    /// Read the configuration in a YAML file
    /// Returns a ConversionConfig if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Check the run is actually startable: the .set file must exist, the
    /// tetrode retention count must fit a tetrode, and split mode needs a
    /// destination subdirectory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.set_file_path.exists() {
            return Err(ConfigError::BadFilePath(self.set_file_path.clone()));
        }
        if self.chans_per_tetrode < 1 || self.chans_per_tetrode > TETRODE_SIZE {
            return Err(ConfigError::BadArgument(format!(
                "chans_per_tetrode must be between 1 and {}, got {}",
                TETRODE_SIZE, self.chans_per_tetrode
            )));
        }
        if self.split && self.split_data_dir.is_none() {
            return Err(ConfigError::BadArgument(String::from(
                "split output requested without a split output subdirectory",
            )));
        }
        Ok(())
    }

    /// The recording data file that accompanies the .set file.
    pub fn bin_file_path(&self) -> PathBuf {
        self.set_file_path.with_extension("bin")
    }

    /// The primary reorganized output, `<base>_shuff.bin`.
    pub fn shuff_file_path(&self) -> PathBuf {
        let mut base = self.set_file_path.with_extension("").into_os_string();
        base.push("_shuff.bin");
        PathBuf::from(base)
    }

    /// The digital event log, `<base>.inp`.
    pub fn inp_file_path(&self) -> PathBuf {
        self.set_file_path.with_extension("inp")
    }

    /// Directory holding the recording, used as the root of split output.
    pub fn output_dir(&self) -> PathBuf {
        match self.set_file_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        }
    }

    /// Where one tetrode's split output lives:
    /// `<dir>/<split-subdir>/<tetrode>/recording.dat`.
    /// None when no split subdirectory is configured.
    pub fn split_file_path(&self, tetrode: usize) -> Option<PathBuf> {
        self.split_data_dir.as_ref().map(|subdir| {
            self.output_dir()
                .join(subdir)
                .join(tetrode.to_string())
                .join(SPLIT_FILE_NAME)
        })
    }
}
