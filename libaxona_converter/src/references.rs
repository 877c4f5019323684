use std::path::Path;

use super::constants::{NUM_BASE_REFS, NUM_CHANNELS};
use super::error::SetFileError;

const CHANNEL_REF_PREFIX: &str = "b_in_ch_";
const BASE_REF_PREFIX: &str = "ref_";

/// Resolve the per-channel reference channels declared in a .set file.
///
/// Two line shapes matter: `b_in_ch_<channel> <slot>` assigns a channel an
/// index into the 8-slot base reference table, and `ref_<slot> <channel>`
/// populates that table. Every other line is ignored. The result is a
/// 64-entry table of reference channel per recording channel.
///
/// A channel pointing at a slot outside the base table is fatal; it is the
/// one validation failure the conversion aborts on. The resolved table is
/// not consumed by the sample pipeline today, it is computed and reported
/// for downstream referencing tools.
pub fn resolve_references(set_path: &Path) -> Result<[usize; NUM_CHANNELS], SetFileError> {
    if !set_path.exists() {
        return Err(SetFileError::BadFilePath(set_path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(set_path)?;

    let mut ref_slots = [0usize; NUM_CHANNELS];
    let mut base_refs = [0usize; NUM_BASE_REFS];
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix(CHANNEL_REF_PREFIX) {
            let (channel, slot) = split_ref_line(rest)?;
            if channel >= NUM_CHANNELS {
                return Err(SetFileError::BadLineFormat(line.to_string()));
            }
            ref_slots[channel] = slot;
        } else if let Some(rest) = line.strip_prefix(BASE_REF_PREFIX) {
            let (slot, channel) = split_ref_line(rest)?;
            if slot >= NUM_BASE_REFS {
                return Err(SetFileError::BadLineFormat(line.to_string()));
            }
            base_refs[slot] = channel;
        }
    }

    let mut resolved = [0usize; NUM_CHANNELS];
    for (channel, slot) in ref_slots.iter().enumerate() {
        if *slot >= NUM_BASE_REFS {
            return Err(SetFileError::ReferenceOutOfRange(channel, *slot));
        }
        resolved[channel] = base_refs[*slot];
        spdlog::debug!(
            "channel {} references slot {} -> channel {}",
            channel,
            slot,
            resolved[channel]
        );
    }
    Ok(resolved)
}

/// Split the tail of a reference line at its last space into two integers.
fn split_ref_line(rest: &str) -> Result<(usize, usize), SetFileError> {
    let (first, second) = rest
        .rsplit_once(' ')
        .ok_or_else(|| SetFileError::BadLineFormat(rest.to_string()))?;
    Ok((first.trim().parse()?, second.trim().parse()?))
}
