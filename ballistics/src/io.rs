use anyhow::{Context, Result};
use std::path::Path;

use crate::protocol::ShotLog;

// ============================================================================
// Shot Log Encoding
// ============================================================================

#[cfg(feature = "bincode")]
pub fn encode_shot_log(log: &ShotLog) -> Result<Vec<u8>> {
    let data = bincode::encode_to_vec(log, bincode::config::standard())?;
    Ok(data)
}

#[cfg(not(feature = "bincode"))]
pub fn encode_shot_log(log: &ShotLog) -> Result<Vec<u8>> {
    let data = serde_json::to_vec(log)?;
    Ok(data)
}

#[cfg(feature = "bincode")]
pub fn decode_shot_log(data: &[u8]) -> Result<ShotLog> {
    let result = bincode::decode_from_slice(data, bincode::config::standard())?.0;
    Ok(result)
}

#[cfg(not(feature = "bincode"))]
pub fn decode_shot_log(data: &[u8]) -> Result<ShotLog> {
    let result = serde_json::from_slice(data)?;
    Ok(result)
}

// ============================================================================
// Shot Log Files
// ============================================================================

pub fn write_shot_log(path: &Path, log: &ShotLog) -> Result<()> {
    let data = encode_shot_log(log).context("Failed to encode shot log")?;
    std::fs::write(path, data).with_context(|| format!("Failed to write shot log {}", path.display()))
}

pub fn read_shot_log(path: &Path) -> Result<ShotLog> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read shot log {}", path.display()))?;
    decode_shot_log(&data).with_context(|| format!("Failed to decode shot log {}", path.display()))
}
