use super::write_output;
use crate::config::CliConfig;
use crate::error::CliResult;
use event_models::{EventAvailabilitySnapshot, PlaceDict};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Decode a cached `place_id -> [values...]` file into a structured snapshot
pub fn execute(
    config: &CliConfig,
    event_id: String,
    input: PathBuf,
    output: Option<PathBuf>,
) -> CliResult<()> {
    info!("Decoding availability for event {} from {}", event_id, input.display());

    let contents = fs::read_to_string(&input)?;
    let cached: PlaceDict = serde_json::from_str(&contents)?;
    let snapshot = EventAvailabilitySnapshot::from_place_dict(&event_id, &cached)?;

    info!(
        "Decoded {} places ({} schema)",
        snapshot.len(),
        if snapshot.is_legacy_schema() { "legacy" } else { "current" }
    );

    write_output(config, &snapshot, output.as_deref())
}
