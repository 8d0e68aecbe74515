pub mod decode_snapshot;
pub mod encode_snapshot;
pub mod validate_message;

use crate::config::CliConfig;
use crate::error::CliResult;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write rendered JSON to `output`, or stdout when no path is given
pub(crate) fn write_output<T: Serialize>(
    config: &CliConfig,
    value: &T,
    output: Option<&Path>,
) -> CliResult<()> {
    let rendered = config.render(value)?;
    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
