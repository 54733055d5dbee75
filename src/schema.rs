use schemars::schema_for;

use crate::model::SnapshotInput;

/// Generate and print the JSON Schema for the `analyze --input` document.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(SnapshotInput);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
