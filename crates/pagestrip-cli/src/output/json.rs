use pagestrip_core::error::StripError;
use pagestrip_core::trace::AuditBundle;
use std::path::Path;

pub fn write_audit(path: &Path, audit: &AuditBundle) -> Result<(), StripError> {
    let json = serde_json::to_string_pretty(audit)?;
    std::fs::write(path, json)?;
    log::info!("audit written to {}", path.display());
    Ok(())
}
