use anyhow::{Context, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Draws a fresh coordinator identity: 16 bytes from the OS CSPRNG,
/// hex-encoded. Distinct across restarts with overwhelming probability,
/// which is what lets clients detect that their cursor is no longer
/// meaningful. Failure to obtain randomness is fatal at startup.
pub fn generate_instance_id() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("while generating server instance id")?;
    Ok(bytes.iter().map(|byte| format!("{:02x}", byte)).collect())
}
