//! License key generation.

use keyward_core::ports::LicenseRepository;
use keyward_core::{Error, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, warn};

/// Length of generated keys.
pub const GENERATED_KEY_LEN: usize = 20;

/// Generation attempts before giving up on finding a free key.
pub const MAX_KEY_ATTEMPTS: u32 = 5;

/// Generate a 20-character uppercase key from 128 bits of OS randomness.
pub fn generate_license_key() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);

    let mut key = format!("{:032X}", u128::from_be_bytes(bytes));
    key.truncate(GENERATED_KEY_LEN);
    key
}

/// Generate a key that is not yet present in `licenses`.
pub async fn unique_license_key(licenses: &dyn LicenseRepository) -> Result<String> {
    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let key = generate_license_key();
        if !licenses.exists_by_key(&key).await? {
            debug!(attempt, "Generated license key");
            return Ok(key);
        }
        warn!(attempt, "Generated license key collided, retrying");
    }

    Err(Error::Conflict(format!(
        "Could not generate a unique license key after {} attempts",
        MAX_KEY_ATTEMPTS
    )))
}
