//! License records and status.

use crate::ids::{LicenseId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Minimum length of a license key.
pub const MIN_KEY_LEN: usize = 10;
/// Maximum length of a license key.
pub const MAX_KEY_LEN: usize = 50;

/// Stored license status.
///
/// The status is persisted, not derived from the expiration date. An expired
/// license keeps its last stored status until an activation or validation
/// observes the expiration and writes `Expired` back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Active,
    Expired,
    Revoked,
    PendingActivation,
    Suspended,
}

impl LicenseStatus {
    pub const ALL: [LicenseStatus; 5] = [
        LicenseStatus::Active,
        LicenseStatus::Expired,
        LicenseStatus::Revoked,
        LicenseStatus::PendingActivation,
        LicenseStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "ACTIVE",
            LicenseStatus::Expired => "EXPIRED",
            LicenseStatus::Revoked => "REVOKED",
            LicenseStatus::PendingActivation => "PENDING_ACTIVATION",
            LicenseStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LicenseStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown license status: {}", s))
    }
}

/// One grant of usage rights for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    /// Client-facing key. Never reassigned after creation.
    pub license_key: String,
    pub product_id: ProductId,
    /// Name of the owning product as of the last load.
    pub product_name: String,
    pub licensed_to: String,
    pub issue_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub status: LicenseStatus,
    #[serde(default)]
    pub enabled_features: BTreeSet<String>,
    pub max_users: Option<u32>,
    pub hardware_id: Option<String>,
    pub activation_date: Option<DateTime<Utc>>,
    /// Save counter; a save must carry the revision it was loaded with.
    #[serde(default)]
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Whether the expiration date lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }

    /// Hardware fingerprint the license is bound to, ignoring blank values.
    pub fn bound_hardware(&self) -> Option<&str> {
        self.hardware_id
            .as_deref()
            .filter(|hardware_id| !hardware_id.trim().is_empty())
    }

    /// Record that the license was observed past its expiration date.
    pub fn expire(&mut self) {
        self.status = LicenseStatus::Expired;
    }

    /// Mark usable and bind to `hardware_id`, overwriting any previous binding.
    pub fn activate(&mut self, hardware_id: Option<String>, now: DateTime<Utc>) {
        self.status = LicenseStatus::Active;
        self.hardware_id = hardware_id;
        self.activation_date = Some(now);
    }

    /// Move an active license onto new hardware.
    pub fn rebind(&mut self, hardware_id: String, now: DateTime<Utc>) {
        self.hardware_id = Some(hardware_id);
        self.activation_date = Some(now);
    }
}
