//! License lifecycle rules.
//!
//! Pure decision functions over a loaded [`License`] and a single `now`
//! snapshot. They never touch storage: the caller applies the returned
//! outcome and persists the record when [`ActivationOutcome::persists`] or
//! [`ValidationOutcome::persists`] says so.

use crate::license::{License, LicenseStatus};
use chrono::{DateTime, Utc};

pub const MSG_CREATED: &str = "License created successfully.";
pub const MSG_RETRIEVED: &str = "License retrieved successfully.";
pub const MSG_UPDATED: &str = "License updated successfully.";
pub const MSG_ACTIVATED: &str = "License activated successfully.";
pub const MSG_REACTIVATED: &str = "License re-activated on new hardware.";
pub const MSG_ALREADY_ACTIVE: &str = "License is already active.";
pub const MSG_REVOKED: &str = "License has been revoked.";
pub const MSG_EXPIRED: &str = "License has expired.";
pub const MSG_REQUIRES_ACTIVATION: &str = "License requires activation.";
pub const MSG_HARDWARE_MISMATCH: &str = "License is bound to a different hardware ID.";
pub const MSG_VALID: &str = "License is valid and active.";

/// Treat blank hardware fingerprints in requests as absent.
pub fn requested_hardware(hardware_id: Option<&str>) -> Option<&str> {
    hardware_id.filter(|hardware_id| !hardware_id.trim().is_empty())
}

/// Result of evaluating an activation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Active license presented on different hardware; binding moves.
    Rebind(String),
    /// Active license, same or no hardware supplied.
    AlreadyActive,
    /// Revoked licenses can never be activated.
    Revoked,
    /// Past its expiration date. Status is written back before failing.
    Expired,
    /// Already stored as expired and still past its date; nothing to write.
    StillExpired,
    /// Becomes active and bound to the supplied hardware (or none).
    Activate(Option<String>),
}

impl ActivationOutcome {
    /// Evaluate `license` against an activation request at `now`.
    pub fn evaluate(license: &License, hardware_id: Option<&str>, now: DateTime<Utc>) -> Self {
        let hardware_id = requested_hardware(hardware_id);

        match license.status {
            LicenseStatus::Active => match hardware_id {
                Some(requested) if license.hardware_id.as_deref() != Some(requested) => {
                    ActivationOutcome::Rebind(requested.to_string())
                }
                _ => ActivationOutcome::AlreadyActive,
            },
            LicenseStatus::Revoked => ActivationOutcome::Revoked,
            LicenseStatus::Expired if license.is_expired_at(now) => {
                ActivationOutcome::StillExpired
            }
            _ if license.is_expired_at(now) => ActivationOutcome::Expired,
            _ => ActivationOutcome::Activate(hardware_id.map(str::to_string)),
        }
    }

    /// Mutate `license` to reflect this outcome.
    pub fn apply(&self, license: &mut License, now: DateTime<Utc>) {
        match self {
            ActivationOutcome::Rebind(hardware_id) => license.rebind(hardware_id.clone(), now),
            ActivationOutcome::Expired => license.expire(),
            ActivationOutcome::Activate(hardware_id) => license.activate(hardware_id.clone(), now),
            ActivationOutcome::AlreadyActive
            | ActivationOutcome::Revoked
            | ActivationOutcome::StillExpired => {}
        }
    }

    /// Whether applying this outcome changed the stored record.
    pub fn persists(&self) -> bool {
        matches!(
            self,
            ActivationOutcome::Rebind(_) | ActivationOutcome::Expired | ActivationOutcome::Activate(_)
        )
    }

    /// Whether the activation request fails.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ActivationOutcome::Revoked | ActivationOutcome::Expired | ActivationOutcome::StillExpired
        )
    }

    pub fn message(&self) -> &'static str {
        match self {
            ActivationOutcome::Rebind(_) => MSG_REACTIVATED,
            ActivationOutcome::AlreadyActive => MSG_ALREADY_ACTIVE,
            ActivationOutcome::Revoked => MSG_REVOKED,
            ActivationOutcome::Expired | ActivationOutcome::StillExpired => MSG_EXPIRED,
            ActivationOutcome::Activate(_) => MSG_ACTIVATED,
        }
    }
}

/// Result of evaluating a validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Stored status is not `Active`.
    NotActive(LicenseStatus),
    /// Stored as `Active` but past expiration; status is written back.
    Lapsed,
    /// Bound to hardware the request did not present.
    HardwareMismatch,
    Valid,
}

impl ValidationOutcome {
    /// Evaluate `license` against a validation request at `now`.
    pub fn evaluate(license: &License, hardware_id: Option<&str>, now: DateTime<Utc>) -> Self {
        if license.status != LicenseStatus::Active {
            return ValidationOutcome::NotActive(license.status);
        }

        if license.is_expired_at(now) {
            return ValidationOutcome::Lapsed;
        }

        if let Some(bound) = license.bound_hardware()
            && hardware_id != Some(bound)
        {
            return ValidationOutcome::HardwareMismatch;
        }

        ValidationOutcome::Valid
    }

    pub fn apply(&self, license: &mut License) {
        if let ValidationOutcome::Lapsed = self {
            license.expire();
        }
    }

    pub fn persists(&self) -> bool {
        matches!(self, ValidationOutcome::Lapsed)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn message(&self) -> String {
        match self {
            ValidationOutcome::NotActive(LicenseStatus::Expired) | ValidationOutcome::Lapsed => {
                MSG_EXPIRED.to_string()
            }
            ValidationOutcome::NotActive(LicenseStatus::Revoked) => MSG_REVOKED.to_string(),
            ValidationOutcome::NotActive(LicenseStatus::PendingActivation) => {
                MSG_REQUIRES_ACTIVATION.to_string()
            }
            ValidationOutcome::NotActive(status) => {
                format!("License is not active. Current status: {}", status)
            }
            ValidationOutcome::HardwareMismatch => MSG_HARDWARE_MISMATCH.to_string(),
            ValidationOutcome::Valid => MSG_VALID.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{LicenseId, ProductId};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn license(status: LicenseStatus, hardware_id: Option<&str>, expires_in: Duration) -> License {
        License {
            id: LicenseId::new(),
            license_key: "ABC1234567".to_string(),
            product_id: ProductId::new(),
            product_name: "P".to_string(),
            licensed_to: "Acme".to_string(),
            issue_date: now() - Duration::days(30),
            expiration_date: now() + expires_in,
            status,
            enabled_features: BTreeSet::new(),
            max_users: None,
            hardware_id: hardware_id.map(str::to_string),
            activation_date: None,
            revision: 1,
            created_at: now() - Duration::days(30),
            updated_at: now() - Duration::days(30),
        }
    }

    #[test]
    fn test_activate_pending_binds_hardware() {
        let mut lic = license(LicenseStatus::PendingActivation, None, Duration::days(10));
        let outcome = ActivationOutcome::evaluate(&lic, Some("H1"), now());
        assert_eq!(outcome, ActivationOutcome::Activate(Some("H1".to_string())));

        outcome.apply(&mut lic, now());
        assert_eq!(lic.status, LicenseStatus::Active);
        assert_eq!(lic.hardware_id.as_deref(), Some("H1"));
        assert_eq!(lic.activation_date, Some(now()));
    }

    #[test]
    fn test_activate_suspended_without_hardware_clears_binding() {
        let mut lic = license(LicenseStatus::Suspended, Some("OLD"), Duration::days(10));
        let outcome = ActivationOutcome::evaluate(&lic, None, now());
        outcome.apply(&mut lic, now());
        assert_eq!(lic.status, LicenseStatus::Active);
        assert_eq!(lic.hardware_id, None);
    }

    #[test]
    fn test_activate_active_on_new_hardware_rebinds() {
        let mut lic = license(LicenseStatus::Active, Some("H1"), Duration::days(10));
        let outcome = ActivationOutcome::evaluate(&lic, Some("H2"), now());
        assert_eq!(outcome, ActivationOutcome::Rebind("H2".to_string()));
        assert!(outcome.persists());

        outcome.apply(&mut lic, now());
        assert_eq!(lic.status, LicenseStatus::Active);
        assert_eq!(lic.hardware_id.as_deref(), Some("H2"));
        assert_eq!(lic.activation_date, Some(now()));
    }

    #[test]
    fn test_activate_active_same_or_absent_hardware_is_noop() {
        let lic = license(LicenseStatus::Active, Some("H1"), Duration::days(10));
        for requested in [Some("H1"), None, Some("  ")] {
            let outcome = ActivationOutcome::evaluate(&lic, requested, now());
            assert_eq!(outcome, ActivationOutcome::AlreadyActive);
            assert!(!outcome.persists());
        }
    }

    #[test]
    fn test_activate_active_ignores_expiration() {
        let lic = license(LicenseStatus::Active, None, -Duration::days(1));
        assert_eq!(
            ActivationOutcome::evaluate(&lic, None, now()),
            ActivationOutcome::AlreadyActive
        );
    }

    #[test]
    fn test_activate_revoked_rejected_even_when_expired() {
        let lic = license(LicenseStatus::Revoked, None, -Duration::days(1));
        let outcome = ActivationOutcome::evaluate(&lic, Some("H1"), now());
        assert_eq!(outcome, ActivationOutcome::Revoked);
        assert!(outcome.is_rejection());
        assert!(!outcome.persists());
    }

    #[test]
    fn test_activate_expired_date_writes_back() {
        let mut lic = license(LicenseStatus::PendingActivation, None, -Duration::seconds(1));
        let outcome = ActivationOutcome::evaluate(&lic, Some("H1"), now());
        assert_eq!(outcome, ActivationOutcome::Expired);
        assert!(outcome.is_rejection());
        assert!(outcome.persists());

        outcome.apply(&mut lic, now());
        assert_eq!(lic.status, LicenseStatus::Expired);
        assert_eq!(lic.hardware_id, None);
        assert_eq!(lic.activation_date, None);
    }

    #[test]
    fn test_activate_stored_expired_past_date_skips_write() {
        let mut lic = license(LicenseStatus::Expired, None, -Duration::days(1));
        let outcome = ActivationOutcome::evaluate(&lic, Some("H1"), now());
        assert_eq!(outcome, ActivationOutcome::StillExpired);
        assert!(outcome.is_rejection());
        assert!(!outcome.persists());
        assert_eq!(outcome.message(), MSG_EXPIRED);

        outcome.apply(&mut lic, now());
        assert_eq!(lic.status, LicenseStatus::Expired);
        assert_eq!(lic.hardware_id, None);
    }

    #[test]
    fn test_activate_expiring_exactly_now_is_allowed() {
        let lic = license(LicenseStatus::PendingActivation, None, Duration::zero());
        assert!(matches!(
            ActivationOutcome::evaluate(&lic, None, now()),
            ActivationOutcome::Activate(None)
        ));
    }

    #[test]
    fn test_validate_messages_for_inactive_statuses() {
        let cases = [
            (LicenseStatus::Expired, MSG_EXPIRED.to_string()),
            (LicenseStatus::Revoked, MSG_REVOKED.to_string()),
            (LicenseStatus::PendingActivation, MSG_REQUIRES_ACTIVATION.to_string()),
            (
                LicenseStatus::Suspended,
                "License is not active. Current status: SUSPENDED".to_string(),
            ),
        ];
        for (status, message) in cases {
            let lic = license(status, None, Duration::days(10));
            let outcome = ValidationOutcome::evaluate(&lic, None, now());
            assert_eq!(outcome, ValidationOutcome::NotActive(status));
            assert_eq!(outcome.message(), message);
            assert!(!outcome.persists());
        }
    }

    #[test]
    fn test_validate_active_past_expiration_lapses() {
        let mut lic = license(LicenseStatus::Active, None, -Duration::seconds(1));
        let outcome = ValidationOutcome::evaluate(&lic, None, now());
        assert_eq!(outcome, ValidationOutcome::Lapsed);
        assert!(outcome.persists());
        outcome.apply(&mut lic);
        assert_eq!(lic.status, LicenseStatus::Expired);
    }

    #[test]
    fn test_validate_hardware_binding() {
        let lic = license(LicenseStatus::Active, Some("H1"), Duration::days(10));
        assert_eq!(
            ValidationOutcome::evaluate(&lic, Some("H2"), now()),
            ValidationOutcome::HardwareMismatch
        );
        assert_eq!(
            ValidationOutcome::evaluate(&lic, None, now()),
            ValidationOutcome::HardwareMismatch
        );
        assert_eq!(
            ValidationOutcome::evaluate(&lic, Some("H1"), now()),
            ValidationOutcome::Valid
        );
    }

    #[test]
    fn test_validate_blank_binding_accepts_any_hardware() {
        let lic = license(LicenseStatus::Active, Some(""), Duration::days(10));
        let outcome = ValidationOutcome::evaluate(&lic, Some("anything"), now());
        assert!(outcome.is_valid());
        assert_eq!(outcome.message(), MSG_VALID);
    }
}
