//! License lifecycle engine.

use keyward_core::clock::{Clock, SystemClock};
use keyward_core::license::License;
use keyward_core::lifecycle::{
    ActivationOutcome, MSG_CREATED, MSG_RETRIEVED, MSG_UPDATED, ValidationOutcome,
    requested_hardware,
};
use keyward_core::ports::{LicenseRepository, ProductRepository};
use keyward_core::{Error, LicenseId, Result};
use keyward_trace::{LicenseAttributes, license_span};
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

use crate::keygen::unique_license_key;
use crate::locks::KeyLocks;
use crate::products::ProductService;
use crate::types::{ActivationRequest, LicenseRequest, LicenseResponse};

/// Creates, activates, validates, updates and deletes licenses.
///
/// Activation, validation, update and delete hold the per-key lock for the
/// whole load, decide and save sequence. The store's revision check covers
/// writers in other processes.
pub struct LicenseService {
    licenses: Arc<dyn LicenseRepository>,
    products: ProductService,
    clock: Arc<dyn Clock>,
    locks: KeyLocks,
}

impl LicenseService {
    pub fn new(licenses: Arc<dyn LicenseRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self {
            licenses,
            products: ProductService::new(products),
            clock: Arc::new(SystemClock),
            locks: KeyLocks::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a new license. Activation is always a separate step.
    pub async fn create(&self, request: &LicenseRequest) -> Result<LicenseResponse> {
        let mut attrs = LicenseAttributes::new().product(&request.product_name);
        if let Some(key) = request.requested_key() {
            attrs = attrs.key(key);
        }

        self.create_license(request)
            .instrument(license_span("create", &attrs))
            .await
    }

    async fn create_license(&self, request: &LicenseRequest) -> Result<LicenseResponse> {
        request.check_dates()?;
        let product = self.products.get_by_name(&request.product_name).await?;

        let license_key = match request.requested_key() {
            Some(key) => {
                if self.licenses.exists_by_key(key).await? {
                    return Err(Error::Conflict(format!("License key already exists: {}", key)));
                }
                key.to_string()
            }
            None => unique_license_key(self.licenses.as_ref()).await?,
        };

        let now = self.clock.now();
        let license = License {
            id: LicenseId::new(),
            license_key,
            product_id: product.id,
            product_name: product.name,
            licensed_to: request.licensed_to.clone(),
            issue_date: request.issue_date,
            expiration_date: request.expiration_date,
            status: request.status,
            enabled_features: request.enabled_features.clone(),
            max_users: request.max_users,
            hardware_id: request.hardware_id.clone(),
            activation_date: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        let saved = self.licenses.save(&license).await?;
        info!(
            license_key = %saved.license_key,
            product = %saved.product_name,
            status = %saved.status,
            "License created"
        );
        Ok(LicenseResponse::new(&saved, MSG_CREATED))
    }

    /// Get a license by key. Never reconciles the stored status.
    pub async fn get(&self, license_key: &str) -> Result<LicenseResponse> {
        let license = self.find(license_key).await?;
        debug!(license_key, status = %license.status, "License retrieved");
        Ok(LicenseResponse::new(&license, MSG_RETRIEVED))
    }

    /// All licenses, oldest first, with their stored status.
    pub async fn list(&self) -> Result<Vec<LicenseResponse>> {
        let licenses = self.licenses.find_all().await?;
        debug!(count = licenses.len(), "Listed licenses");
        Ok(licenses.iter().map(LicenseResponse::from).collect())
    }

    /// Replace every mutable field. The key and activation date are kept.
    pub async fn update(&self, license_key: &str, request: &LicenseRequest) -> Result<LicenseResponse> {
        let attrs = LicenseAttributes::new()
            .key(license_key)
            .product(&request.product_name);

        async {
            request.check_dates()?;
            let _guard = self.locks.acquire(license_key).await;

            let mut license = self.find(license_key).await?;
            let product = self.products.get_by_name(&request.product_name).await?;

            license.product_id = product.id;
            license.product_name = product.name;
            license.licensed_to = request.licensed_to.clone();
            license.issue_date = request.issue_date;
            license.expiration_date = request.expiration_date;
            license.status = request.status;
            license.enabled_features = request.enabled_features.clone();
            license.max_users = request.max_users;
            license.hardware_id = request.hardware_id.clone();

            let saved = self.licenses.save(&license).await?;
            info!(
                license_key,
                product = %saved.product_name,
                status = %saved.status,
                "License updated"
            );
            Ok(LicenseResponse::new(&saved, MSG_UPDATED))
        }
        .instrument(license_span("update", &attrs))
        .await
    }

    pub async fn delete(&self, license_key: &str) -> Result<()> {
        async {
            let _guard = self.locks.acquire(license_key).await;
            let license = self.find(license_key).await?;
            self.licenses.delete(&license).await?;
            info!(license_key, product = %license.product_name, "License deleted");
            Ok(())
        }
        .instrument(license_span("delete", &LicenseAttributes::new().key(license_key)))
        .await
    }

    /// Activate a license on the requested hardware.
    ///
    /// Revoked and expired licenses are rejected with [`Error::License`]; an
    /// expired license has its status written back before the rejection.
    pub async fn activate(&self, request: &ActivationRequest) -> Result<LicenseResponse> {
        let attrs = Self::request_attributes(request);
        self.activate_license(request)
            .instrument(license_span("activate", &attrs))
            .await
    }

    async fn activate_license(&self, request: &ActivationRequest) -> Result<LicenseResponse> {
        let _guard = self.locks.acquire(&request.license_key).await;
        let mut license = self.find_for_product(request).await?;

        let now = self.clock.now();
        let outcome = ActivationOutcome::evaluate(&license, request.hardware_id.as_deref(), now);
        outcome.apply(&mut license, now);
        if outcome.persists() {
            license = self.licenses.save(&license).await?;
        }

        match &outcome {
            ActivationOutcome::Revoked
            | ActivationOutcome::Expired
            | ActivationOutcome::StillExpired => {
                warn!(
                    license_key = %license.license_key,
                    product = %license.product_name,
                    status = %license.status,
                    "Activation rejected: {}",
                    outcome.message()
                );
                return Err(Error::License(outcome.message().to_string()));
            }
            ActivationOutcome::Rebind(hardware_id) => {
                warn!(
                    license_key = %license.license_key,
                    product = %license.product_name,
                    hardware_id = %hardware_id,
                    "License re-bound to new hardware"
                );
            }
            ActivationOutcome::Activate(_) => {
                info!(
                    license_key = %license.license_key,
                    product = %license.product_name,
                    status = %license.status,
                    "License activated"
                );
            }
            ActivationOutcome::AlreadyActive => {
                debug!(license_key = %license.license_key, "License already active");
            }
        }

        Ok(LicenseResponse::new(&license, outcome.message()))
    }

    /// Check whether a license may be used on the requested hardware.
    ///
    /// Negative outcomes are successful calls with `valid == false`. The only
    /// write is the status change of an active license found past expiration.
    pub async fn validate(&self, request: &ActivationRequest) -> Result<LicenseResponse> {
        let attrs = Self::request_attributes(request);
        self.validate_license(request)
            .instrument(license_span("validate", &attrs))
            .await
    }

    async fn validate_license(&self, request: &ActivationRequest) -> Result<LicenseResponse> {
        let _guard = self.locks.acquire(&request.license_key).await;
        let mut license = self.find_for_product(request).await?;

        let now = self.clock.now();
        let hardware_id = requested_hardware(request.hardware_id.as_deref());
        let outcome = ValidationOutcome::evaluate(&license, hardware_id, now);
        outcome.apply(&mut license);
        if outcome.persists() {
            license = self.licenses.save(&license).await?;
            info!(
                license_key = %license.license_key,
                product = %license.product_name,
                status = %license.status,
                "License expired"
            );
        }

        match outcome {
            ValidationOutcome::HardwareMismatch => warn!(
                license_key = %license.license_key,
                hardware_id = hardware_id.unwrap_or(""),
                "Validation on unbound hardware"
            ),
            _ => debug!(
                license_key = %license.license_key,
                valid = outcome.is_valid(),
                "License validated"
            ),
        }

        Ok(LicenseResponse::new(&license, outcome.message()).with_validity(outcome.is_valid()))
    }

    async fn find(&self, license_key: &str) -> Result<License> {
        self.licenses
            .find_by_key(license_key)
            .await?
            .ok_or_else(|| Error::NotFound(format!("License not found with key: {}", license_key)))
    }

    async fn find_for_product(&self, request: &ActivationRequest) -> Result<License> {
        self.licenses
            .find_by_key_and_product_name(&request.license_key, &request.product_name)
            .await?
            .ok_or_else(|| Error::NotFound("License not found for key and product.".to_string()))
    }

    fn request_attributes(request: &ActivationRequest) -> LicenseAttributes {
        LicenseAttributes::new()
            .key(&request.license_key)
            .product(&request.product_name)
            .hardware(requested_hardware(request.hardware_id.as_deref()))
    }
}
