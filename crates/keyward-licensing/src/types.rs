//! Request and response shapes for license and product operations.

use chrono::{DateTime, Utc};
use keyward_core::license::{License, LicenseStatus, MAX_KEY_LEN, MIN_KEY_LEN};
use keyward_core::product::Product;
use keyward_core::{Error, ProductId, Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MSG_DATES_OUT_OF_ORDER: &str = "Issue date cannot be after expiration date.";

const MIN_PRODUCT_NAME_LEN: usize = 3;
const MAX_PRODUCT_NAME_LEN: usize = 100;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Fields supplied when creating or replacing a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRequest {
    #[serde(default)]
    pub product_name: String,
    /// Optional on create; ignored on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(default)]
    pub licensed_to: String,
    pub issue_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub status: LicenseStatus,
    #[serde(default)]
    pub enabled_features: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
}

impl LicenseRequest {
    /// Requested key, treating a blank key as absent.
    pub fn requested_key(&self) -> Option<&str> {
        self.license_key.as_deref().filter(|key| !is_blank(key))
    }

    /// Enforce the issue/expiration ordering.
    pub fn check_dates(&self) -> Result<()> {
        if self.issue_date > self.expiration_date {
            return Err(Error::invalid("issueDate", MSG_DATES_OUT_OF_ORDER));
        }
        Ok(())
    }

    /// Full input validation, collecting every violation.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if is_blank(&self.product_name) {
            errors.insert("productName".into(), "Product name is required.".into());
        }
        if is_blank(&self.licensed_to) {
            errors.insert("licensedTo".into(), "Licensed to is required.".into());
        }
        if let Some(key) = self.requested_key() {
            let len = key.chars().count();
            if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&len) {
                errors.insert(
                    "licenseKey".into(),
                    format!(
                        "License key must be between {} and {} characters.",
                        MIN_KEY_LEN, MAX_KEY_LEN
                    ),
                );
            }
        }
        if self.expiration_date <= now {
            errors.insert(
                "expirationDate".into(),
                "Expiration date must be in the future.".into(),
            );
        }
        if self.issue_date > self.expiration_date {
            errors.insert("issueDate".into(), MSG_DATES_OUT_OF_ORDER.into());
        }
        if self.max_users == Some(0) {
            errors.insert("maxUsers".into(), "Max users must be at least 1.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Activation and validation both identify a license by key and product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    #[serde(default)]
    pub license_key: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
}

impl ActivationRequest {
    pub fn new(
        license_key: impl Into<String>,
        product_name: impl Into<String>,
        hardware_id: Option<&str>,
    ) -> Self {
        Self {
            license_key: license_key.into(),
            product_name: product_name.into(),
            hardware_id: hardware_id.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if is_blank(&self.license_key) {
            errors.insert("licenseKey".into(), "License key is required.".into());
        }
        if is_blank(&self.product_name) {
            errors.insert("productName".into(), "Product name is required.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Snapshot of a license returned by every license operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseResponse {
    pub license_key: String,
    pub product_name: String,
    pub licensed_to: String,
    pub issue_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub status: LicenseStatus,
    pub enabled_features: BTreeSet<String>,
    pub max_users: Option<u32>,
    pub hardware_id: Option<String>,
    pub activation_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
    /// Set only by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

impl LicenseResponse {
    pub fn new(license: &License, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::from(license)
        }
    }

    pub fn with_validity(mut self, valid: bool) -> Self {
        self.valid = Some(valid);
        self
    }
}

impl From<&License> for LicenseResponse {
    fn from(license: &License) -> Self {
        Self {
            license_key: license.license_key.clone(),
            product_name: license.product_name.clone(),
            licensed_to: license.licensed_to.clone(),
            issue_date: license.issue_date,
            expiration_date: license.expiration_date,
            status: license.status,
            enabled_features: license.enabled_features.clone(),
            max_users: license.max_users,
            hardware_id: license.hardware_id.clone(),
            activation_date: license.activation_date,
            message: None,
            valid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ProductRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name".into(), "Product name is required.".into());
        } else if !(MIN_PRODUCT_NAME_LEN..=MAX_PRODUCT_NAME_LEN).contains(&name.chars().count()) {
            errors.insert(
                "name".into(),
                format!(
                    "Product name must be between {} and {} characters.",
                    MIN_PRODUCT_NAME_LEN, MAX_PRODUCT_NAME_LEN
                ),
            );
        }
        if is_blank(&self.description) {
            errors.insert("description".into(), "Description is required.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
