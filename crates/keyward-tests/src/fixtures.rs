//! Test fixtures for creating sample data.

use chrono::{Duration, Utc};
use keyward_core::LicenseId;
use keyward_core::license::{License, LicenseStatus};
use keyward_core::product::Product;
use keyward_licensing::{ActivationRequest, LicenseRequest, ProductRequest};
use std::collections::BTreeSet;

/// Factory for creating test products.
pub struct ProductFixture;

impl ProductFixture {
    pub fn named(name: &str) -> Product {
        Product::new(name, format!("{} test product", name))
    }

    pub fn request(name: &str) -> ProductRequest {
        ProductRequest::new(name, format!("{} test product", name))
    }
}

/// Factory for creating test licenses.
pub struct LicenseFixture;

impl LicenseFixture {
    /// Unsaved license valid for thirty days.
    pub fn for_product(product: &Product, key: &str) -> License {
        let now = Utc::now();
        License {
            id: LicenseId::new(),
            license_key: key.to_string(),
            product_id: product.id,
            product_name: product.name.clone(),
            licensed_to: "Acme Corp".to_string(),
            issue_date: now,
            expiration_date: now + Duration::days(30),
            status: LicenseStatus::PendingActivation,
            enabled_features: BTreeSet::from(["reports".to_string(), "export".to_string()]),
            max_users: Some(10),
            hardware_id: None,
            activation_date: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create request valid for thirty days.
    pub fn request(product_name: &str, key: Option<&str>) -> LicenseRequest {
        let now = Utc::now();
        LicenseRequest {
            product_name: product_name.to_string(),
            license_key: key.map(str::to_string),
            licensed_to: "Acme Corp".to_string(),
            issue_date: now,
            expiration_date: now + Duration::days(30),
            status: LicenseStatus::PendingActivation,
            enabled_features: BTreeSet::from(["reports".to_string()]),
            max_users: Some(10),
            hardware_id: None,
        }
    }

    pub fn activation(key: &str, product_name: &str, hardware_id: Option<&str>) -> ActivationRequest {
        ActivationRequest::new(key, product_name, hardware_id)
    }
}
