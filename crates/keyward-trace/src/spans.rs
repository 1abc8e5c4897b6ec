//! Span creation for license operations.

use tracing::{Level, Span, span};

/// License attributes recorded on lifecycle spans.
#[derive(Debug, Default)]
pub struct LicenseAttributes {
    pub license_key: Option<String>,
    pub product_name: Option<String>,
    pub hardware_id: Option<String>,
}

impl LicenseAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, license_key: impl Into<String>) -> Self {
        self.license_key = Some(license_key.into());
        self
    }

    pub fn product(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn hardware(mut self, hardware_id: Option<&str>) -> Self {
        self.hardware_id = hardware_id.map(str::to_string);
        self
    }
}

/// Create a span for a license lifecycle operation.
pub fn license_span(operation: &str, attrs: &LicenseAttributes) -> Span {
    span!(
        Level::INFO,
        "license.operation",
        operation = operation,
        license.key = attrs.license_key.as_deref().unwrap_or(""),
        license.product = attrs.product_name.as_deref().unwrap_or(""),
        license.hardware_id = attrs.hardware_id.as_deref().unwrap_or(""),
    )
}

/// Create a span for a product catalog operation.
pub fn product_span(operation: &str, name: &str) -> Span {
    span!(
        Level::DEBUG,
        "product.operation",
        operation = operation,
        product.name = name,
    )
}
