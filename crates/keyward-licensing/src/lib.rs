//! License lifecycle engine for Keyward.
//!
//! [`LicenseService`] owns the lifecycle: creation, activation, validation,
//! update and deletion of licenses, evaluated against a single clock reading
//! per call and serialized per license key. [`ProductService`] is the thin
//! catalog the engine resolves product names through.

pub mod keygen;
pub mod locks;
pub mod products;
pub mod service;
pub mod types;

pub use keygen::{GENERATED_KEY_LEN, MAX_KEY_ATTEMPTS, generate_license_key, unique_license_key};
pub use locks::KeyLocks;
pub use products::ProductService;
pub use service::LicenseService;
pub use types::{
    ActivationRequest, LicenseRequest, LicenseResponse, ProductRequest, ProductResponse,
};
