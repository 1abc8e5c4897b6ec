//! Database integration tests.
//!
//! Run with: `cargo test -p keyward-tests --test database_tests --features integration`

#![cfg(feature = "integration")]

use keyward_core::Error;
use keyward_core::license::LicenseStatus;
use keyward_core::ports::{LicenseRepository, ProductRepository};
use keyward_tests::{
    context::TestContext,
    fixtures::{LicenseFixture, ProductFixture},
};

#[tokio::test]
async fn test_product_crud() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let repo = ctx.db.products();

    let product = ProductFixture::named("CRMPro");
    repo.create(&product).await.expect("Failed to create product");

    let found = repo
        .get_by_name("CRMPro")
        .await
        .expect("Failed to get product")
        .expect("Product not found");
    assert_eq!(found.id, product.id);

    let mut renamed = found.clone();
    renamed.name = "CRMPro Plus".to_string();
    let updated = repo.update(&renamed).await.expect("Failed to update product");
    assert_eq!(updated.name, "CRMPro Plus");

    let duplicate = ProductFixture::named("CRMPro Plus");
    let err = repo.create(&duplicate).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    ProductRepository::delete(&repo, product.id)
        .await
        .expect("Failed to delete product");
    assert!(repo.get(product.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_license_save_and_lookup() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let products = ctx.db.products();
    let licenses = ctx.db.licenses();

    let product = ProductFixture::named("CRMPro");
    products.create(&product).await.unwrap();

    let license = LicenseFixture::for_product(&product, "ABC1234567");
    let saved = licenses.save(&license).await.expect("Failed to save license");
    assert_eq!(saved.revision, 1);
    assert_eq!(saved.enabled_features, license.enabled_features);

    assert!(licenses.exists_by_key("ABC1234567").await.unwrap());
    let found = licenses
        .find_by_key_and_product_name("ABC1234567", "CRMPro")
        .await
        .unwrap()
        .expect("License not found");
    assert_eq!(found.product_name, "CRMPro");
    assert_eq!(found.max_users, Some(10));

    let wrong_product = licenses
        .find_by_key_and_product_name("ABC1234567", "ERPSuite")
        .await
        .unwrap();
    assert!(wrong_product.is_none());
}

#[tokio::test]
async fn test_duplicate_key_conflicts() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let products = ctx.db.products();
    let licenses = ctx.db.licenses();

    let product = ProductFixture::named("CRMPro");
    products.create(&product).await.unwrap();
    licenses
        .save(&LicenseFixture::for_product(&product, "ABC1234567"))
        .await
        .unwrap();

    let err = licenses
        .save(&LicenseFixture::for_product(&product, "ABC1234567"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_stale_revision_is_rejected() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let products = ctx.db.products();
    let licenses = ctx.db.licenses();

    let product = ProductFixture::named("CRMPro");
    products.create(&product).await.unwrap();
    let saved = licenses
        .save(&LicenseFixture::for_product(&product, "ABC1234567"))
        .await
        .unwrap();

    let mut first = saved.clone();
    first.status = LicenseStatus::Active;
    licenses.save(&first).await.expect("First writer should win");

    let mut second = saved.clone();
    second.status = LicenseStatus::Revoked;
    let err = licenses.save(&second).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let stored = licenses.find_by_key("ABC1234567").await.unwrap().unwrap();
    assert_eq!(stored.status, LicenseStatus::Active);
    assert_eq!(stored.revision, 2);
}

#[tokio::test]
async fn test_product_delete_cascades_to_licenses() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let products = ctx.db.products();
    let licenses = ctx.db.licenses();

    let product = ProductFixture::named("CRMPro");
    products.create(&product).await.unwrap();
    for key in ["ABC1234567", "DEF1234567"] {
        licenses
            .save(&LicenseFixture::for_product(&product, key))
            .await
            .unwrap();
    }

    ProductRepository::delete(&products, product.id).await.unwrap();
    assert!(licenses.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_license_for_missing_product_is_not_found() {
    let ctx = TestContext::new().await.expect("Failed to create context");
    let licenses = ctx.db.licenses();

    let orphan = LicenseFixture::for_product(&ProductFixture::named("Ghost"), "ABC1234567");
    let err = licenses.save(&orphan).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
