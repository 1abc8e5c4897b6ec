//! Command handlers.

use anyhow::Result;
use chrono::Utc;
use console::style;
use keyward_licensing::{
    ActivationRequest, LicenseRequest, LicenseResponse, ProductRequest, ProductResponse,
};

use crate::client::{ApiClient, ClientError};
use crate::commands::{ActivationArgs, CreateLicenseArgs};
use crate::config::{CliConfig, OutputFormat};

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_license(license: &LicenseResponse) {
    println!("{}", style(&license.license_key).bold());
    println!("  Product:     {}", license.product_name);
    println!("  Licensed to: {}", license.licensed_to);
    println!("  Status:      {}", license.status);
    println!(
        "  Valid:       {} to {}",
        license.issue_date.to_rfc3339(),
        license.expiration_date.to_rfc3339()
    );
    if !license.enabled_features.is_empty() {
        let features: Vec<&str> = license.enabled_features.iter().map(String::as_str).collect();
        println!("  Features:    {}", features.join(", "));
    }
    if let Some(max_users) = license.max_users {
        println!("  Max users:   {}", max_users);
    }
    if let Some(hardware_id) = &license.hardware_id {
        println!("  Hardware:    {}", hardware_id);
    }
    if let Some(activated) = license.activation_date {
        println!("  Activated:   {}", activated.to_rfc3339());
    }
}

fn print_product(product: &ProductResponse) {
    println!(
        "{}  {}  {}",
        style(product.id).dim(),
        style(&product.name).bold(),
        product.description
    );
}

/// Turn a server rejection into a readable error, listing field problems.
fn report(err: ClientError) -> anyhow::Error {
    if let ClientError::Api {
        validation_errors, ..
    } = &err
    {
        for (field, message) in validation_errors {
            eprintln!("  {} {}: {}", style("-").red(), field, message);
        }
    }
    err.into()
}

pub async fn create_product(config: &CliConfig, name: String, description: String) -> Result<()> {
    let client = ApiClient::new(config)?;
    let product = client
        .create_product(&ProductRequest::new(name, description))
        .await
        .map_err(report)?;

    match config.output_format {
        OutputFormat::Json => print_json(&product)?,
        OutputFormat::Table => {
            println!("{} Created product", style("✓").green());
            print_product(&product);
        }
    }
    Ok(())
}

pub async fn list_products(config: &CliConfig) -> Result<()> {
    let products = ApiClient::new(config)?.list_products().await.map_err(report)?;

    match config.output_format {
        OutputFormat::Json => print_json(&products)?,
        OutputFormat::Table if products.is_empty() => {
            println!("{} No products", style("i").blue())
        }
        OutputFormat::Table => products.iter().for_each(print_product),
    }
    Ok(())
}

pub async fn delete_product(config: &CliConfig, id: &str) -> Result<()> {
    ApiClient::new(config)?
        .delete_product(id)
        .await
        .map_err(report)?;
    println!("{} Deleted product {} and its licenses", style("✓").green(), id);
    Ok(())
}

pub async fn create_license(config: &CliConfig, args: CreateLicenseArgs) -> Result<()> {
    let request = LicenseRequest {
        product_name: args.product,
        license_key: args.key,
        licensed_to: args.licensed_to,
        issue_date: args.issued.unwrap_or_else(Utc::now),
        expiration_date: args.expires,
        status: args.status,
        enabled_features: args.features.into_iter().collect(),
        max_users: args.max_users,
        hardware_id: args.hardware_id,
    };

    let license = ApiClient::new(config)?
        .create_license(&request)
        .await
        .map_err(report)?;
    show_license(config, &license)
}

pub async fn get_license(config: &CliConfig, key: &str) -> Result<()> {
    let license = ApiClient::new(config)?.get_license(key).await.map_err(report)?;
    show_license(config, &license)
}

pub async fn list_licenses(config: &CliConfig) -> Result<()> {
    let licenses = ApiClient::new(config)?.list_licenses().await.map_err(report)?;

    match config.output_format {
        OutputFormat::Json => print_json(&licenses)?,
        OutputFormat::Table if licenses.is_empty() => {
            println!("{} No licenses", style("i").blue())
        }
        OutputFormat::Table => {
            for license in &licenses {
                println!(
                    "{}  {:<20}  {:<18}  {}",
                    style(&license.license_key).bold(),
                    license.product_name,
                    license.status.to_string(),
                    license.licensed_to
                );
            }
        }
    }
    Ok(())
}

pub async fn delete_license(config: &CliConfig, key: &str) -> Result<()> {
    ApiClient::new(config)?
        .delete_license(key)
        .await
        .map_err(report)?;
    println!("{} Deleted license {}", style("✓").green(), key);
    Ok(())
}

pub async fn activate_license(config: &CliConfig, args: ActivationArgs) -> Result<()> {
    let request = ActivationRequest::new(args.key, args.product, args.hardware_id.as_deref());
    let license = ApiClient::new(config)?
        .activate_license(&request)
        .await
        .map_err(report)?;
    show_license(config, &license)
}

pub async fn validate_license(config: &CliConfig, args: ActivationArgs) -> Result<()> {
    let request = ActivationRequest::new(args.key, args.product, args.hardware_id.as_deref());
    let license = ApiClient::new(config)?
        .validate_license(&request)
        .await
        .map_err(report)?;
    show_license(config, &license)
}

fn show_license(config: &CliConfig, license: &LicenseResponse) -> Result<()> {
    match config.output_format {
        OutputFormat::Json => print_json(license)?,
        OutputFormat::Table => {
            if let Some(message) = &license.message {
                let marker = match license.valid {
                    Some(false) => style("✗").red(),
                    _ => style("✓").green(),
                };
                println!("{} {}", marker, message);
            }
            print_license(license);
        }
    }
    Ok(())
}

pub fn show_config(config: &CliConfig) -> Result<()> {
    println!("{}", style("Configuration").bold());
    println!("  Path:          {}", CliConfig::config_path()?.display());
    println!("  api_url:       {}", config.api_url);
    println!(
        "  output_format: {}",
        match config.output_format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    );
    Ok(())
}

pub fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = CliConfig::load()?;
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} Set {} = {} ({})",
        style("✓").green(),
        key,
        value,
        path.display()
    );
    Ok(())
}
