//! CLI command definitions.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use keyward_core::license::LicenseStatus;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the license server
    Serve(ServeArgs),

    /// Apply database migrations
    Migrate {
        /// PostgreSQL connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Manage licenses
    Licenses {
        #[command(subcommand)]
        command: LicenseCommands,
    },

    /// Manage client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep everything in memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    /// Maximum database connections
    #[arg(long)]
    pub max_connections: Option<u32>,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Register a product
    Create {
        /// Unique product name
        name: String,

        /// Product description
        #[arg(short, long)]
        description: String,
    },

    /// List products
    List,

    /// Delete a product and all of its licenses
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum LicenseCommands {
    /// Issue a license
    Create(CreateLicenseArgs),

    /// Show a license
    Get {
        /// License key
        key: String,
    },

    /// List licenses
    List,

    /// Delete a license
    Delete {
        /// License key
        key: String,
    },

    /// Activate a license on a machine
    Activate(ActivationArgs),

    /// Check whether a license may be used
    Validate(ActivationArgs),
}

#[derive(Args, Debug)]
pub struct CreateLicenseArgs {
    /// Product name
    #[arg(short, long)]
    pub product: String,

    /// Licensee
    #[arg(short, long)]
    pub licensed_to: String,

    /// Expiration timestamp (RFC 3339)
    #[arg(short, long)]
    pub expires: DateTime<Utc>,

    /// Issue timestamp (RFC 3339), defaults to now
    #[arg(long)]
    pub issued: Option<DateTime<Utc>>,

    /// Explicit license key; generated when omitted
    #[arg(short, long)]
    pub key: Option<String>,

    /// Initial status
    #[arg(short, long, default_value = "PENDING_ACTIVATION")]
    pub status: LicenseStatus,

    /// Enabled feature (repeatable)
    #[arg(short, long = "feature")]
    pub features: Vec<String>,

    /// Maximum concurrent users
    #[arg(long)]
    pub max_users: Option<u32>,

    /// Hardware fingerprint to bind to
    #[arg(long)]
    pub hardware_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct ActivationArgs {
    /// License key
    pub key: String,

    /// Product name
    #[arg(short, long)]
    pub product: String,

    /// Hardware fingerprint
    #[arg(long)]
    pub hardware_id: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
