//! Client for the Hilo home-automation cloud API.
//!
//! ```no_run
//! # async fn run() -> hilo::Result<()> {
//! let client = hilo::HiloClient::new("me@example.com", "hunter2");
//! for location in client.locations().await? {
//!     for device in client.devices(&location).await? {
//!         let attributes = client.device_attributes(&device).await?;
//!         println!("{}: {} attributes", device.name, attributes.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use auth::{Credentials, PasswordGrant, TokenAcquirer};
pub use client::HiloClient;
pub use config::Config;
pub use error::{Error, Result};
pub use session::Session;
pub use types::{Attribute, Device, Gateway, Location};
