//! Client for the TP-Link Tapo cloud: signed account login and device
//! listing.
//!
//! ```no_run
//! use tapo_cloud::{CloudClient, CloudConfig};
//!
//! # fn main() -> Result<(), tapo_cloud::CloudError> {
//! let mut client = CloudClient::new(CloudConfig::default())?;
//! client.login("me@example.com", "password")?;
//! for device in client.list_devices()? {
//!     println!("{} ({})", device.device_name, device.connection());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cloud;
pub mod config;

pub use cloud::{CloudClient, CloudError, Device, DeviceStatus, Session};
pub use config::{CloudConfig, Config, Credentials};
