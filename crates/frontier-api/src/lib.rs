// frontier-api: Async Rust client for the Frontier Silicon FSAPI
//
// FSAPI is a plain XML-over-HTTP protocol spoken by internet radios built
// on Frontier Silicon modules. Every call is a GET against `/fsapi`,
// authenticated by a device PIN plus a session id obtained from
// `CREATE_SESSION`.

pub mod client;
pub mod device;
pub mod endpoints;
pub mod error;
pub mod status;
pub mod transport;
pub mod xml;

pub use client::{DeviceValue, FsapiClient, ListItem, RawResponse};
pub use device::DeviceAddress;
pub use endpoints::{DeviceInfo, PlayControl};
pub use error::Error;
pub use status::Status;
pub use transport::{SettleDelays, TransportConfig};
