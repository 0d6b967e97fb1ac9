// Device addressing.

use std::fmt;

use url::Url;

use crate::error::Error;

/// Host and port of an FSAPI device.
///
/// The FSAPI root always lives at `/fsapi`; port 80 is left implicit in
/// the generated URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: u16,
}

impl DeviceAddress {
    pub const DEFAULT_PORT: u16 = 80;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into().trim().to_owned(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://{host}/fsapi`, or `http://{host}:{port}/fsapi` for any
    /// port other than 80. Bare IPv6 literals are bracketed.
    pub fn base_url(&self) -> Result<Url, Error> {
        if self.host.is_empty() || self.host.contains('/') {
            return Err(Error::InvalidHost {
                host: self.host.clone(),
            });
        }

        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let raw = if self.port == Self::DEFAULT_PORT {
            format!("http://{host}/fsapi")
        } else {
            format!("http://{host}:{}/fsapi", self.port)
        };

        Ok(Url::parse(&raw)?)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == Self::DEFAULT_PORT {
            f.write_str(&self.host)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
