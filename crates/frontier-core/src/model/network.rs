// ── Network diagnostics ──

use std::net::Ipv4Addr;

use serde::Serialize;

/// Network nodes as the device reports them.
///
/// `wifi_rssi` and `ip_address` stay raw; the accessors decode them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub wifi_rssi: Option<String>,
    pub wifi_ssid: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
}

impl NetworkInfo {
    /// Signal strength in dBm.
    ///
    /// Firmwares disagree on encoding: some send the dBm as an unsigned
    /// byte, some send its magnitude. Zero means not on wifi.
    pub fn rssi_dbm(&self) -> Option<i32> {
        let raw: i32 = self.wifi_rssi.as_deref()?.trim().parse().ok()?;
        match raw {
            0 => None,
            r if r > 127 => Some(r - 256),
            r if r > 0 => Some(-r),
            r => Some(r),
        }
    }

    /// The IPv4 address, sent as a big-endian `u32`.
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        let raw: u32 = self.ip_address.as_deref()?.trim().parse().ok()?;
        Some(Ipv4Addr::from(raw))
    }
}
