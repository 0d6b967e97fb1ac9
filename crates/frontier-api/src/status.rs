// FSAPI result statuses.
//
// Device statuses arrive as `FS_*` strings in the `<status>` node. Three
// more are synthesized locally when no usable reply exists.

use std::fmt;

use serde::{Serialize, Serializer};

/// Outcome of an FSAPI call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// `FS_OK`
    Ok,
    /// `FS_FAIL`: the node rejected the value.
    Fail,
    /// `FS_PACKET_BAD`: malformed request.
    PacketBad,
    /// `FS_NODE_BLOCKED`: node unavailable in the current mode.
    NodeBlocked,
    /// `FS_NODE_DOES_NOT_EXIST`
    NodeDoesNotExist,
    /// `FS_SESSION_TIMEOUT`
    SessionTimeout,
    /// `FS_INVALID_SID`
    InvalidSid,
    /// `FS_LIST_END`: list read past the last item.
    ListEnd,

    // ── Synthesized ─────────────────────────────────────────────────
    /// No session could be obtained, so nothing was sent.
    NoSession,
    /// The reply was missing, non-200, empty or not XML.
    XmlParseError,
    /// The reply parsed but carried no `<status>` node.
    Unknown,

    /// Any other `FS_*` string the firmware produces.
    Other(String),
}

impl Status {
    /// Map a raw `<status>` text to a variant. Surrounding whitespace is
    /// ignored.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "FS_OK" => Self::Ok,
            "FS_FAIL" => Self::Fail,
            "FS_PACKET_BAD" => Self::PacketBad,
            "FS_NODE_BLOCKED" => Self::NodeBlocked,
            "FS_NODE_DOES_NOT_EXIST" => Self::NodeDoesNotExist,
            "FS_SESSION_TIMEOUT" => Self::SessionTimeout,
            "FS_INVALID_SID" => Self::InvalidSid,
            "FS_LIST_END" => Self::ListEnd,
            "NO_SESSION" => Self::NoSession,
            "XML_PARSE_ERROR" => Self::XmlParseError,
            "" | "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "FS_OK",
            Self::Fail => "FS_FAIL",
            Self::PacketBad => "FS_PACKET_BAD",
            Self::NodeBlocked => "FS_NODE_BLOCKED",
            Self::NodeDoesNotExist => "FS_NODE_DOES_NOT_EXIST",
            Self::SessionTimeout => "FS_SESSION_TIMEOUT",
            Self::InvalidSid => "FS_INVALID_SID",
            Self::ListEnd => "FS_LIST_END",
            Self::NoSession => "NO_SESSION",
            Self::XmlParseError => "XML_PARSE_ERROR",
            Self::Unknown => "UNKNOWN",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The device no longer honours the session id we sent.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionTimeout | Self::InvalidSid)
    }

    /// No meaningful answer came back at all. A power read with one of
    /// these means the device is treated as offline.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::NoSession | Self::XmlParseError)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_round_trip_through_their_wire_names() {
        for status in [
            Status::Ok,
            Status::Fail,
            Status::NodeBlocked,
            Status::SessionTimeout,
            Status::InvalidSid,
            Status::ListEnd,
            Status::NoSession,
            Status::XmlParseError,
        ] {
            assert_eq!(Status::parse(status.as_str()), status);
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Status::parse("\n  FS_OK \n"), Status::Ok);
    }

    #[test]
    fn unrecognised_status_is_preserved() {
        let status = Status::parse("FS_REPLY_TOO_BIG");
        assert_eq!(status, Status::Other("FS_REPLY_TOO_BIG".into()));
        assert_eq!(status.to_string(), "FS_REPLY_TOO_BIG");
    }

    #[test]
    fn classification() {
        assert!(Status::SessionTimeout.is_session_expired());
        assert!(Status::InvalidSid.is_session_expired());
        assert!(!Status::Fail.is_session_expired());
        assert!(Status::NoSession.is_unreachable());
        assert!(Status::XmlParseError.is_unreachable());
        assert!(!Status::Unknown.is_unreachable());
        assert!(!Status::NodeBlocked.is_unreachable());
    }
}
