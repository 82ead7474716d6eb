//! Outcome taxonomy of an open attempt.

/// Result code of one open attempt.
///
/// Exactly one variant describes each attempt. The numeric codes follow the
/// C convention of zero for success and small negative values for failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Socket created.
    Ok = 0,
    /// `getaddrinfo` failed; see the resolver error code.
    AddressResolution = -1,
    /// `socket` failed.
    SocketCreate = -2,
    Bind = -3,
    Listen = -4,
    Connect = -5,
    /// `fcntl` failed while switching to non-blocking mode.
    FlagControl = -6,
    /// Unix path or port string did not fit its fixed-size buffer.
    Format = -7,
    /// Contradictory configuration, rejected before any OS call.
    Configuration = -8,
    /// No candidate address produced a specific failure.
    Unknown = -9,
    SetOption = -10,
}

impl Status {
    /// Every status, success first.
    pub const ALL: [Status; 11] = [
        Status::Ok,
        Status::AddressResolution,
        Status::SocketCreate,
        Status::Bind,
        Status::Listen,
        Status::Connect,
        Status::FlagControl,
        Status::Format,
        Status::Configuration,
        Status::Unknown,
        Status::SetOption,
    ];

    /// Lowercase single-word key used in rendered messages.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::AddressResolution => "getaddrinfo",
            Self::SocketCreate => "socket",
            Self::Bind => "bind",
            Self::Listen => "listen",
            Self::Connect => "connect",
            Self::FlagControl => "fcntl",
            Self::Format => "format",
            Self::Configuration => "configuration",
            Self::Unknown => "unknown",
            Self::SetOption => "setsockopt",
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Parses a rendered key back into its status.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_lowercase_single_words() {
        let mut seen = HashSet::new();
        for status in Status::ALL {
            let key = status.key();
            assert!(seen.insert(key), "duplicate key {key}");
            assert!(key.chars().all(|c| c.is_ascii_lowercase()), "{key}");
        }
    }

    #[test]
    fn ten_failure_kinds() {
        assert_eq!(Status::ALL.iter().filter(|s| !s.is_ok()).count(), 10);
    }

    #[test]
    fn keys_parse_back() {
        for status in Status::ALL {
            assert_eq!(Status::from_key(status.key()), Some(status));
        }
        assert_eq!(Status::from_key("snprintf"), None);
        assert_eq!(Status::from_key("Bind"), None);
        assert_eq!(Status::from_key(""), None);
    }

    #[test]
    fn only_ok_is_zero() {
        assert_eq!(Status::Ok.code(), 0);
        assert!(Status::ALL[1..].iter().all(|s| s.code() < 0));
    }

    #[test]
    fn display_is_key() {
        assert_eq!(Status::SocketCreate.to_string(), "socket");
        assert_eq!(Status::AddressResolution.to_string(), "getaddrinfo");
    }
}
