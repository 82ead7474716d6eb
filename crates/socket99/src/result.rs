//! The C-style outcome record and its two renderings.

use std::fmt;
use std::io::{self, Write};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use socket99_core::Status;

use crate::error::OpenError;
use crate::sys::{error_string, gai_error_string};

/// Outcome of one open attempt, written once by [`open`](crate::open).
///
/// On success `fd` holds the new socket and the caller owns it. It is also
/// set after a [`Status::FlagControl`] failure, when the socket itself is
/// valid and still has to be closed by the caller.
#[derive(Debug)]
pub struct OpenResult {
    pub status: Status,
    pub fd: Option<OwnedFd>,
    /// errno captured at the failing call; 0 on success.
    pub saved_errno: i32,
    /// `EAI_*` code, set only for [`Status::AddressResolution`].
    pub getaddrinfo_error: i32,
}

impl OpenResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Borrows the descriptor, if there is one.
    #[must_use]
    pub fn as_fd(&self) -> Option<BorrowedFd<'_>> {
        self.fd.as_ref().map(AsFd::as_fd)
    }

    /// Human-readable detail: resolver text for resolution failures, the
    /// platform text of `saved_errno` otherwise.
    #[must_use]
    pub fn detail(&self) -> String {
        if self.status == Status::AddressResolution {
            gai_error_string(self.getaddrinfo_error)
        } else {
            error_string(self.saved_errno)
        }
    }

    /// Renders `"<status>: <detail>"` into `buf` with `snprintf` semantics.
    ///
    /// At most `buf.len() - 1` bytes are written, followed by a NUL. The
    /// return value is the full length of the message, so a value
    /// `>= buf.len()` means the output was truncated.
    pub fn format_into(&self, buf: &mut [u8]) -> usize {
        let msg = self.to_string();
        let bytes = msg.as_bytes();
        if let Some(room) = buf.len().checked_sub(1) {
            let n = bytes.len().min(room);
            buf[..n].copy_from_slice(&bytes[..n]);
            buf[n] = 0;
        }
        bytes.len()
    }

    /// Writes `"<status>: <detail>\n"` to `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{self}")
    }

    /// Converts into a `Result`, rebuilding the typed error from the codes.
    pub fn into_result(self) -> Result<OwnedFd, OpenError> {
        let Self {
            status,
            fd,
            saved_errno,
            getaddrinfo_error,
        } = self;
        let os = || io::Error::from_raw_os_error(saved_errno);

        match status {
            Status::Ok => fd.ok_or(OpenError::Unknown),
            Status::AddressResolution => Err(OpenError::AddressResolution {
                code: getaddrinfo_error,
                os_error: saved_errno,
            }),
            Status::SocketCreate => Err(OpenError::SocketCreate(os())),
            Status::SetOption => Err(OpenError::SetOption(os())),
            Status::Bind => Err(OpenError::Bind(os())),
            Status::Listen => Err(OpenError::Listen(os())),
            Status::Connect => Err(OpenError::Connect(os())),
            Status::FlagControl => match fd {
                Some(fd) => Err(OpenError::FlagControl { source: os(), fd }),
                None => Err(OpenError::Unknown),
            },
            Status::Format => Err(OpenError::Format(os())),
            Status::Configuration => Err(OpenError::Configuration(
                socket99_core::ConfigError::ConflictingAddressFamilies,
            )),
            Status::Unknown => Err(OpenError::Unknown),
        }
    }
}

impl fmt::Display for OpenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.key(), self.detail())
    }
}

impl From<OpenError> for OpenResult {
    fn from(err: OpenError) -> Self {
        let status = err.status();
        let saved_errno = err.raw_os_error();
        let getaddrinfo_error = err.resolver_error();
        let fd = match err {
            OpenError::FlagControl { fd, .. } => Some(fd),
            _ => None,
        };
        Self {
            status,
            fd,
            saved_errno,
            getaddrinfo_error,
        }
    }
}

impl From<Result<OwnedFd, OpenError>> for OpenResult {
    fn from(res: Result<OwnedFd, OpenError>) -> Self {
        match res {
            Ok(fd) => Self {
                status: Status::Ok,
                fd: Some(fd),
                saved_errno: 0,
                getaddrinfo_error: 0,
            },
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn failed(status: Status, saved_errno: i32) -> OpenResult {
        OpenResult {
            status,
            fd: None,
            saved_errno,
            getaddrinfo_error: 0,
        }
    }

    fn strerror(code: i32) -> String {
        // SAFETY: strerror returns a valid NUL-terminated string; tests are single-use.
        unsafe { CStr::from_ptr(libc::strerror(code)) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn format_into_renders_key_and_platform_text() {
        let res = failed(Status::SocketCreate, libc::EACCES);
        let mut buf = [0u8; 256];
        let n = res.format_into(&mut buf);
        assert!(n < buf.len());
        assert_eq!(buf[n], 0);
        let text = std::str::from_utf8(&buf[..n]).unwrap();
        assert_eq!(text, format!("socket: {}", strerror(libc::EACCES)));
    }

    #[test]
    fn format_into_truncates_like_snprintf() {
        let res = failed(Status::Bind, libc::EADDRINUSE);
        let full = res.to_string();
        let mut buf = [0xffu8; 5];
        let n = res.format_into(&mut buf);
        assert_eq!(n, full.len());
        assert!(n >= buf.len());
        assert_eq!(&buf[..4], b"bind");
        assert_eq!(buf[4], 0);
    }

    #[test]
    fn format_into_empty_buffer_reports_length() {
        let res = failed(Status::Listen, libc::EINVAL);
        let mut buf: [u8; 0] = [];
        assert_eq!(res.format_into(&mut buf), res.to_string().len());
    }

    #[test]
    fn resolution_failure_uses_resolver_text() {
        let res = OpenResult {
            status: Status::AddressResolution,
            fd: None,
            saved_errno: libc::EACCES,
            getaddrinfo_error: libc::EAI_NONAME,
        };
        let expected = gai_error_string(libc::EAI_NONAME);
        assert_eq!(res.to_string(), format!("getaddrinfo: {expected}"));
    }

    #[test]
    fn write_to_appends_newline() {
        let res = failed(Status::Connect, libc::ECONNREFUSED);
        let mut out = Vec::new();
        res.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!("connect: {}\n", strerror(libc::ECONNREFUSED))
        );
    }

    #[test]
    fn error_round_trips_through_record() {
        let err = OpenError::Listen(io::Error::from_raw_os_error(libc::EOPNOTSUPP));
        let res = OpenResult::from(err);
        assert_eq!(res.status, Status::Listen);
        assert_eq!(res.saved_errno, libc::EOPNOTSUPP);
        assert!(res.fd.is_none());
        match res.into_result() {
            Err(OpenError::Listen(e)) => assert_eq!(e.raw_os_error(), Some(libc::EOPNOTSUPP)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flag_control_failure_keeps_the_descriptor() {
        use std::os::fd::AsRawFd;

        let fd = crate::sys::socket(libc::AF_INET, libc::SOCK_STREAM, 0).unwrap();
        let raw = fd.as_raw_fd();
        let err = OpenError::FlagControl {
            source: io::Error::from_raw_os_error(libc::EBADF),
            fd,
        };

        let res = OpenResult::from(err);
        assert_eq!(res.status, Status::FlagControl);
        assert_eq!(res.saved_errno, libc::EBADF);
        assert!(!res.is_ok());
        assert_eq!(res.as_fd().map(|fd| fd.as_raw_fd()), Some(raw));
        assert!(res.to_string().starts_with("fcntl: "));

        match res.into_result() {
            Err(OpenError::FlagControl { source, fd }) => {
                assert_eq!(source.raw_os_error(), Some(libc::EBADF));
                assert_eq!(fd.as_raw_fd(), raw);
                assert!(crate::sys::status_flags(fd.as_fd()).is_ok());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flag_control_without_descriptor_is_unknown() {
        let res = failed(Status::FlagControl, libc::EBADF);
        assert!(matches!(res.into_result(), Err(OpenError::Unknown)));
    }

    #[test]
    fn unknown_status_has_no_descriptor() {
        let res = OpenResult::from(OpenError::Unknown);
        assert_eq!(res.status, Status::Unknown);
        assert_eq!(res.saved_errno, 0);
        assert!(res.as_fd().is_none());
        assert!(matches!(res.into_result(), Err(OpenError::Unknown)));
    }
}
