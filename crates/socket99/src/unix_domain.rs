//! Unix-domain opener.

use std::io;
use std::mem;
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use socket99_core::SocketConfig;

use crate::configure::apply_socket_options;
use crate::error::OpenError;
use crate::sys::{self, SockAddrRef};

/// Opens a Unix stream or datagram socket at `path`.
///
/// A server binds (without removing a stale path first) and, for streams,
/// listens. A client connects.
pub(crate) fn open_unix(cfg: &SocketConfig, path: &Path) -> Result<OwnedFd, OpenError> {
    let sock_type = if cfg.datagram {
        libc::SOCK_DGRAM
    } else {
        libc::SOCK_STREAM
    };
    let fd = sys::socket(libc::AF_UNIX, sock_type, 0).map_err(OpenError::SocketCreate)?;

    apply_socket_options(fd.as_fd(), &cfg.socket_options).map_err(OpenError::SetOption)?;

    let addr = unix_sockaddr(path)?;
    let addr_ref = SockAddrRef::unix(&addr);

    if cfg.server {
        sys::bind(fd.as_fd(), addr_ref).map_err(OpenError::Bind)?;
        if !cfg.datagram {
            sys::listen(fd.as_fd(), cfg.effective_backlog()).map_err(OpenError::Listen)?;
        }
    } else {
        sys::connect(fd.as_fd(), addr_ref).map_err(OpenError::Connect)?;
    }

    Ok(fd)
}

/// Copies `path` into a `sockaddr_un`, keeping room for the terminating NUL.
pub(crate) fn unix_sockaddr(path: &Path) -> Result<libc::sockaddr_un, OpenError> {
    let bytes = path.as_os_str().as_bytes();
    // SAFETY: sockaddr_un is plain old data; all-zero is a valid value.
    let mut addr: libc::sockaddr_un = unsafe { mem::zeroed() };

    if bytes.contains(&0) {
        return Err(OpenError::Format(io::Error::from_raw_os_error(libc::EINVAL)));
    }
    if bytes.len() >= addr.sun_path.len() {
        return Err(OpenError::path_too_long());
    }

    addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
    for (dst, &src) in addr.sun_path.iter_mut().zip(bytes) {
        *dst = src as libc::c_char;
    }
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket99_core::Status;

    #[test]
    fn sockaddr_copies_path_and_terminates() {
        let addr = unix_sockaddr(Path::new("/tmp/socket99.sock")).unwrap();
        assert_eq!(addr.sun_family, libc::AF_UNIX as libc::sa_family_t);
        let copied: Vec<u8> = addr
            .sun_path
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        assert_eq!(copied, b"/tmp/socket99.sock");
    }

    #[test]
    fn sockaddr_boundary_lengths() {
        // SAFETY: zeroed sockaddr_un only used for its field size.
        let capacity = unsafe { mem::zeroed::<libc::sockaddr_un>() }.sun_path.len();
        let fits = "a".repeat(capacity - 1);
        assert!(unix_sockaddr(Path::new(&fits)).is_ok());
        let too_long = "a".repeat(capacity);
        let err = unix_sockaddr(Path::new(&too_long)).unwrap_err();
        assert_eq!(err.status(), Status::Format);
        assert_eq!(err.raw_os_error(), libc::ENAMETOOLONG);
    }

    #[test]
    fn sockaddr_rejects_interior_nul() {
        let err = unix_sockaddr(Path::new("bad\0path")).unwrap_err();
        assert_eq!(err.status(), Status::Format);
        assert_eq!(err.raw_os_error(), libc::EINVAL);
    }
}
