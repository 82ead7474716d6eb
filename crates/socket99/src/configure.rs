//! Post-creation descriptor setup: socket options and non-blocking mode.

use std::io;
use std::os::fd::BorrowedFd;

use socket99_core::SocketOption;

use crate::sys;

/// Applies each option at SOL_SOCKET level, in order, stopping at the first
/// failure.
pub(crate) fn apply_socket_options(fd: BorrowedFd<'_>, options: &[SocketOption]) -> io::Result<()> {
    for opt in options {
        sys::setsockopt(fd, libc::SOL_SOCKET, opt.name, &opt.value)?;
    }
    Ok(())
}

/// Sets `O_NONBLOCK`, preserving the other status flags.
pub(crate) fn set_nonblocking(fd: BorrowedFd<'_>) -> io::Result<()> {
    let flags = sys::status_flags(fd)?;
    sys::set_status_flags(fd, flags | libc::O_NONBLOCK)
}
