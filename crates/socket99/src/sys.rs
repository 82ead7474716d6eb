//! Thin `libc` wrappers.
//!
//! Each wrapper reads the OS error inside the call that failed and hands it
//! back in its `io::Result`, so nothing issued afterwards (a `close`, another
//! candidate's `socket`) can overwrite it.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::io;
use std::marker::PhantomData;
use std::mem::size_of;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::ptr;

#[inline]
fn cvt(ret: c_int) -> io::Result<c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

// ---------------------------------------------------------------------------
// Socket addresses
// ---------------------------------------------------------------------------

/// Borrowed `sockaddr` pointer and length, valid for `'a`.
#[derive(Clone, Copy)]
pub(crate) struct SockAddrRef<'a> {
    ptr: *const libc::sockaddr,
    len: libc::socklen_t,
    _marker: PhantomData<&'a libc::sockaddr>,
}

impl<'a> SockAddrRef<'a> {
    pub(crate) fn unix(addr: &'a libc::sockaddr_un) -> Self {
        Self {
            ptr: (addr as *const libc::sockaddr_un).cast(),
            len: size_of::<libc::sockaddr_un>() as libc::socklen_t,
            _marker: PhantomData,
        }
    }

    /// The address as a std `SocketAddr`, if it is IPv4 or IPv6.
    pub(crate) fn to_socket_addr(self) -> Option<SocketAddr> {
        // SAFETY: `ptr` is null or points at `len` bytes that live for 'a.
        let family = c_int::from(unsafe { self.ptr.as_ref() }?.sa_family);
        let len = self.len as usize;
        match family {
            libc::AF_INET if len >= size_of::<libc::sockaddr_in>() => {
                // SAFETY: the family and length say this is a sockaddr_in.
                let sin = unsafe { &*self.ptr.cast::<libc::sockaddr_in>() };
                Some(SocketAddr::V4(SocketAddrV4::new(
                    Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)),
                    u16::from_be(sin.sin_port),
                )))
            }
            libc::AF_INET6 if len >= size_of::<libc::sockaddr_in6>() => {
                // SAFETY: the family and length say this is a sockaddr_in6.
                let sin6 = unsafe { &*self.ptr.cast::<libc::sockaddr_in6>() };
                Some(SocketAddr::V6(SocketAddrV6::new(
                    Ipv6Addr::from(sin6.sin6_addr.s6_addr),
                    u16::from_be(sin6.sin6_port),
                    sin6.sin6_flowinfo,
                    sin6.sin6_scope_id,
                )))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// socket / setsockopt / bind / listen / connect
// ---------------------------------------------------------------------------

pub(crate) fn socket(domain: c_int, sock_type: c_int, protocol: c_int) -> io::Result<OwnedFd> {
    // SAFETY: integer-only syscall.
    let fd = cvt(unsafe { libc::socket(domain, sock_type | libc::SOCK_CLOEXEC, protocol) })?;
    // SAFETY: `socket` just returned this descriptor and nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub(crate) fn setsockopt(
    fd: BorrowedFd<'_>,
    level: c_int,
    name: c_int,
    value: &[u8],
) -> io::Result<()> {
    let len = libc::socklen_t::try_from(value.len())
        .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;
    // SAFETY: `value` is readable for `len` bytes for the duration of the call.
    cvt(unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            level,
            name,
            value.as_ptr().cast::<c_void>(),
            len,
        )
    })?;
    Ok(())
}

pub(crate) fn bind(fd: BorrowedFd<'_>, addr: SockAddrRef<'_>) -> io::Result<()> {
    // SAFETY: `addr` points to `addr.len` readable bytes while it is borrowed.
    cvt(unsafe { libc::bind(fd.as_raw_fd(), addr.ptr, addr.len) })?;
    Ok(())
}

pub(crate) fn listen(fd: BorrowedFd<'_>, backlog: c_int) -> io::Result<()> {
    // SAFETY: integer-only syscall.
    cvt(unsafe { libc::listen(fd.as_raw_fd(), backlog) })?;
    Ok(())
}

pub(crate) fn connect(fd: BorrowedFd<'_>, addr: SockAddrRef<'_>) -> io::Result<()> {
    // SAFETY: `addr` points to `addr.len` readable bytes while it is borrowed.
    cvt(unsafe { libc::connect(fd.as_raw_fd(), addr.ptr, addr.len) })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// fcntl
// ---------------------------------------------------------------------------

pub(crate) fn status_flags(fd: BorrowedFd<'_>) -> io::Result<c_int> {
    // SAFETY: F_GETFL takes no third argument.
    cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) })
}

pub(crate) fn set_status_flags(fd: BorrowedFd<'_>, flags: c_int) -> io::Result<()> {
    // SAFETY: F_SETFL takes an int argument.
    cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// getaddrinfo
// ---------------------------------------------------------------------------

/// Resolver failure: the `EAI_*` code, plus the OS error when it is
/// `EAI_SYSTEM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolveError {
    pub(crate) code: c_int,
    pub(crate) os_error: i32,
}

/// Owned `getaddrinfo` result list, released with `freeaddrinfo` on drop.
pub(crate) struct AddrInfoList {
    head: *mut libc::addrinfo,
}

impl AddrInfoList {
    pub(crate) fn resolve(
        node: Option<&CStr>,
        service: &CStr,
        hints: &libc::addrinfo,
    ) -> Result<Self, ResolveError> {
        let mut head: *mut libc::addrinfo = ptr::null_mut();
        let node_ptr = node.map_or(ptr::null(), CStr::as_ptr);
        // SAFETY: node and service are NUL-terminated or null, hints is
        // initialised, and `head` is a valid out-pointer.
        let rc = unsafe { libc::getaddrinfo(node_ptr, service.as_ptr(), hints, &mut head) };
        let os_error = if rc == libc::EAI_SYSTEM {
            io::Error::last_os_error().raw_os_error().unwrap_or(0)
        } else {
            0
        };
        let list = Self { head };
        if rc != 0 {
            return Err(ResolveError { code: rc, os_error });
        }
        Ok(list)
    }

    pub(crate) fn iter(&self) -> AddrInfoIter<'_> {
        AddrInfoIter {
            cur: self.head,
            _marker: PhantomData,
        }
    }
}

impl Drop for AddrInfoList {
    fn drop(&mut self) {
        if !self.head.is_null() {
            // SAFETY: `head` came from a successful getaddrinfo and is freed once.
            unsafe { libc::freeaddrinfo(self.head) };
        }
    }
}

/// One resolved address to try.
pub(crate) struct Candidate<'a> {
    pub(crate) family: c_int,
    pub(crate) sock_type: c_int,
    pub(crate) protocol: c_int,
    pub(crate) addr: SockAddrRef<'a>,
}

pub(crate) struct AddrInfoIter<'a> {
    cur: *const libc::addrinfo,
    _marker: PhantomData<&'a AddrInfoList>,
}

impl<'a> Iterator for AddrInfoIter<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Candidate<'a>> {
        // SAFETY: `cur` is null or a node of a list kept alive by the borrow
        // of the owning `AddrInfoList`.
        let ai = unsafe { self.cur.as_ref() }?;
        self.cur = ai.ai_next;
        Some(Candidate {
            family: ai.ai_family,
            sock_type: ai.ai_socktype,
            protocol: ai.ai_protocol,
            addr: SockAddrRef {
                ptr: ai.ai_addr,
                len: ai.ai_addrlen,
                _marker: PhantomData,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Error text
// ---------------------------------------------------------------------------

/// Platform description of an errno value (`strerror_r`).
pub(crate) fn error_string(code: i32) -> String {
    let mut buf = [0 as c_char; 256];
    // SAFETY: `buf` is writable for its full length.
    let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return format!("Unknown error {code}");
    }
    // SAFETY: on success strerror_r leaves a NUL-terminated string in `buf`.
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Resolver description of an `EAI_*` code (`gai_strerror`).
pub(crate) fn gai_error_string(code: i32) -> String {
    // SAFETY: gai_strerror returns a pointer to a static string or null.
    let msg = unsafe { libc::gai_strerror(code) };
    if msg.is_null() {
        return format!("Unknown resolver error {code}");
    }
    // SAFETY: non-null results are NUL-terminated static strings.
    unsafe { CStr::from_ptr(msg) }
        .to_string_lossy()
        .into_owned()
}
