//! Low-level host queries.
//!
//! This is the only module in the crate allowed to contain `unsafe` code.
//! Every `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

/// Page size assumed when the OS cannot be queried.
pub(crate) const FALLBACK_PAGE_SIZE: usize = 4096;

/// The host's virtual-memory page size in bytes.
#[cfg(unix)]
pub(crate) fn system_page_size() -> usize {
    // SAFETY: `sysconf` only reads a system constant and has no
    // preconditions on its argument.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        log::warn!("sysconf(_SC_PAGESIZE) failed, assuming {FALLBACK_PAGE_SIZE} bytes");
        return FALLBACK_PAGE_SIZE;
    }
    size as usize
}

/// The host's virtual-memory page size in bytes.
#[cfg(not(unix))]
pub(crate) fn system_page_size() -> usize {
    FALLBACK_PAGE_SIZE
}
