//! Interface name -> handle resolution.
//!
//! On Unix the handle is the kernel interface index as reported by
//! `if_nameindex(3)`. Elsewhere the interfaces known to `sysinfo` are
//! numbered 1..N in name order.

use std::fmt;

use crate::error::IfstatError;

/// Opaque per-boot identifier of a network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceHandle(u32);

#[cfg(test)]
impl InterfaceHandle {
    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for InterfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One enumerable interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInterface {
    pub handle: InterfaceHandle,
    pub name: String,
}

/// Map `name` to the lowest-indexed interface carrying it.
pub fn resolve(name: &str) -> Result<InterfaceHandle, IfstatError> {
    let interfaces = list_interfaces()?;
    find_by_name(&interfaces, name).ok_or_else(|| IfstatError::NotFound(name.to_string()))
}

/// Current name of the interface behind `handle`.
///
/// Fails if the interface has disappeared since it was resolved.
pub fn name_of(handle: InterfaceHandle) -> Result<String, IfstatError> {
    list_interfaces()?
        .into_iter()
        .find(|iface| iface.handle == handle)
        .map(|iface| iface.name)
        .ok_or_else(|| {
            IfstatError::system_query(
                "read counters",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("interface {handle} no longer exists"),
                ),
            )
        })
}

fn find_by_name(interfaces: &[RawInterface], name: &str) -> Option<InterfaceHandle> {
    interfaces
        .iter()
        .filter(|iface| iface.name == name)
        .map(|iface| iface.handle)
        .min()
}

/// Enumerate all interfaces in ascending handle order.
#[cfg(unix)]
pub fn list_interfaces() -> Result<Vec<RawInterface>, IfstatError> {
    use std::ffi::CStr;

    let head = unsafe { libc::if_nameindex() };
    if head.is_null() {
        return Err(IfstatError::system_query(
            "enumerate interfaces",
            std::io::Error::last_os_error(),
        ));
    }

    let mut interfaces = Vec::new();
    let mut current = head;
    loop {
        let entry = unsafe { &*current };
        // The array is terminated by a zeroed entry
        if entry.if_index == 0 || entry.if_name.is_null() {
            break;
        }
        let name = unsafe { CStr::from_ptr(entry.if_name) }
            .to_string_lossy()
            .into_owned();
        interfaces.push(RawInterface {
            handle: InterfaceHandle(entry.if_index),
            name,
        });
        current = unsafe { current.add(1) };
    }

    unsafe { libc::if_freenameindex(head) };

    interfaces.sort_by_key(|iface| iface.handle);
    Ok(interfaces)
}

#[cfg(not(unix))]
pub fn list_interfaces() -> Result<Vec<RawInterface>, IfstatError> {
    let networks = sysinfo::Networks::new_with_refreshed_list();
    let mut names: Vec<String> = networks.list().keys().cloned().collect();
    names.sort();
    Ok(names
        .into_iter()
        .zip(1..)
        .map(|(name, index)| RawInterface {
            handle: InterfaceHandle(index),
            name,
        })
        .collect())
}
