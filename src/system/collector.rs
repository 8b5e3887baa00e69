use std::io;

use chrono::Local;
use sysinfo::Networks;

use crate::error::IfstatError;
use crate::system::interface::{self, InterfaceHandle};
use crate::system::network::CounterSnapshot;

/// Anything that can produce a counter snapshot for an interface handle
pub trait CounterSource {
    fn read(&mut self, handle: InterfaceHandle) -> Result<CounterSnapshot, IfstatError>;
}

/// Interface counter reader backed by the `sysinfo` crate
pub struct Collector {
    networks: Networks,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for Collector {
    /// Read the cumulative byte counters behind `handle`.
    ///
    /// The timestamp is taken after the refresh so it never precedes the
    /// counter values it is paired with.
    fn read(&mut self, handle: InterfaceHandle) -> Result<CounterSnapshot, IfstatError> {
        // Re-enumerating is what turns a vanished interface into SystemQuery
        let name = interface::name_of(handle)?;

        // Drop interfaces that have gone away so a stale entry is never read
        self.networks.refresh(true);

        let data = self.networks.list().get(&name).ok_or_else(|| {
            IfstatError::system_query(
                "read counters",
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no statistics for interface '{name}' {handle}"),
                ),
            )
        })?;

        let inbound_bytes = data.total_received();
        let outbound_bytes = data.total_transmitted();
        let sampled_at = Local::now();

        Ok(CounterSnapshot {
            inbound_bytes,
            outbound_bytes,
            sampled_at,
        })
    }
}
