//! Round-robin egress proxy rotation

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::EgressDescriptor;

/// Round-robin cursor over a configured egress proxy pool.
///
/// With an empty pool every descriptor is direct egress. The cursor is
/// shared across fetches on the same coordinator, so consecutive
/// rotations walk the pool rather than restarting at the first entry.
#[derive(Debug)]
pub struct ProxyRotation {
    proxies: Vec<String>,
    cursor: AtomicUsize,
}

impl ProxyRotation {
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Egress for the current cursor position without advancing.
    pub fn current(&self) -> EgressDescriptor {
        if self.proxies.is_empty() {
            return EgressDescriptor::direct();
        }
        let index = self.cursor.load(Ordering::Relaxed) % self.proxies.len();
        EgressDescriptor::via_proxy(self.proxies[index].clone())
    }

    /// Advance to the next proxy and return its descriptor.
    pub fn rotate(&self) -> EgressDescriptor {
        if self.proxies.is_empty() {
            return EgressDescriptor::direct();
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) + 1;
        EgressDescriptor::via_proxy(self.proxies[index % self.proxies.len()].clone())
    }
}
