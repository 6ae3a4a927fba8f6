use std::collections::HashMap;

use tracing::debug;

/// Open pages known to the runtime, keyed by client id, each with the
/// version token of the worker currently controlling it (if any).
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Option<String>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open page. New clients start uncontrolled.
    pub fn register(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!(client = %id, "Client registered");
        self.clients.entry(id).or_insert(None);
    }

    /// Version token controlling the given client, if any.
    pub fn controller(&self, id: &str) -> Option<&str> {
        self.clients.get(id).and_then(|c| c.as_deref())
    }

    /// Take control of every open client without a reload. Returns how
    /// many clients were re-pointed.
    pub fn claim(&mut self, version: &str) -> usize {
        let mut claimed = 0;
        for controller in self.clients.values_mut() {
            if controller.as_deref() != Some(version) {
                *controller = Some(version.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clients_are_uncontrolled() {
        let mut clients = ClientRegistry::new();
        clients.register("tab-1");
        assert_eq!(clients.controller("tab-1"), None);
        assert_eq!(clients.len(), 1);
    }

    #[test]
    fn test_claim_takes_over_every_client() {
        let mut clients = ClientRegistry::new();
        clients.register("tab-1");
        clients.register("tab-2");

        assert_eq!(clients.claim("planning-cache-v2"), 2);
        assert_eq!(clients.controller("tab-1"), Some("planning-cache-v2"));
        assert_eq!(clients.controller("tab-2"), Some("planning-cache-v2"));

        // Already-claimed clients are not counted twice.
        assert_eq!(clients.claim("planning-cache-v2"), 0);
    }
}
