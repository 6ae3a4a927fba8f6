use crate::http::Request;

/// Interception policy for one request. Exactly one applies per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from the cache when present; only consult the network on a
    /// miss. Misses are not written back.
    CacheFirst,
    /// Try the network; fall back to the cache, then to the synthesized
    /// offline placeholder.
    NetworkFirst,
}

impl Strategy {
    /// Navigations go network-first so an online auth or gateway layer
    /// always outranks stale cached HTML; subresources go cache-first for
    /// instant availability, since they rarely change and gate nothing
    /// security-sensitive.
    pub fn for_request(request: &Request) -> Self {
        if request.is_navigation() {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Destination, Request, Url};

    #[test]
    fn test_navigations_are_network_first() {
        let request = Request::navigate(Url::parse("http://planning.test/").unwrap());
        assert_eq!(Strategy::for_request(&request), Strategy::NetworkFirst);
    }

    #[test]
    fn test_subresources_are_cache_first() {
        for destination in [
            Destination::Script,
            Destination::Style,
            Destination::Image,
            Destination::Font,
            Destination::Manifest,
            Destination::Other,
        ] {
            let request = Request::get(
                Url::parse("http://planning.test/asset").unwrap(),
                destination,
            );
            assert_eq!(Strategy::for_request(&request), Strategy::CacheFirst);
        }
    }
}
