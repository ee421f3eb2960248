use crate::endpoint::Endpoint;
use relayrpc_common::protocol::error::{RelayError, Result};

/// Endless round-robin over a fixed list of nodes.
///
/// The rotator always points at one of its endpoints; [`advance`](Self::advance)
/// moves to the next one and wraps to the first after the last.
#[derive(Debug, Clone)]
pub struct NodeRotator {
    endpoints: Vec<Endpoint>,
    cursor: usize,
}

impl NodeRotator {
    /// Creates a rotator positioned on the first endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `endpoints` is empty.
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(RelayError::Config(
                "at least one endpoint is required".to_string(),
            ));
        }

        Ok(Self {
            endpoints,
            cursor: 0,
        })
    }

    /// Parses node URLs and builds a rotator over them.
    pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Result<Self> {
        let endpoints = urls
            .iter()
            .map(|url| Endpoint::parse(url.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(endpoints)
    }

    /// The active endpoint
    pub fn current(&self) -> &Endpoint {
        &self.endpoints[self.cursor]
    }

    /// Move to the next endpoint and return it
    pub fn advance(&mut self) -> &Endpoint {
        self.cursor = (self.cursor + 1) % self.endpoints.len();
        &self.endpoints[self.cursor]
    }

    /// Index of the active endpoint
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the rotator has no endpoints; never true for a constructed rotator.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotator(urls: &[&str]) -> NodeRotator {
        NodeRotator::from_urls(urls).unwrap()
    }

    #[test]
    fn test_rotator_creation() {
        let rotator = rotator(&["http://node1", "http://node2"]);
        assert_eq!(rotator.len(), 2);
        assert_eq!(rotator.current().as_str(), "http://node1");
        assert_eq!(rotator.position(), 0);
    }

    #[test]
    fn test_round_robin() {
        let mut rotator = rotator(&["http://node1", "http://node2", "http://node3"]);

        assert_eq!(rotator.advance().as_str(), "http://node2");
        assert_eq!(rotator.advance().as_str(), "http://node3");
        assert_eq!(rotator.advance().as_str(), "http://node1");
        // wraps around
        assert_eq!(rotator.current().as_str(), "http://node1");
    }

    #[test]
    fn test_advance_n_times_lands_on_n_mod_m() {
        let urls = ["http://a", "http://b", "http://c", "http://d", "http://e"];
        for n in 0..23 {
            let mut rotator = rotator(&urls);
            for _ in 0..n {
                rotator.advance();
                assert!(rotator.position() < urls.len());
            }
            assert_eq!(rotator.position(), n % urls.len());
            assert_eq!(rotator.current().as_str(), urls[n % urls.len()]);
        }
    }

    #[test]
    fn test_empty_nodes_is_config_error() {
        let result = NodeRotator::new(vec![]);
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let result = NodeRotator::from_urls(&["http://ok", "not-a-url"]);
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn test_single_node() {
        let mut rotator = rotator(&["http://only-node"]);
        assert_eq!(rotator.advance().as_str(), "http://only-node");
        assert_eq!(rotator.advance().as_str(), "http://only-node");
        assert_eq!(rotator.position(), 0);
    }

    #[test]
    fn test_get_endpoints() {
        let rotator = rotator(&["http://a", "http://b"]);
        let urls: Vec<&str> = rotator.endpoints().iter().map(Endpoint::as_str).collect();
        assert_eq!(urls, vec!["http://a", "http://b"]);
    }
}
