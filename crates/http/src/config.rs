//! Server limits.
//!
//! A request is read into a buffer that starts at `initial_buffer_size` bytes and
//! doubles whenever it fills up. `max_request_size` bounds every byte of one
//! request: request line, headers and body. `max_connections` bounds the
//! number of connection tasks alive at once.

/// Initial capacity of the per connection read buffer
pub const DEFAULT_INITIAL_BUFFER_SIZE: usize = 1024;

/// Maximum bytes buffered for a single request, body included
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Maximum number of concurrently served connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    initial_buffer_size: usize,
    max_request_size: usize,
    max_connections: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: DEFAULT_INITIAL_BUFFER_SIZE,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial read buffer capacity, at least one byte.
    #[must_use]
    pub fn initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size.max(1);
        self
    }

    #[must_use]
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.max_request_size = size;
        self
    }

    /// Caps concurrent connections, `None` removes the cap.
    #[must_use]
    pub fn max_connections(mut self, max: Option<usize>) -> Self {
        self.max_connections = max;
        self
    }

    pub fn get_initial_buffer_size(&self) -> usize {
        self.initial_buffer_size
    }

    pub fn get_max_request_size(&self) -> usize {
        self.max_request_size
    }

    pub fn get_max_connections(&self) -> Option<usize> {
        self.max_connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.get_initial_buffer_size(), DEFAULT_INITIAL_BUFFER_SIZE);
        assert_eq!(config.get_max_request_size(), DEFAULT_MAX_REQUEST_SIZE);
        assert_eq!(config.get_max_connections(), Some(DEFAULT_MAX_CONNECTIONS));
    }

    #[test]
    fn setters_chain() {
        let config = ServerConfig::new().initial_buffer_size(0).max_request_size(64).max_connections(None);

        assert_eq!(config.get_initial_buffer_size(), 1);
        assert_eq!(config.get_max_request_size(), 64);
        assert_eq!(config.get_max_connections(), None);
    }
}
