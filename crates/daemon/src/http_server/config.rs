use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Origins allowed by the CORS layer, `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn new(
        listen_addr: SocketAddr,
        log_level: tracing::Level,
        allowed_origins: Vec<String>,
    ) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, allowed_origins={:?}",
            listen_addr,
            allowed_origins
        );
        Self {
            listen_addr,
            log_level,
            allowed_origins,
        }
    }
}
