//! Service-specific tests


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use tokio::net::TcpListener;

    /// A port nothing is listening on
    pub fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Bind `count` listeners on ephemeral loopback ports
    pub async fn listeners(count: usize) -> Vec<(TcpListener, u16)> {
        let mut bound = Vec::with_capacity(count);
        for _ in 0..count {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            bound.push((listener, port));
        }
        bound
    }
}
