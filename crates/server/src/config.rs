use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use httpfromtcp::connection::{DEFAULT_READ_BUFFER_CAPACITY, DEFAULT_RELAY_BLOCK_SIZE};

pub const DEFAULT_PORT: u16 = 42069;
pub const DEFAULT_UPSTREAM: &str = "httpbin.org:80";

#[derive(Debug, Clone, Parser)]
#[command(name = "httpfromtcp-server", about = "HTTP/1.1 server built on raw TCP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upstream `host:port` the `/httpbin` route proxies to.
    #[arg(long, default_value = DEFAULT_UPSTREAM)]
    pub upstream: String,

    /// Bytes read from upstream per relayed chunk.
    #[arg(long, default_value_t = DEFAULT_RELAY_BLOCK_SIZE)]
    pub relay_block_size: usize,

    /// Initial capacity of the request read buffer, doubled as needed.
    #[arg(long, default_value_t = DEFAULT_READ_BUFFER_CAPACITY)]
    pub read_buffer_capacity: usize,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
