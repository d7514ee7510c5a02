use std::net::SocketAddr;
use std::sync::Arc;

use httpfromtcp::connection::StreamingRelay;
use httpfromtcp_server::{serve, Proxy, Router};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    address: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start(upstream: &str, relay_block_size: usize) -> Self {
        let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = tcp_listener.local_addr().unwrap();
        let router = Arc::new(Router::new(Proxy::new(upstream, StreamingRelay::with_block_size(relay_block_size), 8)));

        let (shutdown, stop) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(tcp_listener, router, 8, async {
            let _ = stop.await;
        }));
        Self { address, shutdown, handle }
    }

    async fn request(&self, raw: &str) -> String {
        let mut stream = TcpStream::connect(self.address).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    async fn stop(self) {
        self.shutdown.send(()).unwrap();
        self.handle.await.unwrap();
    }
}

/// Serves one canned response to the first connection and returns what it was sent.
async fn fake_upstream(response: &'static [u8]) -> (String, JoinHandle<String>) {
    let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = tcp_listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = tcp_listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 256];
        while !request.ends_with(b"\r\n\r\n") {
            let read = stream.read(&mut buf).await.unwrap();
            assert_ne!(read, 0, "client closed before finishing its request");
            request.extend_from_slice(&buf[..read]);
        }
        stream.write_all(response).await.unwrap();
        String::from_utf8(request).unwrap()
    });
    (address, handle)
}

/// Splits a chunked body into its data and the trailer block.
fn decode_chunked(mut body: &str) -> (String, String) {
    let mut data = String::new();
    loop {
        let (size, rest) = body.split_once("\r\n").unwrap();
        let size = usize::from_str_radix(size, 16).unwrap();
        if size == 0 {
            return (data, rest.to_string());
        }
        data.push_str(&rest[..size]);
        assert_eq!(&rest[size..size + 2], "\r\n");
        body = &rest[size + 2..];
    }
}

#[tokio::test]
async fn html_pages() {
    let server = TestServer::start("127.0.0.1:9", 1024).await;

    let response = server.request("GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("\r\ncontent-type: text/html\r\n"));
    assert!(response.contains("\r\nletsgo: YES\r\n"));
    assert!(response.contains("Your request was an absolute banger."));

    let response = server.request("GET /yourproblem HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    let response = server.request("GET /myproblem HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));

    server.stop().await;
}

#[tokio::test]
async fn malformed_request_is_answered_with_bad_request() {
    let server = TestServer::start("127.0.0.1:9", 1024).await;

    let response = server.request("GET / HTTP/1.1\r\nHost : localhost\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\ncontent-type: text/plain\r\n"));
    assert!(response.contains("invalid header"));

    server.stop().await;
}

#[tokio::test]
async fn proxy_relays_chunks_with_a_digest_trailer() {
    let (upstream, upstream_handle) =
        fake_upstream(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 26\r\n\r\n{\"hello\": \"from upstream\"}").await;
    let server = TestServer::start(&upstream, 8).await;

    let response = server.request("GET /httpbin/json HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").await;
    let upstream_request = upstream_handle.await.unwrap();
    assert!(upstream_request.starts_with("GET /json HTTP/1.0\r\nHost: 127.0.0.1\r\n"));

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("\r\ntransfer-encoding: chunked"));
    assert!(head.contains("\r\ntrailer: X-Content-SHA256, X-Content-Length"));
    assert!(!head.contains("content-length"));

    let (data, trailer) = decode_chunked(body);
    let expected = "{\"hello\": \"from upstream\"}";
    assert_eq!(data, expected);
    assert_eq!(
        trailer,
        format!("x-content-sha256: {}\r\nx-content-length: 26\r\n\r\n", hex::encode(Sha256::digest(expected.as_bytes())))
    );

    server.stop().await;
}

#[tokio::test]
async fn proxy_accepts_empty_upstream_header_values() {
    let (upstream, upstream_handle) = fake_upstream(b"HTTP/1.1 200 OK\r\nX-Empty:\r\nServer:\r\nContent-Length: 2\r\n\r\nok").await;
    let server = TestServer::start(&upstream, 1024).await;

    let response = server.request("GET /httpbin HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").await;
    let upstream_request = upstream_handle.await.unwrap();
    assert!(upstream_request.starts_with("GET / HTTP/1.0\r\n"));

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    let (data, trailer) = decode_chunked(body);
    assert_eq!(data, "ok");
    assert!(trailer.ends_with("x-content-length: 2\r\n\r\n"));

    server.stop().await;
}

#[tokio::test]
async fn unreachable_upstream_is_an_internal_error() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = closed.local_addr().unwrap().to_string();
    drop(closed);

    let server = TestServer::start(&upstream, 1024).await;
    let response = server.request("GET /httpbin/get HTTP/1.1\r\n\r\n").await;

    assert_eq!(
        response,
        "HTTP/1.1 500 Internal Server Error\r\ncontent-type: text/plain\r\ncontent-length: 21\r\nconnection: close\r\n\r\nInternal Server Error"
    );

    server.stop().await;
}
