use std::sync::Arc;

use anyhow::Context;
use httpfromtcp::connection::{HttpConnection, ReadBuffer, StreamingRelay};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::proxy::Proxy;
use crate::router::Router;

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let address = config.listen_addr();
    let tcp_listener = TcpListener::bind(address).await.with_context(|| format!("bind server to {address}"))?;
    info!(%address, upstream = %config.upstream, "start listening");

    let proxy = Proxy::new(config.upstream, StreamingRelay::with_block_size(config.relay_block_size), config.read_buffer_capacity);
    serve(tcp_listener, Arc::new(Router::new(proxy)), config.read_buffer_capacity, shutdown_signal()).await;

    info!("server gracefully stopped");
    Ok(())
}

/// Accepts connections on `tcp_listener` until `shutdown` resolves, serving each on its
/// own task. Connections already accepted run to completion on their own.
pub async fn serve<F>(tcp_listener: TcpListener, router: Arc<Router>, read_buffer_capacity: usize, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (tcp_stream, remote_addr) = tokio::select! {
            () = &mut shutdown => {
                info!("stop accepting connections");
                return;
            }
            accepted = tcp_listener.accept() => match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            },
        };

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            let connection = HttpConnection::with_read_buffer(reader, writer, ReadBuffer::with_capacity(read_buffer_capacity));
            match connection.process(router).await {
                Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => error!(%remote_addr, "service has error, cause {}, connection shutdown", e),
            }
        });
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(cause = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
