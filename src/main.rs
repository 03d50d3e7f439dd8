//! Persistent-socket JSON carrier for the engine
//!
//! Serves newline-delimited JSON messages over TCP. Connections are handled
//! one at a time on a current-thread runtime: the engine is single-threaded
//! by design and search calls must be serialized.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gomoku::protocol::Session;

const DEFAULT_ADDR: &str = "127.0.0.1:4242";

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Pay the table-construction cost before the first request
    gomoku::board::zobrist::keys();
    gomoku::eval::patterns::easy_table();
    gomoku::eval::patterns::hard_table();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "client connected");

        let mut framed = Framed::new(stream, LinesCodec::new());
        let mut session = Session::new();

        while let Some(line) = framed.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(%peer, error = %e, "read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = session.handle(&line) {
                if let Err(e) = framed.send(response).await {
                    error!(%peer, error = %e, "write failed");
                    break;
                }
            }
        }
        info!(%peer, "client disconnected");
    }
}
