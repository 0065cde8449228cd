use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use super::frame::{read_frame, write_frame, InboundPacket, OutboundPacket};
use super::router::CommandRouter;

/// Replies queued per connection before request tasks wait on the writer.
const REPLY_BUFFER: usize = 32;

/// TCP front end of the [`CommandRouter`].
pub struct CommandServer {
    listener: TcpListener,
    router: CommandRouter,
}

impl CommandServer {
    pub async fn bind(addr: SocketAddr, router: CommandRouter) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then tells every open
    /// connection to stop reading and waits for its in-flight requests to be
    /// answered before returning.
    #[instrument(name = "command_server", skip_all)]
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        info!("Command server accepting connections");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Command server shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let router = self.router.clone();
                        let span = info_span!("connection", peer = %peer);
                        connections.spawn(
                            handle_connection(stream, router, stop_rx.clone()).instrument(span),
                        );
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        let _ = stop_tx.send(true);
        info!(open = connections.len(), "Draining open connections");
        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                warn!(error = %e, "Connection task failed");
            }
        }
        info!("Command server stopped");
    }
}

/// Reads frames until the peer hangs up, sends garbage, or the server stops.
/// Every request runs on its own task; replies go back through a single
/// writer task, in completion order. Returns once every accepted request has
/// been answered.
async fn handle_connection(
    stream: TcpStream,
    router: CommandRouter,
    mut stop: watch::Receiver<bool>,
) {
    debug!("Connection opened");
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let (replies, mut outbox) = mpsc::channel::<OutboundPacket>(REPLY_BUFFER);

    let writer = tokio::spawn(
        async move {
            while let Some(packet) = outbox.recv().await {
                if let Err(e) = write_frame(&mut write_half, &packet).await {
                    warn!(error = %e, "Failed to write reply");
                    break;
                }
            }
        }
        .in_current_span(),
    );

    loop {
        let frame = tokio::select! {
            frame = read_frame(&mut reader) => frame,
            _ = stop.changed() => {
                debug!("Server stopping, no more requests read");
                break;
            }
        };
        let value = match frame {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Connection closed by peer");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Malformed frame, closing connection");
                break;
            }
        };
        let packet: InboundPacket = match serde_json::from_value(value) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Malformed packet, closing connection");
                break;
            }
        };

        let router = router.clone();
        let replies = replies.clone();
        tokio::spawn(
            async move {
                let command = packet.pattern.command().to_string();
                let result = router.dispatch(&command, packet.data).await;
                match (packet.id, result) {
                    (Some(id), result) => {
                        let _ = replies.send(OutboundPacket::reply(id, result)).await;
                    }
                    (None, Ok(_)) => debug!(command = %command, "Event handled"),
                    (None, Err(envelope)) => warn!(
                        command = %command,
                        status = %envelope.status,
                        message = %envelope.message,
                        "Event failed"
                    ),
                }
            }
            .in_current_span(),
        );
    }

    // The writer ends once every request task has dropped its sender
    drop(replies);
    let _ = writer.await;
    debug!("Connection finished");
}
