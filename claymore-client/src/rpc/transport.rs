use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

use super::envelope::{Envelope, Request, parse_response};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::tracing::prelude::*;
use crate::types::MinerEndpoint;

type Connection = Framed<TcpStream, LinesCodec>;

/// Perform one call against the daemon at `endpoint`.
///
/// Connects, writes a single request line, reads a single response line,
/// and drops the connection. Nothing is reused between calls.
pub async fn call(
    endpoint: &MinerEndpoint,
    config: &ClientConfig,
    method: &str,
    args: Map<String, Value>,
) -> Result<Value, TransportError> {
    let envelope = Envelope::for_endpoint(endpoint);
    let request = Request::new(envelope, method, args).to_line()?;

    debug!(address = %endpoint.address, method, "Calling daemon");

    let stream = timeout(
        config.connect_timeout,
        TcpStream::connect(endpoint.address.as_str()),
    )
    .await
    .map_err(|_| TransportError::Timeout {
        operation: "connect",
        limit: config.connect_timeout,
    })??;
    stream.set_nodelay(true)?;

    let codec = LinesCodec::new_with_max_length(config.max_line_length);
    let mut connection = Framed::new(stream, codec);

    let reply = timeout(config.call_timeout, round_trip(&mut connection, request))
        .await
        .map_err(|_| TransportError::Timeout {
            operation: "call",
            limit: config.call_timeout,
        })??;

    trace!(address = %endpoint.address, method, reply = %reply, "Received reply");
    parse_response(&reply)
}

async fn round_trip(
    connection: &mut Connection,
    request: String,
) -> Result<String, TransportError> {
    connection.send(request).await.map_err(codec_error)?;

    // The daemon may close right after writing its reply without a final
    // newline; the codec still yields the buffered line at EOF.
    match connection.next().await {
        Some(line) => line.map_err(codec_error),
        None => Err(TransportError::Closed),
    }
}

fn codec_error(e: LinesCodecError) -> TransportError {
    match e {
        LinesCodecError::Io(e) => TransportError::Io(e),
        LinesCodecError::MaxLineLengthExceeded => {
            TransportError::Envelope("reply line exceeds maximum length".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, capture the request line, answer with
    /// `reply` (if any), then close.
    async fn fake_daemon(reply: Option<&'static str>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            let mut request = String::new();
            socket.read_line(&mut request).await.unwrap();
            if let Some(reply) = reply {
                socket.get_mut().write_all(reply.as_bytes()).await.unwrap();
            }
            request
        });

        (address, handle)
    }

    fn endpoint(address: String) -> MinerEndpoint {
        MinerEndpoint::new(address, "secret")
    }

    async fn call_with_defaults(address: String, method: &str) -> Result<Value, TransportError> {
        let config = ClientConfig::default();
        call(&endpoint(address), &config, method, Map::new()).await
    }

    #[tokio::test]
    async fn sends_one_line_and_returns_result() {
        let reply = "{\"id\": 0, \"result\": [\"13.2 - ETH\"], \"error\": null}\n";
        let (address, daemon) = fake_daemon(Some(reply)).await;

        let result = call_with_defaults(address, "miner_getstat1").await.unwrap();
        assert_eq!(result, json!(["13.2 - ETH"]));

        let request = daemon.await.unwrap();
        assert!(request.ends_with('\n'));
        let request: Value = serde_json::from_str(request.trim_end()).unwrap();
        assert_eq!(request["method"], "miner_getstat1");
        assert_eq!(request["psw"], "secret");
        assert_eq!(request["id"], "0");
        assert_eq!(request["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn accepts_reply_without_trailing_newline() {
        let reply = "{\"id\": 0, \"result\": true, \"error\": null}";
        let (address, _daemon) = fake_daemon(Some(reply)).await;

        let result = call_with_defaults(address, "miner_restart").await.unwrap();
        assert_eq!(result, json!(true));
    }

    #[tokio::test]
    async fn close_without_reply() {
        let (address, _daemon) = fake_daemon(None).await;

        let err = call_with_defaults(address, "miner_reboot").await.unwrap_err();
        assert!(matches!(err, TransportError::Closed), "got {err:?}");
    }

    #[tokio::test]
    async fn remote_error_is_surfaced() {
        let reply = "{\"id\": 0, \"result\": null, \"error\": \"Wrong password\"}\n";
        let (address, _daemon) = fake_daemon(Some(reply)).await;

        let err = call_with_defaults(address, "miner_getstat1").await.unwrap_err();
        assert!(
            matches!(err, TransportError::Remote(ref m) if m == "Wrong password"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn oversized_reply_is_rejected() {
        let (address, _daemon) = fake_daemon(Some(
            "{\"id\": 0, \"result\": [\"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\"]}\n",
        ))
        .await;
        let config = ClientConfig {
            max_line_length: 16,
            ..Default::default()
        };

        let err = call(&endpoint(address), &config, "miner_getstat1", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Envelope(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn connection_refused() {
        // Grab a free port, then release it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = call_with_defaults(address, "miner_getstat1").await.unwrap_err();
        assert!(matches!(err, TransportError::Io(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn silent_daemon_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        // Accept and hold the connection open without answering.
        let _daemon = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let config = ClientConfig {
            call_timeout: Duration::from_millis(100),
            ..Default::default()
        };

        let err = call(&endpoint(address), &config, "miner_getstat1", Map::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, TransportError::Timeout { operation: "call", .. }),
            "got {err:?}"
        );
    }
}
