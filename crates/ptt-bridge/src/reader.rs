//! Frame reader loop
//!
//! Reads the device stream in fixed-size chunks, classifies each chunk on its
//! own and forwards recognised commands to the widget. The loop never closes
//! the connection; whoever owns it does.

use crate::script::ScriptBridge;
use crate::transport::Connection;
use ptt_core::Frame;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Bytes requested per read
pub const READ_BUFFER_SIZE: usize = 1024;

/// Why the reader loop stopped
#[derive(Debug)]
pub enum LoopExit {
    /// Scope was cancelled
    Cancelled,
    /// Device closed the stream
    EndOfStream,
    /// A read failed (including reads failed by `close`)
    ReadError(io::Error),
}

/// Run the reader loop until cancellation, end of stream or a read error
///
/// Cancellation is observed before each read and after each recognised
/// frame. A pending read is only interrupted by closing the connection.
pub async fn reader_loop(
    connection: &mut Connection,
    scope: &CancellationToken,
    bridge: &ScriptBridge,
) -> LoopExit {
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        if scope.is_cancelled() {
            debug!("Reader scope cancelled");
            return LoopExit::Cancelled;
        }

        let n = match connection.read(&mut buf).await {
            Ok(0) => {
                debug!("Device closed the stream");
                return LoopExit::EndOfStream;
            }
            Ok(n) => n,
            Err(e) => {
                debug!("Read failed: {}", e);
                return LoopExit::ReadError(e);
            }
        };

        let frame = Frame::decode(&buf[..n]);
        match frame.command() {
            Some(command) => {
                trace!("[Device→Widget] {:?}", command);
                tokio::task::yield_now().await;
                if scope.is_cancelled() {
                    debug!("Reader scope cancelled");
                    return LoopExit::Cancelled;
                }
                bridge.post(command);
            }
            None => {
                trace!("Ignoring {} bytes: {:?}", n, frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptt_core::ExternalDevice;
    use ptt_host::{HostExecutor, RecordingHost, host_context};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};

    const BASE: &str = "https://widgets.example.org/ptt/index.html";

    fn setup(stream: crate::transport::ByteStream) -> (Connection, ScriptBridge, HostExecutor) {
        let (handle, executor) = host_context();
        let bridge = ScriptBridge::new(handle, BASE).unwrap();
        let conn = Connection::new(ExternalDevice::new("AA", "PTT-42"), stream);
        (conn, bridge, executor)
    }

    fn drain(executor: &mut HostExecutor) -> RecordingHost {
        let mut host = RecordingHost::new();
        executor.run_pending(&mut host);
        host
    }

    #[tokio::test]
    async fn test_press_posts_once() {
        let stream = tokio_test::io::Builder::new().read(b"+PTT=Pxxxxxx").build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        let exit = reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        assert!(matches!(exit, LoopExit::EndOfStream));

        let host = drain(&mut executor);
        assert_eq!(host.messages(), vec![("pttp", "https://widgets.example.org")]);
        assert!(host.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_release_posts_once() {
        let stream = tokio_test::io::Builder::new().read(b"+PTT=R\r\n").build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        assert_eq!(
            drain(&mut executor).messages(),
            vec![("pttr", "https://widgets.example.org")]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_is_dropped() {
        let stream = tokio_test::io::Builder::new()
            .read(b"AT+BRSF=0\r\n")
            .read(b"\r\n+PTT=P")
            .read(&[0xff, 0xfe])
            .build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        assert!(drain(&mut executor).calls.is_empty());
    }

    #[tokio::test]
    async fn test_split_frame_is_missed() {
        let stream = tokio_test::io::Builder::new()
            .read(b"+PTT")
            .read(b"=P")
            .read(b"+PTT=R")
            .build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        assert_eq!(
            drain(&mut executor).messages(),
            vec![("pttr", "https://widgets.example.org")]
        );
    }

    #[tokio::test]
    async fn test_sequence_in_order() {
        let stream = tokio_test::io::Builder::new()
            .read(b"+PTT=P")
            .read(b"noise")
            .read(b"+PTT=R")
            .read(b"+PTT=P")
            .build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        let host = drain(&mut executor);
        let payloads: Vec<&str> = host.messages().into_iter().map(|(data, _)| data).collect();
        assert_eq!(payloads, vec!["pttp", "pttr", "pttp"]);
    }

    #[tokio::test]
    async fn test_read_error_terminates() {
        let stream = tokio_test::io::Builder::new()
            .read(b"+PTT=P")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "link lost"))
            .build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        let exit = reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
        match exit {
            LoopExit::ReadError(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected exit: {:?}", other),
        }
        // Loop does not close the connection itself
        assert!(!conn.is_closed());
        assert_eq!(drain(&mut executor).messages().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_read() {
        let stream = tokio_test::io::Builder::new().build();
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        let scope = CancellationToken::new();
        scope.cancel();
        let exit = reader_loop(&mut conn, &scope, &bridge).await;
        assert!(matches!(exit, LoopExit::Cancelled));
        assert!(drain(&mut executor).calls.is_empty());
    }

    /// Delivers one press and cancels the scope in the same read
    struct CancellingStream {
        scope: CancellationToken,
        sent: bool,
    }

    impl AsyncRead for CancellingStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.sent {
                self.sent = true;
                buf.put_slice(b"+PTT=P");
                self.scope.cancel();
            }
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_cancelled_after_frame_classified() {
        let scope = CancellationToken::new();
        let stream = CancellingStream {
            scope: scope.clone(),
            sent: false,
        };
        let (mut conn, bridge, mut executor) = setup(Box::new(stream));

        let exit = reader_loop(&mut conn, &scope, &bridge).await;
        assert!(matches!(exit, LoopExit::Cancelled));
        assert!(drain(&mut executor).calls.is_empty());
    }

    #[tokio::test]
    async fn test_close_ends_pending_read() {
        let (mut device_side, bridge_side) = tokio::io::duplex(64);
        let (mut conn, bridge, mut executor) = setup(Box::new(bridge_side));
        let closer = conn.close_handle();

        let task = tokio::spawn(async move {
            let exit = reader_loop(&mut conn, &CancellationToken::new(), &bridge).await;
            (exit, conn)
        });

        device_side.write_all(b"+PTT=P").await.unwrap();
        // Wait for the press to come through so the loop is parked in read
        let mut host = RecordingHost::new();
        executor.run_next(&mut host).await;
        assert_eq!(host.messages().len(), 1);

        closer.close();
        let (exit, mut conn) = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        match exit {
            LoopExit::ReadError(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionAborted),
            other => panic!("unexpected exit: {:?}", other),
        }

        // Nothing more is read once closed
        device_side.write_all(b"+PTT=R").await.unwrap();
        let mut buf = [0u8; 8];
        assert!(conn.read(&mut buf).await.is_err());
        assert_eq!(executor.run_pending(&mut host), 0);
    }
}
