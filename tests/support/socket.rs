//! WebSocket server driving scripted sessions for push tests.

use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// How a scripted session ends after its frames are sent.
#[derive(Debug, Clone, Copy)]
pub enum SessionEnd {
    /// Keep reading until the client closes.
    AwaitClient,
    /// Send a close frame.
    Close,
    /// Drop the TCP connection.
    Drop,
}

/// One accepted connection's script.
#[derive(Debug, Clone)]
pub struct Session {
    pub frames: Vec<String>,
    pub end: SessionEnd,
}

/// Accepts connections and plays one session per connection. Once the
/// sessions run out, later connections hang until the client closes.
pub struct FakePushServer {
    pub base_url: String,
    paths: Arc<Mutex<Vec<String>>>,
}

impl FakePushServer {
    pub async fn start(sessions: Vec<Session>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let paths: Arc<Mutex<Vec<String>>> = Arc::default();

        let seen = Arc::clone(&paths);
        tokio::spawn(async move {
            let mut sessions = sessions.into_iter();
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let session = sessions.next().unwrap_or(Session {
                    frames: Vec::new(),
                    end: SessionEnd::AwaitClient,
                });
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let callback = |req: &Request, response: Response| {
                        seen.lock().unwrap().push(req.uri().path().to_string());
                        Ok(response)
                    };
                    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await
                    else {
                        return;
                    };
                    for frame in session.frames {
                        if ws.send(Message::Text(frame)).await.is_err() {
                            return;
                        }
                    }
                    match session.end {
                        SessionEnd::AwaitClient => while let Some(Ok(_)) = ws.next().await {},
                        SessionEnd::Close => {
                            let _ = ws.close(None).await;
                        }
                        SessionEnd::Drop => drop(ws),
                    }
                });
            }
        });

        Self {
            base_url: format!("ws://{addr}"),
            paths,
        }
    }

    /// Request paths of every accepted handshake, in order.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}
