//! A hyper-backed mock LM Studio server for exercising the client end to end.
#![allow(dead_code)]

use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener};
use std::num::NonZeroU16;
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use tokio::runtime;
use tokio::sync::oneshot;

use lmquery::Settings;

#[derive(Clone)]
enum Reply {
    Respond { status: StatusCode, body: Bytes },
    Stall(Duration),
}

pub struct MockServer {
    addr: SocketAddr,
    requests: std_mpsc::Receiver<String>,
    // Dropping the sender stops the accept loop.
    _shutdown_tx: oneshot::Sender<()>,
}

impl MockServer {
    /// Answers every request with `status` and `body`.
    pub fn respond(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        Self::spawn(Reply::Respond {
            status,
            body: Bytes::from(body.to_string()),
        })
    }

    /// Reads the request and then sits on the connection without answering.
    pub fn stall(delay: Duration) -> Self {
        Self::spawn(Reply::Stall(delay))
    }

    // The server gets its own thread and runtime so it can be started from
    // inside a #[tokio::test] as well as from plain #[test]s.
    fn spawn(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        listener
            .set_nonblocking(true)
            .expect("non-blocking listener");
        let addr = listener.local_addr().expect("mock server address");

        let (requests_tx, requests) = std_mpsc::channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("new rt");

        let test_name = thread::current().name().unwrap_or("<unknown>").to_string();
        thread::Builder::new()
            .name(format!("test({})-mock-server", test_name))
            .spawn(move || {
                rt.block_on(async move {
                    let listener =
                        tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                    let builder = Builder::new(TokioExecutor::new());

                    loop {
                        tokio::select! {
                            _ = &mut shutdown_rx => break,
                            accepted = listener.accept() => {
                                let Ok((io, _)) = accepted else { break };
                                let reply = reply.clone();
                                let requests_tx = requests_tx.clone();
                                let svc = hyper::service::service_fn(move |req| {
                                    handle(req, reply.clone(), requests_tx.clone())
                                });
                                let builder = builder.clone();

                                tokio::spawn(async move {
                                    let _ = builder.serve_connection(TokioIo::new(io), svc).await;
                                });
                            }
                        }
                    }
                });
            })
            .expect("thread spawn");

        MockServer {
            addr,
            requests,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn port(&self) -> NonZeroU16 {
        NonZeroU16::new(self.addr.port()).expect("ephemeral port is never 0")
    }

    /// The JSON body of the first request the server received.
    pub fn received_body(&self) -> serde_json::Value {
        let raw = self
            .requests
            .recv_timeout(Duration::from_secs(5))
            .expect("mock server received no request");
        serde_json::from_str(&raw).expect("request body is JSON")
    }
}

async fn handle(
    req: Request<Incoming>,
    reply: Reply,
    requests_tx: std_mpsc::Sender<String>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };
    let _ = requests_tx.send(String::from_utf8_lossy(&body).into_owned());

    let response = match reply {
        Reply::Respond { status, body } => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .expect("valid response"),
        Reply::Stall(delay) => {
            tokio::time::sleep(delay).await;
            Response::new(Full::new(Bytes::new()))
        }
    };
    Ok(response)
}

/// A port that nothing is listening on.
pub fn closed_port() -> NonZeroU16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind scratch listener");
    let port = listener.local_addr().expect("scratch address").port();
    drop(listener);
    NonZeroU16::new(port).expect("ephemeral port is never 0")
}

pub fn settings_for(port: NonZeroU16) -> Settings {
    Settings {
        host: "127.0.0.1".into(),
        port,
        model: "test-model".into(),
        default_max_tokens: 100,
    }
}
