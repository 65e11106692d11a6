//! In-process mock portal for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};

/// A request as seen by the mock portal.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: hyper::HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is json")
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Bytes,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = dyn Fn(&Recorded) -> Reply + Send + Sync;

pub struct MockPortal {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockPortal {
    /// Starts a portal on a random local port that answers every request
    /// with `handler`.
    pub async fn start(handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        let handler: Arc<Handler> = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let make_svc = {
            let requests = requests.clone();
            make_service_fn(move |_conn| {
                let handler = handler.clone();
                let requests = requests.clone();
                async move {
                    Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                        let handler = handler.clone();
                        let requests = requests.clone();
                        async move { Ok::<_, Infallible>(handle(req, &*handler, &requests).await) }
                    }))
                }
            })
        };

        let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_svc);
        let url = format!("http://{}", server.local_addr());
        tokio::spawn(server);

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path is `path`.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn handle(
    req: Request<Body>,
    handler: &Handler,
    requests: &Mutex<Vec<Recorded>>,
) -> Response<Body> {
    let (parts, body) = req.into_parts();
    let body = hyper::body::to_bytes(body).await.unwrap_or_default();
    let query = parts
        .uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let recorded = Recorded {
        method: parts.method.to_string(),
        path: parts.uri.path().to_owned(),
        query,
        headers: parts.headers,
        body,
    };

    let reply = handler(&recorded);
    requests.lock().unwrap().push(recorded);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    Response::builder()
        .status(reply.status)
        .body(Body::from(reply.body))
        .unwrap()
}

pub const KNOWN_PUBLIC_KEY: &str = "4a964fa1cb329d066aedcf7fc03a249eeea3cf2461811090b287daaaec37ab36";
pub const KNOWN_DATA_KEY: &str = "TEST_KEY";
pub const KNOWN_SKYLINK: &str = "AADeqJt8vPZtW9Nm_Hc5C5EKPmZhYUZGeBqvibofIMMHtg";
/// Hex of [`KNOWN_SKYLINK`].
pub const KNOWN_DATA: &str = "41414465714a743876505a7457394e6d5f4863354335454b506d5a6859555a476542717669626f66494d4d487467";
pub const KNOWN_SIGNATURE: &str = "f3dc30c2255254a7ffd64e767e15f8b9dc908491907c79afb3a1b24ee3b9602f10ff01bce22e1e700f502190fff4ee209f5b32e4c2b9e1ef6b0bed0c2b558406";

/// Registry reply for the known entry at revision 2.
pub fn known_entry_reply() -> Reply {
    Reply::json(
        200,
        serde_json::json!({
            "data": KNOWN_DATA,
            "revision": 2,
            "signature": KNOWN_SIGNATURE,
        }),
    )
}
