//! Shared test HTTP server
#![allow(dead_code)]

use std::time::Duration;
use tiny_http::{Response, Server};

/// A canned response for one path
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Route {
    pub fn ok(path: &'static str, body: &[u8]) -> Self {
        Self {
            path,
            status: 200,
            body: body.to_vec(),
            delay: None,
        }
    }

    pub fn status(path: &'static str, status: u16) -> Self {
        Self {
            path,
            status,
            body: b"error".to_vec(),
            delay: None,
        }
    }

    pub fn slow(path: &'static str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::ok(path, b"late")
        }
    }
}

/// Start a test HTTP server on an ephemeral port and return its base URL
pub fn start_test_server(routes: Vec<Route>) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let path = request.url().to_string();
            let response = match routes.iter().find(|route| route.path == path) {
                Some(route) => {
                    if let Some(delay) = route.delay {
                        std::thread::sleep(delay);
                    }
                    Response::from_data(route.body.clone()).with_status_code(route.status)
                }
                None => Response::from_data(b"Not Found".to_vec()).with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    format!("http://{}", addr)
}

/// A base URL nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
