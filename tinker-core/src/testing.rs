//! Canned HTTP server for client tests.
//!
//! Compiled for this crate's own tests and, through the `testing` feature,
//! for the dev-dependencies of the other tinker crates.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// What the server saw for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// e.g. `GET /secrets/OpenAIKey?api-version=7.4 HTTP/1.1`
    pub line: String,
    pub body: String,
}

/// Answer one request per canned `(status, body)`, in order, then stop.
///
/// Returns the base URL and a handle yielding every request received.
pub fn serve(responses: Vec<(&'static str, String)>) -> (String, JoinHandle<Vec<Request>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = std::thread::spawn(move || {
        responses
            .into_iter()
            .map(|(status, body)| answer(&listener, status, &body))
            .collect()
    });
    (format!("http://{addr}"), handle)
}

/// [`serve`] for a single response.
pub fn serve_once(status: &'static str, body: impl Into<String>) -> (String, JoinHandle<Request>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let body = body.into();
    let handle = std::thread::spawn(move || answer(&listener, status, &body));
    (format!("http://{addr}"), handle)
}

fn answer(listener: &TcpListener, status: &str, body: &str) -> Request {
    let (stream, _) = listener.accept().expect("accept");
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).expect("request line");

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).expect("header");
        if header == "\r\n" || header.is_empty() {
            break;
        }
        if let Some(value) = header.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().expect("content-length");
        }
    }
    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).expect("body");

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).expect("write");

    Request {
        line: line.trim_end().to_string(),
        body: String::from_utf8(request_body).expect("utf8 body"),
    }
}
