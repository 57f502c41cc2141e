use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};

use crate::dashboard::Dashboard;

pub mod api;
pub mod routes;

/// Largest request line plus headers accepted.
pub const MAX_HEADER_BYTES: usize = 16_384;
/// Largest `Content-Length` accepted.
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub fn run_server(dashboard: &Dashboard) -> io::Result<()> {
    let bind_addr = dashboard.config.bind.as_str();
    let listener = TcpListener::bind(bind_addr)?;
    log::info!("datasheets server listening on http://{bind_addr}");
    serve(dashboard, listener)
}

/// Handle connections from an already bound listener, one at a time.
pub fn serve(dashboard: &Dashboard, listener: TcpListener) -> io::Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(dashboard, &mut stream) {
                    log::warn!("request error: {err}");
                }
            }
            Err(err) => log::error!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(dashboard: &Dashboard, stream: &mut TcpStream) -> io::Result<()> {
    let request = match read_request(stream) {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            log::warn!("(handle_connection) rejected request: {err}");
            let response = routes::error_response(413, "Payload Too Large", &err.to_string());
            stream.write_all(&response.to_http_bytes())?;
            return stream.flush();
        }
        Err(err) => return Err(err),
    };
    let (method, path) = (request.method.as_str(), request.path.as_str());

    let response = routes::route_request(dashboard, method, path, &request.body);
    if response.status_code >= 500 {
        log::warn!("{method} {path} -> {}", response.status_code);
    } else {
        log::debug!("{method} {path} -> {}", response.status_code);
    }
    stream.write_all(&response.to_http_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Read one request: headers up to the blank line, then `Content-Length`
/// body bytes. Without a `Content-Length` the body is whatever arrived with
/// the headers. `Ok(None)` means the peer closed before sending anything.
pub fn read_request<R: Read>(reader: &mut R) -> io::Result<Option<RawRequest>> {
    let mut buffer: Vec<u8> = Vec::with_capacity(4096);
    let mut chunk = [0_u8; 4096];

    let (head_end, body_start) = loop {
        if let Some(bounds) = header_bounds(&buffer) {
            break bounds;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("request headers exceed {MAX_HEADER_BYTES} bytes"),
            ));
        }
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            break (buffer.len(), buffer.len());
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut lines = head.lines();
    let mut request_parts = lines.next().unwrap_or_default().split_whitespace();
    let method = request_parts.next().unwrap_or("GET").to_string();
    let path = request_parts.next().unwrap_or("/").to_string();
    let content_length = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse::<usize>().ok())
            .flatten()
    });

    let body_end = match content_length {
        Some(length) if length > MAX_BODY_BYTES => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("request body of {length} bytes exceeds {MAX_BODY_BYTES}"),
            ));
        }
        Some(length) => {
            while buffer.len() - body_start < length {
                let n = reader.read(&mut chunk)?;
                if n == 0 {
                    log::debug!(
                        "(read_request) peer closed after {} of {length} body bytes",
                        buffer.len() - body_start
                    );
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
            buffer.len().min(body_start + length)
        }
        None => buffer.len(),
    };

    Ok(Some(RawRequest {
        method,
        path,
        body: String::from_utf8_lossy(&buffer[body_start..body_end]).into_owned(),
    }))
}

/// End of the header block and start of the body, for CRLF or bare LF requests.
fn header_bounds(buffer: &[u8]) -> Option<(usize, usize)> {
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, pos + 4));
    let lf = buffer
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (pos, pos + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}
