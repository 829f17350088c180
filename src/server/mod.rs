use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use camino::Utf8Path;
use tracing::{debug, info, warn};

use crate::store::JsonFileStore;

pub mod routes;

/// Serves the time-series endpoint, one request per connection.
///
/// The store file is reopened for every request so the server sees the
/// results of ingestion runs made while it is up.
pub fn run_server(bind_addr: &str, store_path: &Utf8Path) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!(%bind_addr, store = %store_path, "met-history server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, store_path) {
                    warn!(error = %err, "request error");
                }
            }
            Err(err) => warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream, store_path: &Utf8Path) -> std::io::Result<()> {
    let mut buffer = [0_u8; 8_192];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let request_line = request.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");
    debug!(%method, %path, "request");

    let response = match JsonFileStore::open(store_path) {
        Ok(store) => routes::route_request(method, path, &store),
        Err(err) => routes::error_response(500, "Internal Server Error", &err.to_string()),
    };
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
