//! Monoio-native HTTPS client
//!
//! One TLS connection per request (`Connection: close`), HTTP/1.1 with
//! `Content-Length` and chunked bodies. Every request is bounded by the
//! client's timeout, so the runtime driving it must have timers enabled
//! (`#[monoio::main(enable_timer = true)]`).

use crate::errors::{ExchangeError, Result};
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const READ_CHUNK: usize = 8192;

/// Monoio-native HTTPS client
pub struct MonoioHttpsClient {
    tls_config: Arc<ClientConfig>,
    timeout: Duration,
}

/// HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Parse a raw HTTP/1.1 response
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header_end = find(data, b"\r\n\r\n")
            .ok_or_else(|| ExchangeError::NetworkError("Invalid HTTP response: no header terminator".to_string()))?;

        let head = std::str::from_utf8(&data[..header_end])
            .map_err(|e| ExchangeError::NetworkError(format!("Invalid HTTP header encoding: {e}")))?;
        let raw_body = &data[header_end + 4..];

        let mut lines = head.lines();
        let status_line = lines.next()
            .ok_or_else(|| ExchangeError::NetworkError("Empty response".to_string()))?;
        let status = status_line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| ExchangeError::NetworkError(format!("Invalid status line: {status_line}")))?;

        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let mut response = Self { status, headers, body: String::new() };

        let chunked = response.header("transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
        let body = if chunked {
            decode_chunked(raw_body)?
        } else if let Some(len) = response.header("content-length").and_then(|v| v.parse::<usize>().ok()) {
            raw_body[..len.min(raw_body.len())].to_vec()
        } else {
            raw_body.to_vec()
        };

        response.body = String::from_utf8_lossy(&body).into_owned();
        Ok(response)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl MonoioHttpsClient {
    /// Create a new HTTPS client trusting the webpki root store
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(Self {
            tls_config: Arc::new(tls_config),
            timeout,
        })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make an HTTPS GET request
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.request_with_headers("GET", url, None, &[]).await
    }

    /// Make an HTTPS request with custom headers, bounded by the client timeout
    pub async fn request_with_headers(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        match monoio::time::timeout(self.timeout, self.send(method, url, body, headers)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(format!(
                "{method} {} exceeded {}ms",
                strip_query(url),
                self.timeout.as_millis()
            ))),
        }
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let parsed_url = url::Url::parse(url)?;

        let host = parsed_url.host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl("No host in URL".to_string()))?;
        let port = parsed_url.port().unwrap_or(443);

        let mut path_and_query = parsed_url.path().to_string();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = parsed_url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let tcp_stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("TCP connect to {host}:{port} failed: {e}")))?;

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ExchangeError::NetworkError(format!("Invalid server name: {e:?}")))?;

        let tls_conn = ClientConnection::new(self.tls_config.clone(), server_name)
            .map_err(|e| ExchangeError::NetworkError(format!("TLS setup failed: {e}")))?;

        let mut tls_stream = TlsStream::new(tcp_stream, tls_conn);

        let content_length = body.map(|b| b.len()).unwrap_or(0);
        let mut request = format!(
            "{method} {path_and_query} HTTP/1.1\r\n\
             Host: {host}\r\n\
             User-Agent: pricewatch/0.1\r\n\
             Accept: application/json\r\n\
             Connection: close\r\n\
             Content-Length: {content_length}\r\n"
        );
        for (key, value) in headers {
            request.push_str(&format!("{key}: {value}\r\n"));
        }
        request.push_str("\r\n");
        if let Some(body) = body {
            request.push_str(body);
        }

        debug!("🌐 {} {}{}", method, host, parsed_url.path());

        tls_stream.write_all(request.as_bytes()).await?;
        let response_data = tls_stream.read_to_end().await?;

        HttpResponse::parse(&response_data)
    }
}

/// TLS session over a monoio TCP stream
struct TlsStream {
    stream: TcpStream,
    tls_conn: ClientConnection,
    write_buf: Vec<u8>,
    handshake_complete: bool,
}

impl TlsStream {
    fn new(stream: TcpStream, tls_conn: ClientConnection) -> Self {
        Self {
            stream,
            tls_conn,
            write_buf: Vec::with_capacity(READ_CHUNK),
            handshake_complete: false,
        }
    }

    async fn flush_tls(&mut self) -> Result<()> {
        while self.tls_conn.wants_write() {
            self.write_buf.clear();
            self.tls_conn.write_tls(&mut self.write_buf)
                .map_err(|e| ExchangeError::NetworkError(format!("TLS write failed: {e}")))?;

            if !self.write_buf.is_empty() {
                let buf = std::mem::take(&mut self.write_buf);
                let (result, buf) = self.stream.write_all(buf).await;
                self.write_buf = buf;
                result.map_err(|e| ExchangeError::NetworkError(format!("TCP write failed: {e}")))?;
            }
        }
        Ok(())
    }

    /// Pull one TCP read into the TLS session; returns false on EOF
    async fn fill_tls(&mut self) -> Result<bool> {
        let (result, buf) = self.stream.read(vec![0u8; READ_CHUNK]).await;
        let bytes_read = result.map_err(|e| ExchangeError::NetworkError(format!("TCP read failed: {e}")))?;
        if bytes_read == 0 {
            return Ok(false);
        }

        self.tls_conn.read_tls(&mut std::io::Cursor::new(&buf[..bytes_read]))
            .map_err(|e| ExchangeError::NetworkError(format!("TLS read failed: {e}")))?;
        self.tls_conn.process_new_packets()
            .map_err(|e| ExchangeError::NetworkError(format!("TLS process failed: {e}")))?;
        Ok(true)
    }

    async fn complete_handshake(&mut self) -> Result<()> {
        while !self.handshake_complete {
            self.flush_tls().await?;

            if !self.tls_conn.is_handshaking() {
                self.handshake_complete = true;
                break;
            }

            if self.tls_conn.wants_read() {
                if !self.fill_tls().await? {
                    return Err(ExchangeError::NetworkError("Connection closed during handshake".to_string()));
                }
            } else if !self.tls_conn.wants_write() {
                return Err(ExchangeError::NetworkError("TLS handshake stalled".to_string()));
            }
        }
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.complete_handshake().await?;

        self.tls_conn.writer().write_all(data)
            .map_err(|e| ExchangeError::NetworkError(format!("TLS application write failed: {e}")))?;

        self.flush_tls().await
    }

    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        self.complete_handshake().await?;

        let mut response_data = Vec::new();
        let mut plain = vec![0u8; READ_CHUNK];

        loop {
            match self.tls_conn.reader().read(&mut plain) {
                Ok(0) => break, // close_notify received
                Ok(n) => {
                    response_data.extend_from_slice(&plain[..n]);
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                // Peer closed the socket without close_notify after sending everything
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(ExchangeError::NetworkError(format!("TLS read failed: {e}")));
                }
            }

            if !self.fill_tls().await? {
                break;
            }
        }

        Ok(response_data)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn decode_chunked(mut data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());

    loop {
        let line_end = find(data, b"\r\n")
            .ok_or_else(|| ExchangeError::NetworkError("Truncated chunk header".to_string()))?;
        let size_line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| ExchangeError::NetworkError("Invalid chunk header".to_string()))?;
        // Chunk extensions follow a ';'
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| ExchangeError::NetworkError(format!("Invalid chunk size: {size_hex}")))?;
        data = &data[line_end + 2..];

        if size == 0 {
            break;
        }
        if data.len() < size {
            return Err(ExchangeError::NetworkError("Truncated chunk body".to_string()));
        }
        out.extend_from_slice(&data[..size]);
        data = &data[size..];
        data = data.strip_prefix(b"\r\n".as_slice()).unwrap_or(data);
    }

    Ok(out)
}

/// Drop the query (which carries signatures) before a URL reaches an error message
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
