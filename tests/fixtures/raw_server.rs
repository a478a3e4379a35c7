//! Minimal HTTP/1.1 servers over a raw `TcpListener`.
//!
//! Used where the response framing itself is under test: arbitrary chunk
//! boundaries, bodies cut short, slow answers and connections that stall or
//! never complete.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::oneshot;

const CHUNKED_HEADERS: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: application/octet-stream\r\n\
Transfer-Encoding: chunked\r\n\r\n";

/// Read one request (headers plus a Content-Length body)
pub async fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    let mut tmp = [0u8; 1024];

    let header_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&tmp[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    Ok(buf)
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

async fn write_chunk(stream: &mut TcpStream, chunk: &[u8]) -> std::io::Result<()> {
    stream
        .write_all(format!("{:x}\r\n", chunk.len()).as_bytes())
        .await?;
    stream.write_all(chunk).await?;
    stream.write_all(b"\r\n").await?;
    stream.flush().await
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    (listener, format!("http://{addr}"))
}

/// Serve every request with a chunked body, one HTTP chunk per entry.
///
/// Returns the base URL.
pub async fn spawn_chunked_server(chunks: Vec<Vec<u8>>) -> String {
    let (listener, base_url) = bind().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let chunks = chunks.clone();
            tokio::spawn(async move {
                if read_request(&mut stream).await.is_err() {
                    return;
                }
                if stream.write_all(CHUNKED_HEADERS).await.is_err() {
                    return;
                }
                // A zero-length chunk would end the body early
                for chunk in chunks.iter().filter(|c| !c.is_empty()) {
                    if write_chunk(&mut stream, chunk).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                let _ = stream.write_all(b"0\r\n\r\n").await;
                let _ = stream.flush().await;
            });
        }
    });

    base_url
}

/// Declare `declared_len` bytes, send `sent`, then drop the connection
pub async fn spawn_truncated_server(declared_len: usize, sent: Vec<u8>) -> String {
    let (listener, base_url) = bind().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let sent = sent.clone();
            tokio::spawn(async move {
                if read_request(&mut stream).await.is_err() {
                    return;
                }
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {declared_len}\r\n\r\n"
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&sent).await;
                let _ = stream.flush().await;
                tokio::time::sleep(Duration::from_millis(100)).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    base_url
}

/// Send the headers and one chunk, signal, then hold the connection open
pub async fn spawn_stalling_server(first_chunk: Vec<u8>) -> (String, oneshot::Receiver<()>) {
    let (listener, base_url) = bind().await;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        if read_request(&mut stream).await.is_err() {
            return;
        }
        if stream.write_all(CHUNKED_HEADERS).await.is_err() {
            return;
        }
        if write_chunk(&mut stream, &first_chunk).await.is_err() {
            return;
        }
        let _ = tx.send(());
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    (base_url, rx)
}

/// Accept and read the request but never answer it
pub async fn spawn_silent_server() -> (String, oneshot::Receiver<Vec<u8>>) {
    let (listener, base_url) = bind().await;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        if let Ok(request) = read_request(&mut stream).await {
            let _ = tx.send(request);
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    (base_url, rx)
}

/// Read the request, wait `delay`, then answer 200 with `body`
pub async fn spawn_delayed_server(delay: Duration, body: Vec<u8>) -> String {
    let (listener, base_url) = bind().await;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                if read_request(&mut stream).await.is_err() {
                    return;
                }
                tokio::time::sleep(delay).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.flush().await;
            });
        }
    });

    base_url
}

/// Listener whose accept queue is full, so new connections never complete
pub struct SaturatedListener {
    pub base_url: String,
    _listener: TcpListener,
    _fillers: Vec<TcpStream>,
}

/// Bind with a backlog of one and fill the queue without accepting
pub async fn saturated_listener() -> SaturatedListener {
    let socket = TcpSocket::new_v4().expect("Failed to create socket");
    socket
        .bind("127.0.0.1:0".parse().expect("valid address"))
        .expect("Failed to bind");
    let addr = socket.local_addr().expect("Failed to get address");
    let listener = socket.listen(1).expect("Failed to listen");

    let mut fillers = Vec::new();
    for _ in 0..16 {
        match tokio::time::timeout(Duration::from_millis(100), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => fillers.push(stream),
            _ => break,
        }
    }

    SaturatedListener {
        base_url: format!("http://{addr}"),
        _listener: listener,
        _fillers: fillers,
    }
}
