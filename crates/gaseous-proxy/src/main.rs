use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing::{info, warn};

use gaseous_core::frame::{HEADER_LEN, RECORD_MARKER};
use gaseous_core::{parse_client_hello, unpack_client_hello, TemplateRegistry};
use gaseous_specs::SpecDb;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let port: u16 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8473);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let listener = TcpListener::bind(addr).await?;

    let db = Arc::new(SpecDb::builtin());
    let registry = Arc::new(TemplateRegistry::new());

    info!("Gaseous proxy listening on {}", addr);
    info!("Expecting one Gaseous ClientHello frame per connection\n");

    loop {
        let (mut stream, peer) = listener.accept().await?;
        let db = Arc::clone(&db);
        let registry = Arc::clone(&registry);

        tokio::spawn(async move {
            // Frame header, with or without the 0xFE record marker.
            let mut first = [0u8; 1];
            if let Err(e) = stream.read_exact(&mut first).await {
                warn!("[{}] failed to read frame start: {}", peer, e);
                return;
            }

            let mut frame = Vec::with_capacity(1 + HEADER_LEN);
            frame.push(first[0]);
            let header_remaining = if first[0] == RECORD_MARKER {
                HEADER_LEN
            } else {
                HEADER_LEN - 1
            };
            let mut header = vec![0u8; header_remaining];
            if let Err(e) = stream.read_exact(&mut header).await {
                warn!("[{}] failed to read frame header: {}", peer, e);
                return;
            }
            frame.extend_from_slice(&header);

            // Last four header bytes declare the compressed payload length.
            let len_off = frame.len() - 4;
            let data_len = u32::from_be_bytes([
                frame[len_off],
                frame[len_off + 1],
                frame[len_off + 2],
                frame[len_off + 3],
            ]) as usize;
            if data_len > 64 * 1024 {
                warn!("[{}] payload too large: {} bytes", peer, data_len);
                return;
            }

            let mut payload = vec![0u8; data_len];
            if let Err(e) = stream.read_exact(&mut payload).await {
                warn!("[{}] failed to read payload: {}", peer, e);
                return;
            }
            frame.extend_from_slice(&payload);

            match unpack_client_hello(&frame, &registry, db.as_ref()) {
                Ok(hello_bytes) => match parse_client_hello(&hello_bytes) {
                    Ok(hello) => {
                        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                        println!("  Peer:       {}", peer);
                        println!(
                            "  SNI:        {}",
                            hello.sni.as_deref().unwrap_or("(none)")
                        );
                        println!("  TLS ver:    0x{:04x}", hello.version);
                        println!("  Ciphers:    {} suites", hello.cipher_suites.len());
                        println!("  Extensions: {} types", hello.extensions.len());
                        if !hello.alpn.is_empty() {
                            println!("  ALPN:       {}", hello.alpn.join(", "));
                        }
                        println!(
                            "  Frame:      {} wire bytes -> {} hello bytes",
                            frame.len(),
                            hello_bytes.len()
                        );
                        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
                    }
                    Err(e) => {
                        warn!("[{}] unpacked hello failed to parse: {}", peer, e);
                    }
                },
                Err(e) => {
                    warn!("[{}] unpack error: {}", peer, e);
                }
            }
        });
    }
}
