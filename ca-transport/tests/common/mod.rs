#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::JoinHandle;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};

/// A self-signed certificate and its key.
pub struct Pair {
    pub cert: rcgen::Certificate,
    pub signing_key: rcgen::KeyPair,
}

impl Pair {
    pub fn generate(name: &str) -> Self {
        let rcgen::CertifiedKey { cert, signing_key } =
            rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap();
        Self { cert, signing_key }
    }

    pub fn cert_pem(&self) -> String {
        self.cert.pem()
    }

    pub fn key_pem(&self) -> String {
        self.signing_key.serialize_pem()
    }

    pub fn cert_der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn key_der(&self) -> PrivateKeyDer<'static> {
        PrivatePkcs8KeyDer::from(self.signing_key.serialize_der()).into()
    }
}

/// What the test server saw on its single connection.
#[derive(Debug)]
pub struct Served {
    pub request_head: String,
    pub client_certificates: usize,
}

/// Serve one HTTPS request on 127.0.0.1 with `server` as the server
/// certificate, requiring a client certificate issued by `client_ca`.
///
/// The thread yields `None` when the handshake or the exchange fails.
pub fn serve_once(server: &Pair, client_ca: &Pair) -> (SocketAddr, JoinHandle<Option<Served>>) {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut client_roots = RootCertStore::empty();
    client_roots.add(client_ca.cert_der()).unwrap();
    let verifier =
        WebPkiClientVerifier::builder_with_provider(Arc::new(client_roots), Arc::clone(&provider))
            .build()
            .unwrap();

    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(vec![server.cert_der()], server.key_der())
        .unwrap();
    let config = Arc::new(config);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (tcp, _) = listener.accept().ok()?;
        let conn = ServerConnection::new(config).ok()?;
        let mut tls = StreamOwned::new(conn, tcp);

        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = tls.read(&mut chunk).ok()?;
            if n == 0 {
                return None;
            }
            head.extend_from_slice(&chunk[..n]);
        }

        tls.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
            .ok()?;
        tls.flush().ok()?;

        let client_certificates = tls.conn.peer_certificates().map_or(0, |c| c.len());
        tls.conn.send_close_notify();
        let _ = tls.flush();

        Some(Served {
            request_head: String::from_utf8_lossy(&head).into_owned(),
            client_certificates,
        })
    });

    (addr, handle)
}
