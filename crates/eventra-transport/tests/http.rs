//! Integration tests for the reqwest transport.
//!
//! Each test runs a one-shot HTTP/1.1 responder on a real local socket,
//! captures the raw request it received, and answers with a canned
//! response. This checks what actually goes over the wire.

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use eventra_transport::{
        ApiRequest, FormPart, HttpTransport, ReqwestTransport, TransportError,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, reads a full request (head plus
    /// `content-length` bytes of body), writes `status` and `body` back,
    /// and returns the raw request text.
    fn serve_once(
        listener: TcpListener,
        status: &'static str,
        body: &'static str,
    ) -> JoinHandle<String> {
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("should accept");
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.expect("should read");
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = find_head_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    if buf.len() >= end + 4 + content_length(&head) {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("should write");
            String::from_utf8_lossy(&buf).into_owned()
        })
    }

    fn find_head_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("http://{addr}/api"))
    }

    #[tokio::test]
    async fn test_get_sends_query_and_bearer() {
        let (listener, base) = bind().await;
        let server = serve_once(listener, "200 OK", r#"[{"id":1}]"#);
        let transport = ReqwestTransport::new(&base).unwrap();

        let mut request = ApiRequest::get("/events/").query("search", "rust");
        request.set_bearer("A1");
        let response = transport.send(&request).await.expect("should send");

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), br#"[{"id":1}]"#);

        let raw = server.await.unwrap();
        let lower = raw.to_lowercase();
        assert!(raw.starts_with("GET /api/events/?search=rust HTTP/1.1"), "{raw}");
        assert!(lower.contains("authorization: bearer a1"), "{raw}");
    }

    #[tokio::test]
    async fn test_post_json_body_reaches_server() {
        let (listener, base) = bind().await;
        let server = serve_once(listener, "200 OK", r#"{"access":"A2"}"#);
        let transport = ReqwestTransport::new(&base).unwrap();

        let request =
            ApiRequest::post("auth/refresh/").json_body(br#"{"refresh":"R1"}"#.to_vec());
        let response = transport.send(&request).await.unwrap();

        assert!(response.is_success());
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/auth/refresh/ HTTP/1.1"), "{raw}");
        assert!(raw.to_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"refresh":"R1"}"#), "{raw}");
    }

    #[tokio::test]
    async fn test_unauthorized_status_is_a_response_not_an_error() {
        let (listener, base) = bind().await;
        let server = serve_once(
            listener,
            "401 Unauthorized",
            r#"{"detail":"Token is invalid or expired"}"#,
        );
        let transport = ReqwestTransport::new(&base).unwrap();

        let response = transport
            .send(&ApiRequest::get("/auth/profile/"))
            .await
            .expect("a 401 is still a response");

        assert!(response.is_unauthorized());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_multipart_body_carries_fields_and_file() {
        let (listener, base) = bind().await;
        let server = serve_once(listener, "201 Created", r#"{"id":9}"#);
        let transport = ReqwestTransport::new(&base).unwrap();

        let request = ApiRequest::post("/events/create/").multipart(vec![
            FormPart::text("title", "RustConf"),
            FormPart::File {
                name: "banner_image".into(),
                file_name: "banner.png".into(),
                content_type: Some("image/png".into()),
                data: b"PNGDATA".to_vec(),
            },
        ]);
        let response = transport.send(&request).await.unwrap();

        assert_eq!(response.status(), 201);
        let raw = server.await.unwrap();
        assert!(raw.to_lowercase().contains("multipart/form-data; boundary="));
        assert!(raw.contains("name=\"title\""));
        assert!(raw.contains("RustConf"));
        assert!(raw.contains("filename=\"banner.png\""));
        assert!(raw.contains("PNGDATA"));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connect_error() {
        // Bind to learn a free port, then close it so nothing listens there.
        let (listener, base) = bind().await;
        drop(listener);
        let transport = ReqwestTransport::new(&base).unwrap();

        let result = transport.send(&ApiRequest::get("/events/")).await;

        assert!(
            matches!(result, Err(TransportError::Connect(_))),
            "got {result:?}"
        );
    }
}
