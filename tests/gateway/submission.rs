use adoptar::Config;
use adoptar::config::LimitsConfig;
use adoptar::error::MailError;
use adoptar::gateway::{SubmissionResponse, serve, state_with_transport};
use adoptar::mail::{MailTransport, OutgoingMessage};
use lopdf::Document;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct CountingTransport {
    fail_verify: bool,
    verify_calls: AtomicUsize,
    send_calls: AtomicUsize,
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl CountingTransport {
    fn unreachable() -> Self {
        Self {
            fail_verify: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailTransport for CountingTransport {
    fn name(&self) -> &str {
        "counting"
    }

    fn verify<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
        Box::pin(async move {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_verify {
                Err(MailError::Unavailable("connection refused".into()))
            } else {
                Ok(())
            }
        })
    }

    fn send<'a>(
        &'a self,
        message: &'a OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
        Box::pin(async move {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        })
    }
}

struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(config: Config, transport: Arc<CountingTransport>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let state = state_with_transport(&config, transport);
        let handle = tokio::spawn(async move { serve(listener, state, &[]).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    async fn submit(&self, form: Form) -> (StatusCode, SubmissionResponse) {
        let response = reqwest::Client::new()
            .post(self.url("/api/adoptar"))
            .multipart(form)
            .send()
            .await
            .expect("submission request should complete");
        let status = response.status();
        let body = response
            .json::<SubmissionResponse>()
            .await
            .expect("gateway should answer with a submission response");
        (status, body)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

fn configured() -> Config {
    let mut config = Config::default();
    config.smtp.user = Some("formularios@refugio.com".into());
    config.smtp.pass = Some("app-password".into());
    config
}

fn answers_form(full_name: &str) -> Form {
    Form::new()
        .text("fullName", full_name.to_string())
        .text("email", "juana@example.com")
        .text("phone", "351 555 0101")
        .text("city", "Córdoba")
        .text("q9", "Queremos darle un hogar.")
}

fn photo(index: usize, name: &str, bytes: Vec<u8>) -> (String, Part) {
    let part = Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("image/jpeg")
        .expect("static mime should parse");
    (format!("file_{index}"), part)
}

fn attachment_names(message: &OutgoingMessage) -> Vec<&str> {
    message
        .attachments
        .iter()
        .map(|a| a.filename.as_str())
        .collect()
}

#[tokio::test]
async fn single_photo_submission_is_delivered_with_expected_attachments() {
    let transport = Arc::new(CountingTransport::default());
    let server = GatewayTestServer::start(configured(), Arc::clone(&transport)).await;

    let (name, part) = photo(0, "patio.png", b"fake-photo".to_vec());
    let form = answers_form("Juana Pérez")
        .text("q24", "Archivos adjuntos")
        .part(name, part)
        .text("fileCount", "1");

    let (status, body) = server.submit(form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success, "{body:?}");
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.send_calls.load(Ordering::SeqCst), 1);

    let sent = transport.sent();
    let message = &sent[0];
    assert_eq!(
        attachment_names(message),
        [
            "formulario-preadopcion-Juana-Pérez.pdf",
            "foto-1-Juana-Pérez.png"
        ]
    );
    assert_eq!(
        message.subject,
        "Nuevo Formulario de Preadopción - Juana Pérez"
    );
    assert!(message.html_body.contains("Se adjuntan 1 foto(s)"));

    let pdf = Document::load_mem(&message.attachments[0].content).expect("attachment is a PDF");
    assert!(!pdf.get_pages().is_empty());
}

#[tokio::test]
async fn malformed_file_part_is_dropped_and_file_count_ignored() {
    let transport = Arc::new(CountingTransport::default());
    let server = GatewayTestServer::start(configured(), Arc::clone(&transport)).await;

    let mut form = answers_form("Juana Pérez");
    for index in 0..3 {
        let (name, part) = photo(index, &format!("foto{index}.jpg"), vec![0xFF, 0xD8, 0xFF]);
        form = form.part(name, part);
    }
    let form = form
        .text("file_3", "esto no es un archivo")
        .text("fileCount", "3");

    let (status, body) = server.submit(form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success, "{body:?}");
    let sent = transport.sent();
    assert_eq!(sent[0].attachments.len(), 4);
    assert!(sent[0].html_body.contains("Se adjuntan 3 foto(s)"));
}

#[tokio::test]
async fn unreadable_file_among_five_is_skipped() {
    let transport = Arc::new(CountingTransport::default());
    let server = GatewayTestServer::start(configured(), Arc::clone(&transport)).await;

    let mut form = answers_form("Ana");
    for index in [0, 1, 3, 4] {
        let (name, part) = photo(index, &format!("foto{index}.jpg"), vec![0xFF, 0xD8, 0xFF]);
        form = form.part(name, part);
    }
    let form = form
        .text("file_2", r#"{"name":"remota.jpg","size":2048}"#)
        .text("fileCount", "5");

    let (status, body) = server.submit(form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success, "{body:?}");
    let sent = transport.sent();
    let names = attachment_names(&sent[0]);
    assert_eq!(names.len(), 5);
    assert_eq!(names[0], "formulario-preadopcion-Ana.pdf");
    assert!(!names.iter().any(|n| n.starts_with("foto-5-")));
}

#[tokio::test]
async fn aggregate_over_the_ceiling_fails_before_delivery() {
    let transport = Arc::new(CountingTransport::default());
    let mut config = configured();
    config.limits = LimitsConfig {
        max_total_size: 1024,
        ..LimitsConfig::default()
    };
    let server = GatewayTestServer::start(config, Arc::clone(&transport)).await;

    let (name, part) = photo(0, "grande.jpg", vec![0; 2048]);
    let (status, body) = server
        .submit(answers_form("Juana Pérez").part(name, part))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.success);
    assert!(
        body.message.starts_with("Total file size too large"),
        "{body:?}"
    );
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verification_failure_never_sends() {
    let transport = Arc::new(CountingTransport::unreachable());
    let server = GatewayTestServer::start(configured(), Arc::clone(&transport)).await;

    let (status, body) = server.submit(answers_form("Juana Pérez")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.success);
    assert!(body.error.is_some());
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.send_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credentials_answer_500() {
    let transport = Arc::new(CountingTransport::default());
    let server = GatewayTestServer::start(Config::default(), Arc::clone(&transport)).await;

    let health: serde_json::Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["mail_configured"], false);

    let (status, body) = server.submit(answers_form("Juana Pérez")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.success);
    assert!(body.message.contains("environment variable is not set"));
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 0);
}
