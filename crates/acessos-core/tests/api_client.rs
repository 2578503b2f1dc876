use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use acessos_core::api::{ApiBase, ApiClient, ApiError, AuthToken, LookupOutcome};
use acessos_core::auth::{AuthError, SessionController, SessionTransition};
use acessos_core::models::AgentDraft;

const ADMIN_TOKEN: &str = "header.payload.signature";

#[derive(Clone, Default)]
struct MockState {
    add_calls: Arc<AtomicUsize>,
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("admin"), Some("right")) => (StatusCode::OK, Json(json!({ "token": ADMIN_TOKEN }))),
        (Some("tokenless"), _) => (StatusCode::OK, Json(json!({ "message": "ok" }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Credenciais inválidas." })),
        ),
    }
}

async fn get_agent(Query(params): Query<std::collections::HashMap<String, String>>) -> (StatusCode, String) {
    match params.get("ramal").map(String::as_str) {
        Some("1234") => (
            StatusCode::OK,
            json!({
                "Ramal": 1234,
                "Nome": "João Silva",
                "Channels (Usuário)": "joao.ch",
                "Gestão (Usuário)": "joao.ge",
                "Blip (Usuário)": "joao.bl",
                "Email": "joao@empresa.com",
                "Senha (Unificada)": "abc123"
            })
            .to_string(),
        ),
        Some("5000") => (StatusCode::INTERNAL_SERVER_ERROR, r#"{"message": "Erro ao consultar dados do Airtable."}"#.to_string()),
        Some("6000") => (StatusCode::OK, "not json".to_string()),
        _ => (StatusCode::NOT_FOUND, r#"{"message": "Ramal não encontrado."}"#.to_string()),
    }
}

async fn add_agent(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.add_calls.fetch_add(1, Ordering::SeqCst);

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != format!("Bearer {}", ADMIN_TOKEN) {
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "Token inválido." })));
    }
    if body["Ramal"] == json!(1234) {
        return (StatusCode::CONFLICT, Json(json!({ "message": "Ramal já cadastrado." })));
    }
    if body["Ramal"] == json!(5000) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Erro ao salvar dados no Airtable." })),
        );
    }
    if body["Ramal"] == json!(5001) {
        return (StatusCode::BAD_GATEWAY, Json(json!({})));
    }
    if body["Senha (Unificada)"].as_str().unwrap_or_default().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({})));
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": format!("Agente (Ramal {}) criado com sucesso.", body["Ramal"]) })),
    )
}

// Start the mock credential API on an ephemeral localhost port.
// Returns (join_handle, client, state). Caller should abort the handle to stop the server.
async fn start_mock_api() -> (JoinHandle<()>, ApiClient, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/getAgent", get(get_agent))
        .route("/api/addAgent", post(add_agent))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("bind 127.0.0.1:0");
    let addr: SocketAddr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock api task error: {e:?}");
        }
    });

    let client = ApiClient::new(ApiBase::new(format!("http://{}/api", addr))).expect("client");
    (handle, client, state)
}

struct Guard(JoinHandle<()>);
impl Drop for Guard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn draft(extension: &str) -> AgentDraft {
    AgentDraft {
        extension: extension.to_string(),
        name: "Maria Souza".to_string(),
        channels_user: "maria.ch".to_string(),
        gestao_user: "maria.ge".to_string(),
        blip_user: "maria.bl".to_string(),
        email: "maria@empresa.com".to_string(),
        channels_pass: "s3nha".to_string(),
        gestao_pass: "s3nha".to_string(),
        blip_pass: "s3nha".to_string(),
    }
}

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    let token = api.login("admin", "right").await.expect("login");
    assert_eq!(token.as_str(), ADMIN_TOKEN);
}

#[tokio::test]
async fn login_failures_are_auth_failure() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    assert_eq!(api.login("admin", "wrong").await, Err(ApiError::AuthFailure));
    // 200 without a token is still a failed login
    assert_eq!(api.login("tokenless", "x").await, Err(ApiError::AuthFailure));
}

#[tokio::test]
async fn lookup_found() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    match api.lookup("1234").await.expect("lookup") {
        LookupOutcome::Found(record) => {
            assert_eq!(record.extension, 1234);
            assert_eq!(record.display_name, "João Silva");
            assert_eq!(record.unified_password, "abc123");
        }
        LookupOutcome::NotFound => panic!("expected a record"),
    }
}

#[tokio::test]
async fn lookup_404_is_not_found_not_error() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    assert_eq!(api.lookup("9999").await, Ok(LookupOutcome::NotFound));
}

#[tokio::test]
async fn lookup_server_failures_are_transient() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    assert!(matches!(api.lookup("5000").await, Err(ApiError::Transient(_))));
    assert!(matches!(api.lookup("6000").await, Err(ApiError::Transient(_))));
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    // Reserve a port and free it so nothing is listening there
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = ApiClient::new(ApiBase::new(format!("http://127.0.0.1:{}/api", port))).unwrap();
    assert!(matches!(api.lookup("1234").await, Err(ApiError::Transient(_))));
    assert!(matches!(api.login("admin", "right").await, Err(ApiError::Transient(_))));
}

#[tokio::test]
async fn add_record_with_token() {
    let (srv, api, state) = start_mock_api().await;
    let _g = Guard(srv);

    let token = api.login("admin", "right").await.unwrap();
    let record = draft("4321").validate().unwrap();
    api.add_record(&record, &token).await.expect("add");
    assert_eq!(state.add_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn add_record_errors_carry_server_message() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    let bad_token = AuthToken::new("forged").unwrap();
    let record = draft("4321").validate().unwrap();
    assert_eq!(
        api.add_record(&record, &bad_token).await,
        Err(ApiError::Authorization("Token inválido.".to_string()))
    );

    let token = api.login("admin", "right").await.unwrap();
    let duplicate = draft("1234").validate().unwrap();
    assert_eq!(
        api.add_record(&duplicate, &token).await,
        Err(ApiError::Validation("Ramal já cadastrado.".to_string()))
    );

    let mut empty_pass = draft("4322");
    empty_pass.channels_pass.clear();
    empty_pass.gestao_pass.clear();
    empty_pass.blip_pass.clear();
    let record = empty_pass.validate().unwrap();
    assert_eq!(
        api.add_record(&record, &token).await,
        Err(ApiError::Validation("Erro ao adicionar agente.".to_string()))
    );
}

#[tokio::test]
async fn add_record_server_failure_keeps_server_message() {
    let (srv, api, state) = start_mock_api().await;
    let _g = Guard(srv);

    let token = api.login("admin", "right").await.unwrap();

    let record = draft("5000").validate().unwrap();
    let err = api.add_record(&record, &token).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(err.user_message(), "Erro ao salvar dados no Airtable.");

    let record = draft("5001").validate().unwrap();
    let err = api.add_record(&record, &token).await.unwrap_err();
    assert_eq!(err.user_message(), "Erro ao adicionar agente.");

    assert_eq!(state.add_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_server() {
    let (srv, _api, state) = start_mock_api().await;
    let _g = Guard(srv);

    let mut d = draft("4321");
    d.channels_pass = "a".to_string();
    d.gestao_pass = "b".to_string();
    assert!(d.validate().is_err());
    assert_eq!(state.add_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_controller_against_live_client() {
    let (srv, api, _) = start_mock_api().await;
    let _g = Guard(srv);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = SessionController::new(tx);

    assert_eq!(
        session.login(&api, "admin", "wrong").await,
        Err(AuthError::InvalidCredentials)
    );
    assert!(!session.is_privileged());
    assert!(!session.has_timer());

    session.login(&api, "admin", "right").await.expect("login");
    assert!(session.is_privileged());
    assert!(session.has_timer());
    assert_eq!(rx.try_recv(), Ok(SessionTransition::EnteredPrivileged));
}
