use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use sigma_auth::{ApiError, Credential, ProfileApi};
use sigma_client::HttpBackend;
use sigma_core::{FirebaseUid, RecruitmentId, UserRole};
use sigma_recruitment::{Profession, RecruitmentApi, RecruitmentRequest};

const TOKEN: &str = "good-token";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Clone, Default)]
struct Backend {
    attended: Arc<Mutex<Vec<String>>>,
    submitted: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn recruitment_json(id: &str, attended: bool) -> Value {
    json!({
        "id": id,
        "name": "Carla",
        "discord": "carla#1",
        "phone": "555",
        "profession": "EMS",
        "dni": "A-77",
        "motivation": "ayudar",
        "experience": "poca",
        "description": ["tranquila"],
        "attended": attended,
        "attended_by": if attended { json!("Dra. Ruiz") } else { Value::Null },
        "attended_at": if attended { json!("2024-06-02T09:00:00") } else { Value::Null },
        "created_at": "2024-06-01T18:30:00.250000"
    })
}

fn app(backend: Backend) -> Router {
    Router::new()
        .route(
            "/users/me",
            get(|headers: HeaderMap| async move {
                authorized(&headers)?;
                Ok::<_, StatusCode>(Json(json!({
                    "user_id": "u-1",
                    "firebase_uid": "fb-1",
                    "name": "Ana Ruiz",
                    "dni": "30111222",
                    "email": "ana@sigma.test",
                    "role": "doctor",
                    "enabled": true,
                    "is_admin": true,
                    "created_at": "2024-05-01T10:00:00Z",
                    "updated_at": "2024-05-02T10:00:00.123456"
                })))
            }),
        )
        .route(
            "/doctors/me",
            get(|headers: HeaderMap| async move {
                authorized(&headers)?;
                Ok::<_, StatusCode>(Json(json!({
                    "name": "Ana Ruiz",
                    "dni": "30111222",
                    "email": "ana@sigma.test",
                    "enabled": true,
                    "roles": ["recruiter"]
                })))
            }),
        )
        .route(
            "/police/me",
            get(|headers: HeaderMap| async move {
                authorized(&headers)?;
                Err::<Json<Value>, _>(StatusCode::NOT_FOUND)
            }),
        )
        .route(
            "/recruitment/",
            post(|State(backend): State<Backend>, Json(body): Json<Value>| async move {
                backend.submitted.lock().unwrap().push(body);
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "Solicitud de reclutamiento para EMS creada exitosamente",
                        "recruitment": recruitment_json("rec-1", false)
                    })),
                )
            }),
        )
        .route(
            "/recruitment/medical/pending",
            get(|headers: HeaderMap| async move {
                authorized(&headers)?;
                Ok::<_, StatusCode>(Json(json!([recruitment_json("rec-1", false)])))
            }),
        )
        .route(
            "/recruitment/medical/:id/attend",
            put(
                |State(backend): State<Backend>, Path(id): Path<String>, headers: HeaderMap| async move {
                    authorized(&headers)?;
                    if id != "rec-1" {
                        return Err(StatusCode::NOT_FOUND);
                    }
                    backend.attended.lock().unwrap().push(id.clone());
                    Ok(Json(json!({
                        "message": "Solicitud médica marcada como atendida exitosamente",
                        "recruitment": recruitment_json(&id, true)
                    })))
                },
            ),
        )
        .with_state(backend)
}

fn credential(token: &str) -> Credential {
    Credential::new(FirebaseUid::new("fb-1"), Some("ana@sigma.test".to_string()), token)
}

#[tokio::test]
async fn profile_endpoints_decode_backend_payloads() {
    let server = TestServer::spawn(app(Backend::default())).await;
    let backend = HttpBackend::new(&server.base_url);
    let cred = credential(TOKEN);

    let user = backend.current_user(&cred).await.unwrap();
    assert_eq!(user.role, UserRole::Doctor);
    assert!(user.is_admin);

    let doctor = backend.current_doctor(&cred).await.unwrap();
    assert!(!doctor.is_admin);
    assert_eq!(doctor.roles.len(), 1);

    assert_eq!(backend.current_police(&cred).await, Err(ApiError::NotFound));
}

#[tokio::test]
async fn rejected_token_maps_to_unauthorized() {
    let server = TestServer::spawn(app(Backend::default())).await;
    let backend = HttpBackend::new(format!("{}/", server.base_url));

    let err = backend.current_user(&credential("stale")).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized(401));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn recruitment_round_trip() {
    let state = Backend::default();
    let server = TestServer::spawn(app(state.clone())).await;
    let backend = HttpBackend::new(&server.base_url);
    let cred = credential(TOKEN);

    let request = RecruitmentRequest {
        name: "Carla".to_string(),
        discord: "carla#1".to_string(),
        phone: "555".to_string(),
        profession: Profession::Ems,
        dni: "A-77".to_string(),
        motivation: "ayudar".to_string(),
        experience: "poca".to_string(),
        description: vec!["tranquila".to_string()],
    };
    let created = backend.submit(&request).await.unwrap();
    assert_eq!(created.recruitment.id.as_str(), "rec-1");
    assert_eq!(state.submitted.lock().unwrap()[0]["profession"], "EMS");

    let pending = backend.pending_medical(&cred).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].attended);

    let attended = backend
        .mark_attended(&cred, &RecruitmentId::new("rec-1"))
        .await
        .unwrap();
    assert!(attended.recruitment.attended);
    assert_eq!(attended.recruitment.attended_by.as_deref(), Some("Dra. Ruiz"));
    assert_eq!(state.attended.lock().unwrap().as_slice(), ["rec-1".to_string()]);

    assert_eq!(
        backend.mark_attended(&cred, &RecruitmentId::new("missing")).await,
        Err(ApiError::NotFound)
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(format!("http://{addr}"));
    let err = backend.current_user(&credential(TOKEN)).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
