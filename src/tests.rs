//! Crate-level tests: stubbed dispatch end to end.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;

use crate::{
    ApiError, BodyPart, ClassifiedError, EndPoint, ErrorClassifier, HttpHeaders, HttpMethod, MultipartFormData,
    NetworkError, NotFoundKind, ParameterEncoding, Parameters, Provider, StubBehavior, StubResponse, TargetType,
    TaskType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Challenge {
    id: u64,
    title: String,
    tags: Vec<String>,
}

fn sample() -> Challenge {
    Challenge {
        id: 42,
        title: "Morning run".to_string(),
        tags: vec!["health".to_string(), "daily".to_string()],
    }
}

enum ChallengeApi {
    Detail { stub: StubResponse },
    Create(Challenge),
    Search(Parameters),
    Upload(MultipartFormData),
}

impl TargetType for ChallengeApi {
    fn base_url(&self) -> String {
        "https://api.example.com/v1".to_string()
    }

    fn path(&self) -> String {
        match self {
            ChallengeApi::Detail { .. } => "challenges/42".to_string(),
            ChallengeApi::Create(_) | ChallengeApi::Search(_) => "challenges".to_string(),
            ChallengeApi::Upload(_) => "challenges/42/certifications".to_string(),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            ChallengeApi::Detail { .. } | ChallengeApi::Search(_) => HttpMethod::Get,
            ChallengeApi::Create(_) | ChallengeApi::Upload(_) => HttpMethod::Post,
        }
    }

    fn task(&self) -> TaskType {
        match self {
            ChallengeApi::Detail { .. } => TaskType::Plain,
            ChallengeApi::Create(challenge) => TaskType::json(challenge.clone()),
            ChallengeApi::Search(params) => TaskType::Parameters(params.clone(), ParameterEncoding::QueryString),
            ChallengeApi::Upload(form) => TaskType::Multipart(form.clone()),
        }
    }

    fn headers(&self) -> HttpHeaders {
        HttpHeaders::new().with("Accept", "application/json")
    }

    fn stub_response(&self) -> StubResponse {
        match self {
            ChallengeApi::Detail { stub } => stub.clone(),
            ChallengeApi::Create(challenge) => {
                StubResponse::with_status(201, serde_json::to_vec(challenge).unwrap_or_default())
            }
            _ => StubResponse::ok(serde_json::to_vec(&sample()).unwrap_or_default()),
        }
    }
}

fn detail(stub: StubResponse) -> ChallengeApi {
    ChallengeApi::Detail { stub }
}

fn sample_stub() -> StubResponse {
    StubResponse::ok(serde_json::to_vec(&sample()).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_immediate_stub_has_no_delay() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let start = Instant::now();
    let response = provider
        .request::<_, Challenge>(&detail(sample_stub().with_message("cached")))
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(response.data, sample());
    assert_eq!(response.status_code, 200);
    assert_eq!(response.message.as_deref(), Some("cached"));
    assert!(response.response.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_stub_waits() {
    let provider = Provider::stubbed(StubBehavior::Delayed(Duration::from_secs(2)));
    let start = Instant::now();
    let response = provider.request::<_, Challenge>(&detail(sample_stub())).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(response.data, sample());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_stubs_run_concurrently() {
    let provider = Provider::stubbed(StubBehavior::delayed_secs(3.0));
    let targets: Vec<ChallengeApi> = (0..8).map(|_| detail(sample_stub())).collect();
    let start = Instant::now();
    let results = futures::future::join_all(targets.iter().map(|t| provider.request::<_, Challenge>(t))).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(6));
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn test_stub_failure_is_returned() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let err = provider
        .request::<_, Challenge>(&detail(StubResponse::failure(NetworkError::Timeout("stubbed".into()))))
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::Timeout("stubbed".into()));
}

#[tokio::test]
async fn test_malformed_stub_fails_decoding() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let err = provider
        .request::<_, Challenge>(&detail(StubResponse::ok(r#"{"id": "not a number"}"#)))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::Decoding(_)));
}

#[tokio::test]
async fn test_json_round_trip_through_stub() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let response = provider
        .request::<_, Challenge>(&ChallengeApi::Create(sample()))
        .await
        .unwrap();
    assert_eq!(response.status_code, 201);
    assert_eq!(response.status_text.as_deref(), Some("Created"));
    assert_eq!(response.data, sample());
}

#[test]
fn test_json_encodable_round_trip() {
    let request = EndPoint::from_target(&ChallengeApi::Create(sample()))
        .url_request()
        .unwrap();
    let decoded: Challenge = crate::client::decode_body(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(decoded, sample());
}

#[tokio::test]
async fn test_encoding_failure_surfaces_before_stub() {
    struct Broken;

    impl TargetType for Broken {
        fn base_url(&self) -> String {
            "https://api.example.com".to_string()
        }
        fn path(&self) -> String {
            "broken".to_string()
        }
        fn method(&self) -> HttpMethod {
            HttpMethod::Post
        }
        fn task(&self) -> TaskType {
            let mut map = HashMap::new();
            map.insert((1, 2), "x");
            TaskType::json(map)
        }
    }

    let provider = Provider::stubbed(StubBehavior::Immediate);
    let err = provider.request::<_, ()>(&Broken).await.unwrap_err();
    assert!(matches!(err, NetworkError::Encoding(_)));
}

#[tokio::test]
async fn test_classified_not_found_from_stub() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let stub = StubResponse::with_status(404, r#"{"code": "CHALLENGE_NOT_FOUND", "message": "deleted"}"#);
    let err = provider
        .request_classified::<_, Challenge>(&detail(stub), &ErrorClassifier::default())
        .await
        .unwrap_err();
    assert_eq!(err, ClassifiedError::Api(ApiError::NotFound(NotFoundKind::Challenge)));
}

#[tokio::test]
async fn test_classified_unknown_code_keeps_fields() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let stub = StubResponse::with_status(404, r#"{"code": "BADGE_NOT_FOUND", "message": "no badge"}"#);
    let err = provider
        .request_classified::<_, Challenge>(&detail(stub), &ErrorClassifier::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClassifiedError::Api(ApiError::ClientError {
            code: Some("BADGE_NOT_FOUND".into()),
            message: Some("no badge".into()),
        })
    );
}

#[tokio::test]
async fn test_classified_interceptor_stub_failure_is_auth() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let stub = StubResponse::failure(NetworkError::Interceptor("refresh token expired".into()));
    let err = provider
        .request_classified::<_, Challenge>(&detail(stub), &ErrorClassifier::default())
        .await
        .unwrap_err();
    assert_eq!(err, ClassifiedError::Api(ApiError::AuthenticationFailed));
}

#[tokio::test]
async fn test_classified_success_decodes() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let response = provider
        .request_classified::<_, Challenge>(&detail(sample_stub()), &ErrorClassifier::default())
        .await
        .unwrap();
    assert_eq!(response.data, sample());
}

#[tokio::test]
async fn test_classified_decode_failure_stays_network() {
    let provider = Provider::stubbed(StubBehavior::Immediate);
    let err = provider
        .request_classified::<_, Challenge>(&detail(StubResponse::ok("[]")), &ErrorClassifier::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifiedError::Network(NetworkError::Decoding(_))));
}

#[test]
fn test_every_query_key_appears_once() {
    let inputs = [
        json!({"q": "run"}),
        json!({"q": "a b", "page": 1, "size": 20}),
        json!({"name": "Jo & Co", "emoji": "🏃", "flag": true, "ratio": 0.5}),
        json!({"path/like": "x=y", "k?": "v#"}),
    ];
    for input in inputs {
        let params: Parameters = serde_json::from_value(input).unwrap();
        let request = EndPoint::from_target(&ChallengeApi::Search(params.clone()))
            .url_request()
            .unwrap();
        let query = request.url.query().unwrap();
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        for key in params.keys() {
            assert_eq!(pairs.iter().filter(|(k, _)| k == key).count(), 1, "key {}", key);
        }
        assert_eq!(pairs.len(), params.len());
        assert!(!query.contains(' '));
        assert!(!query.contains('#'));
    }
}

#[tokio::test]
async fn test_multipart_target_through_stub() {
    let form = MultipartFormData::new()
        .part(BodyPart::parameters([("comment", "done!")]))
        .part(
            BodyPart::data([("image", Bytes::from_static(b"\xff\xd8\xff"))])
                .with_mime_type("image/jpeg")
                .with_file_extension("jpg"),
        );
    let boundary = form.boundary().to_string();
    let target = ChallengeApi::Upload(form);

    let request = EndPoint::from_target(&target).url_request().unwrap();
    assert_eq!(
        request.headers.get("Content-Type"),
        Some(format!("multipart/form-data; boundary={}", boundary).as_str())
    );
    let body = request.body.unwrap();
    assert!(body.starts_with(format!("--{}\r\n", boundary).as_bytes()));
    assert!(body.ends_with(format!("\r\n--{}--\r\n", boundary).as_bytes()));

    let provider = Provider::stubbed(StubBehavior::Immediate);
    assert!(provider.request::<_, Challenge>(&target).await.is_ok());
}
