mod common;

use serde_json::json;
use staymate_admin::api::{
    ApiError, AuthApi, KycReader, KycWriter, LocationReader, LocationWriter, QuestionReader,
    UserListQuery, UserReader,
};
use staymate_admin::domain::types::{KycId, LocationId};
use staymate_admin::domain::user::UserStatus;
use staymate_admin::forms::kyc::{RejectKycForm, RejectKycPayload};
use staymate_admin::forms::login::LoginForm;
use staymate_admin::services::notifications::Level;
use staymate_admin::session::Route;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/fakeauth"))
        .and(body_json(json!({"phoneNumber": "9999999999"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": "tok-1",
            "user": {"id": "admin-1", "phone": "9999999999"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kyc/stats"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"pending": 2}})))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, _notifier) = common::gate(None);
    let api = common::http_api(&server.uri(), &gate);

    let session = gate
        .login(
            &api,
            LoginForm {
                phone: "9999999999".into(),
            },
        )
        .await
        .unwrap();
    let stats = api.kyc_stats().await.unwrap();

    assert_eq!(session.token, "tok-1");
    assert_eq!(gate.route(), Route::Console);
    assert_eq!(stats["pending"], 2);
}

#[tokio::test]
async fn failed_login_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/fakeauth"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Unknown admin"})),
        )
        .mount(&server)
        .await;

    let (gate, notifier) = common::gate(None);
    let api = common::http_api(&server.uri(), &gate);

    let err = api
        .login(
            &staymate_admin::forms::login::LoginPayload::try_from(LoginForm {
                phone: "1234567890".into(),
            })
            .unwrap(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Rejected {
            status: 401,
            message: Some(ref m)
        } if m == "Unknown admin"
    ));
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn unauthorized_response_routes_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/users"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (gate, notifier) = common::gate(Some(common::session("stale")));
    let api = common::http_api(&server.uri(), &gate);
    assert_eq!(gate.route(), Route::Console);

    let err = api.list_users(UserListQuery::new()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(gate.route(), Route::Login);
    let shown = notifier.drain();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].level, Level::Warning);
}

#[tokio::test]
async fn user_filters_become_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/users"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .and(query_param("status", "FLAGGED"))
        .and(query_param("search", "asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "u1", "phone": "9000000001", "status": "FLAGGED"}],
            "pagination": {"total": 41}
        })))
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);

    let page = api
        .list_users(
            UserListQuery::new()
                .search("asha")
                .status(UserStatus::Flagged)
                .paginate(2, 20),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 41);
    assert_eq!(page.items[0].status, UserStatus::Flagged);
}

#[tokio::test]
async fn reject_sends_reason_and_surfaces_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/kyc/k1/reject"))
        .and(body_json(json!({"rejectionReason": "Blurry selfie"})))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "KYC already reviewed"})),
        )
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);
    let payload = RejectKycPayload::try_from(RejectKycForm {
        reason: " Blurry selfie ".into(),
    })
    .unwrap();

    let err = api
        .reject_kyc(&KycId::new("k1").unwrap(), &payload)
        .await
        .unwrap_err();

    assert_eq!(err.user_message("Failed to reject KYC"), "KYC already reviewed");
}

#[tokio::test]
async fn success_false_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/locations/l1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Location is locked"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations/l1/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "isInUse": true,
            "userCount": 3
        })))
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);
    let id = LocationId::new("l1").unwrap();

    let usage = api.location_usage(&id).await.unwrap();
    let err = api.delete_location(&id).await.unwrap_err();

    assert!(usage.is_in_use);
    assert_eq!(usage.user_count, 3);
    assert_eq!(err.user_message("Failed to delete location"), "Location is locked");
}

#[tokio::test]
async fn question_tree_is_flattened_with_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "categories": [
                {"name": "Lifestyle", "questions": [
                    {"id": "q1", "text": "Do you smoke?", "type": "RADIO", "order": 0,
                     "options": [{"id": "o1", "text": "Yes", "value": "yes"}]}
                ]},
                {"name": "Work", "questions": [
                    {"id": "q2", "text": "Occupation", "type": "TEXT", "order": 1}
                ]}
            ]
        })))
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);

    let questions = api.list_questions().await.unwrap();

    let categories: Vec<&str> = questions.iter().map(|q| q.category_name.as_str()).collect();
    assert_eq!(categories, vec!["Lifestyle", "Work"]);
    assert_eq!(questions[0].weight, 1.0);
}

#[tokio::test]
async fn approve_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/kyc/k9/approve"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);

    api.approve_kyc(&KycId::new("k9").unwrap()).await.unwrap();
}

#[tokio::test]
async fn missing_location_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);

    let err = api
        .get_location(&LocationId::new("gone").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound));
    assert_eq!(gate.route(), Route::Console);
}

#[tokio::test]
async fn toggle_sends_only_active_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/locations/l2"))
        .and(body_json(json!({"isActive": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (gate, _) = common::gate(Some(common::session("tok")));
    let api = common::http_api(&server.uri(), &gate);

    api.set_location_active(
        &LocationId::new("l2").unwrap(),
        staymate_admin::forms::location::LocationStatusPayload { is_active: false },
    )
    .await
    .unwrap();
}
