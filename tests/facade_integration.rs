mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, body_text, build_app, json_request, mock_sign_in, request, test_config};
use mockito::{Matcher, Server};
use onlyoffice_pipedrive::editor::{build_editor_key, EditorOpenRequest};
use onlyoffice_pipedrive::session::RefreshOutcome;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_is_always_ok() {
    let (app, _) = build_app(test_config("http://127.0.0.1:9"));
    let response = app
        .oneshot(request("/health", Method::GET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn session_reports_readiness_without_the_token() {
    let mut server = Server::new_async().await;
    let (me, crm_me) = mock_sign_in(&mut server).await;
    let (app, state) = build_app(test_config(&server.url()));

    let body = body_json(
        app.clone()
            .oneshot(request("/session", Method::GET))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["ready"], false);

    assert_eq!(state.session.tick().await, RefreshOutcome::Refreshed);
    me.assert_async().await;
    crm_me.assert_async().await;

    let body = body_json(app.oneshot(request("/session", Method::GET)).await.unwrap()).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["language"], "en");
    assert!(body.get("access_token").is_none());
}

#[tokio::test]
async fn rejected_integration_is_reported_as_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/me")
        .with_status(401)
        .create_async()
        .await;
    let (app, state) = build_app(test_config(&server.url()));

    assert_eq!(
        state.session.tick().await,
        RefreshOutcome::Failed { status: Some(401) }
    );
    assert_eq!(state.session.tick().await, RefreshOutcome::FailStopped);

    let body = body_json(app.oneshot(request("/session", Method::GET)).await.unwrap()).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["status"], 401);
    assert_eq!(body["failure"], "unauthorized");
}

#[tokio::test]
async fn formats_are_classified_case_insensitively() {
    let (app, _) = build_app(test_config("http://127.0.0.1:9"));
    let body = body_json(
        app.oneshot(request("/formats/Report.DOCX", Method::GET))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["extension"], "docx");
    assert_eq!(body["family"], "word");
    assert_eq!(body["viewable"], true);
    assert_eq!(body["editable"], true);
    assert_eq!(body["icon"], "docx");
    assert_eq!(body["icon_asset"], "docx.svg");
    assert_eq!(body["favicon"], "word");
    assert_eq!(body["favicon_asset"], "word.ico");
}

#[tokio::test]
async fn deal_files_come_with_editor_links() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    server
        .mock("GET", "/api/v1/deals/12/files")
        .match_header("authorization", "Bearer crm-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"success": true,
                "data": [
                    {"id": 5, "name": "report.docx", "file_size": 2048, "update_time": "2024-01-01 10:00:00"},
                    {"id": 6, "name": "archive.zip", "file_size": 10, "update_time": "2024-01-02 10:00:00"}
                ],
                "additional_data": {"pagination": {"start": 0, "limit": 2, "more_items_in_collection": true, "next_start": 2}}}"#,
        )
        .create_async()
        .await;

    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let response = app
        .oneshot(request("/deals/12/files?limit=2", Method::GET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["next_start"], 2);
    assert_eq!(body["pagination"]["more_items_in_collection"], true);

    let report = &body["files"][0];
    assert_eq!(report["id"], "5");
    assert_eq!(report["size"], "2 KB");
    assert_eq!(report["classification"]["viewable"], true);
    let url = report["editor_url"].as_str().unwrap();
    let opened = EditorOpenRequest::from_query(url, "1").unwrap();
    assert_eq!(opened.token, "signed-context");
    assert_eq!(opened.deal_id, "12");
    assert_eq!(opened.key, build_editor_key("5", "2024-01-01 10:00:00"));

    let archive = &body["files"][1];
    assert_eq!(archive["classification"]["viewable"], false);
    assert!(archive["editor_url"].is_null());
}

#[tokio::test]
async fn failing_listing_degrades_to_an_empty_page() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    server
        .mock("GET", "/api/v1/deals/12/files")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let response = app
        .oneshot(request("/deals/12/files", Method::GET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["files"], json!([]));
    assert_eq!(body["pagination"]["more_items_in_collection"], false);
    assert!(body["next_start"].is_null());
}

#[tokio::test]
async fn documents_are_created_and_linked() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    server
        .mock("POST", "/api/v1/files")
        .match_body(Matcher::Regex("Budget.xlsx".into()))
        .with_status(201)
        .with_body(
            r#"{"success": true, "data": {"id": 40, "deal_id": 12, "name": "Budget.xlsx",
                "update_time": "2024-05-05 09:00:00"}}"#,
        )
        .create_async()
        .await;

    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let response = app
        .oneshot(json_request(
            "/deals/12/documents",
            Method::POST,
            json!({"title": "Budget", "kind": "xlsx"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let opened = EditorOpenRequest::from_query(body["url"].as_str().unwrap(), "1").unwrap();
    assert_eq!(opened.id, "40");
    assert_eq!(opened.name, "Budget.xlsx");
}

#[tokio::test]
async fn over_long_titles_are_rejected() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let response = app
        .oneshot(json_request(
            "/deals/12/documents",
            Method::POST,
            json!({"title": "t".repeat(191), "kind": "docx"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editor_route_fetches_the_configuration() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/config")
        .match_header("x-pipedrive-app-context", "signed-context")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "5".into()),
            Matcher::UrlEncoded("deal_id".into(), "1".into()),
            Matcher::UrlEncoded("dark".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"document": {"fileType": "docx", "key": "k", "title": "report.docx", "url": "https://files/5"},
                "documentType": "word", "type": "desktop", "token": "jwt",
                "editorConfig": {"user": {"id": "1", "name": "Ann"}, "callbackUrl": "https://cb"}}"#,
        )
        .create_async()
        .await;

    let (app, _) = build_app(test_config(&server.url()));
    let response = app
        .oneshot(request(
            "/editor?token=signed-context&id=5&name=report.docx&key=k&dark=true",
            Method::GET,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["documentType"], "word");
    assert_eq!(body["document"]["key"], "k");
}

#[tokio::test]
async fn editor_route_requires_a_token() {
    let (app, _) = build_app(test_config("http://127.0.0.1:9"));
    let response = app
        .oneshot(request("/editor?id=5", Method::GET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_file_without_a_session_fails() {
    let (app, _) = build_app(test_config("http://127.0.0.1:9"));
    let response = app
        .oneshot(request("/files/5?name=a.docx", Method::DELETE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "session is not ready");
}

#[tokio::test]
async fn settings_round_trip_for_admins() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    server
        .mock("GET", "/api/settings")
        .with_status(200)
        .with_body(r#"{"doc_address": "https://docs.example.com/", "doc_secret": "s", "doc_header": "Authorization"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/settings")
        .with_status(200)
        .create_async()
        .await;

    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let body = body_json(
        app.clone()
            .oneshot(request("/settings", Method::GET))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["doc_header"], "Authorization");

    let response = app
        .oneshot(json_request(
            "/settings",
            Method::POST,
            json!({"doc_address": "https://docs.example.com", "doc_secret": "s", "doc_header": "Authorization"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["doc_address"], "https://docs.example.com/");
}

#[tokio::test]
async fn repeated_user_lookups_are_served_from_the_cache() {
    let mut server = Server::new_async().await;
    mock_sign_in(&mut server).await;
    let find = server
        .mock("GET", "/api/v1/users/find")
        .match_header("authorization", "Bearer crm-token")
        .match_query(Matcher::UrlEncoded("term".into(), "bob".into()))
        .with_status(200)
        .with_body(r#"{"success": true, "data": [{"id": 7, "name": "Bob", "email": "bob@example.com"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let (app, state) = build_app(test_config(&server.url()));
    state.session.tick().await;

    let first = body_json(
        app.clone()
            .oneshot(request("/users?term=bob", Method::GET))
            .await
            .unwrap(),
    )
    .await;
    let second = body_json(
        app.oneshot(request("/users?term=bob", Method::GET))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first[0]["name"], "Bob");
    assert_eq!(first, second);
    find.assert_async().await;
}

#[tokio::test]
async fn host_dialogs_are_driven_through_the_sdk() {
    let (app, _) = build_app(test_config("http://127.0.0.1:9"));

    let opened = app
        .clone()
        .oneshot(request("/dialogs/creation", Method::POST))
        .await
        .unwrap();
    assert_eq!(opened.status(), StatusCode::NO_CONTENT);

    let closed = app
        .clone()
        .oneshot(request("/dialogs", Method::DELETE))
        .await
        .unwrap();
    assert_eq!(closed.status(), StatusCode::NO_CONTENT);

    let resized = app
        .oneshot(json_request("/surface/size", Method::PUT, json!({"height": 0})))
        .await
        .unwrap();
    assert_eq!(resized.status(), StatusCode::BAD_REQUEST);
}
