//! Search and listing tests for `GET /documents`.

mod common;

use common::TestApp;
use reqwest::Client;

#[tokio::test]
async fn search_returns_documents_newest_first() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let oldest = app.seed_document("Oldest", "", None, None, 3600.0).await;
    let middle = app.seed_document("Middle", "", None, None, 1800.0).await;
    let newest = app.seed_document("Newest", "", None, None, 60.0).await;

    let response = client
        .get(format!("{}/documents", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let documents = body["documents"].as_array().expect("Missing documents");

    assert!(documents.len() <= 100);
    let ids: Vec<i64> = documents
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![newest, middle, oldest]);

    app.cleanup().await;
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    app.seed_document("Security Policy", "rules", None, None, 60.0)
        .await;
    app.seed_document("Handbook", "travel guidelines", None, None, 60.0)
        .await;
    app.seed_document("Unrelated", "nothing here", None, None, 60.0)
        .await;

    let response = client
        .get(format!("{}/documents?search=POLICY", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["title"], "Security Policy");

    // Description matches too
    let response = client
        .get(format!("{}/documents?search=Travel", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["title"], "Handbook");

    app.cleanup().await;
}

#[tokio::test]
async fn filters_are_conjunctive() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let hr = app.seed_department("HR", "Human Resources").await;
    let policy = app.seed_document_type("POLICY", "Policy").await;
    let guide = app.seed_document_type("GUIDE", "Guide").await;

    let wanted = app
        .seed_document("HR Policy", "", Some(hr), Some(policy), 60.0)
        .await;
    app.seed_document("HR Guide", "", Some(hr), Some(guide), 60.0)
        .await;
    app.seed_document("Floating doc", "", None, None, 60.0).await;

    let response = client
        .get(format!(
            "{}/documents?department=HR&type=POLICY",
            app.address
        ))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let documents = body["documents"].as_array().unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["id"].as_i64().unwrap(), wanted);
    assert_eq!(documents[0]["department"]["code"], "HR");
    assert_eq!(documents[0]["type"]["code"], "POLICY");

    app.cleanup().await;
}

#[tokio::test]
async fn empty_filter_parameters_are_ignored() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    app.seed_document("One", "", None, None, 60.0).await;
    app.seed_document("Two", "", None, None, 60.0).await;

    let response = client
        .get(format!(
            "{}/documents?search=&department=&type=",
            app.address
        ))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(body["documents"].as_array().unwrap().len(), 2);

    app.cleanup().await;
}

#[tokio::test]
async fn documents_without_lookups_have_null_nested_objects() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    app.seed_document("Plain", "no refs", None, None, 60.0).await;

    let response = client
        .get(format!("{}/documents", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let doc = &body["documents"][0];

    assert!(doc["department"].is_null());
    assert!(doc["type"].is_null());
    assert_eq!(doc["tags"], serde_json::json!([]));
    assert!(doc["updated_at"].is_string());

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_department_filter_matches_nothing() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    app.seed_document("One", "", None, None, 60.0).await;

    let response = client
        .get(format!("{}/documents?department=NOPE", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    assert_eq!(body["documents"].as_array().unwrap().len(), 0);

    app.cleanup().await;
}
