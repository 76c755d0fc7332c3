//! Integration tests for the SMS webhook.
//!
//! Each test points the providers at mockito servers, starts the Axum router
//! on a random port and posts provider-style forms to `/sms`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Mock, ServerGuard};
use tokio::net::TcpListener;
use tokio::time::timeout;

use repcall::channels::sms_routes;
use repcall::config::ServiceConfig;
use repcall::pipeline::processor::MessageProcessor;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const PLIVO_PATH: &str = "/v1/Account/MAID/Message/";

fn config_for(server: &ServerGuard) -> ServiceConfig {
    config_with_civic(server, server.url())
}

/// Like [`config_for`], but Civic Information lives at `civic_url`.
fn config_with_civic(server: &ServerGuard, civic_url: String) -> ServiceConfig {
    let url = server.url();
    let env = HashMap::from([
        ("GOOGLE_API_KEY", "g".to_string()),
        ("MAPQUEST_API_KEY", "mq".to_string()),
        ("OPENSTATES_API_KEY", "os".to_string()),
        ("PLIVO_AUTH_ID", "MAID".to_string()),
        ("PLIVO_AUTH_TOKEN", "tok".to_string()),
        ("REPCALL_OUTBOUND_NUMBERS", "15202002223".to_string()),
        ("REPCALL_HTTP_TIMEOUT_SECS", "2".to_string()),
        ("GOOGLE_BASE_URL", url.clone()),
        ("GOOGLE_CIVIC_BASE_URL", civic_url),
        ("MAPQUEST_BASE_URL", url.clone()),
        ("OPENSTATES_BASE_URL", url.clone()),
        ("PLIVO_BASE_URL", url),
    ]);
    ServiceConfig::from_lookup(|k| env.get(k).cloned()).expect("test config")
}

/// Start the webhook on a random port, return the base URL.
async fn start_server(config: &ServiceConfig) -> String {
    let processor = Arc::new(MessageProcessor::from_config(config).expect("processor"));
    let app = sms_routes(processor);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn post_form(base: &str, body: &str) -> reqwest::StatusCode {
    reqwest::Client::new()
        .post(format!("{base}/sms"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_string())
        .send()
        .await
        .expect("POST /sms")
        .status()
}

/// Poll until the mock has been hit.
async fn wait_for(mock: &Mock) {
    while !mock.matched_async().await {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn address_query_replies_with_federal_and_state_numbers() {
    timeout(TEST_TIMEOUT, async {
        let mut server = mockito::Server::new_async().await;
        let mut civic_server = mockito::Server::new_async().await;

        let _geocode = mock_json(
            &mut server,
            "/maps/api/geocode/json",
            r#"{"status": "OK", "results": [{
                "address_components": [{"long_name": "United States", "short_name": "US", "types": ["country"]}],
                "geometry": {"location": {"lat": 37.54, "lng": -77.43}}
            }]}"#,
        )
        .await;
        let civic_on_geocoding_host = server
            .mock("GET", "/civicinfo/v2/representatives")
            .expect(0)
            .create_async()
            .await;
        let civic = mock_json(
            &mut civic_server,
            "/civicinfo/v2/representatives",
            r#"{
                "offices": [
                    {"levels": ["country"], "roles": ["legislatorUpperBody"], "officialIndices": [0]},
                    {"levels": ["country"], "roles": ["legislatorLowerBody"], "officialIndices": [1]}
                ],
                "officials": [
                    {"name": "Tim Kaine", "phones": ["(202) 224-4024"]},
                    {"name": "Jennifer McClellan", "phones": ["(202) 225-2815"]}
                ]
            }"#,
        )
        .await;
        let states = mock_json(
            &mut server,
            "/api/v1/legislators/geo/",
            r#"[{"chamber": "upper", "state": "va", "first_name": "Lamont", "last_name": "Bagby",
                 "offices": [{"phone": "804-698-7509"}]}]"#,
        )
        .await;
        let plivo = server
            .mock("POST", PLIVO_PATH)
            .match_body(Matcher::Regex(
                r"Senator Tim Kaine: 202-224-4024\\nRepresentative Jennifer McClellan: 202-225-2815\\nState Sen\. Lamont Bagby: 804-698-7509".into(),
            ))
            .with_status(202)
            .with_body(r#"{"message": "message(s) queued"}"#)
            .expect(1)
            .create_async()
            .await;

        let config = config_with_civic(&server, civic_server.url());
        let base = start_server(&config).await;
        let status = post_form(
            &base,
            "Text=1000+Bank+St+Richmond+VA+23219&From=15551234567&MessageUUID=m-1",
        )
        .await;

        assert_eq!(status, 200);
        wait_for(&plivo).await;
        plivo.assert_async().await;
        civic.assert_async().await;
        civic_on_geocoding_host.assert_async().await;
        states.assert_async().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn foreign_address_stops_before_civic_lookup() {
    timeout(TEST_TIMEOUT, async {
        let mut server = mockito::Server::new_async().await;

        let _geocode = mock_json(
            &mut server,
            "/maps/api/geocode/json",
            r#"{"status": "OK", "results": [{
                "address_components": [{"long_name": "United Kingdom", "short_name": "GB", "types": ["country"]}],
                "geometry": {"location": {"lat": 51.50, "lng": -0.12}}
            }]}"#,
        )
        .await;
        let mapquest = server
            .mock("GET", "/geocoding/v1/address")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let civic = server
            .mock("GET", "/civicinfo/v2/representatives")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let plivo = server
            .mock("POST", PLIVO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "text": "I'm sorry, I can't find that address within the U.S.",
            })))
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let base = start_server(&config_for(&server)).await;
        assert_eq!(
            post_form(&base, "Text=10+Downing+St+London&From=15551234567").await,
            200
        );

        wait_for(&plivo).await;
        plivo.assert_async().await;
        mapquest.assert_async().await;
        civic.assert_async().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn zip_without_representatives_suggests_a_street_address() {
    timeout(TEST_TIMEOUT, async {
        let mut server = mockito::Server::new_async().await;

        let _geocode = mock_json(
            &mut server,
            "/maps/api/geocode/json",
            r#"{"status": "OK", "results": [{
                "address_components": [{"long_name": "United States", "short_name": "US", "types": ["country"]}],
                "geometry": {"location": {"lat": 37.75, "lng": -122.41}}
            }]}"#,
        )
        .await;
        let _civic = server
            .mock("GET", "/civicinfo/v2/representatives")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 400, "message": "Failed to parse address"}}"#)
            .create_async()
            .await;
        let plivo = server
            .mock("POST", PLIVO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "text": "I'm sorry, sometimes zip code alone does not work. Try again with a postal address?",
            })))
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let base = start_server(&config_for(&server)).await;
        assert_eq!(post_form(&base, "Text=94110&From=15551234567").await, 200);

        wait_for(&plivo).await;
        plivo.assert_async().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn greeting_is_answered_without_lookups() {
    timeout(TEST_TIMEOUT, async {
        let mut server = mockito::Server::new_async().await;
        let geocode = server
            .mock("GET", "/maps/api/geocode/json")
            .expect(0)
            .create_async()
            .await;
        let plivo = server
            .mock("POST", PLIVO_PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "src": "15202002223",
                "dst": "15551234567",
                "text": "Hi! Text me a US postal address and I will send back phone numbers for your state and federal legislators.",
            })))
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let base = start_server(&config_for(&server)).await;
        assert_eq!(post_form(&base, "Text=Hi!&From=15551234567").await, 200);

        wait_for(&plivo).await;
        geocode.assert_async().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn debug_flag_suppresses_dispatch() {
    timeout(TEST_TIMEOUT, async {
        let mut server = mockito::Server::new_async().await;
        let plivo = server
            .mock("POST", PLIVO_PATH)
            .expect(0)
            .create_async()
            .await;

        let base = start_server(&config_for(&server)).await;
        assert_eq!(post_form(&base, "Text=thanks&From=15551234567&Debug=1").await, 200);

        tokio::time::sleep(Duration::from_millis(200)).await;
        plivo.assert_async().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_posts_are_still_acknowledged() {
    timeout(TEST_TIMEOUT, async {
        let server = mockito::Server::new_async().await;
        let base = start_server(&config_for(&server)).await;

        // No sender to reply to.
        assert_eq!(post_form(&base, "Text=20500").await, 200);

        // Not a form at all.
        let status = reqwest::Client::new()
            .post(format!("{base}/sms"))
            .header("content-type", "application/json")
            .body("{}")
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, 200);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let server = mockito::Server::new_async().await;
        let base = start_server(&config_for(&server)).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "ok");
    })
    .await
    .expect("test timed out");
}
