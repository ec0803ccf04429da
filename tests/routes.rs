mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use lotto2d_lib::utils::today;
use lotto2d_lib::{IngestUseCase, LotteryStore, NumberStatUpdate, QueryUseCase, routes};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{ScriptedSource, broken_store, draw, live_payload, memory_store};

fn app(store: &Arc<dyn LotteryStore>, source: ScriptedSource) -> Router {
    let ingest = Arc::new(IngestUseCase::new(Arc::clone(store), Arc::new(source)));
    let queries = Arc::new(QueryUseCase::new(Arc::clone(store)));
    routes::router(ingest, queries)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn seed_stats(store: &Arc<dyn LotteryStore>) {
    for (number, occurrences) in [("10", 4), ("20", 7), ("30", 1)] {
        store
            .upsert_number_stat(NumberStatUpdate {
                number: number.to_string(),
                occurrences,
                last_seen: Utc::now(),
                frequency: format!("{}%", occurrences as f64 * 0.85),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_live_route_returns_fresh_payload() {
    let store = memory_store();
    let source = ScriptedSource {
        live: Some(live_payload("10")),
        today: Some(json!([
            {"set": "1,300.50", "value": "60,112.40", "open_time": "12:01:00", "twod": "02"}
        ])),
        ..Default::default()
    };

    let (status, json) = get(app(&store, source), "/api/lottery/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["live"]["twod"], "10");
    assert_eq!(json["live"]["time"], "16:31:58");
    assert_eq!(json["result"][0]["open_time"], "12:01:00");
    assert!(json.get("cached").is_none());
}

#[tokio::test]
async fn test_live_route_without_cache_is_500() {
    let store = memory_store();
    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/live").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch lottery data");
    assert_eq!(json["message"], "Unable to connect to lottery service");
}

#[tokio::test]
async fn test_live_route_flags_cached_data() {
    let store = memory_store();
    store
        .create_draw_result(draw(&today(), "16:31:58", "10"))
        .await
        .unwrap();

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cached"], true);
    assert_eq!(json["live"]["set"], "1,100.01");
}

#[tokio::test]
async fn test_results_and_history_routes_fail_without_cache() {
    let store = memory_store();

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/results").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["error"],
        "Failed to fetch results and no cached data available"
    );

    let (status, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/history/2024-03-01",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["error"],
        "Failed to fetch history and no cached data available"
    );
}

#[tokio::test]
async fn test_results_route_passes_upstream_through() {
    let store = memory_store();
    let payload = json!({"server_time": "2024-03-01 12:05:00", "result": [
        {"set": "1,300.50", "value": "60,112.40", "open_time": "12:01:00",
         "stock_date": "2024-03-01", "twod": "02"}
    ]});
    let source = ScriptedSource {
        results: Some(payload.clone()),
        ..Default::default()
    };

    let (status, json) = get(app(&store, source), "/api/lottery/results").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, payload);

    let (status, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/results/2024-03-01",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["openTime"], "12:01:00");
}

#[tokio::test]
async fn test_history_routes() {
    let store = memory_store();
    for date in ["2024-02-28", "2024-03-01", "2024-02-29"] {
        store
            .create_history_snapshot(date, json!({"result": []}))
            .await
            .unwrap();
    }

    let (status, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/history/2024-02-29",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"result": []}));

    let (status, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/recent-history/2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-02-29"]);

    let (_, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/recent-history/nope",
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_stats_routes() {
    let store = memory_store();
    seed_stats(&store).await;

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/stats/20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["occurrences"], 7);

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/stats/07").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"number": "07", "occurrences": 0, "lastSeen": null, "frequency": "0%"})
    );

    let (_, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/popular-numbers?limit=2",
    )
    .await;
    let numbers: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["20", "10"]);

    let (_, json) = get(
        app(&store, ScriptedSource::down()),
        "/api/lottery/popular-numbers",
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/all-stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let store = broken_store();

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/stats/07").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Failed to fetch number statistics"}));

    let (status, json) = get(app(&store, ScriptedSource::down()), "/api/lottery/all-stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch all statistics");

    let source = ScriptedSource {
        live: Some(live_payload("10")),
        today: Some(json!([])),
        ..Default::default()
    };
    let (status, json) = get(app(&store, source), "/api/lottery/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["live"]["twod"], "10");
}
