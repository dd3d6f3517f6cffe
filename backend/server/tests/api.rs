use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{
    app,
    config::{Backend, Config},
    state::State,
};
use tower::ServiceExt;

fn router(config: Config) -> Router {
    app(State::new(config).unwrap())
}

fn memory_router() -> Router {
    router(Config::default())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn save(router: &Router, player: &str, score: i64) -> (StatusCode, Value) {
    send(
        router,
        Method::POST,
        "/save-score",
        Some(json!({"player": player, "score": score})),
    )
    .await
}

#[tokio::test]
async fn test_empty_leaderboard() {
    let router = memory_router();

    let (status, body) = send(&router, Method::GET, "/leaderboard", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["leaderboard"], json!([]));
}

#[tokio::test]
async fn test_save_then_read() {
    let router = memory_router();

    for (player, score) in [("Alice", 10), ("Bob", 20), ("Carol", 15)] {
        let (status, body) = save(&router, player, score).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert!(body["score"].is_u64());
    }

    let (status, body) = send(&router, Method::GET, "/leaderboard?limit=3", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["leaderboard"],
        json!([
            {"rank": 1, "player": "Bob", "score": 20},
            {"rank": 2, "player": "Carol", "score": 15},
            {"rank": 3, "player": "Alice", "score": 10},
        ])
    );
}

#[tokio::test]
async fn test_default_limit_is_five() {
    let router = memory_router();
    for score in 0..8 {
        save(&router, "p", score).await;
    }

    for uri in ["/leaderboard", "/leaderboard?limit=0", "/leaderboard?limit=-2", "/leaderboard?limit=abc"] {
        let (status, body) = send(&router, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["leaderboard"].as_array().unwrap().len(), 5, "{uri}");
    }
}

#[tokio::test]
async fn test_rejects_bad_submissions() {
    let router = memory_router();

    let (status, body) = save(&router, "X", -1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&router, Method::POST, "/save-score", Some(json!({"player": "X"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::POST, "/save-score", Some(json!({"score": 4}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = save(&router, "X", 1 << 60).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Score is too large");

    let long = "x".repeat(256);
    let (status, _) = save(&router, &long, 4).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&router, Method::GET, "/leaderboard/count", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_blank_player_is_anonymous() {
    let router = memory_router();
    save(&router, "  ", 3).await;

    let (_, body) = send(&router, Method::GET, "/leaderboard", None).await;

    assert_eq!(body["leaderboard"][0]["player"], "Anonymous");
}

#[tokio::test]
async fn test_player_rank() {
    let router = memory_router();
    save(&router, "Alice", 10).await;
    save(&router, "Bob", 20).await;
    save(&router, "Alice", 30).await;

    let (status, body) = send(&router, Method::GET, "/leaderboard/rank/Alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rank"], 1);

    let (status, body) = send(&router, Method::GET, "/leaderboard/rank/Bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rank"], 2);

    let (status, body) = send(&router, Method::GET, "/leaderboard/rank/Zoe", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_clear_route_needs_admin_flag() {
    let router = memory_router();
    save(&router, "a", 1).await;

    let (status, _) = send(&router, Method::DELETE, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let admin = router_with(|config| config.admin_routes = true);
    save(&admin, "a", 1).await;

    let (status, _) = send(&admin, Method::DELETE, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&admin, Method::GET, "/leaderboard/count", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_redis_down_degrades() {
    let router = router_with(|config| {
        config.backend = Backend::Redis;
        config.redis_url = "redis://127.0.0.1:1".to_string();
        config.redis_timeout = std::time::Duration::from_millis(200);
    });

    let (status, body) = send(&router, Method::GET, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["leaderboard"], json!([]));

    let (status, body) = save(&router, "a", 1).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, _) = save(&router, "a", -1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn router_with(edit: impl FnOnce(&mut Config)) -> Router {
    let mut config = Config::default();
    edit(&mut config);

    router(config)
}
