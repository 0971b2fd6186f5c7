//! Car API Tests
//!
//! Drives the full router in-process:
//! - Create assigns fresh identifiers and answers 201
//! - Listing is capped at 10 and follows insertion order
//! - Partial updates keep unspecified fields
//! - Deleted cars stay gone

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use carlot::http_server::{CarsState, HttpServer, ServerConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn app() -> (Arc<CarsState>, Router) {
    let state = Arc::new(CarsState::new());
    let router = HttpServer::with_state(ServerConfig::default(), state.clone()).router();
    (state, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Extract the embedded `{"<id>": car}` list from a rendered page.
fn page_cars(html: &str) -> Vec<Value> {
    let start_tag = "<script type=\"application/json\" id=\"cars-data\">";
    let start = html.find(start_tag).unwrap() + start_tag.len();
    let end = start + html[start..].find("</script>").unwrap();
    serde_json::from_str::<Vec<Value>>(&html[start..end]).unwrap()
}

fn page_ids(html: &str) -> Vec<String> {
    page_cars(html)
        .iter()
        .map(|entry| entry.as_object().unwrap().keys().next().unwrap().clone())
        .collect()
}

async fn create(router: &Router, body: Value) -> StatusCode {
    send(router, Method::POST, "/cars", Some(body)).await.status()
}

// =============================================================================
// Root and Listing
// =============================================================================

/// Root redirects to the listing.
#[tokio::test]
async fn test_root_redirects_to_cars() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/", None).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/cars");
}

/// Empty store renders an empty listing.
#[tokio::test]
async fn test_empty_listing() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/cars", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<title>Home</title>"));
    assert!(page_cars(&html).is_empty());
}

/// Listing returns min(N, size) cars in insertion order, capped at 10.
#[tokio::test]
async fn test_listing_count_and_cap() {
    let (_state, router) = app();
    let cars: Vec<Value> = (0..12).map(|i| json!({"make": format!("Make{}", i)})).collect();
    assert_eq!(create(&router, Value::Array(cars)).await, StatusCode::CREATED);

    let html = body_text(send(&router, Method::GET, "/cars?number=3", None).await).await;
    assert_eq!(page_ids(&html), vec!["0", "1", "2"]);

    let html = body_text(send(&router, Method::GET, "/cars?number=50", None).await).await;
    assert_eq!(page_cars(&html).len(), 10);

    let html = body_text(send(&router, Method::GET, "/cars", None).await).await;
    assert_eq!(page_cars(&html).len(), 10);

    let html = body_text(send(&router, Method::GET, "/cars?number=0", None).await).await;
    assert!(page_cars(&html).is_empty());
}

/// A negative count drops that many cars from the end of the listing.
#[tokio::test]
async fn test_listing_negative_count() {
    let (_state, router) = app();
    let cars = json!([{"make": "a"}, {"make": "b"}, {"make": "c"}]);
    assert_eq!(create(&router, cars).await, StatusCode::CREATED);

    let html = body_text(send(&router, Method::GET, "/cars?number=-1", None).await).await;
    assert_eq!(page_ids(&html), vec!["0", "1"]);

    let html = body_text(send(&router, Method::GET, "/cars?number=-7", None).await).await;
    assert!(page_cars(&html).is_empty());
}

/// A non-integer count is a validation error.
#[tokio::test]
async fn test_listing_bad_number_is_validation_error() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/cars?number=abc", None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["code"], 422);
    assert_eq!(body["details"][0]["loc"], json!(["query", "number"]));
}

/// Listing passes the request line into the page.
#[tokio::test]
async fn test_listing_shows_request() {
    let (_state, router) = app();
    let html = body_text(send(&router, Method::GET, "/cars?number=2", None).await).await;
    assert!(html.contains("GET /cars"));
}

// =============================================================================
// Create
// =============================================================================

/// Worked example: first car on an empty store lands at identifier 0.
#[tokio::test]
async fn test_create_then_list_example() {
    let (state, router) = app();
    let status = create(&router, json!({"body_cars": [{"make": "Toyota", "year": 2020}], "min_id": 0})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(state.store.contains(0).unwrap());

    let html = body_text(send(&router, Method::GET, "/cars?number=1", None).await).await;
    let cars = page_cars(&html);
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["0"]["make"], "Toyota");
    assert_eq!(cars[0]["0"]["year"], 2020);
    assert_eq!(cars[0]["0"]["engine"], "V4");
}

/// Create responds with no body.
#[tokio::test]
async fn test_create_has_empty_body() {
    let (_state, router) = app();
    let response = send(&router, Method::POST, "/cars", Some(json!([{"make": "Kia"}]))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_text(response).await.is_empty());
}

/// Empty create payload is a bad request.
#[tokio::test]
async fn test_create_empty_is_bad_request() {
    let (_state, router) = app();
    let response = send(&router, Method::POST, "/cars", Some(json!([]))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["error"], "No cars to add");
}

/// Offset shifts the probe start, and occupied slots are skipped.
#[tokio::test]
async fn test_create_offset_and_probe() {
    let (state, router) = app();
    assert_eq!(create(&router, json!([{"make": "a"}])).await, StatusCode::CREATED);
    // size 1 + offset 2 = 3
    assert_eq!(
        create(&router, json!({"body_cars": [{"make": "b"}], "min_id": 2})).await,
        StatusCode::CREATED
    );
    // size 2 + offset 1 = 3, taken, so 4 then 5
    assert_eq!(
        create(&router, json!({"cars": [{"make": "c"}, {"make": "d"}], "min_id": 1})).await,
        StatusCode::CREATED
    );

    let ids: Vec<_> = state
        .store
        .list(usize::MAX)
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec![0, 3, 4, 5]);
}

/// Every created identifier is new.
#[tokio::test]
async fn test_created_ids_unique() {
    let (state, router) = app();
    for offset in [0, 0, 1, 0, 3, 0] {
        let body = json!({"body_cars": [{"make": "x"}, {"make": "y"}], "min_id": offset});
        assert_eq!(create(&router, body).await, StatusCode::CREATED);
    }

    let mut ids: Vec<_> = state
        .store
        .list(usize::MAX)
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids.len(), 12);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);
}

/// Year outside [1950, 2022] is rejected and nothing is inserted.
#[tokio::test]
async fn test_create_validation_failure() {
    let (state, router) = app();
    let response = send(
        &router,
        Method::POST,
        "/cars",
        Some(json!([{"make": "ok", "year": 2000}, {"year": 1900}])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["loc"], json!(["body", 1, "year"]));
    assert!(state.store.is_empty().unwrap());
}

// =============================================================================
// Get by ID
// =============================================================================

/// Existing car is rendered on its page.
#[tokio::test]
async fn test_get_car_renders_it() {
    let (_state, router) = app();
    create(&router, json!([{"make": "Toyota"}, {"make": "Honda"}])).await;

    let response = send(&router, Method::GET, "/cars/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert_eq!(page_ids(&html), vec!["1"]);
    assert!(html.contains("<dd>Honda</dd>"));
    assert!(!html.contains("<dd>Toyota</dd>"));
}

/// Missing car is a 404.
#[tokio::test]
async fn test_get_missing_car() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/cars/5", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], 404);
}

/// Identifiers above 1000 are rejected on the read path.
#[tokio::test]
async fn test_get_id_out_of_range() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/cars/1001", None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["details"][0]["loc"], json!(["path", "id"]));
}

// =============================================================================
// Update
// =============================================================================

/// Worked example: partial update keeps make, year and the default engine.
#[tokio::test]
async fn test_partial_update_example() {
    let (_state, router) = app();
    create(&router, json!([{"make": "Toyota", "year": 2020}])).await;

    let response = send(&router, Method::PUT, "/cars/0", Some(json!({"price": 15000}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let car = body_json(response).await;
    assert_eq!(car["make"], "Toyota");
    assert_eq!(car["year"], 2020);
    assert_eq!(car["price"], 15000.0);
    assert_eq!(car["engine"], "V4");
}

/// Full update replaces every field.
#[tokio::test]
async fn test_full_update() {
    let (state, router) = app();
    create(&router, json!([{"make": "Toyota", "year": 2020, "sold": ["a"]}])).await;

    let full = json!({
        "make": "Tesla",
        "model": "3",
        "year": 2021,
        "price": 40000.5,
        "engine": "electric",
        "autonomous": true,
        "sold": ["b", "c"]
    });
    let car = body_json(send(&router, Method::PUT, "/cars/0", Some(full.clone())).await).await;
    assert_eq!(car, full);
    assert_eq!(serde_json::to_value(state.store.get(0).unwrap()).unwrap(), full);
}

/// Update persists: a later read sees the merged record.
#[tokio::test]
async fn test_update_persists() {
    let (state, router) = app();
    create(&router, json!([{"make": "Toyota", "model": "Corolla"}])).await;
    send(&router, Method::PUT, "/cars/0", Some(json!({"model": null, "autonomous": false}))).await;

    let stored = state.store.get(0).unwrap();
    assert_eq!(stored.make.as_deref(), Some("Toyota"));
    assert_eq!(stored.model, None);
    assert_eq!(stored.autonomous, Some(false));
}

/// Updating a missing car is a 404.
#[tokio::test]
async fn test_update_missing() {
    let (_state, router) = app();
    let response = send(&router, Method::PUT, "/cars/3", Some(json!({"price": 1}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Invalid update leaves the stored car untouched.
#[tokio::test]
async fn test_update_validation_failure() {
    let (state, router) = app();
    create(&router, json!([{"make": "Toyota", "year": 2020}])).await;

    let response = send(&router, Method::PUT, "/cars/0", Some(json!({"year": 2030}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.store.get(0).unwrap().year, Some(2020));
}

// =============================================================================
// Delete
// =============================================================================

/// Delete removes the car; later get and delete are 404.
#[tokio::test]
async fn test_delete_then_missing() {
    let (_state, router) = app();
    create(&router, json!([{"make": "Toyota"}])).await;

    let response = send(&router, Method::DELETE, "/cars/0", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, Method::GET, "/cars/0", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&router, Method::DELETE, "/cars/0", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Deleted cars drop out of the listing.
#[tokio::test]
async fn test_delete_removes_from_listing() {
    let (_state, router) = app();
    create(&router, json!([{"make": "a"}, {"make": "b"}, {"make": "c"}])).await;
    send(&router, Method::DELETE, "/cars/1", None).await;

    let html = body_text(send(&router, Method::GET, "/cars", None).await).await;
    assert_eq!(page_ids(&html), vec!["0", "2"]);
}

// =============================================================================
// Static Assets
// =============================================================================

/// Files under the static directory are served at /static.
#[tokio::test]
async fn test_static_stylesheet() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/static/style.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("li.car"));
}

// =============================================================================
// Malformed Requests
// =============================================================================

async fn assert_validation_error(response: Response, loc: Value) {
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body = body_json(response).await;
    assert_eq!(body["code"], 422);
    assert_eq!(body["details"][0]["loc"], loc);
}

/// Negative and non-integer identifiers are rejected as JSON 422s.
#[tokio::test]
async fn test_bad_path_id_is_validation_error() {
    let (_state, router) = app();

    let response = send(&router, Method::GET, "/cars/-1", None).await;
    assert_validation_error(response, json!(["path", "id"])).await;

    let response = send(&router, Method::GET, "/cars/abc", None).await;
    assert_validation_error(response, json!(["path", "id"])).await;

    let response = send(&router, Method::PUT, "/cars/x", Some(json!({"price": 1}))).await;
    assert_validation_error(response, json!(["path", "id"])).await;

    let response = send(&router, Method::DELETE, "/cars/-3", None).await;
    assert_validation_error(response, json!(["path", "id"])).await;
}

/// A body that is not JSON is rejected as a JSON 422.
#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let (state, router) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/cars")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_validation_error(response, json!(["body"])).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/cars")
        .body(Body::from("[{\"make\": \"a\"}]"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_validation_error(response, json!(["body"])).await;

    assert!(state.store.is_empty().unwrap());
}

// =============================================================================
// Observability
// =============================================================================

/// Every response carries a request id.
#[tokio::test]
async fn test_request_id_header() {
    let (_state, router) = app();
    let response = send(&router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

/// Metrics reflect store mutations and rejected requests.
#[tokio::test]
async fn test_metrics_counters() {
    let (_state, router) = app();
    create(&router, json!([{"make": "a"}, {"make": "b"}])).await;
    send(&router, Method::DELETE, "/cars/0", None).await;
    send(&router, Method::DELETE, "/cars/0", None).await;
    create(&router, json!([])).await;

    let metrics = body_json(send(&router, Method::GET, "/observability/metrics", None).await).await;
    assert_eq!(metrics["cars_created"], 2);
    assert_eq!(metrics["cars_deleted"], 1);
    assert_eq!(metrics["cars"], 1);
    assert_eq!(metrics["not_found"], 1);
    assert_eq!(metrics["rejected"], 1);
    // two creates, two deletes and the metrics request itself
    assert_eq!(metrics["requests"], 5);
}
