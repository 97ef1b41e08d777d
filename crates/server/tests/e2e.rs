use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::storage::MemoryStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes;
use server::ServerState;

struct TestApp {
    base_url: String,
    store: Arc<MemoryStore>,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    server::observability::init_metrics();
    let store = Arc::new(MemoryStore::new());
    let app: Router = routes::build_router(ServerState::new(store.clone()), CorsLayer::very_permissive());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, store, client: reqwest::Client::new() })
}

fn jane() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@x.com",
        "phoneNumber": "1234567890",
        "address": "1 Main St"
    })
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "up");
    Ok(())
}

#[tokio::test]
async fn customer_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = &app.client;

    let res = c.post(app.url("/customers")).json(&jane()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["id"], "1");

    let list: Value = c.get(app.url("/customers")).send().await?.json().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["name"], "Jane Doe");
    assert_eq!(list[0]["phoneNumber"], "1234567890");

    let mut edited = jane();
    edited["address"] = json!("2 Side Rd");
    let res = c.put(app.url("/customers/1")).json(&edited).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let fetched: Value = c.get(app.url("/customers/1")).send().await?.json().await?;
    assert_eq!(fetched["address"], "2 Side Rd");

    let res = c
        .post(app.url("/customers/1/purchases"))
        .json(&json!({ "purchase": "Lamp" }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let with_purchase: Value = res.json().await?;
    assert_eq!(with_purchase["purchases"], json!(["Lamp"]));

    let res = c.delete(app.url("/customers/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(app.url("/customers/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_endpoints_accept_search_term() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = &app.client;
    c.post(app.url("/customers")).json(&jane()).send().await?;
    let mut bob = jane();
    bob["name"] = json!("Bob Stone");
    c.post(app.url("/customers")).json(&bob).send().await?;

    let found: Value = c.get(app.url("/customers?q=stone")).send().await?.json().await?;
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["name"], "Bob Stone");

    for address in ["9 Elm", "4 Oak Lane"] {
        c.post(app.url("/customers/1/orders"))
            .json(&json!({ "address": address, "items": "Widget", "orderDate": "2024-05-01" }))
            .send()
            .await?;
    }
    let orders: Value = c.get(app.url("/customers/1/orders?q=OAK")).send().await?.json().await?;
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
    assert_eq!(orders[0]["address"], "4 Oak Lane");

    let all: Value = c.get(app.url("/customers/1/orders")).send().await?.json().await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn invalid_customer_is_rejected_with_message() -> anyhow::Result<()> {
    let app = start_server().await?;
    let mut bad = jane();
    bad["phoneNumber"] = json!("12345");
    let res = app.client.post(app.url("/customers")).json(&bad).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));

    let list: Value = app.client.get(app.url("/customers")).send().await?.json().await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn updating_missing_customer_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.put(app.url("/customers/42")).json(&jane()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Customer with ID 42 does not exist.");
    Ok(())
}

#[tokio::test]
async fn order_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = &app.client;

    let res = c
        .post(app.url("/customers/3/orders"))
        .json(&json!({
            "address": "9 Elm",
            "items": "Widget\n\nGadget\n",
            "orderDate": "2024-05-01"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let order: Value = res.json().await?;
    assert_eq!(order["orderNumber"], "1");
    assert_eq!(order["customerId"], "3");
    assert_eq!(order["items"], json!(["Widget", "Gadget"]));
    assert_eq!(order["itemCount"], 2);
    assert_eq!(order["orderStatus"], "Pending");

    let res = c
        .put(app.url("/orders/1"))
        .json(&json!({
            "address": "9 Elm",
            "items": "Widget",
            "orderDate": "2024-05-02",
            "orderStatus": "Shipped"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let listed: Value = c.get(app.url("/customers/3/orders")).send().await?.json().await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["orderStatus"], "Shipped");
    assert_eq!(listed[0]["itemCount"], 1);
    assert_eq!(listed[0]["orderDate"], "2024-05-02");

    let other: Value = c.get(app.url("/customers/4/orders")).send().await?.json().await?;
    assert_eq!(other, json!([]));

    let res = c.delete(app.url("/orders/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let all: Value = c.get(app.url("/orders")).send().await?.json().await?;
    assert_eq!(all, json!([]));
    Ok(())
}

#[tokio::test]
async fn order_without_items_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app
        .client
        .post(app.url("/customers/1/orders"))
        .json(&json!({ "address": "9 Elm", "items": "  \n", "orderDate": "2024-05-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Items cannot be empty.");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_json_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app
        .client
        .post(app.url("/customers/1/orders"))
        .json(&json!({ "address": "9 Elm", "items": "Widget", "orderDate": "2024-13-45" }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));

    let res = app
        .client
        .post(app.url("/customers"))
        .json(&json!({ "email": "jane@x.com", "phoneNumber": "1234567890", "address": "1 Main St" }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation Error");

    let all: Value = app.client.get(app.url("/orders")).send().await?.json().await?;
    assert_eq!(all, json!([]));
    Ok(())
}

#[tokio::test]
async fn deleting_unknown_order_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.delete(app.url("/orders/5")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("does not exist")));
    Ok(())
}

#[tokio::test]
async fn store_outage_is_503() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.store.set_unavailable(true);

    let res = app.client.get(app.url("/customers")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Store Unavailable");

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::SERVICE_UNAVAILABLE);

    app.store.set_unavailable(false);
    let res = app.client.get(app.url("/customers")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed() -> anyhow::Result<()> {
    let app = start_server().await?;
    app.client.post(app.url("/customers")).json(&jane()).send().await?;
    let text = app.client.get(app.url("/metrics")).send().await?.text().await?;
    assert!(text.contains("customer_manager_customer_mutations_total"));
    assert!(text.contains("customer_manager_store_errors_total"));
    Ok(())
}
