use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, ServerState};
use service::{catalogue::CatalogueService, storage::catalogue_store::CatalogueStore};

fn cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

struct TestApp {
    base_url: String,
    uploads_dir: PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Isolated temp catalogue + uploads per test run
    let temp_id = Uuid::new_v4();
    let catalogue_path = format!("target/test-data/{}/products.json", temp_id);
    let uploads_dir = PathBuf::from(format!("target/test-data/{}/uploads", temp_id));
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let store = CatalogueStore::new(&catalogue_path).await?;
    let state = ServerState {
        catalogue: CatalogueService::new(store, &uploads_dir),
        uploads_dir: uploads_dir.clone(),
        public_base_url: base_url.clone(),
    };
    let app: Router = routes::build_router(state, cors());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, uploads_dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn upload(app: &TestApp, pid: &str, file_name: &str, bytes: &[u8]) -> anyhow::Result<Value> {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new()
        .text("pid", pid.to_string())
        .part("image", part);
    let res = client()
        .post(format!("{}/upload", app.base_url))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(res.json().await?)
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_search_filters_seeded_catalogue() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = client()
        .post(format!("{}/search", app.base_url))
        .json(&json!({ "pids": ["491772", "999999"] }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    let products = body.as_array().expect("array body");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["pid"], "491772");
    assert_eq!(products[0]["name"], "Big Cap");
    assert!(products[0]["image"].is_null());

    // omitting pids entirely is an empty set, not an error
    let res = client()
        .post(format!("{}/search", app.base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?.as_array().map(|a| a.len()), Some(0));

    Ok(())
}

#[tokio::test]
async fn e2e_upload_assign_serve_and_replace() -> anyhow::Result<()> {
    let app = start_server().await?;
    let png = b"\x89PNG\r\n\x1a\nfake-image-data";

    let ack = upload(&app, "491772", "cap.png", png).await?;
    assert_eq!(ack["message"], "Image assigned successfully");
    let filename = ack["filename"].as_str().expect("filename").to_string();
    assert!(filename.starts_with("491772_"));
    assert!(filename.ends_with(".png"));

    // search now carries the stored filename
    let res = client()
        .post(format!("{}/search", app.base_url))
        .json(&json!({ "pids": ["491772"] }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body[0]["image"], filename.as_str());

    // the image is retrievable by filename with an image content type
    let res = client()
        .get(format!("{}/images/{}", app.base_url, filename))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(res.bytes().await?.as_ref(), &png[..]);

    // replacing the image deletes the old file
    let ack2 = upload(&app, "491772", "cap-v2.png", png).await?;
    let filename2 = ack2["filename"].as_str().expect("filename").to_string();
    assert_ne!(filename, filename2);

    let res = client()
        .get(format!("{}/images/{}", app.base_url, filename))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert!(!app.uploads_dir.join(&filename).exists());

    let res = client()
        .get(format!("{}/images/{}", app.base_url, filename2))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn e2e_upload_for_unknown_pid_still_acks() -> anyhow::Result<()> {
    let app = start_server().await?;

    let ack = upload(&app, "999999", "ghost.png", b"bytes").await?;
    let filename = ack["filename"].as_str().expect("filename").to_string();

    // the orphan file exists and is even servable, but no product references it
    assert!(app.uploads_dir.join(&filename).exists());
    let res = client()
        .post(format!("{}/search", app.base_url))
        .json(&json!({ "pids": ["999999"] }))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?.as_array().map(|a| a.len()), Some(0));

    Ok(())
}

#[tokio::test]
async fn e2e_missing_image_field_is_a_client_error() -> anyhow::Result<()> {
    let app = start_server().await?;

    let form = reqwest::multipart::Form::new().text("pid", "491772");
    let res = client()
        .post(format!("{}/upload", app.base_url))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn e2e_unknown_image_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .get(format!("{}/images/nonexistent.png", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Image not found");
    Ok(())
}

#[tokio::test]
async fn e2e_compare_pair_lookup() -> anyhow::Result<()> {
    let app = start_server().await?;

    let ack = upload(&app, "491772", "cap.png", b"bytes").await?;
    let filename = ack["filename"].as_str().expect("filename").to_string();

    let res = client()
        .get(format!("{}/compare?pid1=491772&pid2=999999", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["product1"]["pid"], "491772");
    assert_eq!(
        body["product1"]["image_url"],
        format!("{}/images/{}", app.base_url, filename).as_str()
    );
    assert!(body["product2"].is_null());

    // a product without an image compares with a null image_url
    let res = client()
        .get(format!("{}/compare?pid1=444799&pid2=491772", app.base_url))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["product1"]["name"], "Long Bottle");
    assert!(body["product1"]["image_url"].is_null());

    // both pids are required
    let res = client()
        .get(format!("{}/compare?pid1=491772", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn e2e_unmatched_route_is_a_generic_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .get(format!("{}/definitely/not/a/route", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Not found");
    Ok(())
}
