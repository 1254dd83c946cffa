//! Handler tests for the Products domain
//!
//! Multipart bodies are assembled by hand so the tests cover the same
//! parsing path a browser form or curl upload goes through.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_helpers::MAX_PAGE;
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const BOUNDARY: &str = "catalog-test-boundary";

fn app() -> (Router, InMemoryImageStorage) {
    let images = InMemoryImageStorage::new();
    let service = ProductService::new(InMemoryProductRepository::new(), Arc::new(images.clone()));
    (handlers::router(service), images)
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str),
}

fn multipart(method: &str, uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match part {
            Part::Text(name, value) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    name, value
                ));
            }
            Part::File(name, file_name) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                ));
                body.push_str("Content-Type: application/octet-stream\r\n\r\nfake-bytes\r\n");
            }
        }
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn product_parts<'a>(sku: &'a str, name: &'a str, image: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("sku", sku),
        Part::Text("name", name),
        Part::Text("quantity", "5"),
        Part::Text("price", "499.99"),
        Part::Text("description", "Demo product"),
        Part::File("image", image),
    ]
}

async fn create(app: &Router, sku: &str, name: &str) -> Value {
    let response = app
        .clone()
        .oneshot(multipart("POST", "/", &product_parts(sku, name, "photo.png")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response.into_body()).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_product_returns_row_with_image_path() {
    let (app, images) = app();

    let body = create(&app, "111", "Telefono").await;
    assert_eq!(body["sku"], 111);
    assert_eq!(body["name"], "Telefono");
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["price"], 499.99);

    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with("images/"));
    assert!(image.ends_with(".png"));
    assert!(images.contains(image).await);
}

#[tokio::test]
async fn test_create_rejects_disallowed_extension() {
    let (app, images) = app();

    let response = app
        .oneshot(multipart("POST", "/", &product_parts("111", "Telefono", "anim.gif")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["image"][0],
        "The image must be a file of type: pdf, jpg, png."
    );
    assert!(images.is_empty().await);
}

#[tokio::test]
async fn test_create_reports_every_missing_field() {
    let (app, _) = app();

    let response = app
        .oneshot(multipart("POST", "/", &[Part::Text("name", "Telefono")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    let details = body["details"].as_object().unwrap();
    for field in ["sku", "quantity", "price", "description", "image"] {
        assert!(details.contains_key(field), "missing {}", field);
    }
    assert!(!details.contains_key("name"));
}

#[tokio::test]
async fn test_create_rejects_non_numeric_sku() {
    let (app, _) = app();

    let response = app
        .oneshot(multipart("POST", "/", &product_parts("abc", "Telefono", "photo.jpg")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response.into_body()).await["details"]["sku"][0],
        "The sku must be an integer."
    );
}

#[tokio::test]
async fn test_create_without_multipart_body_is_bad_request() {
    let (app, _) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_by_name_and_sku() {
    let (app, _) = app();
    create(&app, "111", "Telefono").await;
    create(&app, "222", "Computadora").await;
    create(&app, "311", "Telefono fijo").await;

    let response = app.clone().oneshot(get("/search?name=Tele&sku=11")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Telefono"));
    assert!(names.contains(&"Telefono fijo"));

    let response = app.oneshot(get("/search")).await.unwrap();
    assert_eq!(json_body(response.into_body()).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_changes_only_sent_fields() {
    let (app, images) = app();
    let created = create(&app, "111", "Telefono").await;
    let id = created["id"].as_str().unwrap();
    let old_image = created["image"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(multipart(
            "POST",
            &format!("/{}", id),
            &[Part::Text("price", "10.5"), Part::File("image", "scan.pdf")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["name"], "Telefono");
    assert_eq!(body["sku"], 111);
    assert_eq!(body["price"], 10.5);
    let new_image = body["image"].as_str().unwrap();
    assert!(new_image.ends_with(".pdf"));
    assert!(images.contains(new_image).await);
    assert!(!images.contains(&old_image).await);
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let (app, _) = app();

    let response = app
        .oneshot(multipart(
            "POST",
            "/0190d7a4-1a2b-7c3d-8e4f-000000000000",
            &[Part::Text("name", "Ghost")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response.into_body()).await["message"], "Not Found");
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let (app, images) = app();
    let created = create(&app, "111", "Telefono").await;
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let delete = || Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(images.is_empty().await);

    let response = app.oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_malformed_id() {
    let (app, _) = app();

    let request = Request::builder()
        .method("DELETE")
        .uri("/not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_paginates_ten_per_page() {
    let (app, _) = app();
    for i in 0..12 {
        create(&app, &format!("{}", 100 + i), &format!("Product {}", i)).await;
    }

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["total"], 12);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["per_page"], 10);

    let response = app.clone().oneshot(get("/?page=2")).await.unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["next_page_url"], Value::Null);

    let response = app.oneshot(get("/?page=banana")).await.unwrap();
    assert_eq!(json_body(response.into_body()).await["current_page"], 1);
}

#[tokio::test]
async fn test_list_with_huge_page_number() {
    let (app, _) = app();
    create(&app, "111", "Telefono").await;

    let response = app
        .oneshot(get("/?page=18446744073709551615"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["current_page"], MAX_PAGE);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_search_with_empty_sku_filters_by_name_only() {
    let (app, _) = app();
    create(&app, "111", "Telefono").await;
    create(&app, "222", "Computadora").await;

    let response = app.oneshot(get("/search?name=Tele&sku=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Telefono");
    assert_eq!(results[0]["sku"], 111);
}
