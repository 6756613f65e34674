mod common;

use common::{image_part, TestApp};
use reqwest::multipart::Form;
use serde_json::Value;

const FIVE_MIB: usize = 5 * 1024 * 1024;

#[tokio::test]
async fn upload_single_image_works() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("image", image_part(vec![7; 100], "apple.JPG", "image/jpeg"));
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["original_name"], "apple.JPG");
    assert_eq!(body["data"]["mime_type"], "image/jpeg");
    assert_eq!(body["data"]["field_name"], "image");
    assert_eq!(body["data"]["size"], 100);

    let filename = body["data"]["filename"].as_str().unwrap();
    assert!(filename.starts_with("image-"));
    assert!(filename.ends_with(".JPG"));
    assert_eq!(body["data"]["url"], format!("/uploads/{}", filename));

    let stored = std::fs::read(app.upload_dir().join(filename)).expect("File not on disk");
    assert_eq!(stored, vec![7; 100]);
}

#[tokio::test]
async fn stored_image_is_served_statically() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("image", image_part(b"GIF89a".to_vec(), "x.gif", "image/gif"));
    let body: Value = app.post_form("/api/upload", form).await.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap();

    let response = app
        .client
        .get(format!("{}{}", app.address, url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"GIF89a");
}

#[tokio::test]
async fn non_image_is_rejected_with_fixed_message() {
    let app = TestApp::spawn().await;

    let form = Form::new().part(
        "image",
        image_part(b"%PDF-1.7".to_vec(), "menu.pdf", "application/pdf"),
    );
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Images only! (jpeg, jpg, png, gif, webp)");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn image_extension_with_wrong_mime_is_rejected() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("image", image_part(vec![0; 10], "fake.png", "text/html"));
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Images only! (jpeg, jpg, png, gif, webp)");
}

#[tokio::test]
async fn file_of_exactly_five_mib_is_accepted() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("image", image_part(vec![1; FIVE_MIB], "big.png", "image/png"));
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["size"], FIVE_MIB as u64);
}

#[tokio::test]
async fn file_one_byte_over_limit_is_rejected_and_removed() {
    let app = TestApp::spawn().await;

    let form = Form::new().part(
        "image",
        image_part(vec![1; FIVE_MIB + 1], "big.png", "image/png"),
    );
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "File size cannot exceed 5MB");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn upload_multiple_images_works() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .text("title", "Fresh rotis")
        .part("images", image_part(vec![1; 10], "a.png", "image/png"))
        .part("images", image_part(vec![2; 20], "b.webp", "image/webp"));
    let response = app.post_form("/api/upload/images", form).await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["fields"]["title"], "Fresh rotis");
    assert_eq!(body["data"][1]["size"], 20);
    assert_eq!(app.stored_files().len(), 2);
}

#[tokio::test]
async fn sixth_image_rejects_whole_request() {
    let app = TestApp::spawn().await;

    let mut form = Form::new();
    for i in 0..6 {
        form = form.part(
            "images",
            image_part(vec![i; 10], &format!("{}.jpg", i), "image/jpeg"),
        );
    }
    let response = app.post_form("/api/upload/images", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Maximum 5 images allowed");
    // The five already written are cleaned up.
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn file_under_unexpected_field_is_rejected() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("photo", image_part(vec![1; 10], "a.png", "image/png"));
    let response = app.post_form("/api/upload/images", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Maximum 5 images allowed");
}

#[tokio::test]
async fn bad_second_file_removes_the_first() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .part("images", image_part(vec![1; 10], "a.png", "image/png"))
        .part("images", image_part(vec![2; 10], "b.exe", "application/octet-stream"));
    let response = app.post_form("/api/upload/images", form).await;

    assert_eq!(response.status(), 400);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn form_without_file_is_rejected() {
    let app = TestApp::spawn().await;

    let form = Form::new().text("title", "no picture");
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please upload an image");
}

#[tokio::test]
async fn delete_image_removes_stored_file() {
    let app = TestApp::spawn().await;

    let form = Form::new().part("image", image_part(vec![1; 10], "a.png", "image/png"));
    let body: Value = app.post_form("/api/upload", form).await.json().await.unwrap();
    let filename = body["data"]["filename"].as_str().unwrap().to_string();

    let url = format!("{}/api/upload/{}", app.address, filename);
    let response = app.client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(app.stored_files().is_empty());

    let again = app.client.delete(&url).send().await.unwrap();
    assert_eq!(again.status(), 404);
    let body: Value = again.json().await.unwrap();
    assert_eq!(body["error"], "Image not found");
}

#[tokio::test]
async fn delete_refuses_traversal() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .delete(format!("{}/api/upload/..%5Csecret.png", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn json_body_gets_json_error() {
    let app = TestApp::spawn().await;

    for path in ["/api/upload", "/api/upload/images"] {
        let response = app
            .client
            .post(format!("{}{}", app.address, path))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Please upload an image");
    }
}

#[tokio::test]
async fn second_image_on_single_route_gets_count_message() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .part("image", image_part(vec![1; 10], "a.png", "image/png"))
        .part("image", image_part(vec![2; 10], "b.png", "image/png"));
    let response = app.post_form("/api/upload", form).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Maximum 5 images allowed");
    assert!(app.stored_files().is_empty());
}
