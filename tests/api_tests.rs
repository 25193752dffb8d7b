//! API integration tests
//!
//! These run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique email per registration so tests never collide
fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@test.example", prefix, nanos, n)
}

/// Register an account and return (token, user id)
async fn register(client: &Client, prefix: &str, role: &str) -> (String, i64) {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": format!("Test {}", prefix),
            "email": unique_email(prefix),
            "password": "secret123",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201, "register should succeed");
    let body: Value = response.json().await.expect("Failed to parse register response");
    (
        body["token"].as_str().expect("No token in response").to_string(),
        body["user"]["id"].as_i64().expect("No user id in response"),
    )
}

/// Create a book via multipart form, returning its id
async fn create_book(client: &Client, admin_token: &str, title: &str, stock: i64) -> i64 {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("author", "Andrea Hirata")
        .text("publisher", "Bentang Pustaka")
        .text("year", "2005")
        .text("stock", stock.to_string());

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin_token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201, "create book should succeed");
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["book"]["id"].as_i64().expect("No book id in response")
}

async fn get_book_stock(client: &Client, book_id: i64) -> i64 {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send get book request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse book");
    body["stock"].as_i64().expect("No stock in response")
}

async fn borrow(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrowings", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn return_borrowing(client: &Client, token: &str, borrowing_id: i64) -> reqwest::Response {
    client
        .put(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send return request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_me() {
    let client = Client::new();
    let (token, user_id) = register(&client, "me", "user").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"].as_i64(), Some(user_id));
    assert_eq!(body["role"], "user");
    // The password hash must never leak
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_conflicts() {
    let client = Client::new();
    let email = unique_email("dup");

    let payload = json!({
        "name": "Dup",
        "email": email,
        "password": "secret123"
    });

    let first = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "EmailAlreadyExists");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@test.example",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let (token, _) = register(&client, "logout", "user").await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // The old token is now revoked
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_revokes_previous_tokens() {
    let client = Client::new();
    let email = unique_email("relogin");

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Relogin",
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let old_token = body["token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let new_token = body["token"].as_str().unwrap().to_string();

    // One active token set per user: the pre-login token is dead
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&old_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&new_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_books_are_public_but_writes_are_admin_only() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // A plain user may not create books
    let (user_token, _) = register(&client, "not-admin", "user").await;
    let form = reqwest::multipart::Form::new()
        .text("title", "Forbidden")
        .text("author", "Nobody")
        .text("year", "2020")
        .text("stock", "1");
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&user_token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "bk-admin", "admin").await;

    let book_id = create_book(&client, &admin_token, "Bumi Manusia", 4).await;

    // Partial update
    let form = reqwest::multipart::Form::new().text("stock", "7");
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin_token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["stock"].as_i64(), Some(7));
    assert_eq!(body["book"]["title"], "Bumi Manusia");

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

/// Spec scenario: stock 3, borrow, duplicate borrow, return, re-borrow
#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "cycle-admin", "admin").await;
    let (user_token, _) = register(&client, "cycle-user", "user").await;

    let book_id = create_book(&client, &admin_token, "Laskar Pelangi", 3).await;

    // Borrow: ledger row created, stock 3 -> 2
    let response = borrow(&client, &user_token, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();
    assert_eq!(body["borrowing"]["status"], "borrowed");
    assert!(body["borrowing"]["return_date"].is_null());
    assert_eq!(get_book_stock(&client, book_id).await, 2);

    // Second borrow of the same book by the same user is rejected
    let response = borrow(&client, &user_token, book_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "DuplicateBorrow");
    assert_eq!(get_book_stock(&client, book_id).await, 2);

    // Return: status terminal, stock 2 -> 3
    let response = return_borrowing(&client, &user_token, borrowing_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowing"]["status"], "returned");
    assert!(!body["borrowing"]["return_date"].is_null());
    assert_eq!(get_book_stock(&client, book_id).await, 3);

    // Double return is rejected
    let response = return_borrowing(&client, &user_token, borrowing_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyReturned");
    assert_eq!(get_book_stock(&client, book_id).await, 3);

    // Borrow again after returning succeeds
    let response = borrow(&client, &user_token, book_id).await;
    assert_eq!(response.status(), 201);
    assert_eq!(get_book_stock(&client, book_id).await, 2);
}

/// Spec scenario: stock 0 rejects the borrow and creates no ledger row
#[tokio::test]
#[ignore]
async fn test_borrow_out_of_stock() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "oos-admin", "admin").await;
    let (user_token, _) = register(&client, "oos-user", "user").await;

    let book_id = create_book(&client, &admin_token, "Out of Stock", 0).await;

    let response = borrow(&client, &user_token, book_id).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "OutOfStock");
    assert_eq!(get_book_stock(&client, book_id).await, 0);

    // No ledger row was created
    let response = client
        .get(format!("{}/borrowings", BASE_URL))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book_is_not_found() {
    let client = Client::new();
    let (user_token, _) = register(&client, "nf-user", "user").await;

    let response = borrow(&client, &user_token, 999_999_999).await;
    assert_eq!(response.status(), 404);
}

/// Concurrent borrows against the last copy: exactly one succeeds
#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_last_copy() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "race-admin", "admin").await;
    let (token_a, _) = register(&client, "race-a", "user").await;
    let (token_b, _) = register(&client, "race-b", "user").await;

    let book_id = create_book(&client, &admin_token, "Last Copy", 1).await;

    let (res_a, res_b) = tokio::join!(
        borrow(&client, &token_a, book_id),
        borrow(&client, &token_b, book_id)
    );

    let statuses = [res_a.status().as_u16(), res_b.status().as_u16()];
    let successes = statuses.iter().filter(|s| **s == 201).count();
    let conflicts = statuses.iter().filter(|s| **s == 409).count();
    assert_eq!(successes, 1, "exactly one borrower wins the last copy");
    assert_eq!(conflicts, 1, "the other receives OutOfStock");
    assert_eq!(get_book_stock(&client, book_id).await, 0);
}

/// Returning someone else's borrowing is indistinguishable from a
/// missing id
#[tokio::test]
#[ignore]
async fn test_return_other_users_borrowing_is_not_found() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "own-admin", "admin").await;
    let (token_a, _) = register(&client, "own-a", "user").await;
    let (token_b, _) = register(&client, "own-b", "user").await;

    let book_id = create_book(&client, &admin_token, "Owned", 2).await;

    let response = borrow(&client, &token_a, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["borrowing"]["id"].as_i64().unwrap();

    let response = return_borrowing(&client, &token_b, borrowing_id).await;
    assert_eq!(response.status(), 404);

    // The rightful owner can still return it
    let response = return_borrowing(&client, &token_a, borrowing_id).await;
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_my_borrowings_are_enriched_and_ordered() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "list-admin", "admin").await;
    let (user_token, _) = register(&client, "list-user", "user").await;

    let first = create_book(&client, &admin_token, "First", 1).await;
    let second = create_book(&client, &admin_token, "Second", 1).await;

    assert_eq!(borrow(&client, &user_token, first).await.status(), 201);
    assert_eq!(borrow(&client, &user_token, second).await.status(), 201);

    let response = client
        .get(format!("{}/borrowings", BASE_URL))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Newest first
    assert_eq!(list[0]["book"]["title"], "Second");
    assert_eq!(list[1]["book"]["title"], "First");
    assert!(list[0]["book"]["stock"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_admin_ledger_requires_admin() {
    let client = Client::new();
    let (user_token, _) = register(&client, "ledger-user", "user").await;

    let response = client
        .get(format!("{}/borrowings/all", BASE_URL))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let (admin_token, _) = register(&client, "ledger-admin", "admin").await;
    let response = client
        .get(format!("{}/borrowings/all", BASE_URL))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    for entry in body.as_array().unwrap() {
        assert!(entry["book"]["title"].is_string());
        assert!(entry["user"]["name"].is_string());
    }
}

#[tokio::test]
#[ignore]
async fn test_dashboard_summary() {
    let client = Client::new();
    let (token, _) = register(&client, "dash", "user").await;

    let response = client
        .get(format!("{}/dashboard-summary", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].as_i64().unwrap() >= 0);
    assert!(body["total_borrowed"].as_i64().unwrap() >= 0);
    assert!(body["total_users"].as_i64().unwrap() >= 1);
}
