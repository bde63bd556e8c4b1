mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_returns_created_book_owned_by_caller() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let res = client
        .post(server.url("/books"))
        .bearer_auth(&token)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let book = res.json::<Value>().await?;
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["author"], "Herbert");
    assert_eq!(book["genre"], "SciFi");
    assert_eq!(book["userId"], "user-1");
    assert!(book.get("id").and_then(|v| v.as_str()).is_some());
    assert!(book.get("createdAt").is_some());

    // A second identical create gets its own id
    let res = client
        .post(server.url("/books"))
        .bearer_auth(&token)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?;
    let second = res.json::<Value>().await?;
    assert_ne!(book["id"], second["id"]);

    Ok(())
}

#[tokio::test]
async fn create_rejects_missing_or_empty_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let bad_payloads = [
        json!({}),
        json!({"title": "Dune"}),
        json!({"title": "Dune", "author": "Herbert"}),
        json!({"title": "", "author": "Herbert", "genre": "SciFi"}),
        json!({"title": "Dune", "author": "   ", "genre": "SciFi"}),
    ];

    for payload in bad_payloads {
        let res = client
            .post(server.url("/books"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }

    // Nothing was created
    let res = client
        .get(server.url("/books"))
        .bearer_auth(&token)
        .send()
        .await?;
    let books = res.json::<Vec<Value>>().await?;
    assert!(books.is_empty());

    Ok(())
}

#[tokio::test]
async fn malformed_book_id_is_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let res = client
        .get(server.url("/books/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test]
async fn update_requires_some_field_and_rejects_blank_values() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let created = client
        .post(server.url("/books"))
        .bearer_auth(&token)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["id"].as_str().unwrap();

    // Empty partial: no update data
    let res = client
        .put(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A field cannot be cleared to empty
    let res = client
        .put(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"title": ""}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Stored book is untouched
    let book = client
        .get(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(book["title"], "Dune");

    Ok(())
}

#[tokio::test]
async fn update_preserves_omitted_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let created = client
        .post(server.url("/books"))
        .bearer_auth(&token)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["id"].as_str().unwrap();

    let res = client
        .put(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"genre": "Fiction"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let updated = res.json::<Value>().await?;
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");
    assert_eq!(updated["genre"], "Fiction");

    Ok(())
}

#[tokio::test]
async fn delete_confirms_then_later_access_is_denied() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::token_for("user-1");

    let created = client
        .post(server.url("/books"))
        .bearer_auth(&token)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["id"].as_str().unwrap();

    let res = client
        .delete(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Book deleted successfully");

    // The record is gone for its former owner too
    let res = client
        .get(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A second delete fails the same way, never crashes
    let res = client
        .delete(server.url(&format!("/books/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn full_lifecycle_scenario() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let u1 = common::token_for("u1");
    let u2 = common::token_for("u2");

    let created = client
        .post(server.url("/books"))
        .bearer_auth(&u1)
        .json(&json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let id = created["id"].as_str().unwrap();

    // Owner reads it back
    let res = client
        .get(server.url(&format!("/books/{}", id)))
        .bearer_auth(&u1)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Someone else is denied
    let res = client
        .get(server.url(&format!("/books/{}", id)))
        .bearer_auth(&u2)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner updates the genre, everything else is preserved
    let updated = client
        .put(server.url(&format!("/books/{}", id)))
        .bearer_auth(&u1)
        .json(&json!({"genre": "Fiction"}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");
    assert_eq!(updated["genre"], "Fiction");

    // Owner deletes; later reads are denied
    let res = client
        .delete(server.url(&format!("/books/{}", id)))
        .bearer_auth(&u1)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url(&format!("/books/{}", id)))
        .bearer_auth(&u1)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}
