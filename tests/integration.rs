mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;
use taskboard::models::{Todo, TodoStatus};

async fn create(server: &TestServer, body: Value) -> reqwest::Response {
    server
        .client
        .post(server.url("/todos"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn list(server: &TestServer) -> Vec<Value> {
    let resp = server
        .client
        .get(server.url("/todos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_list_empty() {
    let server = TestServer::new().await;
    assert!(list(&server).await.is_empty());
}

#[tokio::test]
async fn test_todo_crud() {
    let server = TestServer::new().await;

    // Create a todo
    let resp = create(
        &server,
        json!({"title": "  Buy groceries ", "description": " milk, eggs "}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let todo = &body["data"];
    assert_eq!(todo["title"], "Buy groceries");
    assert_eq!(todo["description"], "milk, eggs");
    assert_eq!(todo["status"], "pending");
    assert_eq!(todo["createdAt"], todo["updatedAt"]);
    let todo_id = todo["id"].as_i64().unwrap();

    // Get the todo
    let resp = server
        .client
        .get(server.url(&format!("/todos/{}", todo_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Buy groceries");

    // Update the title
    let resp = server
        .client
        .put(server.url(&format!("/todos/{}", todo_id)))
        .json(&json!({"title": "Buy groceries today"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Buy groceries today");
    assert_eq!(body["data"]["description"], "milk, eggs");

    let todos = list(&server).await;
    assert_eq!(todos.len(), 1);

    // Delete it
    let resp = server
        .client
        .delete(server.url(&format!("/todos/{}", todo_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], todo_id);

    assert!(list(&server).await.is_empty());
}

#[tokio::test]
async fn test_create_defaults_to_pending() {
    let server = TestServer::new().await;

    let resp = create(&server, json!({"title": "Buy milk"})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"].get("description").is_none());
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let server = TestServer::new().await;
    create(&server, json!({"title": "Existing"})).await;

    for body in [json!({"title": "  "}), json!({"description": "no title"})] {
        let resp = create(&server, body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], json!(["Title is required"]));
        assert_eq!(body["fields"]["title"], "Title is required");
    }

    assert_eq!(list(&server).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_status_rejected() {
    let server = TestServer::new().await;

    let resp = create(&server, json!({"title": "Ship it", "status": "done"})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["status"].as_str().unwrap().contains("done"));
    assert!(list(&server).await.is_empty());
}

#[tokio::test]
async fn test_update_status_only() {
    let server = TestServer::new().await;

    let resp = create(
        &server,
        json!({"title": "Write report", "description": "quarterly"}),
    )
    .await;
    let body: Value = resp.json().await.unwrap();
    let before: Todo = serde_json::from_value(body["data"].clone()).unwrap();

    let resp = server
        .client
        .put(server.url(&format!("/todos/{}", before.id)))
        .json(&json!({"status": "completed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let after: Todo = serde_json::from_value(body["data"].clone()).unwrap();

    assert_eq!(after.status, TodoStatus::Completed);
    assert_eq!(after.title, before.title);
    assert_eq!(after.description, before.description);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_update_blank_title_rejected() {
    let server = TestServer::new().await;

    let resp = create(&server, json!({"title": "Original"})).await;
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_i64().unwrap();

    let resp = server
        .client
        .put(server.url(&format!("/todos/{}", id)))
        .json(&json!({"title": " ", "status": "completed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let todos = list(&server).await;
    assert_eq!(todos[0]["title"], "Original");
    assert_eq!(todos[0]["status"], "pending");
}

#[tokio::test]
async fn test_todo_not_found() {
    let server = TestServer::new().await;

    let resp = server
        .client
        .get(server.url("/todos/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Todo not found");

    let resp = server
        .client
        .put(server.url("/todos/9999"))
        .json(&json!({"title": "Test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .delete(server.url("/todos/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_delete_not_found() {
    let server = TestServer::new().await;

    let resp = create(&server, json!({"title": "Once"})).await;
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_i64().unwrap();

    let first = server
        .client
        .delete(server.url(&format!("/todos/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = server
        .client
        .delete(server.url(&format!("/todos/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert!(list(&server).await.is_empty());
}

#[tokio::test]
async fn test_malformed_requests() {
    let server = TestServer::new().await;

    let resp = server
        .client
        .post(server.url("/todos"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_id_shapes_not_found() {
    let server = TestServer::new().await;
    create(&server, json!({"title": "Only one"})).await;

    for id in ["abc", "99999999999999999999", "-1", "1.5"] {
        let path = format!("/todos/{}", id);

        let resp = server.client.get(server.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", id);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Todo not found");

        let resp = server
            .client
            .put(server.url(&path))
            .json(&json!({"title": "Renamed"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "PUT {}", id);

        let resp = server.client.delete(server.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "DELETE {}", id);
    }

    let todos = list(&server).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "Only one");
}

#[tokio::test]
async fn test_base_path() {
    let server = TestServer::with_base_path("/api").await;

    let resp = create(&server, json!({"title": "Nested"})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = server
        .client
        .get(format!("{}/todos", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
