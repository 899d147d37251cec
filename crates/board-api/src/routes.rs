use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::messages;
use crate::service::MessageService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: MessageService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/messages/search", get(messages::search_messages))
        .route("/api/messages/hashtag/{hashtag}", get(messages::messages_by_hashtag))
        .route(
            "/api/messages/{id}",
            get(messages::get_message)
                .put(messages::update_message)
                .delete(messages::delete_message),
        )
        .route("/api/messages/{id}/like", post(messages::like_message))
        .route("/api/messages/{id}/comment", post(messages::add_comment))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::service::tests::{StepClock, service_with_clock};

    fn app() -> Router {
        let service = service_with_clock(StepClock::starting_at("2024-06-01", "12:00:00", 60));
        router(Arc::new(AppStateInner { service }))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, body: Value) -> String {
        let (status, resp) = send(app, "POST", "/api/messages", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp["success"], true);
        resp["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let app = app();
        let id = create(
            &app,
            json!({ "body": "Hello #intro", "createdBy": 7, "hashtags": ["intro"] }),
        )
        .await;

        let (status, msg) = send(&app, "GET", &format!("/api/messages/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(msg["id"], id.as_str());
        assert_eq!(msg["body"], "Hello #intro");
        assert_eq!(msg["createdBy"], 7);
        assert_eq!(msg["likes"], 0);
        assert_eq!(msg["likedBy"], json!([]));
        assert_eq!(msg["comments"], json!([]));
        assert_eq!(msg["date"], "2024-06-01");
        assert_eq!(msg["hour"], "12:00:00");
        assert!(msg.get("images").is_none());

        let (status, found) = send(&app, "GET", "/api/messages/hashtag/intro", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (_, found) = send(&app, "GET", "/api/messages/hashtag/other", None).await;
        assert_eq!(found, json!([]));
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_request() {
        let app = app();

        let (status, err) = send(&app, "POST", "/api/messages", Some(json!({ "body": "  ", "createdBy": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err, json!({ "success": false, "message": "body cannot be empty" }));

        let (status, err) = send(&app, "POST", "/api/messages", Some(json!({ "body": "hi" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "author id is required");

        let (status, _) = send(
            &app,
            "POST",
            "/api/messages",
            Some(json!({ "body": "hi", "createdBy": 1, "likes": 99 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "POST", "/api/messages", Some(json!({ "body": "hi", "createdBy": "seven" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, err) = send(&app, "GET", "/api/messages/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "search term is required");

        let (status, _) = send(&app, "GET", "/api/messages?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_id_versus_missing_id() {
        let app = app();

        let (status, err) = send(&app, "GET", "/api/messages/xyz", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["message"], "invalid message id");

        let missing = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let (status, err) = send(&app, "GET", &format!("/api/messages/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["message"], "message not found");

        let (status, _) = send(&app, "DELETE", "/api/messages/xyz", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "DELETE", &format!("/api/messages/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_like_comment_update_delete_flow() {
        let app = app();
        let id = create(&app, json!({ "body": "flow", "createdBy": 1 })).await;

        let (status, ok) = send(&app, "POST", &format!("/api/messages/{id}/like?userId=5"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ok, json!({ "success": true, "message": "like added" }));

        let (status, err) = send(&app, "POST", &format!("/api/messages/{id}/like?userId=5"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["message"], "user already liked this message");

        let (status, _) = send(&app, "POST", &format!("/api/messages/{id}/like"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/messages/{id}/comment"),
            Some(json!({ "commentedBy": 2, "text": "nice post" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/messages/{id}"),
            Some(json!({ "body": "flow, edited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, msg) = send(&app, "GET", &format!("/api/messages/{id}"), None).await;
        assert_eq!(msg["body"], "flow, edited");
        assert_eq!(msg["likes"], 1);
        assert_eq!(msg["likedBy"], json!([5]));
        assert_eq!(msg["comments"][0]["commentedBy"], 2);
        assert_eq!(msg["comments"][0]["text"], "nice post");
        assert_eq!(msg["comments"][0]["hour"], "12:01:00");

        let (status, ok) = send(&app, "DELETE", &format!("/api/messages/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ok["message"], "message deleted");

        let (status, _) = send(&app, "GET", &format!("/api/messages/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let app = app();
        create(&app, json!({ "body": "first about Rust", "createdBy": 1 })).await;
        create(&app, json!({ "body": "second", "createdBy": 1 })).await;
        create(&app, json!({ "body": "third, rust again", "createdBy": 2 })).await;

        let (status, all) = send(&app, "GET", "/api/messages", None).await;
        assert_eq!(status, StatusCode::OK);
        let bodies: Vec<&str> = all.as_array().unwrap().iter().map(|m| m["body"].as_str().unwrap()).collect();
        assert_eq!(bodies, vec!["third, rust again", "second", "first about Rust"]);

        let (_, top) = send(&app, "GET", "/api/messages?limit=1", None).await;
        assert_eq!(top.as_array().unwrap().len(), 1);

        let (status, found) = send(&app, "GET", "/api/messages/search?term=RUST", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 2);

        let (_, found) = send(&app, "GET", "/api/messages/search?term=golang&limit=5", None).await;
        assert_eq!(found, json!([]));
    }
}
