#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use heartroom::{app, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub async fn test_app() -> Router {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        ..Config::default()
    };
    let app_state = AppState::connect(&config).await.unwrap();
    app(app_state, &config)
}

/// A browser: one cookie jar against a shared app.
pub struct Browser {
    app: Router,
    pub cookie: Option<String>,
}

impl Browser {
    pub fn new(app: &Router) -> Self {
        Self { app: app.clone(), cookie: None }
    }

    pub async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = Some(pair);
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(form.to_owned())).await
    }

    pub async fn rounds(&mut self, room_id: Uuid) -> Value {
        let response = self.get(&format!("/r/{room_id}/rounds")).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap()
    }
}

pub fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

pub async fn text(response: Response) -> String {
    String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap()
}

/// Alice creates a room, Bob joins it.
pub async fn couple(app: &Router) -> (Browser, Browser, Uuid) {
    let mut alice = Browser::new(app);
    let response = alice.post_form("/r/new", "name=Our+Room&nickname=Alice").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let room_id: Uuid = location(&response).trim_start_matches("/r/").parse().unwrap();

    let mut bob = Browser::new(app);
    let response = bob.post_form("/r/join", &format!("room_id={room_id}&nickname=Bob")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/r/{room_id}"));

    (alice, bob, room_id)
}

pub fn ids(snapshot: &Value, bucket: &str) -> Vec<String> {
    snapshot[bucket]
        .as_array()
        .unwrap()
        .iter()
        .map(|round| round["id"].as_str().unwrap().to_owned())
        .collect()
}
