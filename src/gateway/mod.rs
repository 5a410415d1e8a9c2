//! Host-platform event gateway.
//!
//! The messaging backend POSTs message events here; the only thing the
//! gateway acts on is the group subscription command. Replies ride back on
//! the response as a quick-operation object, everything else gets an empty
//! response.

pub mod command;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::store::SubscriptionStore;
use crate::Result;

/// A OneBot v11 message event (consumed fields only).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub post_type: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub group_id: i64,
    #[serde(default)]
    pub raw_message: String,
    #[serde(default)]
    pub sender: Sender,
}

/// Sender details attached to a message event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub role: String,
}

/// Build the gateway router.
pub fn router(subscriptions: Arc<SubscriptionStore>) -> Router {
    Router::new()
        .route("/", post(handle_event))
        .with_state(subscriptions)
}

/// Bind the gateway and serve it until the process exits.
pub async fn serve(host: &str, port: u16, subscriptions: Arc<SubscriptionStore>) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gateway listening on {addr}");
    axum::serve(listener, router(subscriptions)).await?;
    Ok(())
}

async fn handle_event(
    State(subscriptions): State<Arc<SubscriptionStore>>,
    Json(event): Json<MessageEvent>,
) -> Json<Value> {
    let Some(parsed) = command::parse(&event.raw_message) else {
        return Json(json!({}));
    };

    if event.post_type != "message" || event.message_type != "group" {
        return reply("该功能需要在群中使用");
    }
    if event.group_id == 0 {
        return reply("获取群号失败");
    }
    if event.sender.role != "owner" && event.sender.role != "admin" {
        return reply(&format!(
            "只能由群主或管理员进行设置，你的角色{}",
            event.sender.role
        ));
    }

    match command::handle(&subscriptions, event.group_id, parsed).await {
        Ok(text) => reply(&text),
        Err(e) => {
            error!("subscription command failed: {e}");
            reply("设置失败，请稍后重试")
        }
    }
}

fn reply(text: &str) -> Json<Value> {
    Json(json!({ "reply": text }))
}
