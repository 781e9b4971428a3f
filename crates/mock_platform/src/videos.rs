use crate::store::{Fault, Operation, PlatformState, RecordedRequest, StoredVideo};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadsListParams {
    #[serde(default)]
    pub part: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct VideosListParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub part: String,
}

#[derive(Debug, Deserialize)]
pub struct VideosUpdateParams {
    #[serde(default)]
    pub part: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub kind: String,
    pub etag: String,
    pub page_info: PageInfo,
    pub items: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: i32,
    pub results_per_page: i32,
}

fn list_response(kind: &str, items: Vec<Value>) -> ListResponse {
    ListResponse {
        kind: kind.to_string(),
        etag: format!("etag-{}", uuid::Uuid::new_v4()),
        page_info: PageInfo {
            total_results: items.len() as i32,
            results_per_page: items.len() as i32,
        },
        items,
    }
}

fn video_resource(id: &str, video: &StoredVideo, parts: &[&str]) -> Value {
    let mut resource = Map::new();
    resource.insert("kind".to_string(), json!("youtube#video"));
    resource.insert("etag".to_string(), json!(format!("etag-{id}")));
    resource.insert("id".to_string(), json!(id));
    if parts.contains(&"snippet") {
        resource.insert("snippet".to_string(), Value::Object(video.snippet.clone()));
    }
    if parts.contains(&"statistics") {
        let mut statistics = Map::new();
        if let Some(view_count) = &video.view_count {
            statistics.insert("viewCount".to_string(), json!(view_count));
        }
        statistics.insert("likeCount".to_string(), json!("0"));
        statistics.insert("commentCount".to_string(), json!("0"));
        resource.insert("statistics".to_string(), Value::Object(statistics));
    }
    Value::Object(resource)
}

fn split_parts(part: &str) -> Vec<&str> {
    part.split(',').map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Google API style error envelope
pub(crate) fn api_error(status: StatusCode, reason: &str, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
            "errors": [{"message": message, "domain": "youtube.api", "reason": reason}]
        }
    });
    (status, Json(body)).into_response()
}

pub(crate) fn fault_response(fault: Fault) -> Response {
    let status = StatusCode::from_u16(fault.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(fault.body)).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Record the request, then apply injected faults and the bearer check
fn admit(
    state: &PlatformState,
    operation: Operation,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: Option<Value>,
) -> Result<(), Response> {
    let authorization = bearer(headers);
    state.record(RecordedRequest {
        operation,
        query,
        authorization: authorization.clone(),
        body,
    });

    if let Some(fault) = state.fault(operation) {
        return Err(fault_response(fault));
    }

    let token = authorization
        .as_deref()
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        Some(token) if state.token_is_valid(token) => Ok(()),
        _ => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "authError",
            "Request had invalid authentication credentials.",
        )),
    }
}

pub(crate) async fn comment_threads_list(
    State(state): State<Arc<PlatformState>>,
    headers: HeaderMap,
    Query(raw): Query<HashMap<String, String>>,
    Query(params): Query<CommentThreadsListParams>,
) -> Response {
    if let Err(rejection) = admit(&state, Operation::ListCommentThreads, raw, &headers, None) {
        return rejection;
    }

    if state.video(&params.video_id).is_none() {
        return api_error(
            StatusCode::NOT_FOUND,
            "videoNotFound",
            "The video identified by the videoId parameter could not be found.",
        );
    }
    if state.comments_disabled(&params.video_id) {
        return api_error(
            StatusCode::FORBIDDEN,
            "commentsDisabled",
            "The video identified by the videoId parameter has disabled comments.",
        );
    }

    let include_snippet = split_parts(&params.part).contains(&"snippet");
    let limit = params.max_results.unwrap_or(20);
    let items = state
        .latest_comments(&params.video_id, limit)
        .into_iter()
        .map(|comment| {
            let mut comment_snippet = Map::new();
            if let Some(author) = comment.author_display_name {
                comment_snippet.insert("authorDisplayName".to_string(), json!(author));
            }
            comment_snippet.insert(
                "publishedAt".to_string(),
                json!(comment.published_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
            comment_snippet.insert("textDisplay".to_string(), json!("nice"));

            let mut thread = json!({
                "kind": "youtube#commentThread",
                "etag": format!("etag-{}", comment.id),
                "id": &comment.id,
            });
            if include_snippet {
                thread["snippet"] = json!({
                    "videoId": &params.video_id,
                    "topLevelComment": {
                        "kind": "youtube#comment",
                        "id": &comment.id,
                        "snippet": comment_snippet,
                    },
                    "totalReplyCount": 0,
                    "isPublic": true,
                });
            }
            thread
        })
        .collect();

    let response = list_response("youtube#commentThreadListResponse", items);
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn videos_list(
    State(state): State<Arc<PlatformState>>,
    headers: HeaderMap,
    Query(raw): Query<HashMap<String, String>>,
    Query(params): Query<VideosListParams>,
) -> Response {
    if let Err(rejection) = admit(&state, Operation::ListVideos, raw, &headers, None) {
        return rejection;
    }

    let parts = split_parts(&params.part);
    let items = params
        .id
        .split(',')
        .filter_map(|id| state.video(id).map(|video| video_resource(id, &video, &parts)))
        .collect();

    let response = list_response("youtube#videoListResponse", items);
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn videos_update(
    State(state): State<Arc<PlatformState>>,
    headers: HeaderMap,
    Query(raw): Query<HashMap<String, String>>,
    Query(params): Query<VideosUpdateParams>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = admit(
        &state,
        Operation::UpdateVideo,
        raw,
        &headers,
        Some(body.clone()),
    ) {
        return rejection;
    }

    let parts = split_parts(&params.part);
    if !parts.contains(&"snippet") {
        return api_error(
            StatusCode::BAD_REQUEST,
            "invalidPart",
            "The part parameter must include snippet.",
        );
    }

    let id = body.get("id").and_then(Value::as_str).unwrap_or_default();
    let Some(snippet) = body.get("snippet").and_then(Value::as_object) else {
        return api_error(
            StatusCode::BAD_REQUEST,
            "invalidSnippet",
            "The request metadata does not contain a snippet.",
        );
    };
    if snippet.get("title").and_then(Value::as_str).is_none_or(str::is_empty) {
        return api_error(
            StatusCode::BAD_REQUEST,
            "invalidTitle",
            "The request metadata specifies an invalid or empty video title.",
        );
    }

    match state.replace_snippet(id, snippet.clone()) {
        Some(video) => {
            let resource = video_resource(id, &video, &parts);
            (StatusCode::OK, Json(resource)).into_response()
        }
        None => api_error(
            StatusCode::NOT_FOUND,
            "videoNotFound",
            "The video that you are trying to update cannot be found.",
        ),
    }
}
