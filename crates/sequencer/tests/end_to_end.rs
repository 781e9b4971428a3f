use chrono::{Duration, Utc};
use datastore::InMemoryCredentialStore;
use domain::Credentials;
use mock_platform::{MockPlatform, Operation, SEED_REFRESH_TOKEN};
use oauth_client::{Authenticator, YOUTUBE_FORCE_SSL_SCOPE};
use sequencer::{EmptyResultError, RunConfig, RunError, RunOutcome, Sequencer};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use video_client::YouTubeConnector;

const VIDEO: &str = "short-1";

fn snippet() -> Map<String, Value> {
    json!({
        "title": "My first short",
        "description": "Filmed on a phone",
        "categoryId": "22",
        "tags": ["shorts"],
        "channelId": "channel-1"
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn sequencer(platform: &MockPlatform, video: &str) -> Sequencer<YouTubeConnector> {
    let bundle = Credentials {
        token: Some("ya29.stale".to_string()),
        refresh_token: Some(SEED_REFRESH_TOKEN.to_string()),
        token_uri: Some(platform.token_uri()),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
        expiry: Some(Utc::now() - Duration::minutes(10)),
        ..Credentials::default()
    };
    let config = RunConfig::new(Some(video))
        .unwrap()
        .with_api_base_url(platform.base_url());
    let authenticator = Authenticator::new(
        Arc::new(InMemoryCredentialStore::new(bundle)),
        config.required_scopes.clone(),
    );
    let connector = YouTubeConnector::new(authenticator, config.api_base_url.clone());
    Sequencer::new(config, connector)
}

#[tokio::test]
async fn updates_once_then_leaves_the_video_alone() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());
    platform.add_comment(VIDEO, Some("Alex"), Utc::now());

    let first = sequencer(&platform, VIDEO).run().await.unwrap();
    assert_eq!(
        first,
        RunOutcome::Updated {
            title: "This Short has 42 views thanks to Alex #shorts".to_string()
        }
    );

    let second = sequencer(&platform, VIDEO).run().await.unwrap();
    assert!(matches!(second, RunOutcome::Unchanged { .. }));

    assert_eq!(platform.count(Operation::UpdateVideo), 1);
    assert_eq!(platform.count(Operation::ListVideos), 2);

    let mut expected = snippet();
    expected.insert(
        "title".to_string(),
        json!("This Short has 42 views thanks to Alex #shorts"),
    );
    assert_eq!(platform.snippet(VIDEO), Some(expected));
}

#[tokio::test]
async fn new_views_trigger_a_new_update() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());
    platform.add_comment(VIDEO, Some("Alex"), Utc::now());

    sequencer(&platform, VIDEO).run().await.unwrap();
    platform.set_view_count(VIDEO, "43");
    let outcome = sequencer(&platform, VIDEO).run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Updated {
            title: "This Short has 43 views thanks to Alex #shorts".to_string()
        }
    );
    assert_eq!(platform.count(Operation::UpdateVideo), 2);
}

#[tokio::test]
async fn video_without_comments_is_never_read_or_written() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());

    let err = sequencer(&platform, VIDEO).run().await.unwrap_err();

    assert!(matches!(
        err,
        RunError::EmptyResult(EmptyResultError::NoComment)
    ));
    assert_eq!(platform.count(Operation::ListVideos), 0);
    assert_eq!(platform.count(Operation::UpdateVideo), 0);
}

#[tokio::test]
async fn comments_disabled_halts_like_no_comment() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());
    platform.disable_comments(VIDEO);

    let err = sequencer(&platform, VIDEO).run().await.unwrap_err();

    assert!(matches!(
        err,
        RunError::EmptyResult(EmptyResultError::NoComment)
    ));
    assert_eq!(platform.count(Operation::ListVideos), 0);
}

#[tokio::test]
async fn inaccessible_video_is_never_written() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());
    platform.add_comment(VIDEO, Some("Alex"), Utc::now());
    // The comment endpoint still answers, but the video itself is hidden.
    platform.inject_fault(
        Operation::ListVideos,
        200,
        json!({"kind": "youtube#videoListResponse", "items": []}),
    );

    let err = sequencer(&platform, VIDEO).run().await.unwrap_err();

    assert!(matches!(err, RunError::EmptyResult(EmptyResultError::NoVideo)));
    assert_eq!(platform.count(Operation::UpdateVideo), 0);
}

#[tokio::test]
async fn refresh_failure_aborts_before_any_api_call() {
    let platform = MockPlatform::spawn().await.unwrap();
    platform.add_video(VIDEO, Some("42"), snippet());
    platform.inject_fault(Operation::Token, 400, json!({"error": "invalid_grant"}));

    let err = sequencer(&platform, VIDEO).run().await.unwrap_err();

    assert!(matches!(err, RunError::Auth(_)));
    assert_eq!(platform.requests().len(), 1);
}
