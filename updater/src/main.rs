use clap::Parser;
use datastore::{CredentialStore, FileCredentialStore};
use oauth_client::Authenticator;
use sequencer::{RunConfig, RunError, RunOutcome, Sequencer};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use video_client::{DEFAULT_API_BASE_URL, YouTubeConnector};

/// Rewrite a Short's title with its view count and latest commenter
#[derive(Parser, Debug)]
#[command(name = "short-title-updater")]
#[command(version)]
struct Args {
    /// Video to update
    #[arg(long, env = "VIDEO_ID")]
    video_id: Option<String>,

    /// OAuth token bundle (authorized user JSON)
    #[arg(long, env = "YT_CREDENTIALS_FILE", default_value = "token.json")]
    credentials: PathBuf,

    /// Data API base URL
    #[arg(long, env = "YT_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Scopes the token bundle must grant
    #[arg(long = "scope", env = "YT_REQUIRED_SCOPES", value_delimiter = ',')]
    scopes: Vec<String>,

    /// Name used when the latest comment has no author
    #[arg(long = "fallback-name", env = "YT_FALLBACK_NAME")]
    fallback_name: Option<String>,

    /// Write a refreshed token bundle back to the credentials file
    #[arg(long)]
    save_refreshed: bool,

    /// Log at debug level, including raw API responses
    #[arg(short, long)]
    verbose: bool,
}

/// Log filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "short_title_updater=debug,sequencer=debug,oauth_client=debug,video_client=debug"
    } else {
        "short_title_updater=info,sequencer=info,oauth_client=info,video_client=info"
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(args: &Args) -> Result<RunConfig, sequencer::ConfigError> {
    let mut config = RunConfig::new(args.video_id.as_deref())?
        .with_required_scopes(args.scopes.clone())
        .with_api_base_url(args.api_base_url.clone());
    if let Some(name) = &args.fallback_name {
        config = config.with_fallback_commenter_name(name.clone());
    }
    Ok(config)
}

/// Persist the bundle if this run had to refresh it
fn save_refreshed(authenticator: &Authenticator) -> anyhow::Result<()> {
    if !authenticator.was_refreshed() {
        return Ok(());
    }
    if let Some(credentials) = authenticator.credentials() {
        authenticator.store().save(credentials)?;
        tracing::info!(location = %authenticator.store().location(), "saved refreshed credentials");
    }
    Ok(())
}

/// Final console line and process exit code for a finished run
fn report(result: &Result<RunOutcome, RunError>) -> (String, u8) {
    match result {
        Ok(RunOutcome::Updated { title }) => {
            (format!("Success! Updated video title to: {title}"), 0)
        }
        Ok(RunOutcome::Unchanged { title }) => (format!("Title already up to date: {title}"), 0),
        Err(err) => (format!("{} failed: {err}", err.stage()), 1),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return Ok(ExitCode::from(2));
        }
    };

    let file_store = FileCredentialStore::new(&args.credentials);
    tracing::debug!(path = %file_store.path().display(), "credential store");
    let store: Arc<dyn CredentialStore> = Arc::new(file_store);
    let authenticator = Authenticator::new(store, config.required_scopes.clone());
    let connector = YouTubeConnector::new(authenticator, config.api_base_url.clone());
    let mut sequencer = Sequencer::new(config, connector);
    println!("Using video ID: {}", sequencer.config().video_id);

    let result = sequencer.run().await;

    if args.save_refreshed {
        if let Err(err) = save_refreshed(sequencer.authenticator().authenticator()) {
            tracing::warn!(error = %err, "could not save refreshed credentials");
        }
    }

    let (message, code) = report(&result);
    println!("{message}");
    Ok(ExitCode::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use datastore::InMemoryCredentialStore;
    use domain::Credentials;
    use mock_platform::{MockPlatform, Operation, SEED_REFRESH_TOKEN};
    use oauth_client::{AuthError, YOUTUBE_FORCE_SSL_SCOPE};
    use sequencer::EmptyResultError;

    #[test]
    fn default_filter_covers_every_crate() {
        for crate_name in ["short_title_updater", "sequencer", "oauth_client", "video_client"] {
            assert!(default_filter(false).contains(&format!("{crate_name}=info")));
            assert!(default_filter(true).contains(&format!("{crate_name}=debug")));
        }
    }

    #[test]
    fn successful_runs_exit_zero() {
        let title = "This Short has 42 views thanks to Alex #shorts".to_string();

        let updated = report(&Ok(RunOutcome::Updated { title: title.clone() }));
        assert_eq!(updated, (format!("Success! Updated video title to: {title}"), 0));

        let unchanged = report(&Ok(RunOutcome::Unchanged { title: title.clone() }));
        assert_eq!(unchanged, (format!("Title already up to date: {title}"), 0));
    }

    #[test]
    fn aborted_runs_name_the_stage_and_exit_one() {
        let no_comment = report(&Err(EmptyResultError::NoComment.into()));
        assert_eq!(
            no_comment,
            ("comment fetch failed: no comments found on the video".to_string(), 1)
        );

        let auth = report(&Err(AuthError::Unrecoverable.into()));
        assert_eq!(auth.1, 1);
        assert!(auth.0.starts_with("authentication failed: "));
    }

    fn bundle(platform: &MockPlatform, expiry_offset: Duration) -> Credentials {
        Credentials {
            token: Some("ya29.stale".to_string()),
            refresh_token: Some(SEED_REFRESH_TOKEN.to_string()),
            token_uri: Some(platform.token_uri()),
            scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
            expiry: Some(Utc::now() + expiry_offset),
            ..Credentials::default()
        }
    }

    #[tokio::test]
    async fn refreshed_bundle_is_written_back() {
        let platform = MockPlatform::spawn().await.unwrap();
        let store = InMemoryCredentialStore::new(bundle(&platform, Duration::minutes(-5)));
        let mut authenticator = Authenticator::new(
            Arc::new(store.clone()),
            vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
        );
        authenticator.authenticate().await.unwrap();

        save_refreshed(&authenticator).unwrap();

        assert_eq!(platform.count(Operation::Token), 1);
        let saved = store.snapshot().unwrap();
        assert_ne!(saved.access_token(), Some("ya29.stale"));
        assert_eq!(saved.access_token(), authenticator.credentials().unwrap().access_token());
    }

    #[tokio::test]
    async fn unrefreshed_bundle_is_left_alone() {
        let platform = MockPlatform::spawn().await.unwrap();
        let original = bundle(&platform, Duration::minutes(30));
        let store = InMemoryCredentialStore::new(original.clone());
        let mut authenticator = Authenticator::new(
            Arc::new(store.clone()),
            vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
        );
        authenticator.authenticate().await.unwrap();

        save_refreshed(&authenticator).unwrap();

        assert_eq!(platform.count(Operation::Token), 0);
        assert_eq!(store.snapshot(), Some(original));
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["short-title-updater"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn blank_video_id_is_a_config_error() {
        let parsed = args(&["--video-id", " "]);
        assert!(build_config(&parsed).is_err());
    }

    #[test]
    fn flags_flow_into_the_run_config() {
        let parsed = args(&[
            "--video-id",
            "abc",
            "--api-base-url",
            "http://127.0.0.1:9",
            "--scope",
            "scope-a,scope-b",
            "--fallback-name",
            "Someone",
        ]);

        let config = build_config(&parsed).unwrap();

        assert_eq!(config.video_id.as_str(), "abc");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9");
        assert_eq!(config.required_scopes, vec!["scope-a", "scope-b"]);
        assert_eq!(config.fallback_commenter_name, "Someone");
    }
}
