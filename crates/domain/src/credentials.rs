use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// OAuth token bundle in the "authorized user" file format.
///
/// Keys this type does not know about are kept in `extra` so that saving a
/// refreshed bundle does not drop them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "access_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token endpoint used for the refresh grant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, alias = "scope", deserialize_with = "scope_list")]
    pub scopes: Vec<String>,

    /// Access token expiry; `None` means the expiry is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credentials {
    /// The access token, if one is present and non-empty
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// Required scopes this bundle was not granted
    pub fn missing_scopes<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|scope| !self.scopes.contains(scope))
            .map(String::as_str)
            .collect()
    }

    /// Install the outcome of a refresh grant
    pub fn apply_refresh(
        &mut self,
        access_token: String,
        expires_in: i64,
        refresh_token: Option<String>,
        scope: Option<&str>,
        now: DateTime<Utc>,
    ) {
        self.token = Some(access_token);
        self.expiry = Some(now + Duration::seconds(expires_in));
        if let Some(refresh_token) = refresh_token.filter(|token| !token.is_empty()) {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = scope {
            self.scopes = split_scopes(scope);
        }
    }
}

fn split_scopes(joined: &str) -> Vec<String> {
    joined.split_whitespace().map(str::to_string).collect()
}

/// Accepts either a JSON array of scopes or a space-separated string
fn scope_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scopes {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Scopes>::deserialize(deserializer)? {
        Some(Scopes::List(list)) => list,
        Some(Scopes::Joined(joined)) => split_scopes(&joined),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const FORCE_SSL: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).single().unwrap()
    }

    #[test]
    fn parses_authorized_user_file() {
        let credentials: Credentials = serde_json::from_value(json!({
            "token": "ya29.abc",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": [FORCE_SSL],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2024-05-01T12:00:00.123456Z"
        }))
        .unwrap();

        assert_eq!(credentials.access_token(), Some("ya29.abc"));
        assert_eq!(credentials.refresh_token(), Some("1//refresh"));
        assert_eq!(credentials.scopes, vec![FORCE_SSL.to_string()]);
        assert!(credentials.is_expired(at(13)));
        assert!(!credentials.is_expired(at(11)));
        assert_eq!(credentials.extra.get("universe_domain"), Some(&json!("googleapis.com")));
    }

    #[test]
    fn accepts_token_response_style_keys() {
        let credentials: Credentials = serde_json::from_value(json!({
            "access_token": "ya29.abc",
            "scope": "a b c"
        }))
        .unwrap();

        assert_eq!(credentials.access_token(), Some("ya29.abc"));
        assert_eq!(credentials.scopes, vec!["a", "b", "c"]);
        assert_eq!(credentials.expiry, None);
        assert!(!credentials.is_expired(at(0)));
    }

    #[test]
    fn reports_missing_scopes() {
        let credentials = Credentials {
            scopes: vec!["a".to_string()],
            ..Credentials::default()
        };
        let required = vec!["a".to_string(), "b".to_string()];
        assert_eq!(credentials.missing_scopes(&required), vec!["b"]);
    }

    #[test]
    fn refresh_replaces_token_and_expiry_only() {
        let mut credentials = Credentials {
            token: Some("old".to_string()),
            refresh_token: Some("keep".to_string()),
            scopes: vec![FORCE_SSL.to_string()],
            expiry: Some(at(1)),
            ..Credentials::default()
        };

        credentials.apply_refresh("new".to_string(), 3600, None, None, at(2));

        assert_eq!(credentials.access_token(), Some("new"));
        assert_eq!(credentials.refresh_token(), Some("keep"));
        assert_eq!(credentials.expiry, Some(at(3)));
        assert_eq!(credentials.scopes, vec![FORCE_SSL.to_string()]);
    }

    #[test]
    fn saving_keeps_unknown_keys() {
        let raw = json!({"token": "t", "scopes": [], "account": "me@example.com"});
        let credentials: Credentials = serde_json::from_value(raw).unwrap();
        let saved = serde_json::to_value(&credentials).unwrap();
        assert_eq!(saved["account"], json!("me@example.com"));
        assert_eq!(saved["token"], json!("t"));
    }
}
