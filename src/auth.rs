use crate::config;
use crate::error::{sanitize, Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const AUTHORIZE_BASE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
// Percent-encoded "urn:ietf:wg:oauth:2.0:oob" and the full-drive scope.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const OOB_REDIRECT_URI_ENCODED: &str = "urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob";
const DRIVE_SCOPE_ENCODED: &str = "https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive";
const USER_AGENT: &str = concat!("drivekeep/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at_unix: i64,
}

impl SessionToken {
    pub fn is_expired(&self, now_unix: i64) -> bool {
        now_unix >= self.expires_at_unix
    }
}

/// OAuth authenticator backed by a cached session file.
///
/// Client credentials come from `credentials.json` in the config dir, the
/// "installed app" secrets file downloaded from the Google Cloud console.
/// Tokens are cached as pretty JSON next to it and refreshed on expiry; the
/// one interactive step is exchanging a user-pasted authorization code.
pub struct Auth {
    session_path: PathBuf,
    token_url: String,
    client_id: String,
    client_secret: String,
    http: reqwest::blocking::Client,
}

pub struct AuthConfig {
    pub session_path: PathBuf,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Auth {
    pub fn new() -> Result<Self> {
        let base = config::config_dir()
            .ok_or_else(|| Error::Auth("unable to locate config dir".into()))?;
        let secrets = ClientSecrets::load(&base.join("credentials.json"))?;
        let cfg = AuthConfig {
            session_path: base.join("session.json"),
            token_url: env::var("DRIVEKEEP_TOKEN_URL")
                .ok()
                .or(secrets.installed.token_uri)
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            client_id: secrets.installed.client_id,
            client_secret: secrets.installed.client_secret,
        };
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: AuthConfig) -> Result<Self> {
        Ok(Self {
            session_path: cfg.session_path,
            token_url: cfg.token_url,
            client_id: cfg.client_id,
            client_secret: cfg.client_secret,
            http: reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| Error::Auth(format!("failed to build http client: {e}")))?,
        })
    }

    // --- Session cache ---

    pub fn load_session(&self) -> Result<Option<SessionToken>> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.session_path)?;
        let token: SessionToken = serde_json::from_str(&raw).map_err(|e| {
            Error::Auth(format!(
                "failed to parse session file {}: {e}",
                self.session_path.display()
            ))
        })?;
        Ok(Some(token))
    }

    pub fn save_session(&self, token: &SessionToken) -> Result<()> {
        if let Some(parent) = self.session_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(token)
            .map_err(|e| Error::Auth(format!("failed to encode session json: {e}")))?;
        fs::write(&self.session_path, raw)?;
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        if self.session_path.exists() {
            fs::remove_file(&self.session_path)?;
        }
        Ok(())
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    // --- Tokens ---

    /// Returns a live access token, refreshing the cached session when it has
    /// expired.
    pub fn access_token(&self) -> Result<String> {
        let token = self.load_session()?.ok_or_else(|| {
            Error::Auth("not logged in; run `drivekeep login` first".into())
        })?;
        if !token.is_expired(now_unix()) {
            return Ok(token.access_token);
        }
        if token.refresh_token.is_empty() {
            return Err(Error::Auth(
                "session expired and no refresh token cached; run `drivekeep login` again".into(),
            ));
        }
        let refreshed = self.refresh(&token)?;
        Ok(refreshed.access_token)
    }

    /// Exchanges a user-pasted authorization code and caches the session.
    pub fn authorize(&self, code: &str) -> Result<SessionToken> {
        if code.trim().is_empty() {
            return Err(Error::Auth("authorization code is empty".into()));
        }
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code.trim()),
            ("redirect_uri", OOB_REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];
        let resp = self.token_request(&params)?;
        let token = SessionToken {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.unwrap_or_default(),
            expires_at_unix: now_unix().saturating_add(resp.expires_in),
        };
        self.save_session(&token)?;
        Ok(token)
    }

    fn refresh(&self, expired: &SessionToken) -> Result<SessionToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", expired.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let resp = self.token_request(&params)?;
        let token = SessionToken {
            access_token: resp.access_token,
            // Google omits the refresh token on refresh responses; keep ours.
            refresh_token: resp
                .refresh_token
                .unwrap_or_else(|| expired.refresh_token.clone()),
            expires_at_unix: now_unix().saturating_add(resp.expires_in),
        };
        self.save_session(&token)?;
        Ok(token)
    }

    fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                sanitize(&body)
            )));
        }

        response
            .json()
            .map_err(|e| Error::Auth(format!("invalid token response json: {e}")))
    }

    /// Consent URL the user visits to obtain an authorization code.
    pub fn authorize_url(&self) -> String {
        format!(
            "{AUTHORIZE_BASE_URL}?client_id={}&redirect_uri={OOB_REDIRECT_URI_ENCODED}\
             &response_type=code&scope={DRIVE_SCOPE_ENCODED}&access_type=offline",
            self.client_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: InstalledClient,
}

#[derive(Debug, Deserialize)]
struct InstalledClient {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    token_uri: Option<String>,
}

impl ClientSecrets {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Auth(format!(
                "missing client secrets file {}; download an OAuth client of type \
                 'Desktop app' from the Google Cloud console",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Auth(format!("failed to parse {}: {e}", path.display())))
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const FAR_FUTURE: i64 = 4_102_444_800;

    fn test_auth(name: &str, token_url: String) -> Auth {
        Auth::from_config(AuthConfig {
            session_path: env::temp_dir().join(format!(
                "drivekeep-auth-test-{name}-{}.json",
                std::process::id()
            )),
            token_url,
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
        })
        .expect("auth construction failed")
    }

    fn serve(listener: TcpListener, bodies: Vec<&'static str>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            for body in bodies {
                let (mut stream, _) = listener.accept().expect("accept failed");
                let mut buf = [0u8; 8192];
                let _ = stream.read(&mut buf).expect("read failed");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).expect("write failed");
            }
        })
    }

    #[test]
    fn token_expiry_check() {
        let token = SessionToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at_unix: 100,
        };
        assert!(!token.is_expired(99));
        assert!(token.is_expired(100));
    }

    #[test]
    fn session_roundtrip() {
        let auth = test_auth("roundtrip", "http://127.0.0.1:9".into());
        let token = SessionToken {
            access_token: "acc".into(),
            refresh_token: "ref".into(),
            expires_at_unix: FAR_FUTURE,
        };

        auth.save_session(&token).unwrap();
        let restored = auth.load_session().unwrap().expect("session should exist");
        assert_eq!(restored.access_token, "acc");
        assert_eq!(restored.expires_at_unix, FAR_FUTURE);

        auth.clear_session().unwrap();
        assert!(auth.load_session().unwrap().is_none());
    }

    #[test]
    fn missing_session_is_auth_error() {
        let auth = test_auth("missing", "http://127.0.0.1:9".into());
        auth.clear_session().unwrap();
        let err = auth.access_token().unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn valid_session_needs_no_network() {
        // token_url points nowhere; a live token must never hit it.
        let auth = test_auth("no-network", "http://127.0.0.1:9".into());
        auth.save_session(&SessionToken {
            access_token: "live".into(),
            refresh_token: "ref".into(),
            expires_at_unix: FAR_FUTURE,
        })
        .unwrap();

        assert_eq!(auth.access_token().unwrap(), "live");
        auth.clear_session().unwrap();
    }

    #[test]
    fn expired_session_refreshes_and_persists() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = serve(
            listener,
            vec![r#"{"access_token":"fresh","expires_in":3600}"#],
        );

        let auth = test_auth("refresh", format!("http://{addr}"));
        auth.save_session(&SessionToken {
            access_token: "stale".into(),
            refresh_token: "ref".into(),
            expires_at_unix: 0,
        })
        .unwrap();

        assert_eq!(auth.access_token().unwrap(), "fresh");

        // Refresh response had no refresh_token; the cached one survives.
        let saved = auth.load_session().unwrap().unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token, "ref");
        assert!(saved.expires_at_unix > 0);

        auth.clear_session().unwrap();
        server.join().expect("server thread failed");
    }

    #[test]
    fn authorize_exchanges_code_and_saves_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = serve(
            listener,
            vec![r#"{"access_token":"acc-1","refresh_token":"ref-1","expires_in":3600}"#],
        );

        let auth = test_auth("authorize", format!("http://{addr}"));
        auth.clear_session().unwrap();

        let token = auth.authorize("4/code").unwrap();
        assert_eq!(token.access_token, "acc-1");
        assert_eq!(token.refresh_token, "ref-1");
        assert!(auth.load_session().unwrap().is_some());

        auth.clear_session().unwrap();
        server.join().expect("server thread failed");
    }

    #[test]
    fn empty_code_is_rejected_locally() {
        let auth = test_auth("empty-code", "http://127.0.0.1:9".into());
        let err = auth.authorize("   ").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn authorize_url_mentions_client_id() {
        let auth = test_auth("url", "http://127.0.0.1:9".into());
        let url = auth.authorize_url();
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("response_type=code"));
    }
}
