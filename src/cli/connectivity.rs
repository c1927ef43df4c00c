use anyhow::{anyhow, Context, Result};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};

/// Client for a running permitdesk server.
#[derive(Clone)]
pub struct HttpSession {
    base: Url,
    client: reqwest::Client,
}

impl HttpSession {
    pub fn connect(base: &str) -> Result<Self> {
        let base = Url::parse(base).context("invalid base URL")?;
        // guard redirects are answers, not something to follow
        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build()?;
        Ok(Self { base, client })
    }

    pub async fn login(&self, role: &str) -> Result<Value> {
        let resp = self.client.post(self.base.join("/session/login")?).json(&json!({"role": role})).send().await?;
        Self::json_or_err(resp).await
    }

    pub async fn logout(&self) -> Result<Value> {
        let resp = self.client.post(self.base.join("/session/logout")?).send().await?;
        Self::json_or_err(resp).await
    }

    pub async fn whoami(&self) -> Result<Value> {
        let resp = self.client.get(self.base.join("/session")?).send().await?;
        Self::json_or_err(resp).await
    }

    pub async fn nav(&self, surface: &str, path: Option<&str>) -> Result<Value> {
        let mut url = self.base.join(&format!("/nav/{}", surface))?;
        if let Some(p) = path { url.query_pairs_mut().append_pair("path", p); }
        let resp = self.client.get(url).send().await?;
        Self::json_or_err(resp).await
    }

    /// Ask the server's guard about `path`. Redirects come back as a decision.
    pub async fn route(&self, path: &str) -> Result<Value> {
        let resp = self.client.get(self.base.join(path)?).send().await?;
        if resp.status() == StatusCode::SEE_OTHER {
            let location = resp
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Ok(json!({"path": path, "decision": "redirect", "location": location}));
        }
        let v = Self::json_or_err(resp).await?;
        Ok(json!({"path": path, "decision": "render", "view": v.get("view"), "title": v.get("title")}))
    }

    async fn json_or_err(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let val: Value = resp.json().await.unwrap_or(json!({"status":"error"}));
        if !status.is_success() {
            return Err(anyhow!("remote error: HTTP {} {}", status, val));
        }
        Ok(val)
    }
}
