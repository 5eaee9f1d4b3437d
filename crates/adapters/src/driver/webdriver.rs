// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! W3C WebDriver adapter
//!
//! Talks to chromedriver, geckodriver or a Selenium grid over HTTP.

use super::{AutomationDriver, DriverError, ElementInfo, KeyChord, Page, PageProbe};
use async_trait::async_trait;
use av_core::{Cookie, Locator};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Key of the element reference object in WebDriver responses
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches one browser session per `open()`
#[derive(Clone)]
pub struct WebDriver {
    base_url: String,
    headless: bool,
    http: reqwest::Client,
}

impl WebDriver {
    pub fn new(base_url: impl AsRef<str>, headless: bool) -> Result<Self, DriverError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DriverError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
            headless,
            http,
        })
    }

    fn capabilities(&self) -> Value {
        let mut args = vec![
            "--use-fake-ui-for-media-stream",
            "--use-fake-device-for-media-stream",
            "--disable-notifications",
            "--window-size=1280,800",
        ];
        if self.headless {
            args.push("--headless=new");
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

#[async_trait]
impl AutomationDriver for WebDriver {
    async fn open(&self) -> Result<Box<dyn Page>, DriverError> {
        let url = format!("{}/session", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&self.capabilities())
            .send()
            .await
            .map_err(|e| DriverError::AcquireFailed(e.to_string()))?;
        let value = unwrap_value(response)
            .await
            .map_err(|e| DriverError::AcquireFailed(e.to_string()))?;
        let created: NewSession = serde_json::from_value(value)
            .map_err(|e| DriverError::AcquireFailed(format!("unexpected session reply: {e}")))?;

        Ok(Box::new(WebDriverPage {
            session: Arc::new(Session {
                http: self.http.clone(),
                url: format!("{}/session/{}", self.base_url, created.session_id),
            }),
            closed: false,
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Deserialize)]
struct WdResponse {
    value: Value,
}

#[derive(Deserialize)]
struct WdError {
    error: String,
    #[serde(default)]
    message: String,
}

/// Shared by the page and its probes
struct Session {
    http: reqwest::Client,
    url: String,
}

impl Session {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = format!("{}{}", self.url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DriverError::Timeout(path.to_string())
            } else {
                DriverError::Http(e.to_string())
            }
        })?;
        unwrap_value(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, DriverError> {
        self.command(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, DriverError> {
        self.command(Method::POST, path, Some(body)).await
    }

    async fn script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    async fn element_ids(&self, locator: &Locator) -> Result<Vec<String>, DriverError> {
        let (using, value) = locator_strategy(locator);
        let found = self
            .post("/elements", json!({ "using": using, "value": value }))
            .await?;
        Ok(element_ids(&found))
    }

    async fn describe(&self, element: &str) -> Result<ElementInfo, DriverError> {
        let base = format!("/element/{element}");
        let visible = self.get(&format!("{base}/displayed")).await?;
        let enabled = self.get(&format!("{base}/enabled")).await?;
        let text = self.get(&format!("{base}/text")).await?;
        let mut label = text.as_str().unwrap_or_default().trim().to_string();
        if label.is_empty() {
            let aria = self.get(&format!("{base}/attribute/aria-label")).await?;
            label = aria.as_str().unwrap_or_default().trim().to_string();
        }
        Ok(ElementInfo {
            label,
            visible: visible.as_bool().unwrap_or(false),
            enabled: enabled.as_bool().unwrap_or(false),
        })
    }

    /// First element that is visible and, if `need_enabled`, enabled
    async fn first_usable(
        &self,
        locator: &Locator,
        need_enabled: bool,
    ) -> Result<String, DriverError> {
        for id in self.element_ids(locator).await? {
            let info = self.describe(&id).await?;
            if info.visible && (info.enabled || !need_enabled) {
                return Ok(id);
            }
        }
        Err(DriverError::ElementNotFound(locator.to_string()))
    }
}

#[async_trait]
impl PageProbe for Session {
    async fn is_responsive(&self) -> bool {
        let ping = self.script("return document.readyState;", Vec::new());
        matches!(tokio::time::timeout(PROBE_TIMEOUT, ping).await, Ok(Ok(_)))
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.get("/url").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        let value = self
            .script(
                "return document.body ? document.body.innerText : '';",
                Vec::new(),
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError> {
        let mut found = Vec::new();
        for id in self.element_ids(locator).await? {
            match self.describe(&id).await {
                Ok(info) => found.push(info),
                // Element went stale between lookup and inspection
                Err(DriverError::ElementNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(found)
    }
}

pub struct WebDriverPage {
    session: Arc<Session>,
    closed: bool,
}

impl WebDriverPage {
    fn live(&self) -> Result<&Session, DriverError> {
        if self.closed {
            Err(DriverError::SessionGone)
        } else {
            Ok(&self.session)
        }
    }
}

#[async_trait]
impl PageProbe for WebDriverPage {
    async fn is_responsive(&self) -> bool {
        !self.closed && self.session.is_responsive().await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.live()?.current_url().await
    }

    async fn visible_text(&self) -> Result<String, DriverError> {
        self.live()?.visible_text().await
    }

    async fn find(&self, locator: &Locator) -> Result<Vec<ElementInfo>, DriverError> {
        self.live()?.find(locator).await
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.live()?.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), DriverError> {
        self.live()?.post("/refresh", json!({})).await?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let session = self.live()?;
        let id = session.first_usable(locator, true).await?;
        session
            .post(&format!("/element/{id}/click"), json!({}))
            .await?;
        Ok(())
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let session = self.live()?;
        let id = session.first_usable(locator, false).await?;
        session
            .post(&format!("/element/{id}/value"), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn press_keys(&mut self, chord: &KeyChord) -> Result<(), DriverError> {
        self.live()?.post("/actions", key_actions(chord)).await?;
        Ok(())
    }

    async fn execute_script(
        &mut self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, DriverError> {
        self.live()?.script(script, args).await
    }

    async fn snapshot(&mut self) -> Result<Vec<u8>, DriverError> {
        let value = self.live()?.get("/screenshot").await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| DriverError::Protocol("screenshot is not a string".into()))?;
        BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| DriverError::Protocol(format!("screenshot is not base64: {e}")))
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, DriverError> {
        let value = self.live()?.get("/cookie").await?;
        Ok(parse_cookies(&value))
    }

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), DriverError> {
        let session = self.live()?;
        for cookie in cookies {
            session
                .post("/cookie", json!({ "cookie": cookie_json(cookie) }))
                .await?;
        }
        Ok(())
    }

    fn probe(&self) -> Arc<dyn PageProbe> {
        self.session.clone()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Err(DriverError::SessionGone);
        }
        self.closed = true;
        self.session.command(Method::DELETE, "", None).await?;
        Ok(())
    }
}

/// Decode the `{"value": ...}` envelope, mapping W3C error codes
async fn unwrap_value(response: reqwest::Response) -> Result<Value, DriverError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DriverError::Http(e.to_string()))?;
    let parsed: Option<WdResponse> = serde_json::from_str(&body).ok();

    if status.is_success() {
        return parsed
            .map(|r| r.value)
            .ok_or_else(|| DriverError::Protocol(format!("unparseable reply: {body}")));
    }

    let error = parsed.and_then(|r| serde_json::from_value::<WdError>(r.value).ok());
    Err(match error {
        Some(e) => map_error(&e.error, &e.message),
        None => DriverError::Http(format!("{status}: {body}")),
    })
}

fn map_error(code: &str, message: &str) -> DriverError {
    match code {
        "invalid session id" | "no such window" => DriverError::SessionGone,
        "no such element" | "stale element reference" | "element not interactable" => {
            DriverError::ElementNotFound(message.to_string())
        }
        "timeout" | "script timeout" => DriverError::Timeout(message.to_string()),
        "session not created" => DriverError::AcquireFailed(message.to_string()),
        _ => DriverError::Protocol(format!("{code}: {message}")),
    }
}

fn locator_strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::Css(selector) => ("css selector", selector.clone()),
        Locator::Text(text) => ("xpath", text_xpath(text)),
    }
}

/// Clickable elements whose text or accessible label contains `text`,
/// case-insensitively
fn text_xpath(text: &str) -> String {
    const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
    let needle = xpath_literal(&text.to_lowercase());
    format!(
        "//*[self::button or self::a or @role='button' or (self::input and @type='submit')]\
         [contains(translate(normalize-space(.), '{UPPER}', '{LOWER}'), {needle}) \
         or contains(translate(@aria-label, '{UPPER}', '{LOWER}'), {needle})]"
    )
}

/// Quote a string for XPath 1.0, which has no escape sequences
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn element_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(ELEMENT_KEY)?.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn key_actions(chord: &KeyChord) -> Value {
    let (modifiers, key) = chord.webdriver_values();
    let mut actions = Vec::new();
    for m in &modifiers {
        actions.push(json!({ "type": "keyDown", "value": m.to_string() }));
    }
    actions.push(json!({ "type": "keyDown", "value": key.to_string() }));
    actions.push(json!({ "type": "keyUp", "value": key.to_string() }));
    for m in modifiers.iter().rev() {
        actions.push(json!({ "type": "keyUp", "value": m.to_string() }));
    }
    json!({
        "actions": [{ "type": "key", "id": "keyboard", "actions": actions }]
    })
}

fn cookie_json(cookie: &Cookie) -> Value {
    let mut value = json!({ "name": cookie.name, "value": cookie.value });
    if let Some(domain) = &cookie.domain {
        value["domain"] = json!(domain);
    }
    if let Some(path) = &cookie.path {
        value["path"] = json!(path);
    }
    value
}

fn parse_cookies(value: &Value) -> Vec<Cookie> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|c| {
                    Some(Cookie {
                        name: c.get("name")?.as_str()?.to_string(),
                        value: c.get("value")?.as_str()?.to_string(),
                        domain: c.get("domain").and_then(Value::as_str).map(str::to_string),
                        path: c.get("path").and_then(Value::as_str).map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "webdriver_tests.rs"]
mod tests;
