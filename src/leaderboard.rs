//! Leaderboard client: `fetch` calls against the REST service plus a small
//! cache that is invalidated whenever a score is submitted.

use std::cell::RefCell;

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, window};

use crate::game::hud::escape_html;
use crate::score::{NewScore, Score, rank};

const SCORES_PATH: &str = "/scores";
const LOADING_ROWS: usize = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("Failed to fetch leaderboard")]
    FetchFailed,
    #[error("Failed to submit score")]
    SubmitFailed,
    /// 400 from the server; carries its `message`.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl From<serde_json::Error> for LeaderboardError {
    fn from(e: serde_json::Error) -> Self {
        LeaderboardError::Decode(e.to_string())
    }
}

impl From<LeaderboardError> for JsValue {
    fn from(e: LeaderboardError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn js_err(e: JsValue) -> LeaderboardError {
    LeaderboardError::Network(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Last ranked list seen by the client. `None` or stale means the next read
/// goes to the network.
#[derive(Debug, Default)]
pub struct LeaderboardCache {
    entries: Option<Vec<Score>>,
    stale: bool,
}

impl LeaderboardCache {
    pub fn store(&mut self, mut scores: Vec<Score>) {
        rank(&mut scores);
        self.entries = Some(scores);
        self.stale = false;
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Cached list if it is still fresh.
    pub fn fresh(&self) -> Option<&[Score]> {
        match (&self.entries, self.stale) {
            (Some(list), false) => Some(list),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Interpret a `GET /scores` response.
pub fn parse_list_response(ok: bool, body: &str) -> Result<Vec<Score>, LeaderboardError> {
    if !ok {
        return Err(LeaderboardError::FetchFailed);
    }
    let mut scores: Vec<Score> = serde_json::from_str(body)?;
    rank(&mut scores);
    Ok(scores)
}

/// Interpret a `POST /scores` response.
pub fn parse_submit_response(status: u16, body: &str) -> Result<Score, LeaderboardError> {
    match status {
        200..=299 => Ok(serde_json::from_str(body)?),
        400 => {
            let err: ErrorBody = serde_json::from_str(body)?;
            Err(LeaderboardError::Rejected(err.message))
        }
        _ => Err(LeaderboardError::SubmitFailed),
    }
}

/// Rows for the leaderboard element. Usernames are escaped.
pub fn render_rows(scores: &[Score]) -> String {
    if scores.is_empty() {
        return "<div class='ff-empty'>No champions yet. Be the first!</div>".to_string();
    }
    let mut html = String::from("<ol class='ff-leaderboard'>");
    for (index, s) in scores.iter().enumerate() {
        let medal = match index {
            0 => " ff-gold",
            1 => " ff-silver",
            2 => " ff-bronze",
            _ => "",
        };
        html.push_str(&format!(
            "<li class='ff-row{medal}'><span class='ff-rank'>{}</span><span class='ff-name'>{}</span><span class='ff-points'>{}</span></li>",
            index + 1,
            escape_html(&s.username),
            s.score
        ));
    }
    html.push_str("</ol>");
    html
}

/// Placeholder rows shown while the list is on its way.
pub fn render_loading() -> String {
    let mut html = String::from("<div class='ff-loading' aria-busy='true'>");
    for _ in 0..LOADING_ROWS {
        html.push_str("<div class='ff-skeleton'></div>");
    }
    html.push_str("</div>");
    html
}

thread_local! {
    static CACHE: RefCell<LeaderboardCache> = RefCell::new(LeaderboardCache::default());
    static API_BASE: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Point the client at another origin (defaults to same-origin).
#[wasm_bindgen]
pub fn set_api_base(base: &str) {
    API_BASE.with(|b| *b.borrow_mut() = base.trim_end_matches('/').to_string());
}

fn scores_url() -> String {
    API_BASE.with(|b| format!("{}{SCORES_PATH}", b.borrow()))
}

async fn send(method: &str, body: Option<String>) -> Result<(u16, bool, String), LeaderboardError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(json) = &body {
        opts.set_body(&JsValue::from_str(json));
    }
    let request = Request::new_with_str_and_init(&scores_url(), &opts).map_err(js_err)?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
    }

    let win = window().ok_or_else(|| LeaderboardError::Network("no window".into()))?;
    let value = JsFuture::from(win.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let resp: Response = value.dyn_into().map_err(js_err)?;
    let text = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .unwrap_or_default();
    Ok((resp.status(), resp.ok(), text))
}

/// Top scores, from the cache when fresh.
pub async fn fetch_scores() -> Result<Vec<Score>, LeaderboardError> {
    if let Some(cached) = CACHE.with(|c| c.borrow().fresh().map(<[Score]>::to_vec)) {
        return Ok(cached);
    }
    let (_, ok, body) = send("GET", None).await?;
    let scores = parse_list_response(ok, &body)?;
    CACHE.with(|c| c.borrow_mut().store(scores.clone()));
    Ok(scores)
}

pub async fn submit_score(new: &NewScore) -> Result<Score, LeaderboardError> {
    let body = serde_json::to_string(new)?;
    let (status, _, text) = send("POST", Some(body)).await?;
    let created = parse_submit_response(status, &text)?;
    CACHE.with(|c| c.borrow_mut().invalidate());
    log::info!("score {} saved for {}", created.score, created.username);
    Ok(created)
}

/// Fill the element `element_id` with the ranked list.
#[wasm_bindgen]
pub async fn refresh_leaderboard(element_id: String) -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let el = doc
        .get_element_by_id(&element_id)
        .ok_or_else(|| JsValue::from_str("leaderboard element not found"))?;
    if CACHE.with(|c| c.borrow().fresh().is_none()) {
        el.set_inner_html(&render_loading());
    }
    match fetch_scores().await {
        Ok(scores) => {
            el.set_inner_html(&render_rows(&scores));
            Ok(())
        }
        Err(e) => {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, score: i64) -> Score {
        Score { id, username: name.into(), score, created_at: 0 }
    }

    #[test]
    fn cache_goes_stale_after_invalidate() {
        let mut cache = LeaderboardCache::default();
        assert!(cache.fresh().is_none());
        cache.store(vec![row(1, "a", 5), row(2, "b", 9)]);
        assert_eq!(cache.fresh().unwrap()[0].username, "b");
        cache.invalidate();
        assert!(cache.fresh().is_none());
        cache.store(vec![]);
        assert_eq!(cache.fresh().unwrap().len(), 0);
    }

    #[test]
    fn list_response_is_ranked_and_capped() {
        let rows: Vec<Score> = (1..=12).map(|i| row(i, "p", i)).collect();
        let body = serde_json::to_string(&rows).unwrap();
        let list = parse_list_response(true, &body).unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].score, 12);
        assert_eq!(parse_list_response(false, "[]"), Err(LeaderboardError::FetchFailed));
    }

    #[test]
    fn list_response_tolerates_missing_created_at() {
        let list = parse_list_response(true, r#"[{"id":1,"username":"nemo","score":3}]"#).unwrap();
        assert_eq!(list[0].created_at, 0);
    }

    #[test]
    fn submit_response_statuses() {
        let created = parse_submit_response(201, r#"{"id":4,"username":"dory","score":30,"createdAt":1}"#).unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(
            parse_submit_response(400, r#"{"message":"Username is required","field":"username"}"#),
            Err(LeaderboardError::Rejected("Username is required".into()))
        );
        assert_eq!(parse_submit_response(500, ""), Err(LeaderboardError::SubmitFailed));
    }

    #[test]
    fn rows_escape_names_and_mark_podium() {
        let html = render_rows(&[row(1, "<i>x</i>", 10), row(2, "b", 5)]);
        assert!(html.contains("&lt;i&gt;x&lt;/i&gt;"));
        assert!(html.contains("ff-gold"));
        assert!(html.contains("ff-silver"));
        assert!(render_rows(&[]).contains("No champions yet"));
    }

    #[test]
    fn loading_placeholder_has_one_skeleton_per_row() {
        let html = render_loading();
        assert_eq!(html.matches("ff-skeleton").count(), LOADING_ROWS);
        assert!(!html.contains("No champions yet"));
    }
}
