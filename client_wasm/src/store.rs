//! Leaderboard backed by page-provided async functions
//!
//! The page hands over three callbacks returning promises:
//! `insert(entry)`, `queryTop(eventTag, limit)` and `queryAll(eventTag)`.
//! Query results are arrays of `{ name, score, side, created_at }` rows.

use hoop_core::leaderboard::{top_entries, LeaderboardEntry, NewEntry};
use hoop_core::StoreError;
use js_sys::{Function, Promise, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub struct JsLeaderboard {
    insert: Function,
    query_top: Function,
    query_all: Function,
}

fn js_error(value: JsValue) -> StoreError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "store call failed".to_string());
    StoreError::Unavailable(message)
}

async fn await_call(result: Result<JsValue, JsValue>) -> Result<JsValue, StoreError> {
    let value = result.map_err(js_error)?;
    let promise = Promise::resolve(&value);
    JsFuture::from(promise).await.map_err(js_error)
}

fn parse_rows(value: &JsValue) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let text = JSON::stringify(value)
        .map_err(js_error)?
        .as_string()
        .ok_or_else(|| StoreError::Malformed("rows are not JSON".to_string()))?;
    let parsed = proto::parse_rows(&text)?;
    if parsed.dropped > 0 {
        log::warn!("dropped {} malformed leaderboard rows", parsed.dropped);
    }
    Ok(parsed.entries)
}

impl JsLeaderboard {
    pub fn new(insert: Function, query_top: Function, query_all: Function) -> Self {
        Self {
            insert,
            query_top,
            query_all,
        }
    }

    pub async fn insert_entry(&self, entry: &NewEntry) -> Result<(), StoreError> {
        let row = serde_wasm_bindgen::to_value(entry)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        await_call(self.insert.call1(&JsValue::NULL, &row)).await?;
        Ok(())
    }

    pub async fn query_top_entries(
        &self,
        event_tag: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let value = await_call(self.query_top.call2(
            &JsValue::NULL,
            &JsValue::from_str(event_tag),
            &JsValue::from_f64(limit as f64),
        ))
        .await?;
        // The page may not sort; rank here so the order is always right
        Ok(top_entries(&parse_rows(&value)?, limit))
    }

    pub async fn query_all_entries(
        &self,
        event_tag: &str,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let value = await_call(
            self.query_all
                .call1(&JsValue::NULL, &JsValue::from_str(event_tag)),
        )
        .await?;
        parse_rows(&value)
    }
}
