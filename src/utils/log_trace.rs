//! 時系列トレースログ
//! 読み込み・地域解決・描画のイベントを記録し、後から確認できるようにする

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use wasm_bindgen::prelude::*;

const MAX_LOG_ENTRIES: usize = 500;
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "clinic_ranking_log_trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub category: String, // "data-loader", "region", "view-binder", etc.
    pub message: String,
    pub data: Option<serde_json::Value>,
}

pub struct LogTrace {
    logs: VecDeque<LogEntry>,
}

impl LogTrace {
    pub fn new() -> Self {
        let mut trace = LogTrace {
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        };
        trace.load_from_storage();
        trace
    }

    pub fn log(&mut self, level: LogLevel, category: &str, message: &str, data: Option<serde_json::Value>) {
        let entry = LogEntry {
            timestamp: now_iso(),
            level,
            category: category.to_string(),
            message: message.to_string(),
            data,
        };

        write_console(&entry);

        if self.logs.len() >= MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);

        // debugは保存しない
        if level != LogLevel::Debug {
            self.save_to_storage();
        }
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.logs.iter().cloned().collect()
    }

    pub fn get_logs_json(&self) -> String {
        let logs: Vec<&LogEntry> = self.logs.iter().collect();
        serde_json::to_string_pretty(&logs).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn clear(&mut self) {
        self.logs.clear();
        self.save_to_storage();
    }

    #[cfg(target_arch = "wasm32")]
    fn load_from_storage(&mut self) {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                if let Ok(Some(json_str)) = storage.get_item(STORAGE_KEY) {
                    if let Ok(logs) = serde_json::from_str::<Vec<LogEntry>>(&json_str) {
                        self.logs = logs.into_iter().collect();
                    }
                }
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_from_storage(&mut self) {}

    #[cfg(target_arch = "wasm32")]
    fn save_to_storage(&self) {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                let json_str = serde_json::to_string(&self.logs).unwrap_or_else(|_| "[]".to_string());
                let _ = storage.set_item(STORAGE_KEY, &json_str);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_to_storage(&self) {}
}

impl Default for LogTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_iso() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| format!("{}.{:03}", d.as_secs(), d.subsec_millis()))
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn write_console(entry: &LogEntry) {
    let line = wasm_bindgen::JsValue::from_str(&format!("[{}] {}", entry.category, entry.message));
    match entry.level {
        LogLevel::Error => web_sys::console::error_1(&line),
        LogLevel::Warn => web_sys::console::warn_1(&line),
        LogLevel::Debug => web_sys::console::debug_1(&line),
        LogLevel::Info => web_sys::console::log_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_entry: &LogEntry) {}

// グローバルなログトレースインスタンス
thread_local! {
    static LOG_TRACE: RefCell<LogTrace> = RefCell::new(LogTrace::new());
}

fn with_trace<R>(f: impl FnOnce(&mut LogTrace) -> R) -> R {
    LOG_TRACE.with(|trace| f(&mut trace.borrow_mut()))
}

pub fn log_debug(category: &str, message: &str) {
    with_trace(|trace| trace.log(LogLevel::Debug, category, message, None));
}

pub fn log_info(category: &str, message: &str) {
    with_trace(|trace| trace.log(LogLevel::Info, category, message, None));
}

pub fn log_info_with_data(category: &str, message: &str, data: serde_json::Value) {
    with_trace(|trace| trace.log(LogLevel::Info, category, message, Some(data)));
}

pub fn log_warn(category: &str, message: &str) {
    with_trace(|trace| trace.log(LogLevel::Warn, category, message, None));
}

pub fn log_error(category: &str, message: &str) {
    with_trace(|trace| trace.log(LogLevel::Error, category, message, None));
}

pub fn log_error_with_data(category: &str, message: &str, data: serde_json::Value) {
    with_trace(|trace| trace.log(LogLevel::Error, category, message, Some(data)));
}

/// 指定レベル以上のログ
pub fn recent_logs(min_level: LogLevel) -> Vec<LogEntry> {
    with_trace(|trace| {
        trace
            .get_logs()
            .into_iter()
            .filter(|entry| entry.level >= min_level)
            .collect()
    })
}

/// ブラウザのコンソールから `dumpLogs()` で取り出す
#[wasm_bindgen(js_name = dumpLogs)]
pub fn get_logs_json() -> String {
    with_trace(|trace| trace.get_logs_json())
}

pub fn clear_logs() {
    with_trace(|trace| trace.clear());
}
