//! Command listener - HTTP endpoint for the upstream recognizer
//!
//! A tiny_http server on a background thread accepts command and condition
//! messages and forwards them into the single processing loop over a
//! channel. Responses are JSON.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use serde::Deserialize;
use tiny_http::{Header, Response, Server};

use crate::services::SummaryReply;
use crate::session::Conditions;

const MAX_BODY_BYTES: usize = 256 * 1024;

/// Everything the processing loop reacts to.
#[derive(Debug)]
pub enum Event {
    /// A transcribed command to interpret.
    Command(String),
    /// A condition change from the detection flow. `tab` of `None` targets
    /// the active tab.
    SetCondition {
        tab: Option<String>,
        condition: String,
    },
    /// A finished summary request coming back from its worker thread.
    SummaryReady {
        generation: u64,
        reply: SummaryReply,
    },
}

#[derive(Debug, Deserialize)]
struct CommandBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ConditionBody {
    /// Original message tag; when present it must be "setCondition".
    #[serde(default)]
    action: Option<String>,
    condition: String,
    /// Tab identifier, numeric or string ("tabId" in the original shape).
    #[serde(default, alias = "tabId")]
    tab: Option<serde_json::Value>,
}

impl ConditionBody {
    fn tab_string(&self) -> Option<String> {
        match &self.tab {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn respond_json(request: tiny_http::Request, status: u16, body: &str) {
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(json_header());
    let _ = request.respond(response);
}

/// Parse a command body: JSON `{"text": ...}` or a `text=` form field.
fn command_text(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<CommandBody>(body) {
        return Some(parsed.text);
    }
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
}

fn read_body(request: &mut tiny_http::Request) -> Option<String> {
    let mut body = String::new();
    let mut reader = request.as_reader().take(MAX_BODY_BYTES as u64);
    reader.read_to_string(&mut body).ok()?;
    Some(body)
}

/// Start the listener thread. Events land on `tx`; condition queries are
/// answered from the shared registry.
pub fn spawn(
    addr: &str,
    tx: flume::Sender<Event>,
    conditions: Arc<Mutex<Conditions>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = Server::http(addr).map_err(|e| format!("listener: bind {}: {}", addr, e))?;
    eprintln!("listener: on http://{}", addr);

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let path = url.split('?').next().unwrap_or(url.as_str());

            match (method.as_str(), path) {
                ("GET", "/ping") => {
                    respond_json(request, 200, "{\"status\":\"ok\"}");
                }
                ("POST", "/command") => {
                    let Some(body) = read_body(&mut request) else {
                        respond_json(request, 400, "{\"error\":\"unreadable body\"}");
                        continue;
                    };
                    match command_text(&body) {
                        Some(text) => {
                            let _ = tx.send(Event::Command(text));
                            respond_json(request, 200, "{\"status\":\"ok\"}");
                        }
                        None => respond_json(request, 400, "{\"error\":\"missing text\"}"),
                    }
                }
                ("POST", "/condition") => {
                    let Some(body) = read_body(&mut request) else {
                        respond_json(request, 400, "{\"error\":\"unreadable body\"}");
                        continue;
                    };
                    match serde_json::from_str::<ConditionBody>(&body) {
                        Ok(parsed)
                            if parsed
                                .action
                                .as_deref()
                                .is_none_or(|a| a == "setCondition") =>
                        {
                            let _ = tx.send(Event::SetCondition {
                                tab: parsed.tab_string(),
                                condition: parsed.condition,
                            });
                            respond_json(request, 200, "{\"status\":\"ok\"}");
                        }
                        Ok(_) => respond_json(request, 400, "{\"error\":\"unknown action\"}"),
                        Err(_) => respond_json(request, 400, "{\"error\":\"missing condition\"}"),
                    }
                }
                ("GET", "/condition") => {
                    let tab = url
                        .split_once('?')
                        .map(|(_, query)| query.to_string())
                        .and_then(|query| {
                            url::form_urlencoded::parse(query.as_bytes())
                                .find(|(key, _)| key == "tab")
                                .map(|(_, value)| value.into_owned())
                        });

                    let condition = tab.as_deref().and_then(|t| {
                        conditions.lock().ok().and_then(|reg| reg.get(t))
                    });
                    let body = match condition {
                        Some(c) => format!("{{\"condition\":\"{}\"}}", c.label()),
                        None => "{\"condition\":null}".to_string(),
                    };
                    respond_json(request, 200, &body);
                }
                _ => {
                    respond_json(request, 404, "{\"error\":\"not found\"}");
                }
            }
        }
    });

    Ok(())
}
