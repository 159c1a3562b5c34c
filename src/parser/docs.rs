use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::normalize::{endpoint_key, normalize_path};

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];
const RESPONSE_MARKER: &str = "**Response";
const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Documented example responses keyed by `"METHOD /normalized/path"`.
pub type ResponseTable = HashMap<String, Value>;

/// Endpoint most recently announced by a header line.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
}

impl Endpoint {
    pub fn key(&self) -> String {
        endpoint_key(&self.method, &self.path)
    }
}

#[derive(Debug, PartialEq)]
enum ScanState<'a> {
    /// Looking for endpoint headers and `**Response` markers.
    Headers,
    /// After a `**Response` marker: waiting for the json fence, then
    /// collecting until the closing fence.
    Response { opened: bool, body: Vec<&'a str> },
}

/// A block the scanner finished reading, before it is parsed.
#[derive(Debug, PartialEq)]
pub struct ResponseBlock {
    pub endpoint: Option<Endpoint>,
    pub json: String,
}

/// Line-driven scanner pairing each fenced response block with the endpoint
/// header that precedes it.
pub struct DocScanner<'a> {
    state: ScanState<'a>,
    current: Option<Endpoint>,
}

impl<'a> DocScanner<'a> {
    pub fn new() -> Self {
        DocScanner {
            state: ScanState::Headers,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Endpoint> {
        self.current.as_ref()
    }

    pub fn in_response(&self) -> bool {
        matches!(self.state, ScanState::Response { .. })
    }

    /// Feed one line. Returns a block when this line closes one.
    pub fn feed(&mut self, line: &'a str) -> Option<ResponseBlock> {
        let trimmed = line.trim();
        match &mut self.state {
            ScanState::Headers => {
                if let Some(endpoint) = parse_header(trimmed) {
                    self.current = Some(endpoint);
                }
                if trimmed.contains(RESPONSE_MARKER) {
                    self.state = ScanState::Response {
                        opened: false,
                        body: Vec::new(),
                    };
                }
                None
            }
            ScanState::Response { opened, body } => {
                if trimmed.starts_with(JSON_FENCE) {
                    *opened = true;
                    None
                } else if *opened && trimmed.starts_with(FENCE) {
                    let json = body.join("\n");
                    self.state = ScanState::Headers;
                    Some(ResponseBlock {
                        endpoint: self.current.clone(),
                        json,
                    })
                } else {
                    if *opened {
                        body.push(line);
                    }
                    None
                }
            }
        }
    }
}

/// `GET /users/:id` -> method + normalized path.
fn parse_header(line: &str) -> Option<Endpoint> {
    let (method, path) = line.split_once(' ')?;
    if !METHODS.contains(&method) || !path.starts_with('/') {
        return None;
    }
    Some(Endpoint {
        method: method.to_string(),
        path: normalize_path(path),
    })
}

/// Scan markdown documentation into a table of example responses.
/// Blocks that are not valid JSON are dropped; a later block for the same
/// endpoint replaces an earlier one.
pub fn extract_responses(markdown: &str) -> ResponseTable {
    let mut table = ResponseTable::new();
    let mut scanner = DocScanner::new();

    for line in markdown.lines() {
        let Some(block) = scanner.feed(line) else {
            continue;
        };
        let Some(endpoint) = block.endpoint else {
            debug!("Response block before any endpoint header, skipping");
            continue;
        };
        match serde_json::from_str::<Value>(&block.json) {
            Ok(value) => {
                table.insert(endpoint.key(), value);
            }
            Err(e) => debug!("Discarding response for {}: {}", endpoint.key(), e),
        }
    }

    if scanner.in_response() {
        debug!(
            "Documentation ended inside a response section for {:?}",
            scanner.current().map(Endpoint::key)
        );
    }
    table
}
