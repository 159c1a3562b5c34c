use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::normalize::normalize_path;

/// Top level of a Postman-style collection export.
#[derive(Debug, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub item: Vec<Node>,
}

/// Folder, request, or something this tool doesn't care about.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Folder {
        #[serde(default)]
        name: String,
        item: Vec<Node>,
    },
    Request {
        #[serde(default)]
        name: String,
        request: RequestSpec,
    },
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub struct RequestSpec {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: Option<UrlSpec>,
    #[serde(default)]
    pub body: Option<BodySpec>,
    #[serde(default)]
    pub description: Option<Description>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UrlSpec {
    Raw(String),
    Structured {
        #[serde(default)]
        raw: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct BodySpec {
    #[serde(default)]
    pub raw: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Content {
        #[serde(default)]
        content: Option<String>,
    },
}

fn default_method() -> String {
    "GET".to_string()
}

/// Request body as found in the collection: parsed when it is valid JSON,
/// otherwise the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Raw(String),
}

impl RequestBody {
    fn from_raw(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => RequestBody::Json(value),
            Err(_) => RequestBody::Raw(raw.to_string()),
        }
    }

    /// The body as a JSON object, if it is one.
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(value @ Value::Object(_)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub name: String,
    pub folder: String,
    pub method: String,
    pub url: String,
    pub normalized_url: String,
    pub request_body: Option<RequestBody>,
    pub description: Option<String>,
}

pub fn parse_collection(json: &str) -> serde_json::Result<Collection> {
    serde_json::from_str(json)
}

/// Walk the folder tree depth-first and emit one descriptor per request, in
/// document order.
pub fn extract_endpoints(collection: &Collection) -> Vec<EndpointDescriptor> {
    let mut endpoints = Vec::new();
    walk(&collection.item, "", &mut endpoints);
    endpoints
}

fn walk(nodes: &[Node], folder: &str, out: &mut Vec<EndpointDescriptor>) {
    for node in nodes {
        match node {
            Node::Folder { name, item } => {
                let breadcrumb = if folder.is_empty() {
                    name.clone()
                } else {
                    format!("{} > {}", folder, name)
                };
                walk(item, &breadcrumb, out);
            }
            Node::Request { name, request } => out.push(describe(name, folder, request)),
            Node::Other(_) => debug!("Skipping collection node with neither item nor request"),
        }
    }
}

fn describe(name: &str, folder: &str, request: &RequestSpec) -> EndpointDescriptor {
    let url = match &request.url {
        Some(UrlSpec::Raw(s)) => s.clone(),
        Some(UrlSpec::Structured { raw }) => raw.clone().unwrap_or_default(),
        None => String::new(),
    };

    let request_body = request
        .body
        .as_ref()
        .and_then(|b| b.raw.as_deref())
        .map(RequestBody::from_raw);

    let description = match &request.description {
        Some(Description::Text(t)) => Some(t.clone()),
        Some(Description::Content { content }) => content.clone(),
        None => None,
    };

    EndpointDescriptor {
        name: name.to_string(),
        folder: folder.to_string(),
        method: request.method.clone(),
        normalized_url: normalize_path(&url),
        url,
        request_body,
        description,
    }
}
