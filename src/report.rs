use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ReportError;
use crate::parser;
use crate::parser::collection::EndpointDescriptor;
use crate::parser::docs::ResponseTable;
use crate::parser::flatten::{flatten, type_name};
use crate::parser::normalize::endpoint_key;

pub const HEADER: [&str; 7] = [
    "Route Name",
    "Method",
    "URL",
    "Output Variable Name",
    "Variable Type",
    "Example",
    "Source",
];

const NOT_AVAILABLE: &str = "N/A";
const SCALAR_FIELD: &str = "response";
const MAX_EXAMPLE_CHARS: usize = 100;

/// Where a row's example data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    #[serde(rename = "API Docs")]
    ApiDocs,
    #[serde(rename = "Inferred from Request")]
    InferredFromRequest,
    #[serde(rename = "No Example")]
    NoExample,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::ApiDocs => "API Docs",
            Source::InferredFromRequest => "Inferred from Request",
            Source::NoExample => "No Example",
        })
    }
}

/// One line of the output CSV; field order matches `HEADER`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub route_name: String,
    pub method: String,
    pub url: String,
    pub field: String,
    pub type_name: String,
    pub example: String,
    pub source: Source,
}

#[derive(Debug, Default, PartialEq)]
pub struct ReportSummary {
    pub endpoints: usize,
    pub rows: usize,
    pub documented: usize,
    pub inferred: usize,
    pub missing: usize,
}

impl ReportSummary {
    pub fn from_rows(endpoints: usize, rows: &[ReportRow]) -> Self {
        let count = |s: Source| rows.iter().filter(|r| r.source == s).count();
        ReportSummary {
            endpoints,
            rows: rows.len(),
            documented: count(Source::ApiDocs),
            inferred: count(Source::InferredFromRequest),
            missing: count(Source::NoExample),
        }
    }

    pub fn print(&self) {
        println!(
            "Wrote {} rows for {} endpoints ({} from docs, {} inferred, {} without example).",
            self.rows, self.endpoints, self.documented, self.inferred, self.missing,
        );
    }
}

/// Pick the example for an endpoint: documented response first, then an
/// object request body, else nothing.
pub fn choose_example<'a>(
    endpoint: &'a EndpointDescriptor,
    responses: &'a ResponseTable,
) -> (Option<&'a Value>, Source) {
    let key = endpoint_key(&endpoint.method, &endpoint.normalized_url);
    if let Some(documented) = responses.get(&key) {
        return (Some(documented), Source::ApiDocs);
    }
    match endpoint.request_body.as_ref().and_then(|b| b.as_object()) {
        Some(body) => (Some(body), Source::InferredFromRequest),
        None => (None, Source::NoExample),
    }
}

pub fn assemble(endpoints: &[EndpointDescriptor], responses: &ResponseTable) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for endpoint in endpoints {
        let (example, source) = choose_example(endpoint, responses);
        debug!(
            route = %endpoint.name,
            folder = %endpoint.folder,
            description = endpoint.description.as_deref().unwrap_or(""),
            key = %endpoint_key(&endpoint.method, &endpoint.normalized_url),
            %source,
            "Matched endpoint"
        );
        rows.extend(endpoint_rows(endpoint, example, source));
    }
    rows
}

fn endpoint_rows(
    endpoint: &EndpointDescriptor,
    example: Option<&Value>,
    source: Source,
) -> Vec<ReportRow> {
    let row = |field: &str, kind: &str, example: String| ReportRow {
        route_name: endpoint.name.clone(),
        method: endpoint.method.clone(),
        url: endpoint.url.clone(),
        field: field.to_string(),
        type_name: kind.to_string(),
        example,
        source,
    };

    let Some(value) = example else {
        return vec![row(NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE.to_string())];
    };

    if value.is_object() || value.is_array() {
        let fields = flatten(value, "");
        if !fields.is_empty() {
            return fields
                .iter()
                .map(|(path, v)| row(path.as_str(), type_name(v), render_example(v)))
                .collect();
        }
    }

    // Bare scalars, and containers with nothing to flatten.
    vec![row(SCALAR_FIELD, type_name(value), render_example(value))]
}

/// Strings as-is, everything else as compact JSON, cut to 100 characters.
pub fn render_example(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(MAX_EXAMPLE_CHARS).collect()
}

pub fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<(), ReportError> {
    let to_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_err)?;
    writer.write_record(HEADER).map_err(to_err)?;
    for row in rows {
        writer.serialize(row).map_err(to_err)?;
    }
    writer.flush().map_err(|e| to_err(e.into()))?;
    Ok(())
}

fn read_input(path: &Path) -> Result<String, ReportError> {
    std::fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Full pipeline: read both sources, match, write the CSV.
pub fn run(collection: &Path, docs: &Path, output: &Path) -> Result<ReportSummary, ReportError> {
    let collection_json = read_input(collection)?;
    let markdown = read_input(docs)?;

    let (endpoints, responses) =
        parser::parse_sources(&collection_json, &markdown).map_err(|source| {
            ReportError::Collection {
                path: collection.to_path_buf(),
                source,
            }
        })?;
    info!(
        "Loaded {} endpoints and {} documented responses",
        endpoints.len(),
        responses.len()
    );

    let rows = assemble(&endpoints, &responses);
    write_csv(output, &rows)?;

    let summary = ReportSummary::from_rows(endpoints.len(), &rows);
    info!(rows = summary.rows, output = %output.display(), "Report written");
    Ok(summary)
}
