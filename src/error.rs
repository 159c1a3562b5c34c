use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a report run. Anything narrower than a whole input file
/// is absorbed by the parsers instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid collection export")]
    Collection {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write report to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("no sheets access token configured (set ROUTE_REPORT_SHEETS_TOKEN)")]
    MissingToken,
    #[error("cannot read CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid API url: {0}")]
    Url(String),
    #[error("request to sheets API failed")]
    Http(#[from] reqwest::Error),
    #[error("sheets API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected sheets API response: {0}")]
    Response(String),
}
