use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "ROUTE_REPORT";

pub const DEFAULT_COLLECTION: &str = "postman_collection.json";
pub const DEFAULT_DOCS: &str = "API_ENDPOINTS.md";
pub const DEFAULT_OUTPUT: &str = "route_details_final.csv";
pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

/// Runtime settings: built-in defaults, overridden by `ROUTE_REPORT_*`
/// environment variables. CLI flags are applied on top in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub collection_path: PathBuf,
    pub docs_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub sheets_token: Option<String>,
    pub sheets_api_base: String,
    pub drive_api_base: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("collection_path", DEFAULT_COLLECTION)?
            .set_default("docs_path", DEFAULT_DOCS)?
            .set_default("output_path", DEFAULT_OUTPUT)?
            .set_default("sheets_api_base", DEFAULT_SHEETS_API)?
            .set_default("drive_api_base", DEFAULT_DRIVE_API)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults() {
        let s = Settings::from_env(env(&[])).unwrap();
        assert_eq!(s.collection_path, PathBuf::from("postman_collection.json"));
        assert_eq!(s.docs_path, PathBuf::from("API_ENDPOINTS.md"));
        assert_eq!(s.output_path, PathBuf::from("route_details_final.csv"));
        assert_eq!(s.sheets_token, None);
        assert_eq!(s.sheets_api_base, DEFAULT_SHEETS_API);
    }

    #[test]
    fn environment_overrides() {
        let s = Settings::from_env(env(&[
            ("ROUTE_REPORT_OUTPUT_PATH", "out/report.csv"),
            ("ROUTE_REPORT_SHEETS_TOKEN", "ya29.token"),
        ]))
        .unwrap();
        assert_eq!(s.output_path, PathBuf::from("out/report.csv"));
        assert_eq!(s.sheets_token.as_deref(), Some("ya29.token"));
        assert_eq!(s.docs_path, PathBuf::from("API_ENDPOINTS.md"));
    }
}
