use std::path::Path;

use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::SheetsError;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Result of a publish: where the rows ended up.
#[derive(Debug)]
pub struct PublishOutcome {
    pub spreadsheet_id: String,
    pub url: String,
    pub rows: usize,
    pub created: bool,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    spreadsheet_id: String,
    #[serde(default)]
    spreadsheet_url: Option<String>,
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Thin client over the spreadsheet and drive REST endpoints. Calls are made
/// one after another.
pub struct SheetsClient {
    client: Client,
    token: String,
    sheets_api: String,
    drive_api: String,
}

impl SheetsClient {
    pub fn new(token: String, sheets_api: &str, drive_api: &str) -> Result<Self, SheetsError> {
        if token.trim().is_empty() {
            return Err(SheetsError::MissingToken);
        }
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            token,
            sheets_api: sheets_api.trim_end_matches('/').to_string(),
            drive_api: drive_api.trim_end_matches('/').to_string(),
        })
    }

    /// Open the spreadsheet called `title` (creating it if needed), clear its
    /// first worksheet and write `rows` from A1.
    pub async fn publish(
        &self,
        title: &str,
        rows: &[Vec<String>],
    ) -> Result<PublishOutcome, SheetsError> {
        let (spreadsheet_id, created) = match self.find_spreadsheet(title).await? {
            Some(id) => {
                info!("Opened existing sheet: {}", title);
                (id, false)
            }
            None => {
                let id = self.create_spreadsheet(title).await?;
                info!("Created new sheet: {}", title);
                (id, true)
            }
        };

        let meta = self.spreadsheet(&spreadsheet_id).await?;
        let worksheet = meta
            .sheets
            .first()
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| {
                SheetsError::Response(format!("spreadsheet {} has no worksheets", spreadsheet_id))
            })?;

        self.clear(&spreadsheet_id, &worksheet).await?;
        self.update(&spreadsheet_id, &worksheet, rows).await?;

        let url = meta.spreadsheet_url.unwrap_or_else(|| {
            format!("https://docs.google.com/spreadsheets/d/{}", spreadsheet_id)
        });
        Ok(PublishOutcome {
            spreadsheet_id,
            url,
            rows: rows.len(),
            created,
        })
    }

    async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>, SheetsError> {
        let url = endpoint(&self.drive_api, &["files"])?;
        let query = drive_query(title);
        let params = [("q", query.as_str()), ("fields", "files(id,name)")];
        let list: FileList = self.send(self.client.get(url).query(&params)).await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String, SheetsError> {
        let url = endpoint(&self.sheets_api, &["spreadsheets"])?;
        let created: Spreadsheet = self
            .send(self.client.post(url).json(&json!({ "properties": { "title": title } })))
            .await?;
        Ok(created.spreadsheet_id)
    }

    async fn spreadsheet(&self, id: &str) -> Result<Spreadsheet, SheetsError> {
        let url = endpoint(&self.sheets_api, &["spreadsheets", id])?;
        self.send(
            self.client
                .get(url)
                .query(&[("fields", "spreadsheetId,spreadsheetUrl,sheets.properties.title")]),
        )
        .await
    }

    async fn clear(&self, id: &str, worksheet: &str) -> Result<(), SheetsError> {
        let range = format!("{}:clear", quote_sheet(worksheet));
        let url = endpoint(&self.sheets_api, &["spreadsheets", id, "values", &range])?;
        let _: Value = self.send(self.client.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        worksheet: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let range = a1_range(worksheet);
        let url = endpoint(&self.sheets_api, &["spreadsheets", id, "values", &range])?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let _: Value = self
            .send(self.client.put(url).query(&[("valueInputOption", "RAW")]).json(&body))
            .await?;
        Ok(())
    }

    async fn send<T>(&self, req: RequestBuilder) -> Result<T, SheetsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = req.bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api { status, body });
        }
        Ok(resp.json().await?)
    }
}

/// Join path segments onto a base URL, percent-encoding each segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::Url(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url(format!("{} cannot take path segments", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn drive_query(title: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        title.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME
    )
}

/// Worksheet name in A1 notation, quoted with embedded quotes doubled.
fn quote_sheet(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn a1_range(worksheet: &str) -> String {
    format!("{}!A1", quote_sheet(worksheet))
}

/// Every record of a CSV file, header included, as strings.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, SheetsError> {
    let to_err = |source| SheetsError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(to_err)?;
    reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()).map_err(to_err))
        .collect()
}
