// UI layer: the three operation flows and all response rendering.
// Output goes through a caller-supplied writer so tests can capture it;
// diagnostics (skipped rows, unreadable files) go to stderr so a piped
// listing stays clean.

use crate::api::{text_of, Envelope, PasteDetail, StickyClient};
use anyhow::Result;
use chrono::DateTime;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Expiration used when `--expire` is not given, in minutes.
pub const DEFAULT_EXPIRE_MINUTES: i64 = 30;

/// Options for a paste-creation request. Absence is represented by the
/// `Option` itself, never by an empty sentinel; a supplied-but-empty
/// string counts as absent. `private` is a plain bool because the wire
/// format only distinguishes "sent as true" from "not sent at all".
#[derive(Debug, Default)]
pub struct PasteOptions {
    pub title: Option<String>,
    pub language: Option<String>,
    pub password: Option<String>,
    pub private: bool,
    pub expire_minutes: Option<i64>,
    pub project: Option<String>,
}

/// One rendered row of the paste listing.
#[derive(Debug, PartialEq)]
pub struct PasteSummary {
    pub id: String,
    pub author: String,
    pub title: String,
    pub project: String,
    pub language: String,
    pub date: String,
    pub url: String,
}

impl PasteSummary {
    /// Flatten a detail record for display: missing author/title/project
    /// become `n/a`, the UNIX timestamp becomes `YYYY/MM/DD`, and the
    /// paste URL is `{site}/{id}`.
    pub fn from_detail(site: &str, detail: &PasteDetail) -> PasteSummary {
        PasteSummary {
            id: detail.id.clone(),
            author: or_na(&detail.author),
            title: or_na(&detail.title),
            project: or_na(&detail.project),
            language: detail.language.clone(),
            date: format_date(&detail.timestamp),
            url: format!("{}/{}", site, detail.id),
        }
    }
}

fn or_na(field: &Option<String>) -> String {
    field
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "n/a".to_string())
}

// Dates render in UTC; service timestamps carry no timezone, so local
// rendering would shift rows near midnight between machines.
fn format_date(timestamp: &Value) -> String {
    let seconds = timestamp
        .as_i64()
        .or_else(|| timestamp.as_str().and_then(|s| s.trim().parse().ok()));
    seconds
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

/// List the valid values of a service parameter, one per line.
pub fn parameter_values<W: Write>(api: &StickyClient, name: &str, out: &mut W) -> Result<()> {
    let result = api.parameter(name)?;
    render_result(api, out, &result)
}

/// List every paste on the service as a fixed-width table. Each paste
/// costs one extra round trip for its detail record; a row whose detail
/// fetch fails is reported and skipped, the listing keeps going.
pub fn list_pastes<W: Write>(api: &StickyClient, out: &mut W) -> Result<()> {
    let result = api.list_all()?;
    render_result(api, out, &result)
}

/// Create a paste from a local file. An unreadable file aborts the
/// operation before any request is sent; it is not a process failure.
pub fn create_paste<W: Write>(
    api: &StickyClient,
    file: &Path,
    opts: &PasteOptions,
    out: &mut W,
) -> Result<()> {
    let data = match fs::read_to_string(file) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to open paste file {}: {}", file.display(), err);
            return Ok(());
        }
    };
    let file_name = file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let expire = api.nearest_expire(opts.expire_minutes.unwrap_or(DEFAULT_EXPIRE_MINUTES));
    let params = paste_params(file_name, data, opts, expire);
    let result = api.create(&params)?;
    render_result(api, out, &result)
}

/// Assemble the form parameters for `/create`. Title falls back to the
/// file name, language to `text`; `expire` is always sent (already
/// snapped to a supported value); empty optionals are dropped; `private`
/// is sent only when true.
pub fn paste_params(
    file_name: &str,
    data: String,
    opts: &PasteOptions,
    expire_seconds: i64,
) -> Vec<(&'static str, String)> {
    let title = supplied(&opts.title).unwrap_or_else(|| file_name.to_string());
    let language = supplied(&opts.language).unwrap_or_else(|| "text".to_string());
    let mut params = vec![
        ("title", title),
        ("language", language),
        ("data", data),
        ("expire", expire_seconds.to_string()),
    ];
    if let Some(password) = supplied(&opts.password) {
        params.push(("password", password));
    }
    if let Some(project) = supplied(&opts.project) {
        params.push(("project", project));
    }
    if opts.private {
        params.push(("private", "true".to_string()));
    }
    params
}

fn supplied(field: &Option<String>) -> Option<String> {
    field.clone().filter(|s| !s.is_empty())
}

/// Render a `result` object against a live client. Thin wrapper that
/// binds the per-paste detail fetches to the client; the actual
/// rendering lives in `render_envelope` so it can be tested without a
/// running service.
fn render_result<W: Write>(api: &StickyClient, out: &mut W, result: &Value) -> Result<()> {
    render_envelope(out, api.site(), result, |id| paste_details(api, id))
}

/// Render a `result` object according to its envelope tag. The pastes
/// branch asks `fetch_detail` for each row; a `None` means that paste's
/// detail could not be retrieved (already reported) and the row is
/// skipped.
fn render_envelope<W, F>(out: &mut W, site: &str, result: &Value, mut fetch_detail: F) -> Result<()>
where
    W: Write,
    F: FnMut(&str) -> Option<PasteDetail>,
{
    match Envelope::classify(result) {
        Envelope::Error(msg) => writeln!(out, "Error: {}", msg)?,
        Envelope::Values(values) => {
            for value in &values {
                writeln!(out, "{}", text_of(value))?;
            }
        }
        Envelope::Pastes(ids) => {
            write_table_header(out)?;
            for id in &ids {
                if let Some(detail) = fetch_detail(id) {
                    let summary = PasteSummary::from_detail(site, &detail);
                    writeln!(out, "{}", summary_row(&summary))?;
                }
            }
        }
        Envelope::Id(id) => writeln!(out, "{}/{}", site, id)?,
        Envelope::Other(raw) => writeln!(out, "{}", raw)?,
    }
    Ok(())
}

/// Fetch one paste's detail record. Any failure here (service error,
/// transport error, malformed record) is reported to stderr and the
/// paste skipped, so one broken paste cannot abort the listing.
fn paste_details(api: &StickyClient, id: &str) -> Option<PasteDetail> {
    let result = match api.show(id) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Error retrieving paste {}: {:#}", id, err);
            return None;
        }
    };
    if let Envelope::Error(msg) = Envelope::classify(&result) {
        eprintln!("Error retrieving paste {}: {}", id, msg);
        return None;
    }
    match serde_json::from_value(result) {
        Ok(detail) => Some(detail),
        Err(err) => {
            eprintln!("Error retrieving paste {}: {}", id, err);
            None
        }
    }
}

fn table_row(cells: [&str; 7]) -> String {
    format!(
        "{:<15} {:<15} {:<15} {:<15} {:<10} {:<10} {}",
        cells[0], cells[1], cells[2], cells[3], cells[4], cells[5], cells[6]
    )
}

fn write_table_header<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "{}",
        table_row(["Id", "Author", "Title", "Project", "Language", "Date", "URL"])
    )?;
    let dash = "-".repeat(10);
    writeln!(out, "{}", table_row([dash.as_str(); 7]))
}

fn summary_row(summary: &PasteSummary) -> String {
    table_row([
        &summary.id,
        &summary.author,
        &summary.title,
        &summary.project,
        &summary.language,
        &summary.date,
        &summary.url,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PasteDetail;
    use serde_json::json;

    fn detail(value: serde_json::Value) -> PasteDetail {
        serde_json::from_value(value).expect("detail should deserialize")
    }

    #[test]
    fn summary_substitutes_na_for_missing_fields() {
        let detail = detail(json!({
            "id": "abc123",
            "language": "text",
            "timestamp": 0,
        }));
        let summary = PasteSummary::from_detail("http://example.org", &detail);
        assert_eq!(summary.author, "n/a");
        assert_eq!(summary.title, "n/a");
        assert_eq!(summary.project, "n/a");
        assert_eq!(summary.date, "1970/01/01");
        assert_eq!(summary.url, "http://example.org/abc123");
    }

    #[test]
    fn summary_treats_empty_strings_as_missing() {
        let detail = detail(json!({
            "id": "abc123",
            "author": "",
            "title": "notes",
            "language": "text",
            "timestamp": "1400000000",
        }));
        let summary = PasteSummary::from_detail("http://example.org", &detail);
        assert_eq!(summary.author, "n/a");
        assert_eq!(summary.title, "notes");
        // String timestamps parse the same as numeric ones.
        assert_eq!(summary.date, "2014/05/13");
    }

    #[test]
    fn summary_date_falls_back_on_bad_timestamp() {
        let detail = detail(json!({
            "id": "abc123",
            "language": "text",
            "timestamp": "soon",
        }));
        let summary = PasteSummary::from_detail("http://example.org", &detail);
        assert_eq!(summary.date, "n/a");
    }

    #[test]
    fn paste_params_applies_defaults() {
        let opts = PasteOptions::default();
        let params = paste_params("notes.txt", "hello".to_string(), &opts, 1800);
        assert_eq!(
            params,
            vec![
                ("title", "notes.txt".to_string()),
                ("language", "text".to_string()),
                ("data", "hello".to_string()),
                ("expire", "1800".to_string()),
            ]
        );
    }

    #[test]
    fn paste_params_omits_empty_optionals() {
        let opts = PasteOptions {
            title: Some(String::new()),
            password: Some(String::new()),
            project: Some("infra".to_string()),
            ..Default::default()
        };
        let params = paste_params("notes.txt", "hello".to_string(), &opts, 1800);
        // Empty title falls back to the file name, empty password is dropped.
        assert!(params.contains(&("title", "notes.txt".to_string())));
        assert!(!params.iter().any(|(name, _)| *name == "password"));
        assert!(params.contains(&("project", "infra".to_string())));
    }

    #[test]
    fn paste_params_sends_private_only_when_true() {
        let opts = PasteOptions {
            private: false,
            ..Default::default()
        };
        let params = paste_params("notes.txt", String::new(), &opts, 0);
        assert!(!params.iter().any(|(name, _)| *name == "private"));

        let opts = PasteOptions {
            private: true,
            ..Default::default()
        };
        let params = paste_params("notes.txt", String::new(), &opts, 0);
        assert!(params.contains(&("private", "true".to_string())));
    }

    #[test]
    fn table_header_matches_column_layout() {
        let mut out = Vec::new();
        write_table_header(&mut out).expect("writing to a Vec cannot fail");
        let text = String::from_utf8(out).expect("header is utf-8");
        let mut lines = text.lines();
        let header = lines.next().expect("header line");
        assert!(header.starts_with("Id"));
        assert!(header.ends_with("URL"));
        let separator = lines.next().expect("separator line");
        assert_eq!(separator.matches("----------").count(), 7);
    }

    fn rendered<F>(result: serde_json::Value, fetch_detail: F) -> String
    where
        F: FnMut(&str) -> Option<PasteDetail>,
    {
        let mut out = Vec::new();
        render_envelope(&mut out, "http://example.org", &result, fetch_detail)
            .expect("rendering to a Vec cannot fail");
        String::from_utf8(out).expect("output is utf-8")
    }

    #[test]
    fn error_result_renders_only_the_message() {
        let output = rendered(json!({ "error": "bad id" }), |_| None);
        assert_eq!(output, "Error: bad id\n");
    }

    #[test]
    fn id_result_renders_the_paste_url() {
        let output = rendered(json!({ "id": "abc123" }), |_| None);
        assert_eq!(output, "http://example.org/abc123\n");
    }

    #[test]
    fn values_result_renders_one_per_line() {
        let output = rendered(json!({ "values": ["1800", 3600] }), |_| None);
        assert_eq!(output, "1800\n3600\n");
    }

    #[test]
    fn listing_skips_pastes_whose_detail_fetch_fails() {
        let output = rendered(json!({ "pastes": ["good", "broken"] }), |id| {
            if id == "good" {
                Some(detail(json!({
                    "id": "good",
                    "author": "moy",
                    "language": "text",
                    "timestamp": 1400000000,
                })))
            } else {
                None
            }
        });
        let lines: Vec<&str> = output.lines().collect();
        // Header, separator, and the one surviving row.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Id"));
        assert!(lines[1].starts_with("----------"));
        assert!(lines[2].starts_with("good"));
        assert!(lines[2].ends_with("http://example.org/good"));
    }

    #[test]
    fn summary_row_pads_columns() {
        let summary = PasteSummary {
            id: "abc123".to_string(),
            author: "n/a".to_string(),
            title: "notes".to_string(),
            project: "n/a".to_string(),
            language: "text".to_string(),
            date: "2014/05/13".to_string(),
            url: "http://example.org/abc123".to_string(),
        };
        let row = summary_row(&summary);
        assert!(row.starts_with("abc123 "));
        assert!(row.ends_with("http://example.org/abc123"));
        // Four 15-wide columns plus the 10-wide language column, each
        // followed by a separating space, put the date at offset 75.
        assert_eq!(row.find("2014/05/13"), Some(75));
    }
}
