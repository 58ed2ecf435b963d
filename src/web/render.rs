//! HTML rendering. All user-supplied text goes through `escape`.

use crate::metrics::score_distribution;
use crate::models::Threshold;
use crate::pipeline::PredictionRun;
use crate::types::Dataset;
use crate::web::AppState;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:260px;padding:1rem;background:#f3f4f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem;overflow-x:auto}\
table{border-collapse:collapse;font-size:.85rem}\
td,th{border:1px solid #d1d5db;padding:.25rem .5rem;text-align:right}\
.metrics{display:flex;gap:2rem}.metric b{display:block;font-size:1.6rem}\
.error{background:#fee2e2;color:#991b1b;padding:.75rem}\
.warning{background:#fef3c7;padding:.5rem}.ok{background:#dcfce7;padding:.5rem}";

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(state: &AppState, threshold: Threshold, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>ATM Fraud Detection</title><style>{STYLE}</style></head><body>\
<aside><h2>Controls</h2>\
<p>Current threshold: <strong>{threshold}</strong></p>\
<p>Default threshold: {default}</p>\
<p class=\"warning\">Changing threshold affects precision &amp; recall trade-off.</p>\
<hr><p class=\"ok\">Model loaded successfully</p></aside>\
<main><h1>ATM Fraud Detection</h1>{body}\
<hr><small>Model: {model} | ATM Fraud Detection System</small></main></body></html>",
        default = state.default_threshold,
        model = escape(state.model.name()),
    )
}

fn threshold_input(threshold: Threshold) -> String {
    format!(
        "<label>Decision Threshold <input type=\"number\" name=\"threshold\" \
min=\"0\" max=\"1\" step=\"0.01\" value=\"{}\"></label>",
        threshold.value()
    )
}

fn upload_form(threshold: Threshold) -> String {
    format!(
        "<h3>Upload Transaction Data (CSV)</h3>\
<form action=\"/preview\" method=\"post\" enctype=\"multipart/form-data\" novalidate>\
<p>CSV must contain the same columns used during training</p>\
<p><input type=\"file\" name=\"file\" accept=\".csv,text/csv\" required></p>\
<p>{}</p><button type=\"submit\">Upload</button></form>",
        threshold_input(threshold)
    )
}

/// Form re-posting the upload to `action`
fn carry_form(action: &str, csv_text: &str, threshold_field: &str, label: &str) -> String {
    format!(
        "<form action=\"{action}\" method=\"post\" enctype=\"multipart/form-data\" novalidate>\
<textarea name=\"csv\" hidden>{}</textarea><p>{threshold_field}</p>\
<button type=\"submit\">{label}</button></form>",
        escape(csv_text)
    )
}

fn table(dataset: &Dataset) -> String {
    let mut html = String::from("<table><thead><tr>");
    for column in dataset.columns() {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in dataset.rows() {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn index_page(state: &AppState) -> String {
    let threshold = state.default_threshold;
    let body = format!(
        "<p class=\"ok\">Model and preprocessing pipeline loaded</p>{}",
        upload_form(threshold)
    );
    layout(state, threshold, &body)
}

pub fn preview_page(state: &AppState, threshold: Threshold, dataset: &Dataset, csv_text: &str) -> String {
    let preview = dataset.head(state.presentation.preview_rows);
    let body = format!(
        "<h3>Uploaded Data Preview</h3><p>{} rows, {} columns</p>{}{}",
        dataset.len(),
        dataset.columns().len(),
        table(&preview),
        carry_form("/predict", csv_text, &threshold_input(threshold), "Run Predictions"),
    );
    layout(state, threshold, &body)
}

pub fn results_page(state: &AppState, run: &PredictionRun, csv_text: &str) -> String {
    let summary = &run.summary;
    let mut body = format!(
        "<h3>Prediction Results</h3>{}\
<div class=\"metrics\">\
<div class=\"metric\" title=\"All uploaded rows\">Total Transactions<b>{}</b></div>\
<div class=\"metric\" title=\"Number of transactions classified as fraud\">Fraudulent Detected<b>{}</b></div>\
<div class=\"metric\" title=\"Fraud transactions as % of total\">Fraud Percentage<b>{}</b></div>\
</div>",
        table(&run.result_table(state.presentation.result_rows)),
        summary.total,
        summary.fraud_count,
        summary.fraud_pct_display(),
    );

    if summary.total > 0 {
        body.push_str("<h4>Fraud probability distribution</h4><table><tr>");
        for (i, count) in score_distribution(&run.probabilities()).iter().enumerate() {
            let _ = write!(
                body,
                "<td>{:.1}-{:.1}: {}</td>",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count
            );
        }
        body.push_str("</tr></table>");
    }

    let hidden_threshold = format!(
        "<input type=\"hidden\" name=\"threshold\" value=\"{}\">",
        run.threshold.value()
    );
    body.push_str("<h3>Download Predictions</h3>");
    body.push_str(&carry_form(
        "/download",
        csv_text,
        &hidden_threshold,
        "Download CSV (0 = Legit, 1 = Fraud)",
    ));
    let _ = write!(body, "<p><small>Run {}</small></p>", run.run_id);
    body.push_str(&upload_form(run.threshold));

    layout(state, run.threshold, &body)
}

pub fn error_page(state: &AppState, threshold: Threshold, message: &str) -> String {
    let body = format!(
        "<p class=\"error\">Error: {}</p>{}",
        escape(message),
        upload_form(threshold)
    );
    layout(state, threshold, &body)
}
