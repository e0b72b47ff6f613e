//! HTML rendering for the form, result and error pages

use axum::http::StatusCode;

use crate::config::Variant;
use crate::narrative::{Narrative, PREVENTION_HEADING, PREVENTION_TIPS};
use crate::patient::{Age, Gender, PatientRecord};
use crate::screening::ScreeningOutcome;
use crate::utils::{html_escape, FeatureMatrix};

use super::REPORT_URL;

/// What a page needs to know about the running front-end
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    pub variant: Variant,
    /// Whether `/static` is mounted with the branding images
    pub show_images: bool,
}

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; background-color: #f0f0f0; margin: 0; color: #222; }
.stApp { display: flex; max-width: 100%; min-height: 100vh; }
.stSidebar { background-color: #333; color: #fff; padding: 20px; width: 300px; flex-shrink: 0; }
.stSidebar h2 { margin-top: 0; }
.stSidebar label { display: block; margin: 12px 0 4px; }
.stSidebar input, .stSidebar select { width: 100%; box-sizing: border-box; padding: 6px; border-radius: 5px; border: none; }
.stSidebar a { color: #8cc4ff; }
.stMain { flex: 1; padding: 20px 40px; }
.stTitle { font-size: 24px; font-weight: bold; }
.stFrame { padding: 20px; background-color: #ffffff; box-shadow: 0px 0px 10px rgba(0, 0, 0, 0.1); border-radius: 10px; margin-bottom: 20px; }
.stHeader { background-color: #0074e4; color: #fff; padding: 10px; border-top-left-radius: 10px; border-top-right-radius: 10px; margin: -20px -20px 16px; }
.stColumns { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; }
.stImage { max-width: 100%; border-radius: 10px; }
.stButton { background-color: #0074e4; color: #fff; border: none; border-radius: 5px; padding: 10px 20px; margin-top: 16px; cursor: pointer; transition: background-color 0.3s ease; }
.stButton:hover { background-color: #0058a1; }
.stSuccess { color: #00a400; font-weight: bold; }
.stError { color: #ff0000; font-weight: bold; }
.stCheckbox { margin-top: 10px; }
.stTable { border-collapse: collapse; font-size: 12px; display: block; overflow-x: auto; }
.stTable th, .stTable td { border: 1px solid #ddd; padding: 4px 8px; text-align: right; }
.stFooter { margin-top: 24px; font-size: 12px; color: #bbb; }
"#;

fn layout(ctx: &PageContext, sidebar: &str, main: &str) -> String {
    let sidebar_image = if ctx.show_images {
        r#"<img class="stImage" src="/static/epilepsy.jpg" width="300" alt="">"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Epilepsy Prediction</title>
    <link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🧠</text></svg>">
    <style>{style}</style>
</head>
<body>
<div class="stApp">
    <aside class="stSidebar">
        {sidebar}
        {sidebar_image}
        <p>Epilepsy Prediction and Screening Using EEG</p>
        <p class="stFooter">DATA DYNAMOS - 2023</p>
    </aside>
    <main class="stMain">
        <h1 class="stTitle">Epilepsy Prediction App</h1>
        <p>Welcome to the Epilepsy Prediction App! Enter patient information and upload a CSV file for prediction.</p>
        {main}
    </main>
</div>
</body>
</html>"#,
        style = STYLE,
        sidebar = sidebar,
        sidebar_image = sidebar_image,
        main = main,
    )
}

/// Patient form in the sidebar, pre-filled with `patient`
fn patient_form(patient: &PatientRecord) -> String {
    let options: String = Gender::ALL
        .iter()
        .map(|g| {
            let selected = if *g == patient.gender { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, g.as_str(), selected)
        })
        .collect();

    format!(
        r#"<h2>Patient Information</h2>
        <form action="/predict" method="post" enctype="multipart/form-data">
            <label for="name">Patient Name</label>
            <input id="name" name="name" type="text" value="{name}">
            <label for="age">Patient Age</label>
            <input id="age" name="age" type="number" min="{min}" max="{max}" step="1" value="{age}">
            <label for="gender">Patient Gender</label>
            <select id="gender" name="gender">{options}</select>
            <h2>Upload CSV File</h2>
            <label for="file">Upload a CSV file</label>
            <input id="file" name="file" type="file" accept=".csv" required>
            <button class="stButton" type="submit">Predict</button>
        </form>"#,
        name = html_escape(&patient.name),
        min = Age::MIN,
        max = Age::MAX,
        age = patient.age,
        options = options,
    )
}

fn hero_image(ctx: &PageContext) -> &'static str {
    if ctx.show_images {
        r#"<img class="stImage" src="/static/eeg.png" width="500" alt="EEG">"#
    } else {
        ""
    }
}

pub fn index_page(ctx: &PageContext) -> String {
    layout(ctx, &patient_form(&PatientRecord::default()), hero_image(ctx))
}

fn patient_column(patient: &PatientRecord) -> String {
    format!(
        r#"<div class="stFrame"><h2 class="stHeader">Patient Information</h2>
            <p><strong>Name:</strong> {}</p>
            <p><strong>Age:</strong> {} years</p>
            <p><strong>Gender:</strong> {}</p></div>"#,
        html_escape(&patient.name),
        patient.age,
        patient.gender,
    )
}

fn tips_list() -> String {
    let items: String = PREVENTION_TIPS
        .iter()
        .map(|tip| format!("<li>{}</li>", html_escape(tip)))
        .collect();
    format!("<h3>{}</h3><ol>{}</ol>", PREVENTION_HEADING, items)
}

fn prediction_column(ctx: &PageContext, outcome: &ScreeningOutcome) -> String {
    let narrative = outcome.narrative;
    let mut body = String::from(r#"<div class="stFrame"><h2 class="stHeader">Predictions</h2>"#);
    body.push_str("<h3>Epilepsy Predictions:</h3>");

    match narrative {
        Narrative::Symptomatic => {
            body.push_str(&format!(
                r#"<p class="stError">{} 🧠</p><p>{}</p>"#,
                narrative.headline(),
                narrative.advice()
            ));
            if ctx.show_images {
                body.push_str(r#"<img class="stImage" src="/static/result.png" alt="">"#);
            }
            if ctx.variant.shows_upload_preview() {
                body.push_str(&format!(
                    r#"<details class="stCheckbox"><summary>Show Prevention Measures</summary>{}</details>"#,
                    tips_list()
                ));
            } else {
                body.push_str(&tips_list());
            }
        }
        Narrative::Clear => {
            body.push_str(&format!(
                r#"<p class="stSuccess">{} {}</p>"#,
                narrative.headline(),
                narrative.advice()
            ));
            if ctx.show_images {
                body.push_str(r#"<img class="stImage" src="/static/healthy.jpg" width="300" alt="">"#);
            }
        }
    }

    if outcome.rows() > 1 {
        body.push_str(&format!(
            "<p><small>Classified {} samples, {} flagged. The verdict above is for the first sample.</small></p>",
            outcome.rows(),
            outcome.flagged()
        ));
    }
    body.push_str("</div>");
    body
}

fn preview_table(features: &FeatureMatrix, max_rows: usize) -> String {
    let header: String = features
        .columns()
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows: String = features
        .preview(max_rows)
        .map(|row| {
            let cells: String = row.iter().map(|v| format!("<td>{}</td>", v)).collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    let shown = features.n_rows().min(max_rows);

    format!(
        r#"<div class="stFrame"><h3>Uploaded Data:</h3>
            <table class="stTable"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>
            <p><small>Showing {} of {} rows, {} columns.</small></p></div>"#,
        header,
        rows,
        shown,
        features.n_rows(),
        features.n_cols()
    )
}

/// Result page after a successful prediction
pub fn result_page(
    ctx: &PageContext,
    outcome: &ScreeningOutcome,
    features: &FeatureMatrix,
    preview_rows: usize,
    report_written: bool,
) -> String {
    let mut sidebar = patient_form(&outcome.patient);
    if report_written {
        sidebar.push_str(&format!(
            r#"<p>Download the Epilepsy Prediction Report: <a href="{}">Epilepsy Report PDF</a></p>"#,
            REPORT_URL
        ));
    }

    let mut main = String::new();
    if ctx.variant.shows_upload_preview() {
        main.push_str(&preview_table(features, preview_rows));
    }
    main.push_str(&format!(
        r#"<div class="stColumns">{}{}</div>"#,
        patient_column(&outcome.patient),
        prediction_column(ctx, outcome)
    ));

    layout(ctx, &sidebar, &main)
}

/// Generic failure page; `message` is shown as-is after escaping
pub fn error_page(status: StatusCode, message: &str) -> String {
    let ctx = PageContext { variant: Variant::Forest, show_images: false };
    let main = format!(
        r#"<div class="stFrame"><h2 class="stHeader">Something went wrong ({})</h2>
            <p class="stError">{}</p>
            <p><a href="/">Back to the form</a></p></div>"#,
        status.as_u16(),
        html_escape(message)
    );
    layout(&ctx, &patient_form(&PatientRecord::default()), &main)
}
