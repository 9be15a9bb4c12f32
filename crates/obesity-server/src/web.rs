//! Form UI
//!
//! Renders the feature form, forwards submissions to the inference API and
//! shows the returned label. Transport modes are displayed with spaces and
//! sent with underscores.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Router,
};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::{Deserialize, Serialize};

use obesity_classifier::features::{Frequency, Gender, Transport};

use crate::api::PredictionResponse;

const YES_NO: [&str; 2] = ["no", "yes"];

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; }
aside { width: 12rem; padding: 1rem; background: #f0f2f6; min-height: 100vh; }
aside a { display: block; margin: 0.5rem 0; }
main { max-width: 40rem; padding: 1rem 2rem; }
label { display: block; margin-top: 0.8rem; }
input, select { width: 100%; }
.result { margin-top: 1rem; padding: 0.8rem; background: #dff0d8; }
.error { margin-top: 1rem; padding: 0.8rem; background: #f2dede; }
"#;

/// State for the UI: where the API lives and a reusable HTTP client.
pub struct WebState {
    pub api_url: String,
    pub client: reqwest::Client,
}

impl WebState {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.api_url.trim_end_matches('/'))
    }
}

/// Display form of a transport mode: underscores become spaces.
pub fn display_label(label: &str) -> String {
    label.replace('_', " ")
}

/// Wire form of a transport mode: spaces become underscores.
pub fn encode_transport(label: &str) -> String {
    label.replace(' ', "_")
}

/// Values of every form control. Field names match the API request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValues {
    pub gender: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub family_history_with_overweight: String,
    pub favc: String,
    pub fcvc: f64,
    pub ncp: f64,
    pub caec: String,
    pub smoke: String,
    pub ch20: f64,
    pub scc: String,
    pub faf: f64,
    pub tue: f64,
    pub calc: String,
    pub mtrans: String,
}

impl Default for FormValues {
    fn default() -> Self {
        FormValues {
            gender: "Male".into(),
            age: 18,
            height: 1.80,
            weight: 78.0,
            family_history_with_overweight: "no".into(),
            favc: "no".into(),
            fcvc: 2.5,
            ncp: 3.0,
            caec: "no".into(),
            smoke: "no".into(),
            ch20: 2.1,
            scc: "yes".into(),
            faf: 1.9,
            tue: 1.4,
            calc: "no".into(),
            mtrans: "Walking".into(),
        }
    }
}

impl FormValues {
    /// Sidebar presets; anything else yields the defaults.
    pub fn preset(number: u8) -> Self {
        match number {
            1 => FormValues {
                gender: "Male".into(),
                age: 19,
                height: 1.76,
                weight: 83.0,
                family_history_with_overweight: "yes".into(),
                favc: "yes".into(),
                fcvc: 2.15,
                ncp: 2.15,
                caec: "Sometimes".into(),
                smoke: "no".into(),
                ch20: 2.3,
                scc: "no".into(),
                faf: 1.3,
                tue: 2.5,
                calc: "no".into(),
                mtrans: "Public Transportation".into(),
            },
            2 => FormValues {
                gender: "Female".into(),
                age: 24,
                height: 1.58,
                weight: 56.0,
                family_history_with_overweight: "yes".into(),
                favc: "no".into(),
                fcvc: 2.0,
                ncp: 2.15,
                caec: "Sometimes".into(),
                smoke: "no".into(),
                ch20: 1.9,
                scc: "no".into(),
                faf: 1.1,
                tue: 1.9,
                calc: "Sometimes".into(),
                mtrans: "Public Transportation".into(),
            },
            _ => FormValues::default(),
        }
    }

    /// JSON body for `POST /predict`.
    pub fn request_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!(self);
        body["mtrans"] = serde_json::Value::String(encode_transport(&self.mtrans));
        body
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub preset: Option<u8>,
}

enum Outcome {
    Prediction(String),
    Failure(String),
}

fn select_field(label: &str, name: &str, options: &[&str], selected: &str) -> Markup {
    html! {
        label for=(name) { (label) }
        select id=(name) name=(name) {
            @for option in options {
                option value=(option) selected[*option == selected] { (option) }
            }
        }
    }
}

fn number_field(
    label: &str,
    name: &str,
    value: f64,
    (min, max, step): (f64, f64, f64),
    slider: bool,
) -> Markup {
    let kind = if slider { "range" } else { "number" };
    html! {
        label for=(name) { (label) }
        input type=(kind) id=(name) name=(name) value=(value) min=(min) max=(max) step=(step);
    }
}

fn render_page(values: &FormValues, outcome: Option<&Outcome>) -> Markup {
    let genders: Vec<&str> = Gender::ALL.iter().map(|g| g.as_str()).collect();
    let frequencies: Vec<&str> = Frequency::ALL.iter().map(|f| f.as_str()).collect();
    let transports: Vec<String> = Transport::ALL
        .iter()
        .map(|t| display_label(t.as_str()))
        .collect();
    let transports: Vec<&str> = transports.iter().map(String::as_str).collect();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Obesity Classifier" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                aside {
                    h2 { "Presets" }
                    a href="/?preset=1" { "Preset 1" }
                    a href="/?preset=2" { "Preset 2" }
                }
                main {
                    h1 { "Obesity Classification Prediction" }
                    form method="post" action="/classify" {
                        (select_field("Gender", "gender", &genders, &values.gender))
                        label for="age" { "Age" }
                        input type="number" id="age" name="age" value=(values.age) min="1" max="120" step="1";
                        (number_field("Height (in meters)", "height", values.height, (0.1, 3.0, 0.01), false))
                        (number_field("Weight (in kg)", "weight", values.weight, (1.0, 300.0, 0.1), false))
                        (select_field("Family History with Overweight", "family_history_with_overweight", &YES_NO, &values.family_history_with_overweight))
                        (select_field("Frequent Consumption of High Calorie Food", "favc", &YES_NO, &values.favc))
                        (number_field("Vegetable Consumption Ratio in Meals", "fcvc", values.fcvc, (1.0, 3.0, 0.01), true))
                        (number_field("Average Count of Main Meals in a Day", "ncp", values.ncp, (1.0, 3.0, 0.01), false))
                        (select_field("Frequency of Consuming Snacks Between Meals", "caec", &frequencies, &values.caec))
                        (select_field("Smoking", "smoke", &YES_NO, &values.smoke))
                        (number_field("Water Consumption (in litres)", "ch20", values.ch20, (1.0, 3.0, 0.01), false))
                        (select_field("Currently Tracking Calorie Intake", "scc", &YES_NO, &values.scc))
                        (number_field("Physical Activity Frequency", "faf", values.faf, (0.0, 3.0, 0.01), true))
                        (number_field("Time Spent with Electronics", "tue", values.tue, (0.0, 3.0, 0.01), true))
                        (select_field("Frequency of Consuming Alcohol", "calc", &frequencies, &values.calc))
                        (select_field("Main Method of Transport", "mtrans", &transports, &values.mtrans))
                        p { button type="submit" { "Classify Me!" } }
                    }
                    @match outcome {
                        Some(Outcome::Prediction(label)) => {
                            div class="result" { "Classification Result: " strong { (label) } }
                        }
                        Some(Outcome::Failure(message)) => {
                            div class="error" { "Classification failed: " (message) }
                        }
                        None => {}
                    }
                }
            }
        }
    }
}

/// Render the form, optionally filled from a preset
pub async fn index(Query(query): Query<PageQuery>) -> Html<String> {
    let values = query.preset.map(FormValues::preset).unwrap_or_default();
    Html(render_page(&values, None).into_string())
}

async fn request_prediction(state: &WebState, values: &FormValues) -> Result<String, reqwest::Error> {
    let response: PredictionResponse = state
        .client
        .post(state.predict_url())
        .json(&values.request_body())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.prediction)
}

/// Forward the submitted form to the API and render the result
pub async fn classify(
    State(state): State<Arc<WebState>>,
    Form(values): Form<FormValues>,
) -> (StatusCode, Html<String>) {
    match request_prediction(&state, &values).await {
        Ok(prediction) => {
            let label = display_label(&prediction);
            log::info!("Classified submission as {}", prediction);
            (
                StatusCode::OK,
                Html(render_page(&values, Some(&Outcome::Prediction(label))).into_string()),
            )
        }
        Err(e) => {
            log::error!("Prediction request to {} failed: {}", state.predict_url(), e);
            (
                StatusCode::BAD_GATEWAY,
                Html(render_page(&values, Some(&Outcome::Failure(e.to_string()))).into_string()),
            )
        }
    }
}

/// Create the UI router
pub fn create_router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/classify", post(classify))
        .with_state(state)
}

/// Start the UI server
pub async fn serve(addr: &str, state: Arc<WebState>) -> anyhow::Result<()> {
    log::info!("Forwarding predictions to {}", state.predict_url());
    crate::serve_router(addr, create_router(state), "Form UI").await
}
