use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::predictor::{City, InputError, MatchState, Prediction, Predictor, Team};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub loaded_at: DateTime<Utc>,
}

/// Raw form submission; team and city arrive as display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictForm {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    pub target: u32,
    pub current_score: u32,
    pub wickets_fallen: u8,
    pub overs_completed: f64,
}

impl TryFrom<PredictForm> for MatchState {
    type Error = InputError;

    fn try_from(form: PredictForm) -> Result<Self, Self::Error> {
        MatchState::new(
            form.batting_team.parse()?,
            form.bowling_team.parse()?,
            form.city.parse()?,
            form.target,
            form.current_score,
            form.wickets_fallen,
            form.overs_completed,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct Options {
    pub teams: Vec<String>,
    pub cities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: String,
    pub model: String,
    pub loaded_at: DateTime<Utc>,
}

/// Build the Axum router for the prediction form.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/options", get(options_handler))
        .route("/api/predict", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn select_options<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|n| format!(r#"<option value="{n}">{n}</option>"#))
        .collect::<Vec<_>>()
        .join("")
}

/// Serve the form, injecting the team and city selectors.
async fn index_handler() -> Html<String> {
    let html = FORM_HTML
        .replace(
            "{{TEAM_OPTIONS}}",
            &select_options(Team::ALL.iter().map(|t| t.name())),
        )
        .replace(
            "{{CITY_OPTIONS}}",
            &select_options(City::ALL.iter().map(|c| c.name())),
        );
    Html(html)
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok".into(),
        model: state.predictor.model_name().to_string(),
        loaded_at: state.loaded_at,
    })
}

/// GET /api/options
async fn options_handler() -> Json<Options> {
    Json(Options {
        teams: Team::ALL.iter().map(|t| t.name().to_string()).collect(),
        cities: City::ALL.iter().map(|c| c.name().to_string()).collect(),
    })
}

/// POST /api/predict
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PredictForm>,
) -> Result<Json<Prediction>, (StatusCode, String)> {
    let match_state = MatchState::try_from(form).map_err(|e| {
        warn!("Rejected prediction input: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    state.predictor.predict(&match_state).map(Json).map_err(|e| {
        error!("Prediction failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Embedded single-file form (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Win Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { text-align: center; padding: 1.5rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.8rem; font-weight: 700; text-shadow: 2px 2px #000; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; max-width: 960px; margin: 0 auto; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .panel h2 { font-size: 1.1rem; margin-bottom: 1rem; }
  .row { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
  @media (max-width: 768px) { .row { grid-template-columns: 1fr; } }
  label { display: block; font-weight: 700; font-size: .85rem; margin-bottom: .35rem; }
  select, input { width: 100%; padding: .5rem; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; }
  .field { margin-bottom: 1rem; }
  button { background-color: #f12711; background-image: linear-gradient(315deg, #f12711 0%, #f5af19 74%); color: #fff; font-weight: 700; font-size: 1rem; border-radius: 10px; padding: 10px 20px; border: none; cursor: pointer; }
  .result { font-size: 1.1rem; padding: .8rem 1rem; border-radius: 8px; margin-top: .6rem; }
  .result.win { background: rgba(0,200,150,.15); color: var(--green); }
  .result.lose { background: rgba(255,79,106,.15); color: var(--red); }
  .error { color: var(--red); }
  .stadium { width: 100%; border-radius: 8px; margin-top: 1rem; }
  .slogan { text-align: center; font-size: 1.4rem; font-weight: 700; text-shadow: 2px 2px #000; margin-top: 1rem; }
  .hidden { display: none; }
</style>
</head>
<body>
<header>
  <img src="https://brandlogos.net/wp-content/uploads/2025/05/tata_ipl-logo_brandlogos.net_k2ryd.png" width="180" alt="IPL logo">
  <h1>🏏 IPL Win Predictor</h1>
</header>

<main>
  <div class="panel">
    <h2>⚔️ Match Setup</h2>
    <div class="row">
      <div><label for="batting">🏏 Batting Team</label><select id="batting">{{TEAM_OPTIONS}}</select></div>
      <div><label for="bowling">🎯 Bowling Team</label><select id="bowling">{{TEAM_OPTIONS}}</select></div>
      <div><label for="city">📍 Match City</label><select id="city">{{CITY_OPTIONS}}</select></div>
    </div>
  </div>

  <div class="panel">
    <h2>📊 Match Situation</h2>
    <div class="field"><label for="target">🎯 Target Score</label><input id="target" type="number" min="0" step="1" value="0"></div>
    <div class="row">
      <div><label for="score">🏏 Current Score</label><input id="score" type="number" min="0" step="1" value="0"></div>
      <div><label for="wickets">❌ Wickets Fallen</label><input id="wickets" type="number" min="0" max="9" step="1" value="0"></div>
      <div><label for="overs">⏱ Overs Completed</label><input id="overs" type="number" min="0" max="20" step="0.1" value="0.0"></div>
    </div>
  </div>

  <div><button id="predict">🔮 Predict Win Probability</button></div>

  <div class="panel hidden" id="result-panel">
    <h2>🏆 Prediction Result</h2>
    <div class="result win" id="win-line"></div>
    <div class="result lose" id="lose-line"></div>
    <img class="stadium" src="https://images.unsplash.com/photo-1540747913346-19e32dc3e97e?fm=jpg&q=60&w=3000" alt="Cricket stadium">
    <p class="slogan">"Cricket is not just a game, it's an emotion!"</p>
  </div>
  <div class="error" id="error"></div>
</main>

<script>
const $ = id => document.getElementById(id);

// Bowling side can never be the batting side.
function syncBowling() {
  const batting = $('batting').value;
  const bowling = $('bowling');
  let firstAllowed = null;
  for (const opt of bowling.options) {
    opt.hidden = opt.value === batting;
    opt.disabled = opt.value === batting;
    if (!opt.disabled && firstAllowed === null) firstAllowed = opt.value;
  }
  if (bowling.value === batting) bowling.value = firstAllowed;
}

async function predict() {
  $('error').textContent = '';
  const body = {
    batting_team: $('batting').value,
    bowling_team: $('bowling').value,
    city: $('city').value,
    target: parseInt($('target').value || '0', 10),
    current_score: parseInt($('score').value || '0', 10),
    wickets_fallen: parseInt($('wickets').value || '0', 10),
    overs_completed: parseFloat($('overs').value || '0'),
  };
  const r = await fetch('/api/predict', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  if (!r.ok) {
    $('result-panel').classList.add('hidden');
    $('error').textContent = await r.text();
    return;
  }
  const p = await r.json();
  $('win-line').textContent = `${p.batting_team} Win Chance: ${p.win_percent}%`;
  $('lose-line').textContent = `${p.bowling_team} Win Chance: ${p.lose_percent}%`;
  $('result-panel').classList.remove('hidden');
}

$('batting').addEventListener('change', syncBowling);
$('predict').addEventListener('click', predict);
syncBowling();
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{ClassifierError, FeatureRecord, LogisticPipeline, WinClassifier};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        response::Response,
    };
    use tower::ServiceExt;

    fn make_state() -> Arc<AppState> {
        let model = LogisticPipeline::from_json(include_str!("../../models/pipe.json")).unwrap();
        Arc::new(AppState {
            predictor: Predictor::new(Arc::new(model)),
            loaded_at: Utc::now(),
        })
    }

    fn make_form() -> PredictForm {
        PredictForm {
            batting_team: "Kolkata Knight Riders".into(),
            bowling_team: "Kings XI Punjab".into(),
            city: "Kolkata".into(),
            target: 180,
            current_score: 90,
            wickets_fallen: 3,
            overs_completed: 10.0,
        }
    }

    #[tokio::test]
    async fn predict_returns_complementary_percentages() {
        let Json(p) = predict_handler(State(make_state()), Json(make_form()))
            .await
            .unwrap();
        assert_eq!(p.batting_team, Team::KolkataKnightRiders);
        assert_eq!(p.bowling_team, Team::KingsXiPunjab);
        assert_eq!(u32::from(p.win_percent) + u32::from(p.lose_percent), 100);
        assert_eq!(p.features.wickets_left, 7);
    }

    #[tokio::test]
    async fn same_teams_is_unprocessable() {
        let mut form = make_form();
        form.bowling_team = form.batting_team.clone();
        let (status, msg) = predict_handler(State(make_state()), Json(form))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(msg.contains("Kolkata Knight Riders"));
    }

    #[tokio::test]
    async fn unknown_city_and_bad_overs_are_unprocessable() {
        let mut form = make_form();
        form.city = "Gotham".into();
        let (status, _) = predict_handler(State(make_state()), Json(form))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut form = make_form();
        form.overs_completed = 21.0;
        let (status, _) = predict_handler(State(make_state()), Json(form))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    struct BrokenModel;

    impl WinClassifier for BrokenModel {
        fn predict_proba(&self, _record: &FeatureRecord) -> Result<[f64; 2], ClassifierError> {
            Err(ClassifierError::NonFinite)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn classifier_failure_is_internal_error() {
        let state = Arc::new(AppState {
            predictor: Predictor::new(Arc::new(BrokenModel)),
            loaded_at: Utc::now(),
        });
        let (status, _) = predict_handler(State(state), Json(make_form()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn index_lists_every_team_and_city() {
        let Html(page) = index_handler().await;
        assert!(!page.contains("{{TEAM_OPTIONS}}"));
        assert!(!page.contains("{{CITY_OPTIONS}}"));
        for team in Team::ALL {
            assert!(page.contains(&format!(r#"<option value="{0}">{0}</option>"#, team.name())));
        }
        for city in City::ALL {
            assert!(page.contains(city.name()));
        }
        assert!(page.contains("IPL logo"));
        assert!(page.contains("it's an emotion!"));
    }

    #[tokio::test]
    async fn options_and_health() {
        let Json(opts) = options_handler().await;
        assert_eq!(opts.teams.len(), 8);
        assert_eq!(opts.cities.len(), 29);

        let state = make_state();
        let Json(health) = health_handler(State(state.clone())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.model, "ipl-logreg-onehot-v1");
        assert_eq!(health.loaded_at, state.loaded_at);
    }

    async fn send(method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        router(AppState {
            predictor: Predictor::new(Arc::new(
                LogisticPipeline::from_json(include_str!("../../models/pipe.json")).unwrap(),
            )),
            loaded_at: Utc::now(),
        })
        .oneshot(request)
        .await
        .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_serves_every_route() {
        let response = send(Method::GET, "/", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(Method::GET, "/health", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = send(Method::GET, "/api/options", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let opts = body_json(response).await;
        assert_eq!(opts["teams"].as_array().unwrap().len(), 8);
        assert_eq!(opts["cities"].as_array().unwrap().len(), 29);

        let response = send(Method::GET, "/api/nope", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn router_predicts_from_json_body() {
        let body = serde_json::to_string(&make_form()).unwrap();
        let response = send(Method::POST, "/api/predict", Body::from(body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let p: Prediction = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(p.batting_team, Team::KolkataKnightRiders);
        assert_eq!(p.features.runs_left, 90);
        assert_eq!(u32::from(p.win_percent) + u32::from(p.lose_percent), 100);
    }

    #[tokio::test]
    async fn router_rejects_negative_target_and_same_teams() {
        let body = r#"{"batting_team": "Mumbai Indians", "bowling_team": "Delhi Capitals",
                       "city": "Mumbai", "target": -5, "current_score": 10,
                       "wickets_fallen": 1, "overs_completed": 2.0}"#;
        let response = send(Method::POST, "/api/predict", Body::from(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let mut form = make_form();
        form.bowling_team = form.batting_team.clone();
        let body = serde_json::to_string(&form).unwrap();
        let response = send(Method::POST, "/api/predict", Body::from(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn router_rejects_get_on_predict() {
        let response = send(Method::GET, "/api/predict", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
