use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[path = "../physics.rs"]
mod physics;
#[path = "../sampler.rs"]
mod sampler;
#[path = "../config.rs"]
mod config;

use config::{SamplerConfig, DEFAULT_NUM_POINTS, MAX_WORKERS};
use sampler::generate_points_parallel;

const MIN_COUNT: usize = 1_000;
const MAX_COUNT: usize = 1_000_000;

#[derive(Deserialize)]
struct SampleQuery {
    count: Option<usize>,
    a0: Option<f32>,
    seed: Option<u64>,
    workers: Option<usize>,
}

impl SampleQuery {
    fn into_config(self) -> Result<SamplerConfig, String> {
        let config = SamplerConfig {
            num_points: self
                .count
                .unwrap_or(DEFAULT_NUM_POINTS)
                .clamp(MIN_COUNT, MAX_COUNT),
            bohr_radius: self.a0.unwrap_or(physics::BOHR_RADIUS),
            seed: self.seed,
            workers: self.workers.unwrap_or(1).clamp(1, MAX_WORKERS),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct SampleResponse {
    /// Candidate budget
    count: usize,
    accepted: usize,
    acceptance: f32,
    a0: f32,
    seed: u64,
    /// Flattened x, y, z triples
    points: Vec<f32>,
}

const INDEX_HTML: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Schrödinger's Wave Function Visualization</title>
<style>
  body { margin: 0; background: #000; color: #ccc; font: 13px sans-serif; overflow: hidden; }
  #status { position: absolute; top: 8px; left: 8px; }
  canvas { display: block; cursor: grab; }
</style>
</head>
<body>
<div id="status">sampling…</div>
<canvas id="view"></canvas>
<script>
const canvas = document.getElementById("view");
const ctx = canvas.getContext("2d");
const statusEl = document.getElementById("status");
let points = new Float32Array(0);
let colorRadius = 10;
let rotationX = 0, rotationY = 0;
let dragging = false, lastX = 0, lastY = 0;

function resize() {
  canvas.width = window.innerWidth;
  canvas.height = window.innerHeight;
  draw();
}

// eye (3,3,3) looking at the origin, +Y up
const eye = [3, 3, 3];
const f = normalize([-3, -3, -3]);
const s = normalize(cross(f, [0, 1, 0]));
const u = cross(s, f);
function cross(a, b) { return [a[1]*b[2]-a[2]*b[1], a[2]*b[0]-a[0]*b[2], a[0]*b[1]-a[1]*b[0]]; }
function normalize(v) { const l = Math.hypot(v[0], v[1], v[2]); return [v[0]/l, v[1]/l, v[2]/l]; }

function color(d) {
  const n = Math.min(d / colorRadius, 1);
  let c;
  if (n < 0.25) c = [0, n / 0.25, 1];
  else if (n < 0.5) c = [0, 1, 1 - (n - 0.25) / 0.25];
  else if (n < 0.75) c = [(n - 0.5) / 0.25, 1, 0];
  else c = [1, 1 - (n - 0.75) / 0.25, 0];
  return `rgba(${c[0]*255|0},${c[1]*255|0},${c[2]*255|0},0.7)`;
}

function draw() {
  ctx.fillStyle = "#000";
  ctx.fillRect(0, 0, canvas.width, canvas.height);
  const focal = (canvas.height / 2) / Math.tan(22.5 * Math.PI / 180);
  const ax = rotationX * Math.PI / 180, ay = rotationY * Math.PI / 180;
  const cx = Math.cos(ax), sx = Math.sin(ax), cy = Math.cos(ay), sy = Math.sin(ay);
  for (let i = 0; i < points.length; i += 3) {
    let x = points[i], y = points[i + 1], z = points[i + 2];
    const d = Math.hypot(x, y, z);
    // yaw about Y, then pitch about X
    const x1 = x * cy + z * sy, z1 = -x * sy + z * cy;
    const y2 = y * cx - z1 * sx, z2 = y * sx + z1 * cx;
    const px = x1 - eye[0], py = y2 - eye[1], pz = z2 - eye[2];
    const vx = px*s[0] + py*s[1] + pz*s[2];
    const vy = px*u[0] + py*u[1] + pz*u[2];
    const vz = px*f[0] + py*f[1] + pz*f[2];
    if (vz < 0.1) continue;
    ctx.fillStyle = color(d);
    ctx.fillRect(canvas.width / 2 + focal * vx / vz, canvas.height / 2 - focal * vy / vz, 1.5, 1.5);
  }
}

canvas.addEventListener("mousedown", e => { dragging = true; lastX = e.clientX; lastY = e.clientY; });
window.addEventListener("mouseup", () => { dragging = false; });
window.addEventListener("mousemove", e => {
  if (!dragging) return;
  rotationY += (e.clientX - lastX) * 0.1;
  rotationX += (e.clientY - lastY) * 0.1;
  lastX = e.clientX; lastY = e.clientY;
  draw();
});
window.addEventListener("resize", resize);

async function load() {
  const res = await fetch("/samples" + window.location.search);
  if (!res.ok) {
    statusEl.textContent = "Error: " + (await res.text());
    return;
  }
  const data = await res.json();
  points = new Float32Array(data.points);
  colorRadius = 10 * data.a0;
  statusEl.textContent = `${data.accepted} / ${data.count} accepted (${(data.acceptance * 100).toFixed(1)}%), seed ${data.seed}`;
  draw();
}

resize();
load();
</script>
</body>
</html>
"##;

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn samples(
    Query(q): Query<SampleQuery>,
) -> Result<Json<SampleResponse>, (StatusCode, String)> {
    let config = q
        .into_config()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let seed = config.resolve_seed();
    let params = config.density_parameters();

    let started = Instant::now();
    let cloud = tokio::task::spawn_blocking(move || {
        generate_points_parallel(&params, config.num_points, seed, config.workers)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("sampler task failed: {e}")))?;

    tracing::info!(
        candidates = cloud.candidates(),
        accepted = cloud.len(),
        seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "served samples"
    );

    Ok(Json(SampleResponse {
        count: cloud.candidates(),
        accepted: cloud.len(),
        acceptance: cloud.acceptance_ratio(),
        a0: params.bohr_radius(),
        seed,
        points: cloud.as_flat().to_vec(),
    }))
}

fn app() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/samples", get(samples))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = pico_args::Arguments::from_env();
    let addr: SocketAddr = match args.opt_value_from_str("--addr") {
        Ok(addr) => addr.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000))),
        Err(e) => {
            eprintln!("Invalid --addr: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    println!("Serving on http://{}", addr);
    if let Err(e) = axum::serve(listener, app()).await {
        tracing::error!("server error: {e}");
    }
}
