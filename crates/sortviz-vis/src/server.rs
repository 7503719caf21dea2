//! Axum web server with WebSocket streaming of live sort frames.
//!
//! The [`PlaybackController`] is not `Send`, so it never leaves the task that
//! calls [`VisServer::serve`]. HTTP and WebSocket handlers reach it through a
//! command channel, and stop runs directly through a [`ControllerHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sortviz_engine::{
    Config, ConfigStore, ControllerHandle, Frame, PlaybackController, RunReport, Timeline,
    TimelineStatus,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::events::{BroadcastSink, Update};

/// Capacity of the per-client update buffer.
const UPDATE_BUFFER: usize = 1024;

/// Work only the controller task can do.
enum Command {
    Start(Config),
    Reset,
    Configure(Config),
    Record(Config, oneshot::Sender<Result<TimelineStatus, String>>),
}

/// Shared application state.
pub struct AppState {
    handle: ControllerHandle,
    commands: mpsc::Sender<Command>,
    updates: broadcast::Sender<Update>,
    frame: watch::Receiver<Frame>,
    config: watch::Receiver<Config>,
    /// A start is queued and the controller has not finished it yet.
    start_pending: AtomicBool,
    last_report: RwLock<Option<RunReport>>,
    timeline: RwLock<Option<Timeline>>,
}

/// Visualization server.
pub struct VisServer {
    controller: PlaybackController,
    commands: mpsc::Receiver<Command>,
    config: watch::Sender<Config>,
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server whose controller persists settings in `store`.
    pub fn new(store: Box<dyn ConfigStore>, seed: Option<u64>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        let (frame_tx, frame_rx) = watch::channel(Frame::default());
        let sink = BroadcastSink::new(updates.clone(), frame_tx);

        let mut controller = PlaybackController::new(store);
        if let Some(seed) = seed {
            controller = controller.with_seed(seed);
        }
        let mut controller = controller
            .with_render_sink(sink.clone())
            .with_audio_sink(sink);
        // Publish the initial bars.
        controller.reset();

        let (command_tx, command_rx) = mpsc::channel(32);
        let (config_tx, config_rx) = watch::channel(controller.config());

        let state = Arc::new(AppState {
            handle: controller.handle(),
            commands: command_tx,
            updates,
            frame: frame_rx,
            config: config_rx,
            start_pending: AtomicBool::new(false),
            last_report: RwLock::new(None),
            timeline: RwLock::new(None),
        });

        Self {
            controller,
            commands: command_rx,
            config: config_tx,
            state,
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/config", get(config_handler).post(configure_handler))
            .route("/api/frame", get(frame_handler))
            .route("/api/start", post(start_handler))
            .route("/api/stop", post(stop_handler))
            .route("/api/reset", post(reset_handler))
            .route("/api/record", post(record_handler))
            .route("/api/timeline", get(timeline_handler))
            .route("/api/timeline/seek", post(seek_handler))
            .route("/api/timeline/step", post(step_handler))
            .route("/api/timeline/play", post(play_handler))
            .route("/api/timeline/pause", post(pause_handler))
            .route("/api/timeline/stop", post(timeline_stop_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Serve on `port` until the listener fails.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://localhost:{}", port);

        let router = self.router();
        let http = async move { axum::serve(listener, router).await };
        let replay = replay(self.state.clone());
        let controller = drive(self.controller, self.commands, self.config, self.state);

        tokio::select! {
            result = http => result,
            _ = controller => Ok(()),
            _ = replay => Ok(()),
        }
    }
}

/// Execute controller commands one at a time.
async fn drive(
    mut controller: PlaybackController,
    mut commands: mpsc::Receiver<Command>,
    config: watch::Sender<Config>,
    state: Arc<AppState>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Start(requested) => {
                let result = controller.start(requested).await;
                state.start_pending.store(false, Ordering::SeqCst);
                match result {
                    Ok(report) => {
                        debug!(outcome = ?report.outcome, "run finished");
                        *state.last_report.write().await = Some(report);
                    }
                    Err(err) => warn!(error = %err, "run failed"),
                }
            }
            Command::Reset => {
                controller.reset();
            }
            Command::Configure(requested) => {
                controller.configure(requested);
            }
            Command::Record(requested, reply) => {
                let result = match controller.record(requested).await {
                    Ok(timeline) => {
                        let status = TimelineStatus::from(&timeline);
                        *state.timeline.write().await = Some(timeline);
                        Ok(status)
                    }
                    Err(err) => Err(err.user_message()),
                };
                let _ = reply.send(result);
            }
        }
        config.send_replace(controller.config());
    }
}

/// Play the recorded timeline, one step per configured step delay.
async fn replay(state: Arc<AppState>) {
    loop {
        let delay = state.config.borrow().timing().step_delay();
        tokio::time::sleep(delay).await;

        let mut timeline = state.timeline.write().await;
        let Some(timeline) = timeline.as_mut() else {
            continue;
        };
        if let Some(step) = timeline.tick().cloned() {
            let _ = state.updates.send(Update::Replay {
                step: Some(step),
                status: TimelineStatus::from(&*timeline),
                frame: timeline.frame().clone(),
            });
        }
    }
}

/// Generic acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    pub message: String,
}

impl Ack {
    fn ok(message: &str) -> Json<Ack> {
        Json(Ack {
            ok: true,
            message: message.to_string(),
        })
    }

    fn refused(status: StatusCode, message: &str) -> (StatusCode, Json<Ack>) {
        (
            status,
            Json(Ack {
                ok: false,
                message: message.to_string(),
            }),
        )
    }
}

type Acked = Result<Json<Ack>, (StatusCode, Json<Ack>)>;

impl AppState {
    async fn submit(&self, command: Command) -> Acked {
        self.commands
            .send(command)
            .await
            .map_err(|_| Ack::refused(StatusCode::SERVICE_UNAVAILABLE, "controller has shut down"))?;
        Ok(Ack::ok("queued"))
    }

    fn refuse_while_running(&self) -> Result<(), (StatusCode, Json<Ack>)> {
        if self.handle.is_running() || self.start_pending.load(Ordering::SeqCst) {
            Err(Ack::refused(StatusCode::CONFLICT, "a sort is running"))
        } else {
            Ok(())
        }
    }

    /// Start a run, defaulting to the current config.
    async fn start(&self, config: Option<Config>) -> Acked {
        self.refuse_while_running()?;
        if self.start_pending.swap(true, Ordering::SeqCst) {
            return Err(Ack::refused(StatusCode::CONFLICT, "a sort is running"));
        }
        let config = config.unwrap_or_else(|| *self.config.borrow());
        let queued = self.submit(Command::Start(config)).await;
        if queued.is_err() {
            self.start_pending.store(false, Ordering::SeqCst);
        }
        queued
    }

    fn stop(&self) -> Json<Ack> {
        self.handle.stop();
        Ack::ok("stopped")
    }

    async fn reset(&self) -> Acked {
        self.refuse_while_running()?;
        self.submit(Command::Reset).await
    }

    fn status(&self) -> StatusResponse {
        StatusResponse {
            status: "ok",
            running: self.handle.is_running() || self.start_pending.load(Ordering::SeqCst),
            config: *self.config.borrow(),
        }
    }
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    running: bool,
    config: Config,
}

#[derive(Serialize)]
struct StatusWithReport {
    #[serde(flatten)]
    status: StatusResponse,
    last_report: Option<RunReport>,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusWithReport> {
    let last_report = state.last_report.read().await.clone();
    Json(StatusWithReport {
        status: state.status(),
        last_report,
    })
}

async fn config_handler(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(*state.config.borrow())
}

async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<Config>,
) -> Acked {
    state.refuse_while_running()?;
    state.submit(Command::Configure(config)).await
}

async fn frame_handler(State(state): State<Arc<AppState>>) -> Json<Frame> {
    Json(state.frame.borrow().clone())
}

#[derive(Debug, Default, Deserialize)]
struct RunRequest {
    #[serde(default)]
    config: Option<Config>,
}

async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Acked {
    state.start(req.config).await
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<Ack> {
    state.stop()
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Acked {
    state.reset().await
}

async fn record_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<TimelineStatus>, (StatusCode, Json<Ack>)> {
    state.refuse_while_running()?;
    let config = req.config.unwrap_or_else(|| *state.config.borrow());
    let (reply, response) = oneshot::channel();
    state.submit(Command::Record(config, reply)).await?;

    match response.await {
        Ok(Ok(status)) => Ok(Json(status)),
        Ok(Err(message)) => Err(Ack::refused(StatusCode::UNPROCESSABLE_ENTITY, &message)),
        Err(_) => Err(Ack::refused(StatusCode::SERVICE_UNAVAILABLE, "controller has shut down")),
    }
}

/// Timeline status plus the frame at its cursor.
#[derive(Serialize)]
struct TimelineView {
    status: TimelineStatus,
    frame: Frame,
}

impl From<&Timeline> for TimelineView {
    fn from(timeline: &Timeline) -> Self {
        Self {
            status: timeline.into(),
            frame: timeline.frame().clone(),
        }
    }
}

fn no_timeline() -> (StatusCode, Json<Ack>) {
    Ack::refused(StatusCode::NOT_FOUND, "nothing recorded yet")
}

async fn timeline_handler(State(state): State<Arc<AppState>>) -> TimelineReply {
    let timeline = state.timeline.read().await;
    let view = timeline.as_ref().map(TimelineView::from).ok_or_else(no_timeline)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
struct SeekRequest {
    step: usize,
}

type TimelineReply = Result<Json<TimelineView>, (StatusCode, Json<Ack>)>;

/// Apply `change` to the recorded timeline and report where it stands.
async fn update_timeline(state: &AppState, change: impl FnOnce(&mut Timeline)) -> TimelineReply {
    let mut timeline = state.timeline.write().await;
    let timeline = timeline.as_mut().ok_or_else(no_timeline)?;
    change(timeline);
    Ok(Json(TimelineView::from(&*timeline)))
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> TimelineReply {
    update_timeline(&state, |t| t.seek(req.step)).await
}

async fn play_handler(State(state): State<Arc<AppState>>) -> TimelineReply {
    update_timeline(&state, Timeline::play).await
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> TimelineReply {
    update_timeline(&state, Timeline::pause).await
}

async fn timeline_stop_handler(State(state): State<Arc<AppState>>) -> TimelineReply {
    update_timeline(&state, Timeline::stop).await
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> TimelineReply {
    update_timeline(&state, |t| match req.direction {
        Direction::Forward => {
            t.step_forward();
        }
        Direction::Backward => t.step_backward(),
    })
    .await
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut updates = state.updates.subscribe();

    // Send the current bars first
    let initial = Update::Frame {
        step: None,
        frame: state.frame.borrow().clone(),
    };
    if send_json(&mut socket, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(text) => {
                        if let Ok(cmd) = serde_json::from_str::<WsCommand>(&text) {
                            let response = handle_ws_command(&state, cmd).await;
                            if send_json(&mut socket, &response).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    if send_json(&mut socket, &update).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(err) => {
            warn!(error = %err, "failed to encode websocket message");
            Ok(())
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "start")]
    Start {
        #[serde(default)]
        config: Option<Config>,
    },
    #[serde(rename = "stop")]
    Stop,
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "get_status")]
    GetStatus,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "ack")]
    Ack(Ack),
    #[serde(rename = "status")]
    Status(StatusResponse),
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    let acked = match cmd {
        WsCommand::Start { config } => state.start(config).await,
        WsCommand::Stop => Ok(state.stop()),
        WsCommand::Reset => state.reset().await,
        WsCommand::GetStatus => return WsResponse::Status(state.status()),
    };
    match acked {
        Ok(Json(ack)) | Err((_, Json(ack))) => WsResponse::Ack(ack),
    }
}
