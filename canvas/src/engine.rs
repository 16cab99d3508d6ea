use std::collections::BTreeMap;

use frames::{Board, ClientFrame, SaveRequest, ServerFrame, Stroke};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point, Resolution};
use crate::history::History;
use crate::input::{Brush, InputState, PointerSample, Tool};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Everything the host feeds into the engine, one at a time, on one thread.
#[derive(Debug, Clone)]
pub enum Event {
    PointerDown(PointerSample),
    PointerMove(PointerSample),
    PointerUp(PointerSample),
    /// Wheel notch at a screen position. Positive `delta_y` zooms out.
    Wheel { delta_y: f64, at: Point },
    /// Zoom percentage typed into the zoom field.
    SetZoom { percent: f64 },
    /// The canvas element was resized or moved to a display with another
    /// pixel ratio.
    Resize { width_css: f64, height_css: f64, dpr: f64 },
    Undo,
    Redo,
    /// Confirmed "clear all". Confirmation is the host's job.
    ClearAll,
    /// A raw text message from the collaboration channel.
    Remote(String),
    Connected,
    Disconnected,
    /// Host timer fired, every [`crate::consts::AUTOSAVE_INTERVAL_MS`].
    AutoSaveTick,
    SaveRequested,
    /// Outcome of a save issued for `revision`.
    SaveFinished { revision: u64, result: Result<i64, String> },
    /// Initial REST load completed.
    Loaded(Board),
    LoadFailed(String),
    SetAutoSave(bool),
    SelectTool(Tool),
    SetBrush(Brush),
}

/// Work the engine asks the host (or [`Engine`]) to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Clear the base surface and repaint every committed stroke.
    RepaintBase,
    /// Clear the preview surface and repaint all in-progress strokes.
    RepaintPreview,
    /// Paint the newest segment of the live stroke onto the base surface.
    PaintLiveSegment,
    /// Resize both backing stores, then repaint both surfaces.
    ResizeSurfaces(Resolution),
    /// Send a frame on the collaboration channel.
    Send(ClientFrame),
    /// Persist the board. Report back with [`Event::SaveFinished`].
    Save { revision: u64, request: SaveRequest },
    StatusChanged(Status),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Outcome of the most recent snapshot load, REST or channel `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Loading,
    Loaded,
    /// Non-fatal: the session keeps working on whatever it already holds.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

/// Snapshot of the indicators the host displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub connection: ConnectionStatus,
    pub load: LoadStatus,
    pub save: SaveStatus,
    pub dirty: bool,
    pub zoom_percent: i64,
}

/// Core engine state: all logic that doesn't depend on the canvas elements.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub board_id: String,
    /// Identifies this tab on the channel. Frames carrying it are our own echoes.
    pub session_id: String,
    pub camera: Camera,
    /// Committed strokes in paint order.
    pub strokes: Vec<Stroke>,
    pub history: History,
    pub input: InputState,
    pub tool: Tool,
    pub brush: Brush,
    /// Latest in-progress stroke per remote sender.
    pub remote_previews: BTreeMap<String, Stroke>,
    /// Latest cursor position per remote sender, in board space.
    pub peers: BTreeMap<String, (f64, f64)>,
    pub autosave: bool,
    pub connection: ConnectionStatus,
    pub load: LoadStatus,
    pub save: SaveStatus,
    /// Bumped on every history mutation.
    revision: u64,
    /// Newest revision known to match the server.
    saved_revision: u64,
}

impl EngineCore {
    #[must_use]
    pub fn new(board_id: impl Into<String>) -> Self {
        Self::with_session(board_id, Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn with_session(board_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            session_id: session_id.into(),
            camera: Camera::default(),
            strokes: Vec::new(),
            history: History::new(),
            input: InputState::Idle,
            tool: Tool::default(),
            brush: Brush::default(),
            remote_previews: BTreeMap::new(),
            peers: BTreeMap::new(),
            autosave: true,
            connection: ConnectionStatus::default(),
            load: LoadStatus::default(),
            save: SaveStatus::default(),
            revision: 0,
            saved_revision: 0,
        }
    }

    // --- Queries ---

    /// Whether local edits exist that no completed save covers.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            connection: self.connection,
            load: self.load,
            save: self.save,
            dirty: self.is_dirty(),
            zoom_percent: self.camera.zoom_percent(),
        }
    }

    /// Strokes for the base surface: committed strokes, then the local eraser
    /// while it is being dragged so a full repaint keeps its erasure.
    pub fn base_strokes(&self) -> impl Iterator<Item = &Stroke> {
        let live_eraser = self.input.live_stroke().filter(|s| s.is_eraser());
        self.strokes.iter().chain(live_eraser)
    }

    /// Strokes for the preview surface: remote previews, then the local pen
    /// stroke on top. A local eraser paints on the base surface instead.
    pub fn preview_strokes(&self) -> impl Iterator<Item = &Stroke> {
        let local = self.input.live_stroke().filter(|s| !s.is_eraser());
        self.remote_previews.values().chain(local)
    }

    // --- Dispatch ---

    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::PointerDown(sample) => self.pointer_down(sample),
            Event::PointerMove(sample) => self.pointer_move(sample),
            Event::PointerUp(_) => self.pointer_up(),
            Event::Wheel { delta_y, at } => self.change_view(|camera| camera.wheel_zoom(delta_y, at)),
            Event::SetZoom { percent } => self.change_view(|camera| camera.zoom_to_percent(percent)),
            Event::Resize { width_css, height_css, dpr } => self.resize(width_css, height_css, dpr),
            Event::Undo => {
                let changed = self.history.undo(&mut self.strokes);
                self.after_edit(changed)
            }
            Event::Redo => {
                let changed = self.history.redo(&mut self.strokes);
                self.after_edit(changed)
            }
            Event::ClearAll => {
                self.history.clear_all(&mut self.strokes);
                self.after_edit(true)
            }
            Event::Remote(text) => self.remote(&text),
            Event::Connected => {
                self.connection = ConnectionStatus::Connected;
                vec![self.status_action()]
            }
            Event::Disconnected => {
                self.connection = ConnectionStatus::Disconnected;
                self.remote_previews.clear();
                self.peers.clear();
                vec![Action::RepaintPreview, self.status_action()]
            }
            Event::AutoSaveTick => {
                if self.autosave && self.is_dirty() {
                    self.save_actions()
                } else {
                    Vec::new()
                }
            }
            Event::SaveRequested => self.save_actions(),
            Event::SaveFinished { revision, result } => self.save_finished(revision, result),
            Event::Loaded(board) => self.load_snapshot(board),
            Event::LoadFailed(reason) => {
                log::warn!("board {} failed to load: {reason}", self.board_id);
                self.load = LoadStatus::Failed;
                vec![Action::RepaintBase, self.status_action()]
            }
            Event::SetAutoSave(enabled) => {
                self.autosave = enabled;
                Vec::new()
            }
            Event::SelectTool(tool) => {
                self.tool = tool;
                Vec::new()
            }
            Event::SetBrush(brush) => {
                self.brush = brush;
                Vec::new()
            }
        }
    }

    // --- Pointer ---

    fn pointer_down(&mut self, sample: PointerSample) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        let Some(tool) = self.tool.stroke_tool() else {
            self.input = InputState::Panning { last_screen: sample.screen };
            return Vec::new();
        };

        let first = self.camera.screen_to_board(sample.screen, sample.effective_pressure());
        let stroke = Stroke::begin(tool, self.brush.color, self.brush.size, self.brush.opacity, first);
        let action = live_paint_action(&stroke);
        self.input = InputState::Drawing { stroke };
        vec![action]
    }

    fn pointer_move(&mut self, sample: PointerSample) -> Vec<Action> {
        match &mut self.input {
            InputState::Idle => {
                let at = self.camera.screen_to_board(sample.screen, 0.0);
                vec![Action::Send(ClientFrame::Cursor { user_id: self.session_id.clone(), x: at.x, y: at.y })]
            }
            InputState::Panning { last_screen } => {
                let (dx, dy) = (sample.screen.x - last_screen.x, sample.screen.y - last_screen.y);
                *last_screen = sample.screen;
                self.camera.pan_by(dx, dy);
                vec![Action::RepaintBase, Action::RepaintPreview]
            }
            InputState::Drawing { stroke } => {
                let point = self.camera.screen_to_board(sample.screen, sample.effective_pressure());
                stroke.push_point(point);
                vec![
                    live_paint_action(stroke),
                    Action::Send(ClientFrame::StrokePreview { user_id: self.session_id.clone(), stroke: stroke.clone() }),
                ]
            }
        }
    }

    fn pointer_up(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::Drawing { stroke } => {
                let Some(stroke) = stroke.finalize() else {
                    return vec![Action::RepaintPreview];
                };
                self.history.commit(&mut self.strokes, stroke);
                let mut actions = vec![Action::RepaintPreview];
                actions.extend(self.after_edit(true));
                actions
            }
        }
    }

    // --- View ---

    fn change_view(&mut self, apply: impl FnOnce(&mut Camera)) -> Vec<Action> {
        let before = self.camera.resolution();
        apply(&mut self.camera);
        let after = self.camera.resolution();

        let mut actions = Vec::new();
        if after != before {
            actions.push(Action::ResizeSurfaces(after));
        }
        actions.extend([Action::RepaintBase, Action::RepaintPreview, self.status_action()]);
        actions
    }

    fn resize(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.camera.width_css = width_css.max(0.0);
        self.camera.height_css = height_css.max(0.0);
        self.camera.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        vec![Action::ResizeSurfaces(self.camera.resolution()), Action::RepaintBase, Action::RepaintPreview]
    }

    // --- Edits ---

    fn after_edit(&mut self, changed: bool) -> Vec<Action> {
        if !changed {
            return Vec::new();
        }
        self.revision += 1;
        vec![Action::RepaintBase, self.status_action()]
    }

    // --- Channel ---

    fn remote(&mut self, text: &str) -> Vec<Action> {
        let frame = match frames::decode_server_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("dropping malformed frame: {e}");
                return Vec::new();
            }
        };

        match frame {
            ServerFrame::Init { board } => self.load_snapshot(board),
            ServerFrame::BoardUpdated { board } => {
                self.strokes = board.strokes;
                self.remote_previews.clear();
                self.saved_revision = self.revision;
                vec![Action::RepaintBase, Action::RepaintPreview, self.status_action()]
            }
            ServerFrame::StrokePreview { user_id, stroke } => {
                if user_id == self.session_id {
                    return Vec::new();
                }
                self.remote_previews.insert(user_id, stroke);
                vec![Action::RepaintPreview]
            }
            ServerFrame::Cursor { user_id, x, y } => {
                if user_id != self.session_id {
                    self.peers.insert(user_id, (x, y));
                }
                Vec::new()
            }
        }
    }

    /// Replace strokes and viewport with a full snapshot. Redo is kept.
    fn load_snapshot(&mut self, board: Board) -> Vec<Action> {
        let before = self.camera.resolution();
        self.strokes = board.strokes;
        self.camera.viewport = board.viewport.normalized();
        self.remote_previews.clear();
        self.load = LoadStatus::Loaded;
        self.saved_revision = self.revision;
        self.save = SaveStatus::Idle;

        let mut actions = Vec::new();
        let after = self.camera.resolution();
        if after != before {
            actions.push(Action::ResizeSurfaces(after));
        }
        actions.extend([Action::RepaintBase, Action::RepaintPreview, self.status_action()]);
        actions
    }

    // --- Saving ---

    fn save_actions(&mut self) -> Vec<Action> {
        self.save = SaveStatus::Saving;
        let request = SaveRequest { strokes: Some(self.strokes.clone()), viewport: Some(self.camera.viewport) };
        vec![Action::Save { revision: self.revision, request }, self.status_action()]
    }

    fn save_finished(&mut self, revision: u64, result: Result<i64, String>) -> Vec<Action> {
        match result {
            Ok(_) => {
                self.saved_revision = self.saved_revision.max(revision);
                self.save = SaveStatus::Saved;
            }
            Err(reason) => {
                log::warn!("board {} save failed at revision {revision}: {reason}", self.board_id);
                self.save = SaveStatus::Failed;
            }
        }
        vec![self.status_action()]
    }

    fn status_action(&self) -> Action {
        Action::StatusChanged(self.status())
    }
}

/// The local pen previews on its own surface; the eraser paints straight
/// onto the base so erased pixels disappear while dragging.
fn live_paint_action(stroke: &Stroke) -> Action {
    if stroke.is_eraser() { Action::PaintLiveSegment } else { Action::RepaintPreview }
}

/// The full canvas engine. Wraps `EngineCore` and owns the two stacked
/// canvas elements: the base surface below and the preview surface on top.
pub struct Engine {
    base: HtmlCanvasElement,
    preview: HtmlCanvasElement,
    base_ctx: CanvasRenderingContext2d,
    preview_ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to the given canvas elements.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either element has no 2D context.
    pub fn new(base: HtmlCanvasElement, preview: HtmlCanvasElement, board_id: &str) -> Result<Self, JsValue> {
        let base_ctx = context_2d(&base)?;
        let preview_ctx = context_2d(&preview)?;
        Ok(Self { base, preview, base_ctx, preview_ctx, core: EngineCore::new(board_id) })
    }

    /// Dispatch one event, perform the render work it produced, and return
    /// the remaining actions (sends, saves, status) for the host.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a canvas call fails.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Action>, JsValue> {
        let mut rest = Vec::new();
        for action in self.core.handle(event) {
            match action {
                Action::RepaintBase => self.repaint_base()?,
                Action::RepaintPreview => self.repaint_preview()?,
                Action::PaintLiveSegment => {
                    if let Some(stroke) = self.core.input.live_stroke() {
                        render::paint_live_segment(&self.base_ctx, stroke, &self.core.camera)?;
                    }
                }
                Action::ResizeSurfaces(resolution) => {
                    for canvas in [&self.base, &self.preview] {
                        canvas.set_width(resolution.width_px);
                        canvas.set_height(resolution.height_px);
                    }
                    self.repaint_base()?;
                    self.repaint_preview()?;
                }
                other => rest.push(other),
            }
        }
        Ok(rest)
    }

    fn repaint_base(&self) -> Result<(), JsValue> {
        render::paint_base(&self.base_ctx, self.core.base_strokes(), &self.core.camera)
    }

    fn repaint_preview(&self) -> Result<(), JsValue> {
        render::paint_preview(&self.preview_ctx, self.core.preview_strokes(), &self.core.camera)
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}
