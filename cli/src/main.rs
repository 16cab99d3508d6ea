use std::fs;
use std::io::{self, Read};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use frames::{Board, ClientFrame, SaveRequest, SaveResponse, ServerFrame, Stroke};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use uuid::Uuid;


type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("websocket failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("expected init frame, got {0}")]
    UnexpectedFrame(&'static str),
    #[error("failed to read {path}: {source}")]
    Input { path: String, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid stroke: {0}")]
    InvalidStroke(#[from] frames::ModelError),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "inkboard", about = "Inkboard REST and websocket CLI")]
struct Cli {
    #[arg(long, env = "INKBOARD_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// Seconds to wait for the initial board snapshot.
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: Url,
    timeout: Duration,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server answers `/healthz`.
    Ping,
    Board(BoardCommand),
    /// Print every frame broadcast on a board.
    Watch(WatchArgs),
    /// Send one stroke as a live preview to a board's viewers.
    Preview(PreviewArgs),
    /// Move this session's cursor on a board.
    Cursor(CursorArgs),
}

#[derive(Args, Debug)]
struct BoardCommand {
    #[command(subcommand)]
    command: BoardSubcommand,
}

#[derive(Subcommand, Debug)]
enum BoardSubcommand {
    /// Print a board snapshot as JSON.
    Load { board_id: String },
    /// Save strokes and/or viewport from a JSON file (`-` for stdin).
    ///
    /// Accepts a save request or a full board as printed by `board load`.
    Save {
        board_id: String,
        #[arg(long, default_value = "-")]
        input: String,
    },
}

#[derive(Args, Debug)]
struct WatchArgs {
    board_id: String,
    /// Stop after this many frames (the initial snapshot included).
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    board_id: String,
    /// Stroke JSON file (`-` for stdin).
    #[arg(long, default_value = "-")]
    input: String,
    #[arg(long)]
    user_id: Option<String>,
}

#[derive(Args, Debug)]
struct CursorArgs {
    board_id: String,
    #[arg(long, allow_negative_numbers = true)]
    x: f64,
    #[arg(long, allow_negative_numbers = true)]
    y: f64,
    #[arg(long)]
    user_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: parse_base_url(&cli.base_url)?, timeout: Duration::from_secs(cli.timeout_secs) };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Board(board) => run_board(&ctx, board).await,
        Command::Watch(args) => run_watch(&ctx, args).await,
        Command::Preview(args) => run_preview(&ctx, args).await,
        Command::Cursor(args) => run_cursor(&ctx, args).await,
    }
}

// =============================================================================
// REST
// =============================================================================

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let response = reqwest::get(api_url(&cli.base_url, &["healthz"])?).await?;
    ensure_success(response).await?;
    println!("ok");
    Ok(())
}

async fn run_board(cli: &CliContext, board: BoardCommand) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    match board.command {
        BoardSubcommand::Load { board_id } => {
            let url = api_url(&cli.base_url, &["api", "board", &board_id])?;
            let response = ensure_success(client.get(url).send().await?).await?;
            let board: Board = response.json().await?;
            print_json(&serde_json::to_value(&board)?)
        }
        BoardSubcommand::Save { board_id, input } => {
            let request: SaveRequest = serde_json::from_str(&read_input(&input)?)?;
            request.validate()?;
            match &request.strokes {
                Some(strokes) => eprintln!("saving board {board_id}: {} strokes", strokes.len()),
                None => eprintln!("saving board {board_id}: viewport only"),
            }
            let url = api_url(&cli.base_url, &["api", "board", &board_id, "save"])?;
            let response = ensure_success(client.post(url).json(&request).send().await?).await?;
            let saved: SaveResponse = response.json().await?;
            print_json(&serde_json::to_value(saved)?)
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CliError::Status { status: status.as_u16(), message })
}

// =============================================================================
// WEBSOCKET
// =============================================================================

async fn run_watch(cli: &CliContext, args: WatchArgs) -> Result<(), CliError> {
    let mut stream = connect_board(cli, &args.board_id).await?;
    eprintln!("watching board {}", args.board_id);

    let mut seen = 0_usize;
    while args.max_frames.is_none_or(|max| seen < max) {
        let frame = match recv_next(&mut stream, None).await {
            Ok(frame) => frame,
            Err(CliError::WsClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        println!("{}", frames::encode(&frame)?);
        seen += 1;
    }
    stream.close(None).await?;
    Ok(())
}

async fn run_preview(cli: &CliContext, args: PreviewArgs) -> Result<(), CliError> {
    let stroke: Stroke = serde_json::from_str(&read_input(&args.input)?)?;
    stroke.validate()?;
    let user_id = args.user_id.unwrap_or_else(session_id);

    let mut stream = connect_board(cli, &args.board_id).await?;
    wait_for_init(&mut stream, cli.timeout).await?;
    let points = stroke.points.len();
    send_frame(&mut stream, &ClientFrame::StrokePreview { user_id: user_id.clone(), stroke }).await?;
    eprintln!("sent preview as {user_id}: {points} points");
    stream.close(None).await?;
    Ok(())
}

async fn run_cursor(cli: &CliContext, args: CursorArgs) -> Result<(), CliError> {
    let user_id = args.user_id.unwrap_or_else(session_id);
    let mut stream = connect_board(cli, &args.board_id).await?;
    wait_for_init(&mut stream, cli.timeout).await?;
    send_frame(&mut stream, &ClientFrame::Cursor { user_id, x: args.x, y: args.y }).await?;
    stream.close(None).await?;
    Ok(())
}

async fn connect_board(cli: &CliContext, board_id: &str) -> Result<WsStream, CliError> {
    let (stream, _) = connect_async(ws_url(&cli.base_url, board_id)?.as_str()).await?;
    Ok(stream)
}

/// Accept only `http` and `https` bases that can carry path segments.
fn parse_base_url(raw: &str) -> Result<Url, CliError> {
    let invalid = || CliError::InvalidBaseUrl(raw.to_owned());
    let url = Url::parse(raw).map_err(|_| invalid())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

/// Append `segments` to the base path. Each segment is percent-encoded,
/// `/` included, so board ids round-trip as a single segment.
fn api_url(base: &Url, segments: &[&str]) -> Result<Url, CliError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|()| CliError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn ws_url(base: &Url, board_id: &str) -> Result<Url, CliError> {
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return Err(CliError::InvalidBaseUrl(base.to_string())),
    };
    let mut url = api_url(base, &["ws"])?;
    url.set_scheme(scheme).map_err(|()| CliError::InvalidBaseUrl(base.to_string()))?;
    url.query_pairs_mut().append_pair("board", board_id);
    Ok(url)
}

async fn wait_for_init(stream: &mut WsStream, timeout: Duration) -> Result<Board, CliError> {
    match recv_next(stream, Some(timeout)).await? {
        ServerFrame::Init { board } => Ok(board),
        other => Err(CliError::UnexpectedFrame(frame_kind(&other))),
    }
}

async fn send_frame(stream: &mut WsStream, frame: &ClientFrame) -> Result<(), CliError> {
    stream.send(Message::Text(frames::encode(frame)?.into())).await?;
    Ok(())
}

async fn recv_next(stream: &mut WsStream, timeout: Option<Duration>) -> Result<ServerFrame, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message? {
                Message::Text(text) => return frames::decode_server_frame(text.as_str()).map_err(CliError::from),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| CliError::Timeout)?,
        None => fut.await,
    }
}

fn frame_kind(frame: &ServerFrame) -> &'static str {
    match frame {
        ServerFrame::Init { .. } => "init",
        ServerFrame::BoardUpdated { .. } => "board-updated",
        ServerFrame::StrokePreview { .. } => "stroke-preview",
        ServerFrame::Cursor { .. } => "cursor",
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn session_id() -> String {
    format!("cli-{}", Uuid::new_v4())
}

fn read_input(path: &str) -> Result<String, CliError> {
    let result = if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(path)
    };
    result.map_err(|source| CliError::Input { path: path.to_owned(), source })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
