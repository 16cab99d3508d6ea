use super::*;
use frames::{Color, Point, Stroke, Tool};

fn cursor(user: &str) -> ServerFrame {
    ServerFrame::Cursor { user_id: user.into(), x: 1.0, y: 2.0 }
}

fn preview() -> ServerFrame {
    let stroke = Stroke::begin(Tool::Pen, Color::BLACK, 4.0, 1.0, Point::new(0.0, 0.0, 1.0));
    ServerFrame::StrokePreview { user_id: "u".into(), stroke }
}

#[test]
fn join_counts_and_part_removes_empty_board() {
    let registry = ConnectionRegistry::new();
    let (tx, _rx) = mpsc::channel(4);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(registry.join("board", a, tx.clone()), 1);
    assert_eq!(registry.join("board", b, tx), 2);
    registry.part("board", a);
    assert_eq!(registry.peer_count("board"), 1);
    registry.part("board", b);
    assert_eq!(registry.peer_count("board"), 0);
    assert_eq!(registry.board_count(), 0);
}

#[test]
fn part_unknown_is_noop() {
    let registry = ConnectionRegistry::new();
    registry.part("nowhere", Uuid::new_v4());
    assert_eq!(registry.board_count(), 0);
}

#[tokio::test]
async fn broadcast_skips_excluded_sender() {
    let registry = ConnectionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::channel(4);
    let (tx_b, mut rx_b) = mpsc::channel(4);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    registry.join("board", a, tx_a);
    registry.join("board", b, tx_b);

    assert_eq!(registry.broadcast("board", &preview(), Some(a)), 1);
    assert_eq!(rx_b.recv().await, Some(preview()));
    assert!(rx_a.try_recv().is_err());
}

#[tokio::test]
async fn broadcast_is_scoped_to_board() {
    let registry = ConnectionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::channel(4);
    let (tx_b, mut rx_b) = mpsc::channel(4);
    registry.join("one", Uuid::new_v4(), tx_a);
    registry.join("two", Uuid::new_v4(), tx_b);

    registry.broadcast("one", &cursor("x"), None);
    assert_eq!(rx_a.recv().await, Some(cursor("x")));
    assert!(rx_b.try_recv().is_err());
}

#[test]
fn closed_receiver_is_evicted() {
    let registry = ConnectionRegistry::new();
    let (tx, rx) = mpsc::channel(4);
    let (tx_live, _rx_live) = mpsc::channel(4);
    registry.join("board", Uuid::new_v4(), tx);
    registry.join("board", Uuid::new_v4(), tx_live);
    drop(rx);

    assert_eq!(registry.broadcast("board", &cursor("x"), None), 1);
    assert_eq!(registry.peer_count("board"), 1);
}

#[test]
fn last_closed_receiver_removes_board() {
    let registry = ConnectionRegistry::new();
    let (tx, rx) = mpsc::channel(4);
    registry.join("board", Uuid::new_v4(), tx);
    drop(rx);

    assert_eq!(registry.broadcast("board", &cursor("x"), None), 0);
    assert_eq!(registry.board_count(), 0);
}

#[tokio::test]
async fn full_queue_drops_frame_but_keeps_connection() {
    let registry = ConnectionRegistry::new();
    let (tx, mut rx) = mpsc::channel(1);
    registry.join("board", Uuid::new_v4(), tx);

    assert_eq!(registry.broadcast("board", &cursor("first"), None), 1);
    assert_eq!(registry.broadcast("board", &cursor("second"), None), 0);
    assert_eq!(registry.peer_count("board"), 1);

    assert_eq!(rx.recv().await, Some(cursor("first")));
    assert_eq!(registry.broadcast("board", &cursor("third"), None), 1);
    assert_eq!(rx.recv().await, Some(cursor("third")));
}
