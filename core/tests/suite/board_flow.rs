use std::sync::Arc;

use engine_room_core::Board;
use engine_room_core::FileKvStore;
use engine_room_core::Notice;
use engine_room_core::RecordStore;
use engine_room_core::Status;
use engine_room_core::board::Area;
use engine_room_core::board::HitTree;
use engine_room_core::board::NodeKind;
use engine_room_core::board::RecordPatch;
use engine_room_core::export::export_csv;
use engine_room_core::storage::KeyValueStore;
use engine_room_core::storage::RECORDS_KEY;
use engine_room_core::submission::NewApplication;
use engine_room_core::submission::submit;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> (RecordStore, Arc<FileKvStore>) {
    let kv = Arc::new(FileKvStore::open(dir.path()).unwrap());
    (RecordStore::new(kv.clone()), kv)
}

fn application(name: &str, stage: &str) -> NewApplication {
    NewApplication {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        stage: stage.to_string(),
        description: format!("{name} builds things"),
        ..Default::default()
    }
}

/// Five 20-cell columns, bodies from row 2.
fn hit_tree() -> HitTree {
    let mut tree = HitTree::new();
    let board = tree.push(NodeKind::Board, Area::new(0, 0, 100, 20), None);
    for (i, status) in Status::COLUMNS.iter().enumerate() {
        let x = i as u16 * 20;
        let column = tree.push(
            NodeKind::Column(status.clone()),
            Area::new(x, 0, 20, 20),
            Some(board),
        );
        tree.push(
            NodeKind::ColumnBody(status.clone()),
            Area::new(x, 2, 20, 18),
            Some(column),
        );
    }
    tree
}

#[test]
fn submit_drag_edit_and_export_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let (store, _kv) = file_store(&dir);

    let ada = submit(&store, application("Ada", "scaling")).unwrap();
    let alan = submit(&store, application("Alan", "revenue")).unwrap();
    assert!(alan.id > ada.id);

    let mut board = Board::new(store);
    let stats = board.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending_count, 2);
    assert_eq!(stats.pipeline_display(), "$150k");

    // Drag Ada into Interview (third column).
    let notice = board
        .drop_card(&ada.id.to_string(), &hit_tree(), 45, 10)
        .unwrap();
    assert_eq!(notice, Notice::success("Moved application to Interview"));

    board.select(alan.id).unwrap();
    board
        .save_selection(RecordPatch {
            notes: Some("call back next week".to_string()),
            status: Some(Status::Accepted),
        })
        .unwrap();

    // A fresh board over the same directory sees every change.
    let (store, _kv) = file_store(&dir);
    let board = Board::new(store);
    let projection = board.projection();
    assert_eq!(projection.column(&Status::Interview).unwrap().len(), 1);
    assert_eq!(projection.column(&Status::Accepted).unwrap().len(), 1);
    assert!(projection.column(&Status::New).unwrap().is_empty());
    assert_eq!(board.record(alan.id).unwrap().notes, "call back next week");
    assert_eq!(board.stats().acceptance_rate_percent, 50);

    let csv = export_csv(board.records()).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("\"call back next week\""));
}

#[test]
fn load_then_save_reproduces_persisted_document() {
    let dir = TempDir::new().unwrap();
    let (store, kv) = file_store(&dir);
    let document = r#"[{"id":1,"name":"Ada","business-name":"Engines","stage":"mvp","description":"d","status":"Review","date":"1/1/2026","notes":"","email":"a@x.io","website":"https://x.io"},{"id":2,"name":"Bo","stage":"idea","description":"","status":"Parked","date":"","notes":"n"}]"#;
    kv.set(RECORDS_KEY, document).unwrap();

    let records = store.load();
    assert_eq!(records.len(), 2);
    store.save(&records).unwrap();

    let resaved = kv.get(RECORDS_KEY).unwrap().unwrap();
    let before: serde_json::Value = serde_json::from_str(document).unwrap();
    let after: serde_json::Value = serde_json::from_str(&resaved).unwrap();
    assert_eq!(after, before);
}

#[test]
fn unknown_status_is_kept_but_not_rendered() {
    let dir = TempDir::new().unwrap();
    let (store, kv) = file_store(&dir);
    kv.set(
        RECORDS_KEY,
        r#"[{"id":1,"name":"Ada","status":"Parked"},{"id":2,"name":"Bo","status":"New"}]"#,
    )
    .unwrap();

    let mut board = Board::new(store);
    assert_eq!(board.projection().visible().count(), 1);
    assert_eq!(board.projection().unplaced.len(), 1);

    board.move_card(engine_room_core::RecordId(2), &Status::Review);
    let persisted = kv.get(RECORDS_KEY).unwrap().unwrap();
    assert!(persisted.contains(r#""status":"Parked""#));
}

#[test]
fn moving_a_card_keeps_undecodable_siblings() {
    let dir = TempDir::new().unwrap();
    let (store, kv) = file_store(&dir);
    kv.set(
        RECORDS_KEY,
        r#"[{"id":1,"name":"Ada","status":"New"},{"id":2,"name":"Bo","notes":null,"phone":5551234}]"#,
    )
    .unwrap();

    let mut board = Board::new(store.clone());
    assert_eq!(board.records().len(), 1);
    assert!(board.move_card(engine_room_core::RecordId(1), &Status::Interview).is_some());
    board.select(engine_room_core::RecordId(1)).unwrap();
    board
        .save_selection(RecordPatch {
            notes: Some("second look".to_string()),
            status: None,
        })
        .unwrap();
    submit(&store, application("Cy", "mvp")).unwrap();

    let persisted: serde_json::Value =
        serde_json::from_str(&kv.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    let entries = persisted.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["status"], "Interview");
    assert_eq!(entries[0]["notes"], "second look");
    assert_eq!(
        entries[1],
        serde_json::json!({"id": 2, "name": "Bo", "notes": null, "phone": 5551234})
    );
    assert_eq!(entries[2]["name"], "Cy");
}
