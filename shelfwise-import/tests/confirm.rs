use std::cell::RefCell;

use shelfwise_catalog::types::*;
use shelfwise_db::*;
use shelfwise_import::*;

fn book(id: &str, title: &str, level: Option<&str>) -> CatalogBook {
    CatalogBook {
        id: id.to_string(),
        title: title.to_string(),
        author: None,
        reading_level: level.map(str::to_string),
        age_range: None,
        genre_ids: vec![],
        description: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

fn setup() -> Connection {
    let conn = open_memory().unwrap();
    insert_book(&conn, &book("b1", "Matilda", Some("3.0"))).unwrap();
    insert_book(&conn, &book("b2", "Holes", None)).unwrap();
    insert_book(&conn, &book("b3", "Wonder", Some("4.8"))).unwrap();
    conn
}

fn link(id: &str) -> LinkDecision {
    LinkDecision {
        existing_book_id: id.to_string(),
    }
}

fn confirm(conn: &Connection, request: &ConfirmRequest) -> BatchOperationResult {
    confirm_import(
        conn,
        "org1",
        "test.json",
        request,
        &BatchOptions::default(),
        &SilentProgress,
    )
    .unwrap()
}

#[derive(Default)]
struct RecordingProgress {
    chunks: RefCell<Vec<(usize, usize)>>,
}

impl ImportProgress for RecordingProgress {
    fn on_chunk(&self, current: usize, total: usize) {
        self.chunks.borrow_mut().push((current, total));
    }
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

#[test]
fn links_matched_books() {
    let conn = setup();
    let request = ConfirmRequest {
        matched: vec![link("b1"), link("b2")],
        ..Default::default()
    };
    let result = confirm(&conn, &request);

    assert_eq!(result.linked, 2);
    assert!(result.success);
    assert_eq!(available_selections(&conn, "org1").unwrap().len(), 2);
}

#[test]
fn second_of_three_links_fails_when_book_vanished() {
    let conn = setup();
    let request = ConfirmRequest {
        matched: vec![link("b1"), link("gone"), link("b3")],
        ..Default::default()
    };
    let result = confirm(&conn, &request);

    assert_eq!(result.linked, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, OpKind::Link);
    assert_eq!(result.errors[0].key, "gone");
    assert!(!result.success);

    // the failure did not roll back its neighbours
    let linked: Vec<_> = available_selections(&conn, "org1")
        .unwrap()
        .into_iter()
        .map(|s| s.book_id)
        .collect();
    assert_eq!(linked, vec!["b1", "b3"]);
}

#[test]
fn relinking_is_idempotent() {
    let conn = setup();
    upsert_selection(&conn, "org1", "b1").unwrap();
    set_availability(&conn, "org1", "b1", false).unwrap();

    let request = ConfirmRequest {
        matched: vec![link("b1")],
        ..Default::default()
    };
    let result = confirm(&conn, &request);
    assert!(result.success);
    confirm(&conn, &request);

    let selections = organization_selections(&conn, "org1").unwrap();
    assert_eq!(selections.len(), 1);
    assert!(selections[0].is_available);
}

#[test]
fn new_books_are_created_and_linked() {
    let conn = setup();
    let request = ConfirmRequest {
        new_books: vec![CreateDecision {
            title: "Charlotte's Web".to_string(),
            author: Some("E.B. White".to_string()),
            reading_level: Some("4.4".to_string()),
        }],
        ..Default::default()
    };
    let result = confirm(&conn, &request);

    assert_eq!(result.created, 1);
    assert_eq!(result.linked, 0);
    assert!(result.success);

    let books = organization_books(&conn, "org1").unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Charlotte's Web");
    assert_eq!(books[0].author.as_deref(), Some("E.B. White"));
    assert_eq!(books[0].id.len(), 36);
}

#[test]
fn conflicts_update_level_only_when_asked() {
    let conn = setup();
    let request = ConfirmRequest {
        conflicts: vec![
            ConflictDecision {
                existing_book_id: "b1".to_string(),
                update_reading_level: true,
                new_reading_level: Some("4.5".to_string()),
            },
            ConflictDecision {
                existing_book_id: "b3".to_string(),
                update_reading_level: false,
                new_reading_level: Some("9.9".to_string()),
            },
        ],
        ..Default::default()
    };
    let result = confirm(&conn, &request);

    assert_eq!(result.updated, 1);
    assert_eq!(result.linked, 2);
    assert!(result.success);
    assert_eq!(get_book(&conn, "b1").unwrap().unwrap().reading_level.as_deref(), Some("4.5"));
    assert_eq!(get_book(&conn, "b3").unwrap().unwrap().reading_level.as_deref(), Some("4.8"));
}

#[test]
fn vanished_conflict_book_reports_both_operations() {
    let conn = setup();
    let request = ConfirmRequest {
        conflicts: vec![ConflictDecision {
            existing_book_id: "gone".to_string(),
            update_reading_level: true,
            new_reading_level: Some("2.0".to_string()),
        }],
        ..Default::default()
    };
    let result = confirm(&conn, &request);

    let kinds: Vec<_> = result.errors.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![OpKind::Update, OpKind::Link]);
    assert_eq!(result.updated, 0);
    assert!(!result.success);
}

#[test]
fn invalid_request_writes_nothing() {
    let conn = setup();
    let request = ConfirmRequest {
        matched: vec![link("b1")],
        new_books: vec![CreateDecision {
            title: "   ".to_string(),
            author: None,
            reading_level: None,
        }],
        ..Default::default()
    };
    let err = confirm_import(
        &conn,
        "org1",
        "test.json",
        &request,
        &BatchOptions::default(),
        &SilentProgress,
    )
    .unwrap_err();

    assert!(matches!(err, ImportError::Validation(_)));
    assert!(organization_selections(&conn, "org1").unwrap().is_empty());
    assert!(list_import_logs(&conn, "org1", None).unwrap().is_empty());
}

#[test]
fn created_book_links_across_chunk_boundary() {
    let conn = setup();
    let create = |title: &str| CreateDecision {
        title: title.to_string(),
        author: None,
        reading_level: None,
    };
    let request = ConfirmRequest {
        new_books: vec![create("Frindle"), create("Hatchet")],
        ..Default::default()
    };
    // Four writes in chunks of three: the second book's link lands alone.
    let progress = RecordingProgress::default();
    let result = confirm_import(
        &conn,
        "org1",
        "split.json",
        &request,
        &BatchOptions { chunk_size: 3 },
        &progress,
    )
    .unwrap();

    assert_eq!(result.created, 2);
    assert!(result.errors.is_empty());
    assert!(result.success);
    assert_eq!(*progress.chunks.borrow(), vec![(1, 2), (2, 2)]);

    let titles: Vec<_> = organization_books(&conn, "org1")
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Frindle", "Hatchet"]);
}

#[test]
fn chunks_are_reported_and_logged() {
    let conn = setup();
    let request = ConfirmRequest {
        matched: vec![link("b1"), link("b2"), link("b3")],
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let result = confirm_import(
        &conn,
        "org1",
        "three.json",
        &request,
        &BatchOptions { chunk_size: 2 },
        &progress,
    )
    .unwrap();

    assert_eq!(result.linked, 3);
    assert_eq!(*progress.chunks.borrow(), vec![(1, 2), (2, 2)]);

    let logs = list_import_logs(&conn, "org1", None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source_type, "confirm");
    assert_eq!(logs[0].source_name, "three.json");
    assert_eq!(logs[0].records_linked, 3);
    assert_eq!(logs[0].errors, 0);
}

#[test]
fn confirm_request_parses_camel_case_payload() {
    let json = r#"{
        "matched": [{"existingBookId": "b1"}],
        "newBooks": [{"title": "Wonder", "author": null, "readingLevel": "4.8"}],
        "conflicts": [{"existingBookId": "b3", "updateReadingLevel": true, "newReadingLevel": "5"}]
    }"#;
    let request: ConfirmRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.matched[0].existing_book_id, "b1");
    assert_eq!(request.new_books[0].reading_level.as_deref(), Some("4.8"));
    assert!(request.conflicts[0].update_reading_level);
    assert_eq!(request.decisions().len(), 3);
}
