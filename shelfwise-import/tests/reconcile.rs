use shelfwise_catalog::types::*;
use shelfwise_db::*;
use shelfwise_import::*;

fn book(id: &str, title: &str, author: Option<&str>, level: Option<&str>) -> CatalogBook {
    CatalogBook {
        id: id.to_string(),
        title: title.to_string(),
        author: author.map(str::to_string),
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
    insert_book(&conn, &book("matilda", "Matilda", Some("Roald Dahl"), Some("3.0"))).unwrap();
    insert_book(&conn, &book("hobbit", "The Hobbit", Some("J.R.R. Tolkien"), Some("5.5"))).unwrap();
    insert_book(&conn, &book("holes", "Holes", Some("Louis Sachar"), None)).unwrap();
    conn
}

fn preview(conn: &Connection, org: &str, candidates: &[ImportCandidate]) -> ImportPreview {
    preview_import(conn, org, candidates, &ReconcileOptions::default()).unwrap()
}

#[test]
fn linked_book_is_already_in_library() {
    let conn = setup();
    upsert_selection(&conn, "org1", "matilda").unwrap();

    let candidate = ImportCandidate::new("Matilda")
        .with_author("Roald Dahl")
        .with_reading_level("3.0");
    let result = preview(&conn, "org1", &[candidate]);

    assert_eq!(result.summary.already_in_library, 1);
    assert_eq!(
        result.already_in_library[0].category,
        MatchCategory::AlreadyInLibrary {
            existing_id: "matilda".to_string()
        }
    );
}

#[test]
fn selection_of_another_org_does_not_count() {
    let conn = setup();
    upsert_selection(&conn, "org2", "matilda").unwrap();

    let result = preview(&conn, "org1", &[ImportCandidate::new("Matilda")]);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(result.summary.already_in_library, 0);
}

#[test]
fn unavailable_selection_is_not_in_library() {
    let conn = setup();
    upsert_selection(&conn, "org1", "matilda").unwrap();
    set_availability(&conn, "org1", "matilda", false).unwrap();

    let result = preview(&conn, "org1", &[ImportCandidate::new("Matilda")]);
    assert_eq!(result.summary.matched, 1);
}

#[test]
fn differing_level_is_conflict() {
    let conn = setup();
    let candidate = ImportCandidate::new("Matilda")
        .with_author("Roald Dahl")
        .with_reading_level("4.5");
    let result = preview(&conn, "org1", &[candidate]);

    assert_eq!(result.summary.conflicts, 1);
    let MatchCategory::Conflict { existing_id, details } = &result.conflicts[0].category else {
        panic!("expected conflict");
    };
    assert_eq!(existing_id, "matilda");
    assert_eq!(details.existing_reading_level, "3.0");
    assert_eq!(details.imported_reading_level, "4.5");
}

#[test]
fn missing_level_is_matched() {
    let conn = setup();
    let candidate = ImportCandidate::new("Matilda").with_author("Roald Dahl");
    let result = preview(&conn, "org1", &[candidate]);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(result.matched[0].existing.as_ref().unwrap().id, "matilda");
}

#[test]
fn misspelled_title_is_possible_match() {
    let conn = setup();
    let candidate = ImportCandidate::new("The Hobit").with_author("Tolkien");
    let result = preview(&conn, "org1", &[candidate]);

    assert_eq!(result.summary.possible_matches, 1);
    assert!(matches!(
        &result.possible_matches[0].category,
        MatchCategory::PossibleMatch { existing_id, .. } if existing_id == "hobbit"
    ));
}

#[test]
fn unknown_title_is_new_book() {
    let conn = setup();
    let result = preview(&conn, "org1", &[ImportCandidate::new("Some Totally New Title")]);
    assert_eq!(result.summary.new_books, 1);
    assert_eq!(result.summary.total, 1);
}

#[test]
fn preview_does_not_write() {
    let conn = setup();
    let candidates = vec![
        ImportCandidate::new("Matilda").with_reading_level("9"),
        ImportCandidate::new("Brand New"),
    ];
    preview(&conn, "org1", &candidates);

    let stats = catalog_stats(&conn, Some("org1")).unwrap();
    assert_eq!(stats.books, 3);
    assert_eq!(stats.selections_available, 0);
    assert_eq!(get_book(&conn, "matilda").unwrap().unwrap().reading_level.as_deref(), Some("3.0"));
}

#[test]
fn empty_and_titleless_lists_are_rejected() {
    let conn = setup();
    let err = preview_import(&conn, "org1", &[], &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));

    let blank = vec![ImportCandidate::new("  "), ImportCandidate::new("")];
    let err = preview_import(&conn, "org1", &blank, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
}

#[test]
fn punctuation_only_titles_are_rejected() {
    let conn = setup();
    let punctuation = vec![ImportCandidate::new("???"), ImportCandidate::new(" -- ")];
    let err =
        preview_import(&conn, "org1", &punctuation, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));

    let mixed = vec![ImportCandidate::new("???"), ImportCandidate::new("Holes")];
    let result = preview(&conn, "org1", &mixed);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(result.summary.skipped, 1);
}

#[test]
fn book_with_malformed_genres_still_matches() {
    let conn = setup();
    conn.execute(
        "UPDATE catalog_books SET genre_ids = 'not json' WHERE id = 'matilda'",
        [],
    )
    .unwrap();

    let candidate = ImportCandidate::new("Matilda").with_author("Roald Dahl");
    let result = preview(&conn, "org1", &[candidate]);
    assert_eq!(result.summary.new_books, 0);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(
        result.matched[0].category,
        MatchCategory::Matched {
            existing_id: "matilda".to_string()
        }
    );
}

#[test]
fn stricter_threshold_turns_possible_match_into_new_book() {
    let conn = setup();
    let candidate = ImportCandidate::new("The Hobit").with_author("Tolkien");
    let strict = ReconcileOptions {
        fuzzy_threshold: 0.95,
    };
    let result = preview_import(&conn, "org1", &[candidate], &strict).unwrap();
    assert_eq!(result.summary.new_books, 1);
}

#[test]
fn preview_serializes_in_camel_case() {
    let conn = setup();
    let result = preview(&conn, "org1", &[ImportCandidate::new("Holes")]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["matched"], 1);
    assert_eq!(json["possibleMatches"].as_array().unwrap().len(), 0);
    assert_eq!(json["matched"][0]["category"]["existingId"], "holes");
    assert_eq!(json["matched"][0]["existing"]["title"], "Holes");
}
