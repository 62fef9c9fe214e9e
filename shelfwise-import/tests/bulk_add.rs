use shelfwise_catalog::types::*;
use shelfwise_db::*;
use shelfwise_import::*;

fn new_book(title: &str, author: Option<&str>) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.map(str::to_string),
        ..Default::default()
    }
}

fn add(conn: &Connection, books: Vec<NewBook>) -> BulkAddResult {
    bulk_add(
        conn,
        "org1",
        "books.csv",
        books,
        &BatchOptions::default(),
        &SilentProgress,
    )
    .unwrap()
}

#[test]
fn adds_and_links_new_books() {
    let conn = open_memory().unwrap();
    let mut holes = new_book("Holes", Some("Louis Sachar"));
    holes.genre_ids = vec!["adventure".to_string(), "adventure".to_string()];
    let result = add(&conn, vec![holes, new_book("Matilda", Some("Roald Dahl"))]);

    assert_eq!(result.imported, 2);
    assert_eq!(result.duplicates, 0);
    assert_eq!(result.total, 2);
    assert_eq!(result.books[0].title, "Holes");
    assert_eq!(result.books[0].genre_ids, vec!["adventure"]);
    assert!(!result.books[0].created_at.is_empty());
    assert_eq!(organization_books(&conn, "org1").unwrap().len(), 2);
}

#[test]
fn duplicate_of_catalog_with_missing_author_is_skipped() {
    let conn = open_memory().unwrap();
    add(&conn, vec![new_book("Matilda", Some("Roald Dahl"))]);

    let result = add(&conn, vec![new_book("MATILDA!", None)]);
    assert_eq!(result.imported, 0);
    assert_eq!(result.duplicates, 1);
    assert_eq!(all_books(&conn).unwrap().len(), 1);
}

#[test]
fn book_with_malformed_genres_is_still_a_duplicate() {
    let conn = open_memory().unwrap();
    add(&conn, vec![new_book("Matilda", Some("Roald Dahl"))]);
    conn.execute("UPDATE catalog_books SET genre_ids = 'not json'", [])
        .unwrap();

    let result = add(&conn, vec![new_book("Matilda", Some("Roald Dahl"))]);
    assert_eq!(result.imported, 0);
    assert_eq!(result.duplicates, 1);
    assert_eq!(all_books(&conn).unwrap().len(), 1);
}

#[test]
fn duplicates_within_one_request_are_skipped() {
    let conn = open_memory().unwrap();
    let result = add(
        &conn,
        vec![
            new_book("Holes", None),
            new_book("holes.", Some("Louis Sachar")),
            new_book("Holes", Some("Someone Else")),
        ],
    );
    // the second row matches the first (author missing there); the third has
    // a different author but is compared to the first, whose author is empty
    assert_eq!(result.imported, 1);
    assert_eq!(result.duplicates, 2);
    assert_eq!(result.total, 3);
}

#[test]
fn different_authors_are_distinct_books() {
    let conn = open_memory().unwrap();
    let result = add(
        &conn,
        vec![
            new_book("Selected Poems", Some("Emily Dickinson")),
            new_book("Selected Poems", Some("Robert Frost")),
        ],
    );
    assert_eq!(result.imported, 2);
    assert_eq!(result.duplicates, 0);
}

#[test]
fn blank_titles_are_ignored() {
    let conn = open_memory().unwrap();
    let result = add(&conn, vec![new_book("  ", None), new_book("Wonder", None)]);
    assert_eq!(result.imported, 1);
    assert_eq!(result.total, 2);
}

#[test]
fn empty_request_is_rejected() {
    let conn = open_memory().unwrap();
    let err = bulk_add(
        &conn,
        "org1",
        "books.csv",
        vec![],
        &BatchOptions::default(),
        &SilentProgress,
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
}

#[test]
fn bulk_add_is_logged() {
    let conn = open_memory().unwrap();
    add(&conn, vec![new_book("Wonder", None)]);

    let logs = list_import_logs(&conn, "org1", None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source_type, "bulk_add");
    assert_eq!(logs[0].records_created, 1);
}

#[test]
fn result_serializes_in_camel_case() {
    let conn = open_memory().unwrap();
    let result = add(&conn, vec![new_book("Wonder", None)]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["imported"], 1);
    assert_eq!(json["books"][0]["title"], "Wonder");
    assert!(json["books"][0]["genreIds"].is_array());
    assert!(json.get("errors").is_none());
}
