use notebox_core::db::open_db_in_memory;
use notebox_core::{
    AuthService, InMemorySessionStore, NoteService, NoteServiceError, SqliteNoteRepository,
    SqliteUserRepository, UserIdentity, ValidationError, NEW_NOTE_ID,
};
use rusqlite::Connection;

fn register(conn: &Connection, email: &str) -> UserIdentity {
    let sessions = InMemorySessionStore::new();
    let auth = AuthService::new(SqliteUserRepository::try_new(conn).unwrap(), &sessions);
    let grant = auth.register(email, "pw").unwrap();
    grant.identity
}

fn note_service(conn: &Connection) -> NoteService<SqliteNoteRepository<'_>> {
    NoteService::new(SqliteNoteRepository::try_new(conn).unwrap())
}

#[test]
fn create_then_get_returns_trimmed_fields_and_equal_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    let id = notes.create_note(&owner, "T", "").unwrap();
    let note = notes.get_note(&owner, id).unwrap();

    assert_eq!(note.title, "T");
    assert_eq!(note.content, "");
    assert_eq!(note.user_id, owner.user_id());
    assert_eq!(note.created_at, note.updated_at);
}

#[test]
fn create_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    let err = notes.create_note(&owner, "   ", "body").unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(ValidationError::EmptyTitle)
    ));
    assert!(notes.list_notes(&owner).unwrap().is_empty());
}

#[test]
fn foreign_notes_are_not_found_for_every_operation() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice@x.com");
    let mallory = register(&conn, "mallory@x.com");
    let notes = note_service(&conn);
    let id = notes.create_note(&alice, "Private", "secret").unwrap();

    assert!(matches!(
        notes.get_note(&mallory, id).unwrap_err(),
        NoteServiceError::NotFound(found) if found == id
    ));
    assert!(matches!(
        notes.update_note(&mallory, id, "Owned", "pwned").unwrap_err(),
        NoteServiceError::NotFound(_)
    ));
    assert!(matches!(
        notes.delete_note(&mallory, id).unwrap_err(),
        NoteServiceError::NotFound(_)
    ));
    assert!(notes.list_notes(&mallory).unwrap().is_empty());

    let untouched = notes.get_note(&alice, id).unwrap();
    assert_eq!(untouched.title, "Private");
    assert_eq!(untouched.content, "secret");
}

#[test]
fn foreign_and_missing_notes_report_the_same_error() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice@x.com");
    let bob = register(&conn, "bob@x.com");
    let notes = note_service(&conn);
    let alice_note = notes.create_note(&alice, "Mine", "").unwrap();
    let missing = alice_note + 1000;

    let foreign = notes.get_note(&bob, alice_note).unwrap_err().to_string();
    let absent = notes.get_note(&bob, missing).unwrap_err().to_string();
    assert_eq!(
        foreign.replace(&alice_note.to_string(), "<id>"),
        absent.replace(&missing.to_string(), "<id>")
    );
}

#[test]
fn foreign_update_with_empty_title_is_still_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice@x.com");
    let bob = register(&conn, "bob@x.com");
    let notes = note_service(&conn);
    let id = notes.create_note(&alice, "Mine", "").unwrap();

    let err = notes.update_note(&bob, id, "", "").unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));
}

#[test]
fn update_with_empty_title_leaves_note_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);
    let id = notes.create_note(&owner, "Shopping", "milk").unwrap();
    let before = notes.get_note(&owner, id).unwrap();

    let err = notes.update_note(&owner, id, "  ", "milk, eggs").unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(ValidationError::EmptyTitle)
    ));
    assert_eq!(notes.get_note(&owner, id).unwrap(), before);
}

#[test]
fn update_overwrites_fields_and_advances_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);
    let id = notes.create_note(&owner, "Shopping", "milk,eggs").unwrap();
    let before = notes.get_note(&owner, id).unwrap();

    notes
        .update_note(&owner, id, "Shopping", "milk,eggs,bread")
        .unwrap();
    let after = notes.get_note(&owner, id).unwrap();

    assert_eq!(after.content, "milk,eggs,bread");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn delete_removes_note_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);
    let id = notes.create_note(&owner, "Temp", "").unwrap();

    notes.delete_note(&owner, id).unwrap();
    assert!(matches!(
        notes.get_note(&owner, id).unwrap_err(),
        NoteServiceError::NotFound(_)
    ));
    assert!(matches!(
        notes.delete_note(&owner, id).unwrap_err(),
        NoteServiceError::NotFound(_)
    ));
    assert!(matches!(
        notes.update_note(&owner, id, "Back", "").unwrap_err(),
        NoteServiceError::NotFound(_)
    ));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(rows, 0, "delete must not leave a tombstone");
}

#[test]
fn list_orders_by_most_recent_touch() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    let a = notes.create_note(&owner, "A", "").unwrap();
    let b = notes.create_note(&owner, "B", "").unwrap();
    let listed: Vec<_> = notes
        .list_notes(&owner)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![b, a]);

    notes.update_note(&owner, a, "A", "touched").unwrap();
    let listed: Vec<_> = notes
        .list_notes(&owner)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![a, b]);
}

#[test]
fn list_is_scoped_to_owner_and_carries_display_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice@x.com");
    let bob = register(&conn, "bob@x.com");
    let notes = note_service(&conn);
    notes.create_note(&alice, "Alice 1", "").unwrap();
    notes.create_note(&bob, "Bob 1", "").unwrap();
    notes.create_note(&alice, "Alice 2", "").unwrap();

    let listed = notes.list_notes(&alice).unwrap();
    let titles: Vec<_> = listed.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Alice 2", "Alice 1"]);
    for summary in &listed {
        assert_eq!(
            summary.display_timestamp,
            summary.updated_at.format("%d %b %Y %I:%M %p").to_string()
        );
    }
}

#[test]
fn new_note_sentinel_is_never_looked_up() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    assert_eq!(notes.editor_note(&owner, NEW_NOTE_ID).unwrap(), None);
    assert!(matches!(
        notes.get_note(&owner, NEW_NOTE_ID).unwrap_err(),
        NoteServiceError::NotFound(NEW_NOTE_ID)
    ));
}

#[test]
fn save_creates_for_sentinel_and_updates_otherwise() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    let id = notes.save_note(&owner, NEW_NOTE_ID, "Draft", "v1").unwrap();
    assert_ne!(id, NEW_NOTE_ID);

    let same = notes.save_note(&owner, id, "Draft", "v2").unwrap();
    assert_eq!(same, id);
    assert_eq!(notes.get_note(&owner, id).unwrap().content, "v2");
    assert_eq!(notes.list_notes(&owner).unwrap().len(), 1);

    let editing = notes.editor_note(&owner, id).unwrap().unwrap();
    assert_eq!(editing.title, "Draft");
}

#[test]
fn end_to_end_register_create_update_list_delete() {
    let conn = open_db_in_memory().unwrap();
    let sessions = InMemorySessionStore::new();
    let auth = AuthService::new(SqliteUserRepository::try_new(&conn).unwrap(), &sessions);
    let notes = note_service(&conn);

    let grant = auth.register("a@x.com", "pw1").unwrap();
    let user = auth.require_session(Some(&grant.session_key)).unwrap();

    let id = notes.create_note(&user, "Shopping", "milk,eggs").unwrap();
    let created = notes.get_note(&user, id).unwrap();
    notes
        .update_note(&user, id, "Shopping", "milk,eggs,bread")
        .unwrap();
    assert!(notes.get_note(&user, id).unwrap().updated_at > created.updated_at);

    let listed = notes.list_notes(&user).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].title, "Shopping");

    notes.delete_note(&user, id).unwrap();
    assert!(notes.list_notes(&user).unwrap().is_empty());

    auth.terminate(&grant.session_key).unwrap();
    assert!(auth.require_session(Some(&grant.session_key)).is_err());
}

#[test]
fn note_ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);

    let first = notes.create_note(&owner, "One", "").unwrap();
    notes.delete_note(&owner, first).unwrap();
    let second = notes.create_note(&owner, "Two", "").unwrap();
    assert!(second > first);
}

#[test]
fn summaries_serialize_without_raw_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "a@x.com");
    let notes = note_service(&conn);
    notes.create_note(&owner, "Json", "").unwrap();

    let listed = notes.list_notes(&owner).unwrap();
    let value = serde_json::to_value(&listed[0]).unwrap();
    assert_eq!(value["title"], "Json");
    assert!(value.get("display_timestamp").is_some());
    assert!(value.get("updated_at").is_none());
}
