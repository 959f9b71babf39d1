use std::collections::HashMap;
use flatbase::{Cast, Config, Database, ErrorKind, Relation, Value};
use flatbase::migration::engine::Position;

fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        base_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let db = Database::open(config).unwrap();
    (dir, db)
}

fn vals(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn crud_lifecycle() {
    let (_dir, db) = temp_db();
    db.create_table("users", &["id", "name"]).unwrap();
    let users = db.model("users");

    let a = users.create(vals(&[("name", "A".into())])).unwrap();
    assert_eq!(a.get_int("id").unwrap(), 1);
    let b = users.create(vals(&[("name", "B".into())])).unwrap();
    assert_eq!(b.get_int("id").unwrap(), 2);

    let found = users.query().unwrap().filter("name", "A").first().unwrap();
    assert_eq!(found.get_int("id").unwrap(), 1);

    let affected = users.query().unwrap().filter("id", 1).delete().unwrap();
    assert_eq!(affected, 1);
    assert_eq!(users.query().unwrap().count().unwrap(), 1);

    // Key generation resumes from the remaining maximum
    let c = users.create(vals(&[("name", "C".into())])).unwrap();
    assert_eq!(c.get_int("id").unwrap(), 3);
}

#[test]
fn record_edit_and_save() {
    let (_dir, db) = temp_db();
    db.create_table("users", &["id", "name"]).unwrap();
    let users = db.model("users");
    users.create(vals(&[("name", "A".into())])).unwrap();

    let mut record = users.find(1).unwrap();
    record.set("name", Value::Text("Ada".into()));
    // In-memory edit is invisible until saved
    assert_eq!(users.find(1).unwrap().get_str("name").unwrap(), "A");

    users.save(&record).unwrap();
    assert_eq!(users.find(1).unwrap().get_str("name").unwrap(), "Ada");
}

#[test]
fn column_migrations_walk_through() {
    let (_dir, db) = temp_db();
    db.create_table("users", &["id", "name"]).unwrap();
    let users = db.model("users");
    users.create(vals(&[("name", "A".into())])).unwrap();
    users.create(vals(&[("name", "B".into())])).unwrap();

    db.change_table("users", |t| {
        t.add_at("flag", "0", Position::After("name".into()))
    })
    .unwrap();
    let schema = users.table().unwrap().schema().unwrap();
    assert_eq!(schema.columns(), &["id", "name", "flag"]);
    let rows = users.table().unwrap().read_rows().unwrap();
    assert!(rows.iter().all(|r| r[2] == "0"));

    db.change_table("users", |t| t.rename("flag", "active")).unwrap();
    let schema = users.table().unwrap().schema().unwrap();
    assert_eq!(schema.columns(), &["id", "name", "active"]);
    let rows = users.table().unwrap().read_rows().unwrap();
    assert!(rows.iter().all(|r| r[2] == "0"));

    db.change_table("users", |t| t.delete("active")).unwrap();
    let schema = users.table().unwrap().schema().unwrap();
    assert_eq!(schema.columns(), &["id", "name"]);
    assert!(users.table().unwrap().read_rows().unwrap().iter().all(|r| r.len() == 2));
}

#[test]
fn eager_loading_over_created_data() {
    let (_dir, db) = temp_db();
    db.create_table("authors", &["id", "name"]).unwrap();
    db.create_table("books", &["id", "author_id", "title"]).unwrap();

    let books = db.model("books");
    let authors = db
        .model("authors")
        .relate("books", Relation::has_many(books.clone()).with_foreign_key("author_id"));

    let ada = authors.create(vals(&[("name", "Ada".into())])).unwrap();
    let bob = authors.create(vals(&[("name", "Bob".into())])).unwrap();
    let ada_id = ada.get_int("id").unwrap();
    let bob_id = bob.get_int("id").unwrap();

    books
        .create(vals(&[("author_id", ada_id.into()), ("title", "one".into())]))
        .unwrap();
    books
        .create(vals(&[("author_id", ada_id.into()), ("title", "two".into())]))
        .unwrap();
    books
        .create(vals(&[("author_id", bob_id.into()), ("title", "three".into())]))
        .unwrap();

    let loaded = authors.query().unwrap().with(&["books"]).order_by("id").get().unwrap();
    assert_eq!(loaded[0].related("books").len(), 2);
    assert_eq!(loaded[1].related("books").len(), 1);
}

#[test]
fn casts_survive_write_and_read() {
    let (_dir, db) = temp_db();
    db.create_table("events", &["id", "payload", "tags", "seen"]).unwrap();
    let events = db
        .model("events")
        .cast("payload", Cast::Object)
        .cast("tags", Cast::Array)
        .cast("seen", Cast::Bool);

    let payload: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(r#"{"k":1}"#).unwrap();
    events
        .create(vals(&[
            ("payload", Value::Object(payload.clone())),
            ("tags", Value::Array(vec!["a".into(), "b".into()])),
            ("seen", Value::Bool(true)),
        ]))
        .unwrap();

    let record = events.find(1).unwrap();
    assert_eq!(record.get("payload"), Some(&Value::Object(payload)));
    assert!(record.get_bool("seen").unwrap());
    assert!(matches!(record.get("tags"), Some(Value::Array(items)) if items.len() == 2));
}

#[test]
fn pagination_descriptors() {
    let (_dir, db) = temp_db();
    db.create_table("rows", &["id", "n"]).unwrap();
    let rows = db.model("rows");
    for i in 0..7 {
        rows.create(vals(&[("n", (i * 10).into())])).unwrap();
    }

    let page = rows.query().unwrap().paginate(2, 3).unwrap();
    assert_eq!(page.state.total, 7);
    assert_eq!(page.state.page_count(), 3);
    assert_eq!(page.state.offset, 3);
    assert_eq!(page.items.len(), 3);
    assert!(page.state.crumbs[1].active);
}

#[test]
fn truncate_keeps_schema() {
    let (_dir, db) = temp_db();
    db.create_table("users", &["id", "name"]).unwrap();
    let users = db.model("users");
    users.create(vals(&[("name", "A".into())])).unwrap();

    users.truncate().unwrap();
    assert_eq!(users.query().unwrap().count().unwrap(), 0);
    assert_eq!(users.primary_key().unwrap(), "id");
}

#[test]
fn migration_errors_leave_file_untouched() {
    let (_dir, db) = temp_db();
    db.create_table("users", &["id", "name"]).unwrap();
    let users = db.model("users");
    users.create(vals(&[("name", "A".into())])).unwrap();

    assert_eq!(
        db.change_table("users", |t| t.rename("missing", "x")).unwrap_err().kind,
        ErrorKind::UnknownColumn
    );
    assert_eq!(
        db.change_table("users", |t| t.add("name", "")).unwrap_err().kind,
        ErrorKind::Schema
    );
    assert_eq!(users.query().unwrap().count().unwrap(), 1);
}
