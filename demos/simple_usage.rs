/// flatbase walkthrough
///
/// Demonstrates the main surface:
/// - table creation and migration
/// - create / query / update / delete
/// - relations with lazy and eager loading
/// - pagination descriptors

use flatbase::migration::engine::Position;
use flatbase::{Config, Database, Relation, Value};
use std::collections::HashMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = Database::open(Config {
        base_dir: dir.path().to_path_buf(),
        ..Config::default()
    })?;

    // Step 1: tables
    println!("Creating tables...");
    db.create_table("users", &["id", "name", "age"])?;
    db.create_table("posts", &["id", "user_id", "title"])?;

    let posts = db.model("posts");
    let users = db
        .model("users")
        .relate("posts", Relation::has_many(posts.clone()));

    // Step 2: INSERT
    println!("Inserting rows...");
    for (name, age) in [("Ada", 36), ("Bob", 20), ("Cara", 45)] {
        users.create(values(&[("name", name.into()), ("age", age.into())]))?;
    }
    posts.create(values(&[("user_id", 1.into()), ("title", "hello".into())]))?;
    posts.create(values(&[("user_id", 1.into()), ("title", "again".into())]))?;
    posts.create(values(&[("user_id", 2.into()), ("title", "hi".into())]))?;

    // Step 3: QUERY
    let adults = users
        .query()?
        .filter_op("age", flatbase::Operator::Ge, 21)
        .order_by_desc("age")
        .get()?;
    println!("Adults: {}", adults.len());
    for user in &adults {
        println!("  {} ({})", user.get_str("name")?, user.get_int("age")?);
    }

    // Step 4: RELATIONS, eager loaded in one batched query
    let with_posts = users.query()?.with(&["posts"]).get()?;
    for user in &with_posts {
        println!(
            "  {} wrote {} post(s)",
            user.get_str("name")?,
            user.related("posts").len()
        );
    }

    // Step 5: UPDATE and DELETE through the chain
    let affected = users
        .query()?
        .filter("name", "Bob")
        .update(values(&[("age", 21.into())]))?;
    println!("Updated {} row(s)", affected);

    let removed = users.query()?.filter("age", 21).delete()?;
    println!("Deleted {} row(s)", removed);

    // Step 6: MIGRATION
    println!("Adding a column...");
    db.change_table("users", |t| {
        t.add_at("active", "1", Position::After("name".into()))
    })?;
    let first = users.query()?.first()?;
    println!("First user active flag: {:?}", first.get("active"));

    // Step 7: PAGINATION descriptors for a renderer
    let page = users.query()?.paginate(1, 2)?;
    println!(
        "Page {}/{} with {} item(s)",
        page.state.page,
        page.state.page_count(),
        page.items.len()
    );

    Ok(())
}

fn values(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}
