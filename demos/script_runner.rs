//! Executing a parsed script against an OperationExecutor
//!
//! Wires the parser to a toy in-memory executor that applies every
//! operation to a HashMap-backed store, then shows how the two error
//! policies differ on a script with a malformed statement.
//!
//! Run with: cargo run --example script_runner

use std::collections::HashMap;

use mongoscript::{
    run_script, Document, ErrorPolicy, ExecutionOutput, ExecutionResult, IndexOptions,
    OperationExecutor, ScriptParser,
};
use serde_json::{json, Value};

const SETUP: &str = "\
db.createCollection(\"users\");
db.users.createIndex({ email: 1 }, { unique: true, name: 'users_email' });
db.users.insertMany([
    { name: 'Jane', email: 'jane@example.com', active: true },
    { name: 'Bob', email: 'bob@example.com', active: false },
]);
db.users.updateMany({ active: false }, { $set: { active: true } });
db.users.deleteOne({ name: 'Bob' });
";

const BROKEN: &str = "\
db.audit.insertOne({event: 'start'});
db.audit.insertOne({event: });
db.audit.insertOne({event: 'end'});
";

/// Toy store: collections of documents plus the created index names.
#[derive(Default)]
struct MemoryStore {
    collections: HashMap<String, Vec<Document>>,
    indexes: Vec<String>,
    next_id: i64,
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| document.get(key) == Some(value))
}

impl OperationExecutor for MemoryStore {
    fn create_collection(
        &mut self,
        collection: &str,
        _validator: Option<&Document>,
    ) -> ExecutionResult {
        self.collections.entry(collection.to_string()).or_default();
        Ok(ExecutionOutput::Created(collection.to_string()))
    }

    fn create_index(
        &mut self,
        collection: &str,
        keys: &[(String, Value)],
        options: &IndexOptions,
    ) -> ExecutionResult {
        let name = options.name.clone().unwrap_or_else(|| {
            let fields: Vec<String> = keys
                .iter()
                .map(|(field, direction)| format!("{field}_{direction}"))
                .collect();
            format!("{}_{}", collection, fields.join("_"))
        });
        self.indexes.push(name.clone());
        Ok(ExecutionOutput::IndexCreated(name))
    }

    fn insert(&mut self, collection: &str, method: &str, documents: &[Document]) -> ExecutionResult {
        let stored = self.collections.entry(collection.to_string()).or_default();
        let mut ids = Vec::new();
        for document in documents {
            let mut document = document.clone();
            let id = self.next_id + 1;
            self.next_id = id;
            let id = json!(id);
            document.insert("_id".to_string(), id.clone());
            stored.push(document);
            ids.push(id);
        }
        if method == "insertOne" {
            Ok(ExecutionOutput::InsertedId(ids.remove(0)))
        } else {
            Ok(ExecutionOutput::InsertedIds(ids))
        }
    }

    fn update(
        &mut self,
        collection: &str,
        method: &str,
        filter: &Document,
        update: &Document,
    ) -> ExecutionResult {
        let mut modified = 0;
        if let Some(stored) = self.collections.get_mut(collection) {
            for document in stored.iter_mut() {
                if matches_filter(document, filter) {
                    if let Some(Value::Object(set)) = update.get("$set") {
                        for (key, value) in set {
                            document.insert(key.clone(), value.clone());
                        }
                    }
                    modified += 1;
                    if method == "updateOne" {
                        break;
                    }
                }
            }
        }
        Ok(ExecutionOutput::Modified(modified))
    }

    fn delete(&mut self, collection: &str, method: &str, filter: &Document) -> ExecutionResult {
        let mut deleted = 0;
        if let Some(stored) = self.collections.get_mut(collection) {
            let before = stored.len();
            if method == "deleteOne" {
                if let Some(position) = stored.iter().position(|d| matches_filter(d, filter)) {
                    stored.remove(position);
                }
            } else {
                stored.retain(|d| !matches_filter(d, filter));
            }
            deleted = (before - stored.len()) as u64;
        }
        Ok(ExecutionOutput::Deleted(deleted))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🚀 Script Runner Demo");
    println!("=====================");

    // 1. Apply a clean setup script
    println!("\n1️⃣  Applying a clean setup script...");
    let parser = ScriptParser::new();
    let mut store = MemoryStore::default();
    let outcome = run_script(&parser, &mut store, SETUP);
    println!("   success: {}", outcome.success);
    for output in &outcome.outputs {
        println!("   {output:?}");
    }
    println!(
        "   store now holds {} user documents, {} indexes",
        store.collections.get("users").map_or(0, Vec::len),
        store.indexes.len()
    );

    // 2. Halt policy: the bad statement aborts the whole script
    println!("\n2️⃣  Halt policy aborts before anything runs...");
    let mut store = MemoryStore::default();
    let outcome = run_script(&parser, &mut store, BROKEN);
    println!("   success: {}", outcome.success);
    if let Some(error) = &outcome.error {
        println!("   error: {error}");
    }
    println!("   operations applied: {}", outcome.outputs.len());

    // 3. Skip policy: bad statements become diagnostics
    println!("\n3️⃣  Skip policy collects diagnostics and keeps going...");
    let skipping = ScriptParser::with_policy(ErrorPolicy::Skip);
    let mut store = MemoryStore::default();
    let outcome = run_script(&skipping, &mut store, BROKEN);
    println!("   success: {}", outcome.success);
    println!("   operations applied: {}", outcome.outputs.len());
    for diagnostic in &outcome.diagnostics {
        println!("   [{:?}] {}", diagnostic.code, diagnostic.message);
    }

    println!("\n🎉 Done");
    Ok(())
}
