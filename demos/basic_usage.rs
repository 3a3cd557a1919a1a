//! Basic parsing walkthrough
//!
//! Parses a small setup script and prints every typed operation the
//! parser produced, along with script metadata and any diagnostics.
//!
//! Run with: cargo run --example basic_usage

use mongoscript::{parse_metadata, Operation, ScriptParser};

const SCRIPT: &str = r#"// METADATA:
// {"description": "Example app bootstrap", "version": "1.0.0", "author": "platform team"}

// Create a simple collection
db.createCollection("users");

// Indexes: compound key order is preserved as written
db.users.createIndex({ email: 1 }, { unique: true });
db.users.createIndex({ "profile.department": 1, status: 1 });

// Seed documents
db.users.insertOne({
    name: "John Doe",
    email: 'john.doe@example.com',
    age: 30,
    profile: {
        department: "Engineering",
        role: "Senior Developer",
    },
});

db.users.insertMany([
    { name: 'Jane Smith', email: 'jane.smith@example.com', age: 28 },
    { name: 'Bob Johnson', email: 'bob.johnson@example.com', age: 35 },
]);

db.users.updateOne({ email: 'john.doe@example.com' }, { $set: { status: 'active' } });
db.users.deleteMany({ status: 'retired' });
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🧩 MongoDB Setup Script Parser");
    println!("==============================");

    if let Some(metadata) = parse_metadata(SCRIPT) {
        println!("\n📋 Metadata");
        println!("   description: {}", metadata.description);
        println!("   version:     {}", metadata.version);
        println!("   author:      {}", metadata.author);
    }

    let parsed = ScriptParser::new().parse(SCRIPT)?;

    println!("\n🔍 Parsed {} operations", parsed.operations.len());
    for (i, operation) in parsed.operations.iter().enumerate() {
        println!("   {}. {}", i + 1, operation.description());
        if let Operation::CreateIndex { keys, options, .. } = operation {
            let fields: Vec<String> = keys
                .iter()
                .map(|(field, direction)| format!("{field}: {direction}"))
                .collect();
            println!("      keys in written order: {{ {} }}", fields.join(", "));
            if options.unique == Some(true) {
                println!("      unique");
            }
        }
    }

    if parsed.is_clean() {
        println!("\n✅ No diagnostics");
    } else {
        println!("\n⚠️  {} diagnostics", parsed.diagnostics.len());
        for diagnostic in &parsed.diagnostics {
            println!("   [{:?}] {}", diagnostic.code, diagnostic.message);
        }
    }

    Ok(())
}
