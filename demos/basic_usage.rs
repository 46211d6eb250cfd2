// demos/basic_usage.rs
//! Basic usage of the dynamic value bridge

use dyn_bridge::{Bridge, Dynamic, ExportError, MemoryRuntime, Runtime};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Dynamic Bridge - Basic Usage ===\n");

    let bridge = Bridge::new();
    let mut rt = MemoryRuntime::new();

    // Host data headed into the engine
    let payload = Dynamic::object()
        .with_field("user", Dynamic::object().with_field("name", "ada").with_field("age", 36))
        .with_field("tags", vec!["admin", "dev"])
        .with_field("score", 9.5)
        .with_field("verified", true);

    println!("Importing: {}", payload);
    let value = bridge.import(&mut rt, &payload).expect("import failed");
    println!(
        "✓ Imported as runtime {} with {} heap allocations\n",
        rt.type_of(&value).unwrap_or("?"),
        rt.allocations()
    );

    // Engine-side changes
    let tags = rt.get_property(&value, "tags").expect("tags");
    let flag = rt.boolean(false);
    rt.push(&tags, flag).expect("push");

    let back = bridge.export(&rt, &value).expect("export failed");
    println!("Exported: {}\n", back);

    // Functions have no dynamic equivalent
    let callback = rt.create_function("onDone").expect("function");
    rt.set_property(&value, "onDone", callback).expect("set");

    match bridge.export(&rt, &value) {
        Ok(v) => println!("Unexpectedly exported: {}", v),
        Err(ExportError::Unsupported(e)) => println!("✗ Export refused: {}", e),
        Err(e) => println!("✗ Export failed: {}", e),
    }
}
