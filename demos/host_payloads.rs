// demos/host_payloads.rs
//! Limits and failure modes when exchanging untrusted payloads

use dyn_bridge::{
    Bridge, BridgeConfig, Dynamic, ExportError, JsValue, MemoryRuntime, Runtime, ValueKind,
};

/// Human-readable label for an engine value the bridge refused
fn describe(rt: &MemoryRuntime, value: &JsValue, kind: ValueKind) -> String {
    let detail = match kind {
        ValueKind::Function => rt.function_name(value).map(|name| format!("function {}", name)),
        ValueKind::HostObject => rt.host_class(value).map(|class| format!("[object {}]", class)),
        ValueKind::Symbol => rt.symbol_description(value).map(|d| format!("Symbol({})", d)),
        other => Ok(other.to_string()),
    };
    detail.unwrap_or_else(|_| kind.to_string())
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Dynamic Bridge - Host Payloads ===\n");

    let config = BridgeConfig::from_json(
        r#"{"max_depth": 32, "skip_undefined_properties": true}"#,
    )
    .expect("invalid config");
    let bridge = Bridge::with_config(config).expect("invalid config");

    // Example 1: payload from a JSON document
    let json: serde_json::Value = serde_json::from_str(
        r#"{"orders": [{"id": 1, "items": ["a", "b"]}, {"id": 2, "items": []}]}"#,
    )
    .expect("bad json");

    let mut rt = MemoryRuntime::new();
    let value = bridge
        .import(&mut rt, &Dynamic::from(json))
        .expect("import failed");
    let back = bridge.export(&rt, &value).expect("export failed");
    println!("Example 1: round trip -> {}\n", serde_json::Value::from(&back));

    // Example 2: nesting past the configured limit
    let mut deep = Dynamic::array();
    for _ in 0..100 {
        deep = Dynamic::from(vec![deep]);
    }
    match bridge.import(&mut rt, &deep) {
        Ok(_) => println!("Example 2: imported unexpectedly"),
        Err(e) => println!("Example 2: {}\n", e),
    }

    // Example 3: integer the engine cannot hold exactly
    let big = Dynamic::object().with_field("id", i64::MAX);
    match bridge.import(&mut rt, &big) {
        Ok(_) => println!("Example 3: imported unexpectedly"),
        Err(e) => println!("Example 3: {}\n", e),
    }

    // Example 4: engine object graph with a cycle
    let node = rt.create_object().expect("object");
    rt.set_property(&node, "next", node).expect("set");
    match bridge.export(&rt, &node) {
        Ok(_) => println!("Example 4: exported unexpectedly"),
        Err(e) => println!("Example 4: {}\n", e),
    }

    // Example 5: heap exhaustion aborts the whole import
    let mut small = MemoryRuntime::with_allocation_limit(4);
    let payload = Dynamic::from(vec!["one", "two", "three", "four", "five"]);
    match bridge.import(&mut small, &payload) {
        Ok(_) => println!("Example 5: imported unexpectedly"),
        Err(e) => println!("Example 5: {} (allocation failure: {})", e, e.is_allocation_failure()),
    }

    // Example 6: engine values with no dynamic counterpart
    let refused = [
        rt.create_function("onMessage").expect("function"),
        rt.create_host_object("WebSocket").expect("host object"),
        rt.create_symbol("iterator"),
    ];
    for value in &refused {
        match bridge.export(&rt, value) {
            Ok(_) => println!("Example 6: exported unexpectedly"),
            Err(ExportError::Unsupported(e)) => {
                println!("Example 6: {} refused ({})", describe(&rt, value, e.kind), e)
            }
            Err(e) => println!("Example 6: {}", e),
        }
    }

    // Example 7: an engine that cannot hold non-finite numbers
    let mut strict = MemoryRuntime::with_finite_numbers_only();
    let samples = Dynamic::object().with_field("samples", vec![1.5, f64::INFINITY]);
    match bridge.import(&mut strict, &samples) {
        Ok(_) => println!("\nExample 7: imported unexpectedly"),
        Err(e) => println!("\nExample 7: {}", e),
    }
}
