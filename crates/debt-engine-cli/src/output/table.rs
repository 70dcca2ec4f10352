use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result go into a field/value table; array-of-object
/// fields (payment plans, payoff projections) each get their own table below
/// it, followed by any envelope warnings and the methodology line.
pub fn print_table(value: &Value) {
    let map = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };

    match map.get("result") {
        Some(result) => {
            print_section(result);
            print_envelope_notes(map);
        }
        None => print_section(value),
    }
}

fn print_section(value: &Value) {
    let map = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut sub_tables: Vec<(&str, &Vec<Value>)> = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.iter().all(|v| v.is_object()) && !arr.is_empty() => {
                sub_tables.push((key.as_str(), arr));
            }
            _ => {
                builder.push_record([key.as_str(), &render(val)]);
            }
        }
    }
    println!("{}", Table::from(builder));

    for (key, rows) in sub_tables {
        println!("\n{}:", key);
        print_rows(rows);
    }
}

fn print_rows(rows: &[Value]) {
    let headers: Vec<String> = match rows.first().and_then(|v| v.as_object()) {
        Some(first) => first.keys().cloned().collect(),
        None => return,
    };

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(render).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(render).collect::<Vec<_>>().join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
