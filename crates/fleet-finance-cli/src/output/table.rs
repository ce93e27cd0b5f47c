use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use fleet_finance_core::display::NOT_APPLICABLE;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Some(Value::Array(rows)) = envelope.get("display") {
        print_display_rows(rows);
    } else if result.get("matrix").is_some() {
        print_sensitivity_grid(result);
    } else if let Value::Object(_) = result {
        print_flat_object(result);
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    // Amortization schedule, when the loan calculator produced one
    if let Some(Value::Array(schedule)) = result.get("schedule") {
        if !schedule.is_empty() {
            println!("\nSchedule:");
            print_array_table(schedule);
        }
    }

    // Print warnings if any
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

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Label / value rows already formatted for display (₹ amounts, percentages).
fn print_display_rows(rows: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["Figure", "Value"]);
    for row in rows {
        let label = row.get("label").and_then(Value::as_str).unwrap_or_default();
        let value = row.get("value").and_then(Value::as_str).unwrap_or(NOT_APPLICABLE);
        builder.push_record([label, value]);
    }
    println!("{}", Table::from(builder));
}

/// Sensitivity matrix with variable 1 down the side and variable 2 across.
fn print_sensitivity_grid(result: &Value) {
    let empty = Vec::new();
    let v1_name = result.get("variable_1_name").and_then(Value::as_str).unwrap_or("variable_1");
    let v1_values = result
        .get("variable_1_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let v2_values = result
        .get("variable_2_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let metric = result.get("output_metric").and_then(Value::as_str).unwrap_or("value");
    let matrix = result.get("matrix").and_then(Value::as_array).unwrap_or(&empty);

    let mut builder = Builder::default();
    let mut header = vec![v1_name.to_string()];
    if v2_values.is_empty() {
        header.push(metric.to_string());
    } else {
        let v2_name = result.get("variable_2_name").and_then(Value::as_str).unwrap_or("variable_2");
        header.extend(v2_values.iter().map(|v| format!("{}={}", v2_name, format_value(v))));
    }
    builder.push_record(header);

    for (v1, row) in v1_values.iter().zip(matrix) {
        let mut record = vec![format_value(v1)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));

    if let Some(base) = result.get("base_case_value") {
        println!("\nBase case {}: {}", metric, format_value(base));
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => NOT_APPLICABLE.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
