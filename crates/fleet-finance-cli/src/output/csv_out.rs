use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result");
            if let Some(Value::Array(rows)) = map.get("display") {
                write_display_csv(&mut wtr, rows);
            } else if let Some(grid) = result.filter(|r| r.get("matrix").is_some()) {
                write_grid_csv(&mut wtr, grid);
            } else if let Some(Value::Object(result)) = result {
                // Two-column CSV: field, value
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_display_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let _ = wtr.write_record(["label", "value"]);
    for row in rows {
        let label = row.get("label").map(format_csv_value).unwrap_or_default();
        let value = row.get("value").map(format_csv_value).unwrap_or_default();
        let _ = wtr.write_record([label, value]);
    }
}

/// Long format: one line per grid cell, blank output where not applicable.
fn write_grid_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, grid: &Value) {
    let empty = Vec::new();
    let v1_values = grid
        .get("variable_1_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let v2_values = grid
        .get("variable_2_values")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let matrix = grid.get("matrix").and_then(Value::as_array).unwrap_or(&empty);

    let _ = wtr.write_record(["variable_1", "variable_2", "output"]);
    for (v1, row) in v1_values.iter().zip(matrix) {
        let cells = row.as_array().unwrap_or(&empty);
        for (col, cell) in cells.iter().enumerate() {
            let v2 = v2_values.get(col).map(format_csv_value).unwrap_or_default();
            let _ = wtr.write_record([format_csv_value(v1), v2, format_csv_value(cell)]);
        }
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
