use serde_json::{json, Map, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output `key -> value` rows as an aligned table or a JSON object
pub fn output_key_values(
    output_format: &OutputFormat,
    collection_name: &str,
    rows: &[(String, String)],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let map: Map<String, Value> = rows
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: map }))?);
        }
        OutputFormat::Text => {
            let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in rows {
                println!("{:width$}  {}", key, value, width = width);
            }
        }
    }
    Ok(())
}
