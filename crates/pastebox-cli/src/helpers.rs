//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use chrono::{DateTime, NaiveDate, Utc};

/// Read a payload from `file`, or from stdin when no file is given.
pub fn read_payload(file: Option<&str>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        return std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read payload file {}: {}", path, e));
    }
    if io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No payload provided. Pipe data on stdin or use --file."
        ));
    }
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(anyhow::anyhow!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
}

/// Parse a `KEY=VALUE` metadata pair.
///
/// Values that look like booleans or numbers are stored as such; everything
/// else is a string.
pub fn parse_meta_pair(pair: &str) -> anyhow::Result<(String, serde_json::Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid metadata: {} (expected KEY=VALUE)", pair))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("Invalid metadata: {} (empty key)", pair));
    }

    let value = match raw {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                serde_json::Value::from(int)
            } else if let Some(float) = raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                serde_json::Value::Number(float)
            } else {
                serde_json::Value::String(raw.to_string())
            }
        }
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meta_pair_types() {
        assert_eq!(
            parse_meta_pair("compression=zlib").unwrap(),
            ("compression".to_string(), serde_json::json!("zlib"))
        );
        assert_eq!(
            parse_meta_pair("v=2").unwrap(),
            ("v".to_string(), serde_json::json!(2))
        );
        assert_eq!(
            parse_meta_pair("ratio=0.5").unwrap().1,
            serde_json::json!(0.5)
        );
        assert_eq!(parse_meta_pair("flag=true").unwrap().1, serde_json::json!(true));
        assert_eq!(parse_meta_pair("eq=a=b").unwrap().1, serde_json::json!("a=b"));
    }

    #[test]
    fn test_parse_meta_pair_rejects_malformed() {
        assert!(parse_meta_pair("novalue").is_err());
        assert!(parse_meta_pair("=x").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let parsed = parse_datetime("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        let date_only = parse_datetime("2024-01-02").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-01-02T00:00:00+00:00");
        assert!(parse_datetime("yesterday").is_err());
    }
}
