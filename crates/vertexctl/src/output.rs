//! Output rendering: JSON, YAML or tables, with optional JMESPath filtering

use anyhow::{Context, Result};
use comfy_table::Table;
use jpx_core::Runtime;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::cli;

/// Global JMESPath runtime with extended functions
static JMESPATH_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or initialize the JMESPath runtime with extended functions
pub fn get_jmespath_runtime() -> &'static Runtime {
    JMESPATH_RUNTIME.get_or_init(|| Runtime::builder().with_all_extensions().build())
}

/// Normalize backtick literals in JMESPath expressions.
///
/// JMESPath allows "elided quotes" in backtick literals, so `` `RUNNING` `` is
/// equivalent to `` `"RUNNING"` ``. The runtime requires valid JSON inside
/// backticks, so bare words are quoted here.
///
/// Examples:
/// - `` `RUNNING` `` -> `` `"RUNNING"` ``
/// - `` `true` `` -> `` `true` `` (unchanged, valid JSON boolean)
/// - `` `123` `` -> `` `123` `` (unchanged, valid JSON number)
fn normalize_backtick_literals(query: &str) -> String {
    static BACKTICK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = BACKTICK_RE
        .get_or_init(|| Regex::new(r"`([^`\\]*(?:\\.[^`\\]*)*)`").ok())
        .as_ref()
    else {
        return query.to_string();
    };

    re.replace_all(query, |caps: &regex::Captures| {
        let content = &caps[1];
        let trimmed = content.trim();

        if serde_json::from_str::<Value>(trimmed).is_ok() {
            format!("`{}`", content)
        } else {
            let escaped = trimmed.replace('\\', "\\\\").replace('"', "\\\"");
            format!("`\"{}\"`", escaped)
        }
    })
    .into_owned()
}

/// Compile a JMESPath expression using the extended runtime.
pub fn compile_jmespath(
    query: &str,
) -> Result<jpx_core::Expression<'static>, jpx_core::JmespathError> {
    let normalized = normalize_backtick_literals(query);
    get_jmespath_runtime().compile(&normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Concrete format for a CLI choice; `auto` picks `auto_default`
    pub fn resolve(choice: cli::OutputFormat, auto_default: OutputFormat) -> Self {
        match choice {
            cli::OutputFormat::Auto => auto_default,
            cli::OutputFormat::Json => OutputFormat::Json,
            cli::OutputFormat::Yaml => OutputFormat::Yaml,
            cli::OutputFormat::Table => OutputFormat::Table,
        }
    }
}

/// Serialize `data`, apply `query`, and print it in `format`
pub fn print_output<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    let json_value = apply_query(serde_json::to_value(data)?, query)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table => {
            print_as_table(&json_value);
        }
    }

    Ok(())
}

/// Apply an optional JMESPath query to a JSON value
pub fn apply_query(value: Value, query: Option<&str>) -> Result<Value> {
    match query {
        Some(query_str) => {
            let expr = compile_jmespath(query_str)
                .with_context(|| format!("Invalid JMESPath expression: {}", query_str))?;
            expr.search(&value).context("JMESPath query failed")
        }
        None => Ok(value),
    }
}

fn print_as_table(value: &Value) {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            println!("{}", table);
        }
        Value::Array(_) => {
            println!("No results.");
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            println!("{}", table);
        }
        _ => {
            println!("{}", format_value(value));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_backtick_unquoted_string() {
        assert_eq!(
            normalize_backtick_literals(r#"[?state==`RUNNING`]"#),
            r#"[?state==`"RUNNING"`]"#
        );
    }

    #[test]
    fn test_normalize_backtick_already_quoted() {
        assert_eq!(
            normalize_backtick_literals(r#"[?state==`"RUNNING"`]"#),
            r#"[?state==`"RUNNING"`]"#
        );
    }

    #[test]
    fn test_normalize_backtick_json_literals_untouched() {
        assert_eq!(
            normalize_backtick_literals(r#"[?anomalyCount==`3`]"#),
            r#"[?anomalyCount==`3`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?done==`true`]"#),
            r#"[?done==`true`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"`{"key": "value"}`"#),
            r#"`{"key": "value"}`"#
        );
    }

    #[test]
    fn test_normalize_multiple_backticks() {
        assert_eq!(
            normalize_backtick_literals(r#"[?state==`RUNNING` && location==`us-central1`]"#),
            r#"[?state==`"RUNNING"` && location==`"us-central1"`]"#
        );
    }

    #[test]
    fn test_apply_query_filters_clusters() {
        let clusters = json!([
            {"name": "a", "state": "RUNNING"},
            {"name": "b", "state": "STOPPING"}
        ]);
        let names = apply_query(clusters, Some("[?state==`RUNNING`].name")).unwrap();
        assert_eq!(names, json!(["a"]));
    }

    #[test]
    fn test_apply_query_rejects_invalid_expression() {
        let err = apply_query(json!({}), Some("[?")).unwrap_err();
        assert!(err.to_string().contains("Invalid JMESPath expression"));
    }

    #[test]
    fn test_resolve_auto_uses_command_default() {
        assert_eq!(
            OutputFormat::resolve(cli::OutputFormat::Auto, OutputFormat::Table),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::resolve(cli::OutputFormat::Yaml, OutputFormat::Table),
            OutputFormat::Yaml
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!([1, 2])), "[2 items]");
        assert_eq!(format_value(&json!({"a": 1})), "{1 fields}");
    }
}
