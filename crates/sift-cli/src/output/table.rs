//! Plain-text tables for `--format table`.
//!
//! Responses are converted through `serde_json::Value`: an object becomes a
//! key/value table with nested objects flattened to dotted keys, an array of
//! objects becomes one row per element.

use serde_json::{Map, Value};

/// Columns too bulky for list tables; `show` commands still print them.
const HIDDEN_LIST_COLUMNS: &[&str] = &["abstract", "authors", "candidate", "phase_data"];

/// Fields whose values are screening vocabulary.
const STATUS_FIELDS: &[&str] = &[
    "decision",
    "previous_decision",
    "screening_status",
    "quality_status",
    "extraction_status",
    "user_confirmed",
    "projection",
];

const MIN_WIDTH: usize = 4;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// `key | value` rows describing one object.
    KeyValue,
    /// One row per record.
    Records,
}

#[derive(Debug)]
struct Column {
    name: String,
    width: usize,
    numeric: bool,
}

/// A rendered-on-demand table of string cells.
#[derive(Debug)]
pub struct Table {
    layout: Layout,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

/// Render any JSON value as a table.
#[must_use]
pub fn render_value(value: &Value, options: TableOptions) -> String {
    match value {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let table = Table::from_records(items);
            if table.columns.is_empty() {
                String::from("(no columns)")
            } else {
                table.render(options)
            }
        }
        Value::Array(items) => Table::new(
            Layout::Records,
            vec![String::from("value")],
            items.iter().map(|item| vec![cell_text(item)]).collect(),
        )
        .render(options),
        Value::Object(map) => Table::from_object(map).render(options),
        scalar => Table::new(
            Layout::Records,
            vec![String::from("value")],
            vec![vec![cell_text(scalar)]],
        )
        .render(options),
    }
}

impl Table {
    fn new(layout: Layout, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells = || rows.iter().filter_map(|row| row.get(idx));
                let width = cells()
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0);
                let mut values = cells().filter(|cell| !matches!(cell.as_str(), "-" | "null"));
                let numeric = values.clone().next().is_some()
                    && values.all(|cell| cell.parse::<f64>().is_ok());
                Column {
                    name,
                    width,
                    numeric,
                }
            })
            .collect();
        Self {
            layout,
            columns,
            rows,
        }
    }

    /// Key/value table for one object, sorted by flattened key.
    fn from_object(map: &Map<String, Value>) -> Self {
        let mut entries = Vec::new();
        flatten_into("", map, &mut entries);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let rows = entries
            .into_iter()
            .map(|(key, value)| vec![key, cell_text(&value)])
            .collect();
        Self::new(
            Layout::KeyValue,
            vec![String::from("key"), String::from("value")],
            rows,
        )
    }

    /// One row per object; identifiers lead, bulky columns are dropped.
    fn from_records(items: &[Value]) -> Self {
        let mut headers = Vec::<String>::new();
        for map in items.iter().filter_map(Value::as_object) {
            for key in map.keys() {
                if !headers.contains(key) && !HIDDEN_LIST_COLUMNS.contains(&key.as_str()) {
                    headers.push(key.clone());
                }
            }
        }
        headers.sort_by_key(|h| (!matches!(h.as_str(), "id" | "candidate_id"), h.clone()));

        let rows = items
            .iter()
            .filter_map(Value::as_object)
            .map(|map| {
                headers
                    .iter()
                    .map(|header| map.get(header).map_or_else(|| String::from("-"), cell_text))
                    .collect()
            })
            .collect();
        Self::new(Layout::Records, headers, rows)
    }

    fn is_status_cell(&self, row: &[String], col: usize) -> bool {
        match self.layout {
            Layout::Records => STATUS_FIELDS.contains(&self.columns[col].name.as_str()),
            Layout::KeyValue => {
                col == 1
                    && row
                        .first()
                        .and_then(|key| key.rsplit('.').next())
                        .is_some_and(|field| STATUS_FIELDS.contains(&field))
            }
        }
    }

    /// Lay the table out, narrowing the widest text columns to fit `max_width`.
    #[must_use]
    pub fn render(&self, options: TableOptions) -> String {
        let widths = self.fitted_widths(options.max_width);

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| pad(&clip(&column.name, width), width, false))
            .collect::<Vec<_>>()
            .join(GAP);
        let header = header.trim_end().to_string();
        let gaps = GAP.len() * widths.len().saturating_sub(1);
        let divider = "-".repeat(widths.iter().sum::<usize>() + gaps);

        let mut lines = vec![header, divider];
        for row in &self.rows {
            let line = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(idx, (column, &width))| {
                    let text = clip(row.get(idx).map_or("-", String::as_str), width);
                    let padded = pad(&text, width, column.numeric);
                    if options.color && self.is_status_cell(row, idx) {
                        paint(&text, &padded)
                    } else {
                        padded
                    }
                })
                .collect::<Vec<_>>()
                .join(GAP);
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    fn fitted_widths(&self, max_width: Option<usize>) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.width).collect();
        let Some(max_width) = max_width else {
            return widths;
        };
        let gaps = GAP.len() * widths.len().saturating_sub(1);

        while widths.iter().sum::<usize>() + gaps > max_width {
            // Numbers are never clipped; text columns keep room for their header.
            let widest = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .filter(|&(_, (column, &width))| {
                    !column.numeric && width > column.name.chars().count().max(MIN_WIDTH)
                })
                .max_by_key(|&(_, (_, &width))| width)
                .map(|(idx, _)| idx);
            match widest {
                Some(idx) => widths[idx] -= 1,
                None => break,
            }
        }
        widths
    }
}

/// Flatten nested objects into dotted keys (`counters.identified`).
fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(&full, inner, out),
            other => out.push((full, other.clone())),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        // Author lists and id lists read better joined.
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}

/// Color `padded` (which starts or ends with `text`) by screening meaning.
fn paint(text: &str, padded: &str) -> String {
    let code = match text {
        "include" | "true" | "assessed" | "extracted" | "screened" | "upsert" => "32",
        "uncertain" | "pending" | "in_progress" | "unscreened" => "33",
        "exclude" | "false" | "remove" => "31",
        _ => return padded.to_string(),
    };
    padded.replacen(text, &format!("\u{1b}[{code}m{text}\u{1b}[0m"), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn object_flattens_nested_counters() {
        let out = render_value(
            &json!({"project_id": "prj-1", "counters": {"identified": 3, "included": 1}}),
            PLAIN,
        );
        let keys: Vec<&str> = out
            .lines()
            .skip(2)
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(keys, vec!["counters.identified", "counters.included", "project_id"]);
    }

    #[test]
    fn records_lead_with_identifier_and_hide_abstract() {
        let out = render_value(
            &json!([{"title": "T", "abstract": "long", "id": "p1", "decision": null}]),
            PLAIN,
        );
        let header: Vec<&str> = out.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(header, vec!["id", "decision", "title"]);
        assert!(out.contains("null"));
    }

    #[test]
    fn numeric_columns_align_right() {
        let table = Table::new(
            Layout::Records,
            vec!["id".into(), "saved".into()],
            vec![vec!["a".into(), "7".into()], vec!["b".into(), "120".into()]],
        );
        let out = table.render(PLAIN);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "a       7");
        assert_eq!(lines[3], "b     120");
    }

    #[test]
    fn wide_text_is_clipped_but_numbers_are_not() {
        let rows = json!([{"id": "p1", "title": "x".repeat(80), "year": 2020}]);
        let out = render_value(
            &rows,
            TableOptions {
                max_width: Some(40),
                color: false,
            },
        );
        assert!(out.lines().all(|line| line.chars().count() <= 40));
        assert!(out.contains('…'));
        assert!(out.contains("2020"));
    }

    #[test]
    fn string_arrays_join_in_cells() {
        let out = render_value(&json!({"created": ["p1", "p2"]}), PLAIN);
        assert!(out.contains("p1, p2"));
    }

    #[test]
    fn only_status_cells_are_colored() {
        let out = render_value(
            &json!([{"id": "include", "decision": "include"}]),
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        let row = out.lines().nth(2).unwrap();
        assert!(row.starts_with("include"));
        assert_eq!(row.matches("\u{1b}[32m").count(), 1);
    }

    #[test]
    fn status_keys_colored_in_key_value_tables() {
        let out = render_value(
            &json!({"candidate": {"decision": "exclude"}, "reason": "exclude"}),
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert_eq!(out.matches("\u{1b}[31m").count(), 1);
    }
}
