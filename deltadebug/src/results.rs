// PY_SOURCE: src/delta_debugging/result.py

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Outcome of one debugger on one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Record", from = "Record")]
pub struct RunResult {
    pub file: String,
    pub algorithm: String,
    pub cache: String,
    pub input_size: usize,
    pub output_size: usize,
    /// Oracle invocations.
    pub count: usize,
    /// Wall time in seconds.
    pub time: f64,
}

impl RunResult {
    /// Fraction of the input removed; 1.0 for an empty input.
    pub fn reduction_ratio(&self) -> f64 {
        if self.input_size == 0 {
            1.0
        } else {
            (self.input_size as f64 - self.output_size as f64) / self.input_size as f64
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Record {
    #[serde(rename = "File")]
    file: String,
    #[serde(rename = "Algorithm")]
    algorithm: String,
    #[serde(rename = "Cache")]
    cache: String,
    #[serde(rename = "Input Size")]
    input_size: usize,
    #[serde(rename = "Output Size")]
    output_size: usize,
    #[serde(rename = "Reduction Ratio", default)]
    reduction_ratio: f64,
    #[serde(rename = "Count")]
    count: usize,
    #[serde(rename = "Time")]
    time: f64,
}

impl From<RunResult> for Record {
    fn from(r: RunResult) -> Self {
        Self {
            reduction_ratio: r.reduction_ratio(),
            file: r.file,
            algorithm: r.algorithm,
            cache: r.cache,
            input_size: r.input_size,
            output_size: r.output_size,
            count: r.count,
            time: r.time,
        }
    }
}

impl From<Record> for RunResult {
    fn from(r: Record) -> Self {
        Self {
            file: r.file,
            algorithm: r.algorithm,
            cache: r.cache,
            input_size: r.input_size,
            output_size: r.output_size,
            count: r.count,
            time: r.time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<RunResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading results");
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), count = self.results.len(), "storing results");
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter()
    }

    /// Plain-text table with a row index. With `remove_unique_columns`, the
    /// file, algorithm and cache columns are left out when every row agrees.
    pub fn table(&self, remove_unique_columns: bool) -> String {
        if self.results.is_empty() {
            return String::new();
        }

        let text = |header: &'static str, cell: fn(&RunResult) -> String| Column {
            header,
            numeric: false,
            cells: self.results.iter().map(cell).collect(),
        };
        let number = |header: &'static str, cell: fn(&RunResult) -> String| Column {
            numeric: true,
            ..text(header, cell)
        };

        let labels = [
            text("File", |r| r.file.clone()),
            text("Algorithm", |r| r.algorithm.clone()),
            text("Cache", |r| r.cache.clone()),
        ];
        let mut columns = vec![Column {
            header: "",
            numeric: true,
            cells: (0..self.results.len()).map(|i| i.to_string()).collect(),
        }];
        columns.extend(labels.into_iter().filter(|c| !remove_unique_columns || !c.is_uniform()));
        columns.extend([
            number("Input Size", |r| r.input_size.to_string()),
            number("Output Size", |r| r.output_size.to_string()),
            number("Reduction Ratio", |r| format!("{:.2}", r.reduction_ratio())),
            number("Count", |r| r.count.to_string()),
            number("Time", |r| format!("{:.2}", r.time)),
        ]);

        let widths: Vec<usize> = columns.iter().map(Column::width).collect();
        let mut lines = Vec::with_capacity(self.results.len() + 2);
        lines.push(row(&columns, &widths, |c| c.header));
        lines.push(
            widths
                .iter()
                .map(|&w| "-".repeat(w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for i in 0..self.results.len() {
            lines.push(row(&columns, &widths, |c| c.cells[i].as_str()));
        }
        lines.join("\n")
    }
}

struct Column {
    header: &'static str,
    numeric: bool,
    cells: Vec<String>,
}

impl Column {
    fn width(&self) -> usize {
        self.cells
            .iter()
            .map(String::len)
            .chain([self.header.len()])
            .max()
            .unwrap_or(0)
    }

    fn is_uniform(&self) -> bool {
        self.cells.iter().collect::<BTreeSet<_>>().len() <= 1
    }
}

fn row<'a>(columns: &'a [Column], widths: &[usize], cell: impl Fn(&'a Column) -> &'a str) -> String {
    let line = columns
        .iter()
        .zip(widths)
        .map(|(column, &width)| {
            if column.numeric {
                format!("{:>width$}", cell(column))
            } else {
                format!("{:<width$}", cell(column))
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}
