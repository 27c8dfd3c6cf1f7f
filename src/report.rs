//! Tabular trace of an allocation, for audit and diagnostics.
//!
//! ```text
//!      INSTANCE NAME      | BASE ID (HEX) | REQUESTED WINDOW SIZE | ...
//!       signalGen         |  256 (0x100)  |          20           | ...
//! ```
//!
//! Cells longer than their column wrap onto continuation lines. A legend
//! describing each column follows the table.

use std::fmt;

use crate::allocate::AllocationResult;

/// Marker appended to a requested window when the component gave no range.
pub const DEFAULT_WINDOW_MARKER: &str = " (D)";

/// Text shown for the last entry, whose window has no upper neighbour.
pub const UNBOUNDED: &str = "unbounded";

struct Column {
    title: &'static str,
    /// Spaces added on each side of the title.
    pad: usize,
    description: &'static str,
}

impl Column {
    const fn width(&self) -> usize {
        self.title.len() + 2 * self.pad
    }
}

const COLUMNS: [Column; 6] = [
    Column {
        title: "INSTANCE NAME",
        pad: 5,
        description: "Name of the component instance.",
    },
    Column {
        title: "BASE ID (HEX)",
        pad: 0,
        description: "First id of the instance's window, in decimal and hexadecimal.",
    },
    Column {
        title: "REQUESTED WINDOW SIZE",
        pad: 0,
        description: "Window from the instance, else the larger of the assembly window and the component's range. (D) marks instances whose component gave no range.",
    },
    Column {
        title: "DIFFERENCED ID WINDOW SIZE",
        pad: 0,
        description: "Distance from this base id to the next one.",
    },
    Column {
        title: "LARGEST COMPONENT INTERNAL ID",
        pad: 0,
        description: "Highest event, channel, command or parameter id the component declares.",
    },
    Column {
        title: "MAX AMOUNT OF IDS",
        pad: 0,
        description: "Most ids the component can use at once across its namespaces.",
    },
];

/// Display adapter rendering an [`AllocationResult`] as a table plus legend.
pub struct AllocationReport<'a> {
    result: &'a AllocationResult,
}

impl<'a> AllocationReport<'a> {
    pub fn new(result: &'a AllocationResult) -> Self {
        Self { result }
    }

    /// The six cells of each row, in assignment order.
    pub fn rows(&self) -> Vec<[String; 6]> {
        self.result
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let marker = if a.required_range.is_none() {
                    DEFAULT_WINDOW_MARKER
                } else {
                    ""
                };
                [
                    a.name.clone(),
                    format!("{} ({:#x})", a.base_id, a.base_id),
                    format!("{}{marker}", a.window),
                    self.result
                        .actual_window(i)
                        .map_or_else(|| UNBOUNDED.to_string(), |w| w.to_string()),
                    optional(a.largest_component_id()),
                    optional(a.required_amount),
                ]
            })
            .collect()
    }
}

/// Render the full report.
pub fn render(result: &AllocationResult) -> String {
    AllocationReport::new(result).to_string()
}

impl fmt::Display for AllocationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = COLUMNS
            .iter()
            .map(|c| format!("{pad}{}{pad}", c.title, pad = " ".repeat(c.pad)))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(f, "{header}")?;

        for row in self.rows() {
            write_row(f, &row)?;
        }
        write_legend(f)
    }
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[String; 6]) -> fmt::Result {
    let mut rest: Vec<&str> = row.iter().map(String::as_str).collect();
    while rest.iter().any(|cell| !cell.is_empty()) {
        let mut line = Vec::with_capacity(COLUMNS.len());
        for (cell, column) in rest.iter_mut().zip(COLUMNS.iter()) {
            let width = column.width();
            let (head, tail) = split_chars(*cell, width);
            line.push(format!("{head:^width$}"));
            *cell = tail;
        }
        writeln!(f, "{}", line.join(" | "))?;
    }
    Ok(())
}

fn write_legend(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let table_width: usize = COLUMNS.iter().map(Column::width).sum();
    let title_width = COLUMNS.iter().map(|c| c.title.len()).max().unwrap_or(0);
    let indent = title_width + 3;
    let border = "-".repeat(table_width + 4);

    writeln!(f, "{border}")?;
    for column in &COLUMNS {
        let text = format!("{:<title_width$} - {}", column.title, column.description);
        let (first, mut rest) = split_chars(&text, table_width);
        writeln!(f, "| {first:<table_width$} |")?;
        while !rest.is_empty() {
            let (chunk, tail) = split_chars(rest, table_width - indent);
            let line = format!("{}{chunk}", " ".repeat(indent));
            writeln!(f, "| {line:<table_width$} |")?;
            rest = tail;
        }
    }
    writeln!(f, "{border}")
}

/// Split after at most `n` characters.
fn split_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}
