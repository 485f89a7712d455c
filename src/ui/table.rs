//! Plain-text table with a colored header row
//!
//! Columns are padded by display width so CJK titles and emoji line up.

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
struct Column {
    title: String,
    align: Align,
    dimmed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match align {
        Align::Left => format!("{}{}", text, fill),
        Align::Right => format!("{}{}", fill, text),
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, title: &str, align: Align) -> Self {
        self.columns.push(Column {
            title: title.to_string(),
            align,
            dimmed: false,
        });
        self
    }

    /// A left-aligned column rendered dimmed (ids, URLs)
    pub fn dim_column(mut self, title: &str) -> Self {
        self.columns.push(Column {
            title: title.to_string(),
            align: Align::Left,
            dimmed: true,
        });
        self
    }

    /// Add a row; missing cells render empty, extra cells are dropped
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(col.title.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render without colors, one line per row
    pub fn render_plain(&self) -> Vec<String> {
        let widths = self.widths();
        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| pad(&col.title, *w, col.align))
            .collect::<Vec<_>>()
            .join("  ");

        std::iter::once(header.trim_end().to_string())
            .chain(self.rows.iter().map(|row| {
                row.iter()
                    .zip(&self.columns)
                    .zip(&widths)
                    .map(|((cell, col), w)| pad(cell, *w, col.align))
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            }))
            .collect()
    }

    pub fn print(&self) {
        let widths = self.widths();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| pad(&col.title, *w, col.align).blue().bold().to_string())
            .collect();
        println!("{}", header.join("  "));

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&self.columns)
                .zip(&widths)
                .map(|((cell, col), w)| {
                    let text = pad(cell, *w, col.align);
                    if col.dimmed {
                        text.dimmed().to_string()
                    } else {
                        text
                    }
                })
                .collect();
            println!("{}", cells.join("  "));
        }
    }
}
