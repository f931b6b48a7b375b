/// One line of a comparison report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Free text outside the metrics table.
    Text(String),

    /// A table row: the metric label followed by one cell per phase.
    Row(Vec<String>),
}

/// A phase-by-phase comparison, rendered as TSV or as a workbook.
///
/// Reports mix prose with a metrics table, so the content is kept as an ordered list of
/// lines and each renderer decides how to lay them out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonTable {
    lines: Vec<Line>,
}

impl ComparisonTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Text(text.into()));
    }

    pub fn blank(&mut self) {
        self.text("");
    }

    /// Append every line of a block of text.
    pub fn text_block(&mut self, block: &str) {
        for line in block.lines() {
            self.text(line);
        }
    }

    pub fn row(&mut self, label: impl Into<String>, cells: impl IntoIterator<Item = String>) {
        let mut row = vec![label.into()];
        row.extend(cells);
        self.lines.push(Line::Row(row));
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Rows of the metrics table, including the header row.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.lines.iter().filter_map(|line| match line {
            Line::Row(cells) => Some(cells.as_slice()),
            Line::Text(_) => None,
        })
    }
}
