//! Plain-text table rendering.
//!
//! Takes a header row and body rows and produces aligned columns, sized
//! with display width rather than byte length so wide characters line up.

use unicode_width::UnicodeWidthStr;

/// Presentation options for [`render_table`].
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Spaces between columns.
    pub padding: usize,
    /// Draw a rule between the header and the body.
    pub header_rule: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            padding: 2,
            header_rule: true,
        }
    }
}

/// Render a header row and body rows as aligned plain text.
///
/// Rows shorter than the header are padded with empty cells; cells beyond
/// the header width are ignored.
pub fn render_table(header: &[&str], rows: &[Vec<String>], options: &TableOptions) -> String {
    if header.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, header.iter().copied(), &widths, options.padding);
    if options.header_rule {
        let total: usize =
            widths.iter().sum::<usize>() + options.padding * (widths.len().saturating_sub(1));
        out.push_str(&"-".repeat(total));
        out.push('\n');
    }
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths, options.padding);
    }
    out
}

fn push_row<'a>(
    out: &mut String,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    padding: usize,
) {
    let mut cells: Vec<&str> = cells.take(widths.len()).collect();
    cells.resize(widths.len(), "");

    for (i, cell) in cells.iter().enumerate() {
        out.push_str(cell);
        if i + 1 < widths.len() {
            let fill = widths[i].saturating_sub(cell.width()) + padding;
            out.push_str(&" ".repeat(fill));
        }
    }
    // Trailing spaces on the last column are never emitted.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_aligned_columns() {
        let rows = vec![
            vec!["greet".to_string(), "Greet a user".to_string()],
            vec!["migration:run".to_string(), "Run migrations".to_string()],
        ];
        let out = render_table(
            &["Command", "Description"],
            &rows,
            &TableOptions {
                padding: 2,
                header_rule: false,
            },
        );

        let expected = "\
Command        Description
greet          Greet a user
migration:run  Run migrations
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_header_rule_spans_columns() {
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        let out = render_table(&["one", "two"], &rows, &TableOptions::default());

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[1].len(), "one".len() + 2 + "two".len());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let rows = vec![vec!["only".to_string()]];
        let out = render_table(
            &["x", "y"],
            &rows,
            &TableOptions {
                padding: 1,
                header_rule: false,
            },
        );
        assert_eq!(out, "x    y\nonly\n");
    }

    #[test]
    fn test_empty_header_renders_nothing() {
        assert_eq!(render_table(&[], &[], &TableOptions::default()), "");
    }
}
