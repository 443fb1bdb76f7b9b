// Paginated export
//
// Renders the document into fixed-size pages: text is word-wrapped to a
// fixed content width and a page break is inserted whenever the next
// block would overflow the vertical space left on the current page.
// Geometry mirrors an A4 layout with 15-unit margins.

use serde::Serialize;

use super::{strip_unclear_markers, ExportContent};
use crate::model::ChatRole;

const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 15.0;
const TOP: f64 = 20.0;

/// Characters that fit one line at font size 10.
const WRAP_COLUMNS_AT_10: usize = 90;

const HEADER_COLOR: &str = "#333333";
const BODY_COLOR: &str = "#000000";
const TRANSCRIPT_COLOR: &str = "#4F46E5";
const REPORT_COLOR: &str = "#059669";
const CRITIQUE_COLOR: &str = "#D97706";

/// One wrapped line with the style it was laid out in.
#[derive(Debug, Clone, Serialize)]
pub struct StyledLine {
    pub text: String,
    pub font_size: u8,
    pub bold: bool,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub lines: Vec<StyledLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedLayout {
    pub pages: Vec<Page>,
}

struct Layout {
    pages: Vec<Page>,
    y: f64,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = TOP;
    }

    /// Wrap a block of text and place it, breaking to a new page when it
    /// would overflow the remaining vertical space.
    fn add_block(&mut self, text: &str, font_size: u8, bold: bool, color: &'static str) {
        let columns = WRAP_COLUMNS_AT_10 * 10 / font_size as usize;
        let lines = wrap(text, columns.max(1));

        if self.y + lines.len() as f64 * 7.0 > PAGE_HEIGHT - MARGIN {
            self.new_page();
        }

        let page = self.pages.last_mut().unwrap();
        for line in &lines {
            page.lines.push(StyledLine {
                text: line.clone(),
                font_size,
                bold,
                color,
            });
        }

        self.y += lines.len() as f64 * 6.0 + 4.0;
    }

    /// Force a page break unless the current page is still mostly empty.
    fn break_before_section(&mut self) {
        if self.y > 200.0 {
            self.new_page();
        }
    }
}

/// Greedy word wrap to a column limit. Words longer than the limit are
/// split hard rather than overflowing.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        if raw_line.chars().count() <= columns {
            lines.push(raw_line.to_string());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;

        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > columns {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if word_len > columns {
                // Hard-split an oversized word.
                let mut chunk = String::new();
                for c in word.chars() {
                    chunk.push(c);
                    if chunk.chars().count() == columns {
                        lines.push(std::mem::take(&mut chunk));
                    }
                }
                current = chunk;
                current_len = current.chars().count();
                continue;
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        lines.push(current);
    }

    lines
}

/// Render the export as a paginated layout.
pub fn render(data: &ExportContent) -> PagedLayout {
    let mut layout = Layout::new();

    layout.add_block("PSİKOLOJİ AĞI - SEANS DÖKÜMÜ", 16, true, HEADER_COLOR);
    layout.add_block(
        &format!("Danışan: {}", data.metadata.client_alias),
        12,
        false,
        BODY_COLOR,
    );
    layout.add_block(
        &format!("Tarih: {}", data.metadata.date),
        12,
        false,
        BODY_COLOR,
    );
    if let Some(number) = &data.metadata.session_number {
        layout.add_block(&format!("Seans: {}", number), 12, false, BODY_COLOR);
    }
    layout.y += 10.0;

    if let Some(segments) = data.transcript_segments() {
        layout.add_block("Transkript", 14, true, TRANSCRIPT_COLOR);
        layout.y += 5.0;

        for seg in segments {
            let clean = strip_unclear_markers(&seg.text);
            let line = format!("{} [{}]: {}", seg.speaker.label(), seg.timestamp, clean);
            layout.add_block(&line, 10, false, BODY_COLOR);
            // Tight spacing between utterances.
            layout.y -= 2.0;
        }
        layout.y += 10.0;
    }

    if let Some(report) = &data.report {
        layout.break_before_section();
        layout.add_block("Seans Raporu", 14, true, REPORT_COLOR);
        layout.y += 5.0;
        layout.add_block(&report.replace('#', ""), 10, false, BODY_COLOR);
        layout.y += 10.0;
    }

    if let Some(critique) = &data.critique {
        layout.break_before_section();
        layout.add_block("Süpervizyon", 14, true, CRITIQUE_COLOR);
        layout.y += 5.0;
        layout.add_block(&critique.replace('#', ""), 10, false, BODY_COLOR);
    }

    if let Some(messages) = data.chat_messages() {
        layout.break_before_section();
        layout.add_block("Asistan Notları", 14, true, HEADER_COLOR);
        layout.y += 5.0;
        for msg in messages {
            let label = match msg.role {
                ChatRole::User => "Siz",
                ChatRole::Model => "Asistan",
            };
            layout.add_block(&format!("{}: {}", label, msg.content), 10, false, BODY_COLOR);
        }
    }

    PagedLayout {
        pages: layout.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_columns() {
        let lines = wrap("bir iki üç dört beş altı yedi sekiz", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "bir iki üç dört beş altı yedi sekiz");
    }

    #[test]
    fn test_wrap_splits_oversized_word() {
        let lines = wrap("abcdefghijklmnop", 5);
        assert!(lines.iter().all(|l| l.chars().count() <= 5));
        assert_eq!(lines.concat(), "abcdefghijklmnop");
    }

    #[test]
    fn test_wrap_keeps_short_lines() {
        assert_eq!(wrap("kısa", 90), vec!["kısa".to_string()]);
        assert_eq!(wrap("a\nb", 90), vec!["a".to_string(), "b".to_string()]);
    }
}
