//! Line-based layout for chat bubbles.
//!
//! Answers that contain numbered points (`1. ...`) are shown as an indented
//! list, one block per non-blank line. Anything else is shown as written.

use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// A `1.`-style line, trimmed
    Point(&'a str),
    Paragraph(&'a str),
}

/// Whether a line starts with digits followed by a dot.
fn is_point(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line.as_bytes().get(digits) == Some(&b'.')
}

/// Split message content into display blocks.
///
/// Without any numbered line the whole content stays one paragraph, blank
/// lines included. With one, every line is trimmed and blank lines are dropped.
pub fn split_blocks(content: &str) -> Vec<Block<'_>> {
    if !content.lines().any(is_point) {
        return vec![Block::Paragraph(content)];
    }
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if is_point(line) {
                Block::Point(line)
            } else {
                Block::Paragraph(line)
            }
        })
        .collect()
}

/// Render message content into a bubble.
pub fn render_content(ui: &mut egui::Ui, content: &str, color: egui::Color32) {
    for block in split_blocks(content) {
        match block {
            Block::Point(text) => {
                ui.horizontal_wrapped(|ui| {
                    ui.add_space(16.0);
                    ui.label(egui::RichText::new(text).size(15.0).color(color));
                });
                ui.add_space(4.0);
            }
            Block::Paragraph(text) => {
                ui.label(egui::RichText::new(text).size(15.0).color(color));
                ui.add_space(4.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_answer_becomes_points() {
        assert_eq!(
            split_blocks("1. Use urea\n\n2. Irrigate"),
            vec![Block::Point("1. Use urea"), Block::Point("2. Irrigate")]
        );
    }

    #[test]
    fn test_mixed_lines_are_trimmed() {
        assert_eq!(
            split_blocks("For wheat:\n  1. Sow in November  \n\nWater weekly.\n10. Harvest in April"),
            vec![
                Block::Paragraph("For wheat:"),
                Block::Point("1. Sow in November"),
                Block::Paragraph("Water weekly."),
                Block::Point("10. Harvest in April"),
            ]
        );
    }

    #[test]
    fn test_plain_answer_kept_whole() {
        let text = "Use neem oil.\n\nSpray in the evening.";
        assert_eq!(split_blocks(text), vec![Block::Paragraph(text)]);
    }

    #[test]
    fn test_point_needs_digits_and_dot() {
        assert!(is_point("3. Weed"));
        assert!(!is_point("3 Weed"));
        assert!(!is_point(". Weed"));
        assert!(!is_point("Step 3. Weed"));
    }
}
