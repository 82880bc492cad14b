//! HTML export of the Ask-AI history, ready to print or share

use crate::records::Entry;
use std::fmt::Write;

const STYLE: &str = "
      @page { margin: 40px; }
      body { font-family: Arial, sans-serif; padding: 0; margin: 0; }
      h3, h4 { color: rgb(4, 10, 18); }
      div { margin-bottom: 10px; color: rgb(52, 53, 54); }
      .entry { margin-bottom: 24px; border-bottom: 1px solid #c3c3c3; }
      .answer { white-space: pre-wrap; }";

/// Render `entries` in the given order as one standalone HTML document
pub fn render_html(entries: &[Entry]) -> String {
    let mut rows = String::new();
    for (index, entry) in entries.iter().enumerate() {
        // Writing into a String cannot fail
        let _ = write!(
            rows,
            "\n    <div class=\"entry\">\n      <h3>Q{}. {}</h3>\n      <p>Topic: {}</p>\n      <h4>Answer:</h4>\n      <div class=\"answer\">{}</div>\n    </div>",
            index + 1,
            escape_html(entry.question()),
            escape_html(entry.topic()),
            escape_html(entry.answer()),
        );
    }

    format!(
        "<html>\n  <head>\n    <meta charset=\"UTF-8\">\n    <style>{}\n    </style>\n  </head>\n  <body>\n    <h2>Ask AI - Exported Chats</h2>{}\n  </body>\n</html>\n",
        STYLE, rows
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EntryStatus;

    fn answered(question: &str, answer: &str) -> Entry {
        let mut entry = Entry::pending(question, Some("Web"));
        entry.finish(EntryStatus::Completed, answer);
        entry
    }

    #[test]
    fn test_numbered_blocks() {
        let html = render_html(&[answered("first?", "one"), answered("second?", "two")]);
        assert!(html.contains("<h2>Ask AI - Exported Chats</h2>"));
        assert!(html.contains("Q1. first?"));
        assert!(html.contains("Q2. second?"));
        assert!(html.contains("Topic: Web"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let html = render_html(&[answered("<script>alert(1)</script>", "a & b")]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_empty_history() {
        let html = render_html(&[]);
        assert!(html.contains("Exported Chats"));
        assert!(!html.contains("Q1."));
    }
}
