//! HTML rendering for the translator form

/// Page title shown in the browser tab
pub const PAGE_TITLE: &str = "Offline Language Translator";

/// Shown instead of calling the model when the input is blank
pub const EMPTY_INPUT_WARNING: &str = "Please enter text.";

/// Shown when the model call fails
pub const GENERIC_FAILURE: &str = "Translation failed. Please try again.";

/// What to show below the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing submitted yet
    Blank,
    /// Input rejected before translation
    Warning(String),
    /// Translated text
    Translation(String),
    /// Lookup or model failure
    Error(String),
}

/// Everything needed to render the page once
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    /// Pair labels in display order
    pub labels: Vec<&'a str>,
    /// Selected label; the first one when unset
    pub selected: Option<&'a str>,
    /// Textarea content
    pub text: &'a str,
    /// Result area
    pub outcome: Outcome,
}

impl<'a> PageView<'a> {
    /// Fresh page with nothing submitted
    pub fn new(labels: Vec<&'a str>) -> Self {
        Self {
            labels,
            selected: None,
            text: "",
            outcome: Outcome::Blank,
        }
    }

    /// Keep the submitted selection and text
    pub fn with_input(mut self, selected: &'a str, text: &'a str) -> Self {
        self.selected = Some(selected);
        self.text = text;
        self
    }

    /// Set the result area
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem}\
select,textarea{width:100%;box-sizing:border-box;font-size:1rem;margin:.25rem 0 1rem}\
textarea{min-height:8rem}\
button{font-size:1rem;padding:.4rem 1.2rem}\
.warning{background:#fff8e1;border-left:4px solid #f9a825;padding:.75rem}\
.success{background:#e8f5e9;border-left:4px solid #2e7d32;padding:.75rem}\
.error{background:#ffebee;border-left:4px solid #c62828;padding:.75rem}\
.output{white-space:pre-wrap;margin-top:1rem}";

/// Render the full page
pub fn render(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(2048);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>🌍 Language Translator</h1>\n\
         <form method=\"post\" action=\"/\">\n\
         <h3>Choose Language Pair</h3>\n\
         <label for=\"pair\">Translation Type</label>\n\
         <select id=\"pair\" name=\"pair\">\n",
        PAGE_TITLE, STYLE
    ));

    for (i, label) in view.labels.iter().enumerate() {
        let selected = match view.selected {
            Some(s) => s == *label,
            None => i == 0,
        };
        html.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>\n",
            escape_html(label),
            if selected { " selected" } else { "" }
        ));
    }

    html.push_str(&format!(
        "</select>\n\
         <label for=\"text\">Enter text to translate</label>\n\
         <textarea id=\"text\" name=\"text\">{}</textarea>\n\
         <button type=\"submit\">Translate</button>\n\
         </form>\n",
        escape_html(view.text)
    ));

    match &view.outcome {
        Outcome::Blank => {}
        Outcome::Warning(message) => {
            html.push_str(&format!("<p class=\"warning\">{}</p>\n", escape_html(message)));
        }
        Outcome::Translation(output) => {
            html.push_str(&format!(
                "<p class=\"success\">Translation:</p>\n<div class=\"output\">{}</div>\n",
                escape_html(output)
            ));
        }
        Outcome::Error(message) => {
            html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 2] = ["English → Hindi", "Hindi → English"];

    #[test]
    fn test_initial_page() {
        let html = render(&PageView::new(LABELS.to_vec()));

        assert!(html.contains("<title>Offline Language Translator</title>"));
        assert!(html.contains("Choose Language Pair"));
        assert!(html.contains("Translation Type"));
        assert!(html.contains("Enter text to translate"));
        assert!(html.contains("<option value=\"English → Hindi\" selected>"));
        assert!(html.contains("<option value=\"Hindi → English\">"));
        assert!(!html.contains("Translation:"));
    }

    #[test]
    fn test_selection_and_text_are_preserved() {
        let view = PageView::new(LABELS.to_vec())
            .with_input("Hindi → English", "नमस्ते")
            .with_outcome(Outcome::Translation("Hello".to_string()));
        let html = render(&view);

        assert!(html.contains("<option value=\"Hindi → English\" selected>"));
        assert!(html.contains("<option value=\"English → Hindi\">"));
        assert!(html.contains(">नमस्ते</textarea>"));
        assert!(html.contains("Translation:"));
        assert!(html.contains("<div class=\"output\">Hello</div>"));
    }

    #[test]
    fn test_warning_outcome() {
        let view = PageView::new(LABELS.to_vec())
            .with_outcome(Outcome::Warning(EMPTY_INPUT_WARNING.to_string()));
        let html = render(&view);

        assert!(html.contains("<p class=\"warning\">Please enter text.</p>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let view = PageView::new(LABELS.to_vec())
            .with_input("English → Hindi", "<script>alert('x')</script>")
            .with_outcome(Outcome::Translation("a & b".to_string()));
        let html = render(&view);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
    }
}
