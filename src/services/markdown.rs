use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// PATTERNS
// ============================================================================

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,3}) (.*)$").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\*|\d+\.) (.*)$").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static BOLD_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.*?)__").unwrap());
static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+?)\*").unwrap());
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_([^_]+?)_").unwrap());

// ============================================================================
// ESCAPING
// ============================================================================

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Plain text bubble: escaped, line breaks kept, wrapped in a paragraph.
pub fn render_plain_text(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

// ============================================================================
// INLINE SPANS
// ============================================================================

fn apply_emphasis(text: &str) -> String {
    let text = BOLD_STAR_RE.replace_all(text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR_RE.replace_all(&text, "<em>$1</em>");
    ITALIC_UNDERSCORE_RE.replace_all(&text, "<em>$1</em>").into_owned()
}

/// Only web, mail and relative targets survive; anything else points nowhere.
fn safe_href(href: &str) -> &str {
    let lower = href.trim().to_ascii_lowercase();
    let has_scheme = lower
        .split_once(':')
        .map(|(scheme, _)| !scheme.contains('/') && !scheme.contains('?') && !scheme.contains('#'))
        .unwrap_or(false);

    if !has_scheme
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("mailto:")
    {
        href.trim()
    } else {
        "#"
    }
}

/// Links first, then bold, then italic. Link targets are kept out of the
/// emphasis pass so underscores in URLs stay intact.
fn process_inline(escaped: &str) -> String {
    let mut output = String::with_capacity(escaped.len());
    let mut last = 0;

    for captures in LINK_RE.captures_iter(escaped) {
        let whole = captures.get(0).unwrap();
        output.push_str(&apply_emphasis(&escaped[last..whole.start()]));
        output.push_str(&render_link(&captures));
        last = whole.end();
    }
    output.push_str(&apply_emphasis(&escaped[last..]));

    output
}

fn render_link(captures: &Captures<'_>) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        safe_href(&captures[2]),
        apply_emphasis(&captures[1])
    )
}

/// Escape a single line and apply inline spans.
pub fn render_inline(line: &str) -> String {
    process_inline(&escape_html(line))
}

// ============================================================================
// BLOCKS
// ============================================================================

#[derive(Default)]
struct BlockWriter {
    html: String,
    paragraph: Vec<String>,
    in_list: bool,
}

impl BlockWriter {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.html.push_str("<p>");
            self.html.push_str(&self.paragraph.join("<br>"));
            self.html.push_str("</p>\n");
            self.paragraph.clear();
        }
    }

    fn close_list(&mut self) {
        if self.in_list {
            self.html.push_str("</ul>\n");
            self.in_list = false;
        }
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.close_list();
    }

    fn heading(&mut self, level: usize, text: &str) {
        self.flush();
        self.html.push_str(&format!("<h{level}>{}</h{level}>\n", render_inline(text)));
    }

    fn list_item(&mut self, text: &str) {
        self.flush_paragraph();
        if !self.in_list {
            self.html.push_str("<ul>\n");
            self.in_list = true;
        }
        self.html.push_str(&format!("<li>{}</li>\n", render_inline(text)));
    }

    fn paragraph_line(&mut self, text: &str) {
        self.close_list();
        self.paragraph.push(render_inline(text));
    }

    fn finish(mut self) -> String {
        self.flush();
        self.html.trim().to_string()
    }
}

/// Render the Markdown subset used by bot replies into an HTML fragment.
///
/// Supports `#`..`###` headings, `* ` and `1. ` list items (both as `<ul>`),
/// `**bold**`, `__bold__`, `*italic*`, `_italic_` and `[text](url)` links.
/// All text is escaped before markup is added, so unterminated markers stay
/// literal. Output of this function is not valid input: a second pass would
/// escape the entities again.
pub fn render_markdown(markdown: &str) -> String {
    let mut writer = BlockWriter::default();

    for line in markdown.split('\n') {
        let line = line.trim();

        if line.is_empty() {
            writer.flush();
        } else if let Some(caps) = HEADING_RE.captures(line) {
            writer.heading(caps[1].len(), &caps[2]);
        } else if let Some(caps) = LIST_ITEM_RE.captures(line) {
            writer.list_item(&caps[1]);
        } else {
            writer.paragraph_line(line);
        }
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic_in_one_paragraph() {
        assert_eq!(
            render_markdown("**hi** *there*"),
            "<p><strong>hi</strong> <em>there</em></p>"
        );
    }

    #[test]
    fn heading_then_paragraph() {
        assert_eq!(render_markdown("# Title\n\nBody"), "<h1>Title</h1>\n<p>Body</p>");
    }

    #[test]
    fn heading_levels() {
        assert_eq!(
            render_markdown("## Two\n### Three"),
            "<h2>Two</h2>\n<h3>Three</h3>"
        );
        // Four hashes is not a heading we support.
        assert_eq!(render_markdown("#### Four"), "<p>#### Four</p>");
    }

    #[test]
    fn consecutive_lines_share_a_paragraph() {
        assert_eq!(
            render_markdown("line one\nline two\n\nnext"),
            "<p>line one<br>line two</p>\n<p>next</p>"
        );
    }

    #[test]
    fn bullet_and_numbered_items_form_one_list() {
        let html = render_markdown("Steps:\n* open portal\n2. sign in\n\nDone");
        assert_eq!(
            html,
            "<p>Steps:</p>\n<ul>\n<li>open portal</li>\n<li>sign in</li>\n</ul>\n<p>Done</p>"
        );
    }

    #[test]
    fn heading_closes_open_list() {
        let html = render_markdown("* a\n# H");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<h1>H</h1>");
    }

    #[test]
    fn text_after_list_starts_a_paragraph() {
        let html = render_markdown("* a\nafter");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<p>after</p>");
    }

    #[test]
    fn escapes_before_adding_markup() {
        let html = render_markdown("<script>alert('x')</script> & \"q\"");
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt; &amp; &quot;q&quot;</p>"
        );
    }

    #[test]
    fn unterminated_markers_stay_literal() {
        assert_eq!(render_markdown("**oops"), "<p>**oops</p>");
        assert_eq!(render_markdown("a * b"), "<p>a * b</p>");
    }

    #[test]
    fn underscore_variants() {
        assert_eq!(
            render_markdown("__strong__ and _soft_"),
            "<p><strong>strong</strong> and <em>soft</em></p>"
        );
    }

    #[test]
    fn links_keep_their_targets() {
        let html = render_markdown("See [the_portal](https://ums.edu.my/ums_feedback_system/)");
        assert_eq!(
            html,
            "<p>See <a href=\"https://ums.edu.my/ums_feedback_system/\" target=\"_blank\" rel=\"noopener noreferrer\">the_portal</a></p>"
        );

        let html = render_markdown("[the_ums_portal](https://ums.edu.my/)");
        assert_eq!(
            html,
            "<p><a href=\"https://ums.edu.my/\" target=\"_blank\" rel=\"noopener noreferrer\">the<em>ums</em>portal</a></p>"
        );
    }

    #[test]
    fn script_links_are_neutralized() {
        let html = render_markdown("[click](javascript:alert(1))");
        assert!(html.contains("href=\"#\""));
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn second_pass_double_escapes() {
        let once = render_markdown("a & b");
        assert_eq!(once, "<p>a &amp; b</p>");
        assert!(render_markdown(&once).contains("&amp;amp;"));
    }

    #[test]
    fn plain_text_keeps_line_breaks() {
        assert_eq!(render_plain_text("1. a\n2. <b>"), "<p>1. a<br>2. &lt;b&gt;</p>");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_markdown(""), "");
        assert_eq!(render_markdown("\n\n  \n"), "");
    }
}
