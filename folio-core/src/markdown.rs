//! Markdown rendering for blog posts and project descriptions.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// Render GitHub-flavoured markdown to HTML.
///
/// Raw HTML in the source is dropped. Headings get slug ids and are wrapped
/// in a self-link; code blocks carry highlight.js classes.
pub fn markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let events: Vec<Event> = Parser::new_ext(markdown, options)
        .filter(|event| {
            !matches!(
                event,
                Event::Html(_)
                    | Event::InlineHtml(_)
                    | Event::Start(Tag::HtmlBlock)
                    | Event::End(TagEnd::HtmlBlock)
            )
        })
        .collect();

    let mut slugger = Slugger::default();
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading { level, classes, attrs, .. }) => {
                let end = heading_end(&events, i);
                let slug = slugger.slug(&heading_text(&events[i + 1..end]));
                let anchor: CowStr = format!("#{slug}").into();
                out.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(slug.into()),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
                out.push(Event::Start(Tag::Link {
                    link_type: LinkType::Inline,
                    dest_url: anchor,
                    title: CowStr::Borrowed(""),
                    id: CowStr::Borrowed(""),
                }));
                // The heading is already a link; inner links keep only their text.
                out.extend(
                    events[i + 1..end]
                        .iter()
                        .filter(|e| !matches!(e, Event::Start(Tag::Link { .. }) | Event::End(TagEnd::Link)))
                        .cloned(),
                );
                out.push(Event::End(TagEnd::Link));
                out.push(events[end].clone());
                i = end + 1;
                continue;
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let class = match kind {
                    CodeBlockKind::Fenced(info) => match language(info) {
                        Some(lang) => format!("hljs language-{lang}"),
                        None => "hljs".to_string(),
                    },
                    CodeBlockKind::Indented => "hljs".to_string(),
                };
                out.push(Event::Html(format!("<pre><code class=\"{class}\">").into()));
            }
            Event::End(TagEnd::CodeBlock) => {
                out.push(Event::Html("</code></pre>\n".into()));
            }
            event => out.push(event.clone()),
        }
        i += 1;
    }

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, out.into_iter());
    rendered
}

fn heading_end(events: &[Event], start: usize) -> usize {
    events[start..]
        .iter()
        .position(|e| matches!(e, Event::End(TagEnd::Heading(_))))
        .map(|offset| start + offset)
        .unwrap_or(events.len() - 1)
}

fn heading_text(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(text) | Event::Code(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect()
}

/// First word of a fence info string, limited to characters safe in a class name.
fn language(info: &str) -> Option<&str> {
    let lang = info.split_whitespace().next()?;
    let safe = lang
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '#'));
    safe.then_some(lang)
}

/// GitHub-style heading ids, unique within one document.
#[derive(Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .to_lowercase()
            .chars()
            .filter_map(|c| match c {
                ' ' => Some('-'),
                '-' | '_' => Some(c),
                c if c.is_alphanumeric() => Some(c),
                _ => None,
            })
            .collect();

        let mut slug = base.clone();
        if self.seen.contains_key(&base) {
            loop {
                let count = self.seen.entry(base.clone()).or_insert(0);
                *count += 1;
                slug = format!("{base}-{count}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
        }
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("  \n\t "), "");
    }

    #[test]
    fn test_headings_get_unique_anchored_ids() {
        let html = markdown_to_html("# Getting Started\n\n## Setup\n\n## Setup\n");
        assert!(html.contains(r##"<h1 id="getting-started"><a href="#getting-started">Getting Started</a></h1>"##));
        assert!(html.contains(r##"<h2 id="setup"><a href="#setup">Setup</a></h2>"##));
        assert!(html.contains(r##"<h2 id="setup-1"><a href="#setup-1">Setup</a></h2>"##));
    }

    #[test]
    fn test_links_inside_headings_are_not_nested() {
        let html = markdown_to_html("## See [the docs](https://docs.rs) first\n");
        assert!(html.contains(r##"<h2 id="see-the-docs-first"><a href="#see-the-docs-first">See the docs first</a></h2>"##));
        assert!(!html.contains("https://docs.rs"));
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let html = markdown_to_html("Hello <script>alert(1)</script> world\n\n<div>block</div>\n");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<div>"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn test_code_blocks_carry_highlight_classes() {
        let html = markdown_to_html("```rust\nfn main() {}\n```\n");
        assert!(html.contains(r#"<pre><code class="hljs language-rust">fn main() {}"#));
        let plain = markdown_to_html("```\n<b>x</b>\n```\n");
        assert!(plain.contains(r#"<code class="hljs">&lt;b&gt;x&lt;/b&gt;"#));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_slugger() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Hello, World!"), "hello-world");
        assert_eq!(slugger.slug("Hello World"), "hello-world-1");
        assert_eq!(slugger.slug("hello-world-1"), "hello-world-1-1");
    }
}
