//! Inline articles.
//!
//! Book files embed topical articles in gray-background `div`s. The title
//! paragraph (`p.ct`) is typeset letter-spaced, e.g. `T H E&nbsp;&nbsp;L A W`
//! or `T H E<br/>L A W`; word gaps are double spaces or line breaks, while
//! single spaces separate the letters of one word.
//!
//! An article attaches to the first verse anchor after its block.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::boundary::is_article_block;
use crate::dom::{ArenaDom, ArenaNodeId, outer_html};
use crate::ids::{VerseId, is_verse_id, verse_ref_in_href};
use crate::model::{Annotation, AnnotationKind};
use crate::text::{clean_text, styled_text};

/// Maximum length of a title-derived article id.
pub const SLUG_MAX_LEN: usize = 30;

const WORD_GAP_MARK: &str = "||";

static WORD_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\u{a0}]{2,}").expect("valid regex"));

/// Extract every article block of a book file.
///
/// The returned annotations carry the attachment verse as their only
/// passage id. Blocks without a title paragraph or without a following
/// verse anchor are skipped.
pub fn extract_articles(dom: &ArenaDom) -> Vec<Annotation> {
    let mut articles = Vec::new();
    for div in dom.descendants(dom.document()) {
        if !is_article_block(dom, div) {
            continue;
        }
        let Some(title_p) = dom
            .descendants(div)
            .find(|&n| dom.is_tag(n, "p") && dom.has_class(n, "ct"))
        else {
            debug!("article block without a title paragraph");
            continue;
        };

        let title = article_title(dom, title_p);
        let id = match dom.element_id(title_p) {
            Some(explicit) => explicit.to_string(),
            None => slugify(&title),
        };

        let following = dom
            .following(div)
            .find_map(|n| dom.element_id(n).filter(|id| is_verse_id(id)));
        let Some(verse_id) = following else {
            debug!(article = %id, "article without a following verse");
            continue;
        };
        let verse_display = VerseId::parse(verse_id)
            .map(|v| v.display_ref())
            .unwrap_or_default();

        articles.push(Annotation {
            id,
            kind: AnnotationKind::Article,
            passage_ids: vec![verse_id.to_string()],
            verse_display,
            text: article_text(dom, div, &title),
            html: outer_html(dom, div),
            patristic_citations: Vec::new(),
            scripture_refs: linked_verses(dom, div),
        });
    }
    articles
}

/// Rebuild a letter-spaced title: `T H E  L A W` becomes `THE LAW`.
pub fn article_title(dom: &ArenaDom, title_p: ArenaNodeId) -> String {
    let raw = dom
        .descendants(title_p)
        .filter_map(|n| dom.text_content(n))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("  ");
    collapse_letter_spacing(&raw)
}

/// Join single-spaced capitals while keeping double-spaced word gaps.
pub fn collapse_letter_spacing(raw: &str) -> String {
    let marked = WORD_GAP.replace_all(raw, WORD_GAP_MARK);
    let chars: Vec<char> = marked.chars().collect();
    let mut joined = String::with_capacity(marked.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_capitals = c.is_whitespace()
            && i > 0
            && chars[i - 1].is_ascii_uppercase()
            && chars.get(i + 1).is_some_and(char::is_ascii_uppercase);
        if !between_capitals {
            joined.push(c);
        }
    }
    joined.replace(WORD_GAP_MARK, " ").trim().to_string()
}

/// Article body: title, a blank line, then one line per paragraph.
fn article_text(dom: &ArenaDom, div: ArenaNodeId, title: &str) -> String {
    let no_pruning = HashSet::new();
    let mut lines = vec![title.to_string(), String::new()];

    for p in dom.find_all_tags(div, "p") {
        if dom.has_class(p, "ct") {
            continue;
        }
        let text = clean_text(&styled_text(dom, p, &no_pruning));
        if text.is_empty() {
            continue;
        }
        if dom.has_class(p, "sub1") {
            lines.push(String::new());
            if text == text.to_lowercase() {
                lines.push(uppercase_outside_tags(&text));
            } else {
                lines.push(text);
            }
        } else if dom.has_class(p, "ext") {
            lines.push(format!("    {text}"));
        } else {
            lines.push(text);
        }
    }

    lines.join("\n").trim().to_string()
}

fn uppercase_outside_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ => {}
        }
        if in_tag || c == '>' {
            out.push(c);
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

/// Verse ids linked from inside `root`, in document order.
pub fn linked_verses(dom: &ArenaDom, root: ArenaNodeId) -> Vec<String> {
    dom.descendants(root)
        .filter(|&n| dom.is_tag(n, "a"))
        .filter_map(|a| dom.get_attr(a, "href").and_then(verse_ref_in_href))
        .map(str::to_string)
        .collect()
}

/// Article id from a title: lower-case ASCII alphanumerics joined by `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut gap = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('_');
            }
            gap = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    slug.trim_end_matches('_').to_string()
}

/// `base`, or `base_2`, `base_3`, ... for the first id not yet taken.
pub fn disambiguate<F>(base: &str, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const MATTHEW: &str = r#"<html><body>
        <p class="tx"><span id="Matt_vchap5-2"></span>Then He opened His mouth and taught them, saying:</p>
        <div style="background-color: gray; padding: 6px">
          <p class="ct">T H E&nbsp;&nbsp;L A W</p>
          <p class="tx1">The Law is <i>fulfilled</i> in Christ (see <a href="Romans.html#Rom_vchap10-4">Rom 10:4</a>).</p>
          <p class="sub1">the new commandment</p>
          <p class="ext">Quoted from the prophets.</p>
        </div>
        <p class="tx"><span id="Matt_vchap5-3"></span>Blessed are the poor in spirit,</p>
        </body></html>"#;

    #[test]
    fn test_extract_article() {
        let dom = parse_html(MATTHEW);
        let articles = extract_articles(&dom);
        assert_eq!(articles.len(), 1);

        let article = &articles[0];
        assert_eq!(article.id, "the_law");
        assert_eq!(article.kind, AnnotationKind::Article);
        assert_eq!(article.passage_ids, vec!["Matt_vchap5-3"]);
        assert_eq!(article.verse_display, "5:3");
        assert_eq!(article.scripture_refs, vec!["Rom_vchap10-4"]);
        assert!(article.html.starts_with("<div style="));
        assert_eq!(
            article.text,
            "THE LAW\n\nThe Law is <i>fulfilled</i> in Christ (see Rom 10:4).\n\nTHE NEW COMMANDMENT\n    Quoted from the prophets."
        );
    }

    #[test]
    fn test_explicit_title_id() {
        let dom = parse_html(
            r#"<div style="background-color: gray"><p class="ct" id="ch_prayer">P R A Y E R</p></div>
               <p><span id="Matt_vchap6-9"></span>Our Father</p>"#,
        );
        let articles = extract_articles(&dom);
        assert_eq!(articles[0].id, "ch_prayer");
        assert!(articles[0].text.starts_with("PRAYER"));
    }

    #[test]
    fn test_article_without_following_verse_is_dropped() {
        let dom = parse_html(
            r#"<p><span id="Matt_vchap28-20"></span>to the end of the age.</p>
               <div style="background-color: gray"><p class="ct">E N D</p></div>"#,
        );
        assert!(extract_articles(&dom).is_empty());
    }

    #[test]
    fn test_block_without_title_is_skipped() {
        let dom = parse_html(
            r#"<div style="background-color: gray"><p class="tx">untitled</p></div>
               <p><span id="Matt_vchap1-1"></span>x</p>"#,
        );
        assert!(extract_articles(&dom).is_empty());
    }

    #[test]
    fn test_title_with_line_break() {
        let dom = parse_html(r#"<p class="ct">T H E<br/>H O L Y<br/>S P I R I T</p>"#);
        let p = dom.find(|n| dom.is_tag(n, "p")).unwrap();
        assert_eq!(article_title(&dom, p), "THE HOLY SPIRIT");
    }

    #[test]
    fn test_collapse_letter_spacing() {
        assert_eq!(collapse_letter_spacing("T H E  L A W"), "THE LAW");
        assert_eq!(collapse_letter_spacing("T H E\u{a0}\u{a0}L A W"), "THE LAW");
        assert_eq!(collapse_letter_spacing("The Law"), "The Law");
        assert_eq!(collapse_letter_spacing("  "), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("THE LAW"), "the_law");
        assert_eq!(slugify("Faith & Works!"), "faith_works");
        assert_eq!(slugify("--x--"), "x");
        assert_eq!(
            slugify("The Theotokos in the Old Testament Prophecies"),
            "the_theotokos_in_the_old_testa"
        );
        assert_eq!(slugify("!!!"), "");
        assert_eq!(
            slugify("The Sabbath and the Lords Day Rest"),
            "the_sabbath_and_the_lords_day"
        );
    }

    #[test]
    fn test_disambiguate() {
        let taken = ["the_law", "the_law_2"];
        assert_eq!(disambiguate("the_law", |id| taken.contains(&id)), "the_law_3");
        assert_eq!(disambiguate("grace", |id| taken.contains(&id)), "grace");
    }
}
