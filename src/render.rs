// src/render.rs
//! Result rendering: HTML cards for the results page and plain text for the terminal.
//!
//! Every post field is scraped, untrusted text and goes through [`escape_html`]
//! before it lands in markup.

use std::fmt::Write;

use crate::types::response::ResultsResponse;
use crate::types::ResultPost;
use crate::utils::{escape_html, or_default, truncate};

pub const MAX_LINKS_SHOWN: usize = 3;
pub const LINK_LABEL_CHARS: usize = 60;
pub const TERMINAL_CONTENT_CHARS: usize = 300;

const NO_POSTS: &str = r#"<p class="text-center">No posts found</p>"#;

/// One result card.
pub fn render_card(post: &ResultPost) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"result-card\">\n");
    html.push_str("  <div class=\"result-header\">\n");
    let _ = writeln!(
        html,
        "    <div class=\"result-author\">{}</div>",
        escape_html(or_default(&post.author, "Unknown"))
    );
    let _ = writeln!(
        html,
        "    <span class=\"result-query\">{}</span>",
        escape_html(or_default(&post.query, "N/A"))
    );
    html.push_str("  </div>\n");
    let _ = writeln!(
        html,
        "  <div class=\"result-content\">{}</div>",
        escape_html(or_default(&post.content, "No content"))
    );

    if !post.links.is_empty() {
        html.push_str("  <div class=\"result-links\">\n    <strong>Links:</strong>\n");
        for link in post.links.iter().take(MAX_LINKS_SHOWN) {
            let _ = writeln!(
                html,
                "    <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                escape_html(link),
                escape_html(&truncate(link, LINK_LABEL_CHARS))
            );
        }
        html.push_str("  </div>\n");
    }

    html.push_str("</div>\n");
    html
}

/// All cards, or the empty placeholder.
pub fn render_cards(posts: &[ResultPost]) -> String {
    if posts.is_empty() {
        return format!("{}\n", NO_POSTS);
    }
    posts.iter().map(render_card).collect()
}

/// Standalone results page with the stats header.
pub fn render_page(job_id: &str, posts: &[ResultPost], total_queries: usize) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>LinkedIn Job Finder: {job}</title>
</head>
<body>
<div class="stats">
  <div class="stat"><span id="totalPosts">{posts_len}</span> posts</div>
  <div class="stat"><span id="totalQueries">{total_queries}</span> queries</div>
</div>
<div id="resultsContainer">
{cards}</div>
</body>
</html>
"#,
        job = escape_html(job_id),
        posts_len = posts.len(),
        total_queries = total_queries,
        cards = render_cards(posts),
    )
}

// ===== Terminal output =====

pub fn format_tags(title: &str, tags: &[String], empty: &str) -> String {
    if tags.is_empty() {
        format!("{}: {}", title, empty)
    } else {
        format!("{}: {}", title, tags.join(", "))
    }
}

/// Terminal rendering of one post, numbered from 1.
pub fn format_post(index: usize, post: &ResultPost, content_chars: usize) -> String {
    let rule = "─".repeat(70);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "📌 POST #{}", index);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "👤 Author: {}", or_default(&post.author, "Unknown"));
    let _ = writeln!(out, "🔍 Query: {}", or_default(&post.query, "N/A"));
    let _ = writeln!(
        out,
        "\n📝 Content:\n{}",
        truncate(or_default(&post.content, "No content"), content_chars)
    );

    if !post.links.is_empty() {
        let _ = writeln!(out, "\n🔗 Links:");
        for link in post.links.iter().take(MAX_LINKS_SHOWN) {
            let _ = writeln!(out, "   • {}", link);
        }
    }
    out
}

/// Status banner for a one-shot view of a job.
pub fn format_status_banner(response: &ResultsResponse) -> String {
    let rule = "=".repeat(70);
    let skills: Vec<String> = response.skills.iter().take(10).cloned().collect();
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "📊 JOB STATUS: {}",
        response.status.as_str().to_uppercase()
    );
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "✅ Skills Extracted: {}", skills.join(", "));
    let _ = writeln!(out, "🔍 Queries Used: {}", response.queries.len());
    let _ = writeln!(out, "📝 Total Posts Found: {}", response.results.len());
    let _ = writeln!(out, "{}", rule);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_links(links: Vec<String>) -> ResultPost {
        ResultPost {
            author: "Ada <Lovelace>".to_string(),
            query: "rust & go".to_string(),
            content: "<img src=x onerror=alert(1)>".to_string(),
            links,
            ..Default::default()
        }
    }

    #[test]
    fn test_card_escapes_untrusted_fields() {
        let html = render_card(&post_with_links(vec![]));
        assert!(html.contains("Ada &lt;Lovelace&gt;"));
        assert!(html.contains("rust &amp; go"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("result-links"));
    }

    #[test]
    fn test_card_limits_and_truncates_links() {
        let long = format!("https://www.linkedin.com/posts/{}", "a".repeat(100));
        let links = vec![
            long.clone(),
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ];
        let html = render_card(&post_with_links(links));

        assert_eq!(html.matches("<a href=").count(), 3);
        assert!(!html.contains("https://c.example"));
        assert!(html.contains(&format!("href=\"{}\"", long)));
        assert!(html.contains(&format!(">{}...</a>", &long[..60])));
    }

    #[test]
    fn test_card_defaults_for_empty_fields() {
        let html = render_card(&ResultPost::default());
        assert!(html.contains(">Unknown<"));
        assert!(html.contains(">N/A<"));
        assert!(html.contains(">No content<"));
    }

    #[test]
    fn test_empty_results_placeholder() {
        assert!(render_cards(&[]).contains("No posts found"));
        let page = render_page("job-1", &[], 4);
        assert!(page.contains(r#"<span id="totalPosts">0</span>"#));
        assert!(page.contains(r#"<span id="totalQueries">4</span>"#));
    }

    #[test]
    fn test_terminal_post_truncates_content() {
        let post = ResultPost {
            author: "Grace".to_string(),
            content: "y".repeat(400),
            ..Default::default()
        };
        let out = format_post(1, &post, TERMINAL_CONTENT_CHARS);
        assert!(out.contains("📌 POST #1"));
        assert!(out.contains(&format!("{}...", "y".repeat(300))));
        assert!(!out.contains(&"y".repeat(301)));
    }
}
