//! Shared navigation sidebar.
//!
//! Every page pulls `sidebar.html` from the backend when it initializes and
//! keeps the fragment in its [`SidebarSlot`]. The terminal only needs the
//! links, so they are extracted from the anchors.

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Compiled regexes
// ---------------------------------------------------------------------------

/// `<a ... href="x" ...>label</a>`, across lines.
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
        .expect("anchor regex must compile")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex must compile"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Container the sidebar fragment is injected into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarSlot {
    html: Option<String>,
}

impl SidebarSlot {
    pub fn fill(&mut self, html: String) {
        self.html = Some(html);
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.html.is_some()
    }

    pub fn links(&self) -> Vec<NavLink> {
        self.html.as_deref().map(parse_links).unwrap_or_default()
    }
}

/// Extract navigation links from an HTML fragment, in document order.
///
/// Nested markup inside an anchor is stripped and whitespace collapsed.
/// Anchors with no visible label are skipped.
pub fn parse_links(html: &str) -> Vec<NavLink> {
    ANCHOR_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str().trim().to_string();
            let inner = caps.get(2)?.as_str();
            let label = TAG_RE
                .replace_all(inner, " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            (!label.is_empty()).then_some(NavLink { label, href })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDEBAR: &str = r##"
<nav class="sidebar">
  <ul>
    <li><a href="/config-management">Configuration</a></li>
    <li><a class="nav" href='/rules-management'>
        <i class="icon-bell"></i> Alert  Rules
    </a></li>
    <li><a href="/metrics-management"><span>Metrics</span></a></li>
    <li><a href="/reports">Reports</a></li>
    <li><a href="#"><i class="icon-only"></i></a></li>
  </ul>
</nav>"##;

    #[test]
    fn extracts_labels_and_targets_in_order() {
        let links = parse_links(SIDEBAR);
        let labels: Vec<&str> = links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Configuration", "Alert Rules", "Metrics", "Reports"]);
        assert_eq!(links[1].href, "/rules-management");
    }

    #[test]
    fn empty_slot_has_no_links() {
        let slot = SidebarSlot::default();
        assert!(!slot.is_loaded());
        assert!(slot.links().is_empty());
    }

    #[test]
    fn filled_slot_keeps_raw_html() {
        let mut slot = SidebarSlot::default();
        slot.fill(SIDEBAR.to_string());
        assert_eq!(slot.html(), Some(SIDEBAR));
        assert_eq!(slot.links().len(), 4);
    }
}
