//! Rendering with the attribution footer

use crate::policy::AttributionBundle;
use pulldown_cmark::{html, Event, Parser};
use serde::{Deserialize, Serialize};

/// Output markup for `render`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Html,
    Markdown,
}

impl std::str::FromStr for RenderFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("unknown render format: {}", s)),
        }
    }
}

pub(super) fn render(bundle: &AttributionBundle, format: RenderFormat) -> String {
    match format {
        RenderFormat::Html => render_html(bundle, 0),
        RenderFormat::Markdown => render_markdown(bundle),
    }
}

fn escaped(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn title_of(bundle: &AttributionBundle) -> &str {
    bundle.title().unwrap_or_else(|| bundle.id().as_str())
}

fn body_of(bundle: &AttributionBundle) -> Option<&str> {
    bundle.content().get("content").and_then(|v| v.as_str())
}

/// Markdown body to HTML; raw HTML in the source is emitted as text
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn render_html(bundle: &AttributionBundle, depth: usize) -> String {
    let pad = "  ".repeat(depth * 2);
    let mut out = String::new();

    out.push_str(&format!(
        "{pad}<div class=\"discourse-node\" data-id=\"{}\" data-type=\"{}\">\n",
        escaped(bundle.id().as_str()),
        bundle.record_type()
    ));
    out.push_str(&format!("{pad}  <h3>{}</h3>\n", escaped(title_of(bundle))));
    if let Some(body) = body_of(bundle) {
        out.push_str(&format!(
            "{pad}  <div class=\"content\">{}</div>\n",
            markdown_to_html(body).trim_end()
        ));
    }

    if bundle.is_encumbered() {
        let link = escaped(bundle.source_link().unwrap_or_default());
        out.push_str(&format!("{pad}  <div class=\"attribution-required\">\n"));
        out.push_str(&format!(
            "{pad}    <p><strong>License:</strong> {}</p>\n",
            escaped(bundle.license_name().unwrap_or_default())
        ));
        out.push_str(&format!(
            "{pad}    <p><strong>Source:</strong> <a href=\"{link}\">{link}</a></p>\n"
        ));
        out.push_str(&format!(
            "{pad}    <p><strong>Creator:</strong> {}</p>\n",
            escaped(bundle.creator().unwrap_or_default())
        ));
        out.push_str(&format!("{pad}  </div>\n"));
    }

    if !bundle.related().is_empty() {
        out.push_str(&format!("{pad}  <ul class=\"related\">\n"));
        for related in bundle.related() {
            out.push_str(&format!("{pad}    <li data-relation=\"{}\">\n", related.relation));
            out.push_str(&render_html(&related.bundle, depth + 1));
            out.push_str(&format!("{pad}    </li>\n"));
        }
        out.push_str(&format!("{pad}  </ul>\n"));
    }

    out.push_str(&format!("{pad}</div>\n"));
    out
}

fn render_markdown(bundle: &AttributionBundle) -> String {
    let mut out = format!("# {}\n\n", title_of(bundle));
    if let Some(body) = body_of(bundle) {
        out.push_str(&format!("{}\n\n", body.trim_end()));
    }

    if bundle.is_encumbered() {
        let link = bundle.source_link().unwrap_or_default();
        out.push_str("---\n\n**Attribution Required**\n\n");
        out.push_str(&format!(
            "- License: {}\n",
            bundle.license_name().unwrap_or_default()
        ));
        out.push_str(&format!("- Source: [{link}]({link})\n"));
        out.push_str(&format!("- Creator: {}\n\n", bundle.creator().unwrap_or_default()));
    }

    if !bundle.related().is_empty() {
        out.push_str("## Related\n\n");
        push_related_markdown(&mut out, bundle, 0);
    }
    out
}

fn push_related_markdown(out: &mut String, bundle: &AttributionBundle, depth: usize) {
    let indent = "  ".repeat(depth);
    for related in bundle.related() {
        let child = &related.bundle;
        out.push_str(&format!(
            "{indent}- *{}*: **{}**",
            related.relation,
            title_of(child)
        ));
        if child.is_encumbered() {
            let link = child.source_link().unwrap_or_default();
            out.push_str(&format!(
                " ({}; [{link}]({link}); {})",
                child.license_name().unwrap_or_default(),
                child.creator().unwrap_or_default()
            ));
        }
        out.push('\n');
        push_related_markdown(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::gateway::EnforcementGateway;
    use crate::record::{Edge, EdgeKind, License, Record, RecordId, RecordType};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn gateway() -> EnforcementGateway {
        let store = MemoryStore::new();
        store.insert(
            Record::new("evidence-001", RecordType::Evidence)
                .with_license(
                    License::named("CC BY 4.0")
                        .with_source_link("https://lab.example.com/dataset-001")
                        .with_creator("Jane Smith"),
                )
                .with_field("title", "Cell migration <increases>")
                .with_field("content", "We observed a **2x** increase."),
        );
        store.insert(
            Record::new("evidence-002", RecordType::Evidence)
                .with_license(License::named("All Rights Reserved").with_creator("John Doe"))
                .with_field("title", "Temperature affects enzyme activity")
                .with_field("content", "Peaks at 37C. <script>alert(1)</script>"),
        );
        store.insert(
            Record::new("source-001", RecordType::Source)
                .with_license(
                    License::named("CC0 1.0")
                        .with_source_link("https://example.com/raw-data")
                        .with_creator("Lab Team"),
                )
                .with_field("title", "Research Dataset"),
        );
        store.add_edge(Edge::new("evidence-001", "source-001", EdgeKind::GroundedIn));
        EnforcementGateway::new(Arc::new(store), Arc::new(MemoryAuditSink::new()))
    }

    #[test]
    fn html_has_attribution_footer_for_encumbered() {
        let html = gateway()
            .render(&RecordId::from("evidence-001"), RenderFormat::Html)
            .unwrap();

        assert!(html.contains("class=\"attribution-required\""));
        assert!(html.contains("<strong>License:</strong> CC BY 4.0"));
        assert!(html.contains(
            "<a href=\"https://lab.example.com/dataset-001\">https://lab.example.com/dataset-001</a>"
        ));
        assert!(html.contains("<strong>Creator:</strong> Jane Smith"));
        assert!(html.contains("<strong>2x</strong>"));
        assert!(html.contains("Cell migration &lt;increases&gt;"));
    }

    #[test]
    fn html_includes_grounding_with_its_own_footer() {
        let html = gateway()
            .render(&RecordId::from("evidence-001"), RenderFormat::Html)
            .unwrap();
        assert!(html.contains("data-relation=\"groundedIn\""));
        assert!(html.contains("<strong>Creator:</strong> Lab Team"));
        assert_eq!(html.matches("attribution-required").count(), 2);
    }

    #[test]
    fn unencumbered_record_has_no_footer() {
        let html = gateway()
            .render(&RecordId::from("evidence-002"), RenderFormat::Html)
            .unwrap();
        assert!(!html.contains("attribution-required"));
        assert!(!html.contains("John Doe"));

        let markdown = gateway()
            .render(&RecordId::from("evidence-002"), RenderFormat::Markdown)
            .unwrap();
        assert!(!markdown.contains("Attribution Required"));
    }

    #[test]
    fn html_nesting_is_balanced() {
        let html = gateway()
            .render(&RecordId::from("evidence-001"), RenderFormat::Html)
            .unwrap();

        assert!(html.starts_with("<div class=\"discourse-node\" data-id=\"evidence-001\""));
        assert!(html.ends_with("</div>\n"));
        assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
        assert_eq!(html.matches("<li ").count(), html.matches("</li>").count());
        assert!(html.contains("\n    <div class=\"discourse-node\" data-id=\"source-001\""));
    }

    #[test]
    fn raw_html_in_content_is_escaped() {
        let html = gateway()
            .render(&RecordId::from("evidence-002"), RenderFormat::Html)
            .unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn markdown_has_attribution_section() {
        let markdown = gateway()
            .render(&RecordId::from("evidence-001"), RenderFormat::Markdown)
            .unwrap();

        assert!(markdown.starts_with("# Cell migration <increases>\n"));
        assert!(markdown.contains("**Attribution Required**"));
        assert!(markdown.contains("- License: CC BY 4.0"));
        assert!(markdown.contains(
            "- Source: [https://lab.example.com/dataset-001](https://lab.example.com/dataset-001)"
        ));
        assert!(markdown.contains("- Creator: Jane Smith"));
        assert!(markdown.contains("*groundedIn*: **Research Dataset**"));
    }

    #[test]
    fn format_parses() {
        assert_eq!("md".parse::<RenderFormat>(), Ok(RenderFormat::Markdown));
        assert_eq!("html".parse::<RenderFormat>(), Ok(RenderFormat::Html));
        assert!("pdf".parse::<RenderFormat>().is_err());
    }
}
