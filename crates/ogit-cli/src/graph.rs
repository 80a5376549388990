//! Graphviz rendering of commit ancestry.

use ogit_dag::AncestryEdge;
use ogit_types::ObjectId;

/// A commit node with the text shown inside its box.
pub struct LogNode {
    pub id: ObjectId,
    pub summary: String,
}

/// Render nodes and edges as a `digraph ogitlog` document.
pub fn render_dot(nodes: &[LogNode], edges: &[AncestryEdge]) -> String {
    let mut out = String::from("digraph ogitlog{\n  node[shape=rect]\n");
    for node in nodes {
        out.push_str(&format!(
            "  c_{} [label=\"{}: {}\"]\n",
            node.id,
            node.id.short_hex(),
            escape_label(&node.summary)
        ));
    }
    for edge in edges {
        out.push_str(&format!("  c_{} -> c_{};\n", edge.child, edge.parent));
    }
    out.push_str("}\n");
    out
}

/// First line of a commit message, trimmed.
pub fn summary_line(message: &[u8]) -> String {
    let text = String::from_utf8_lossy(message);
    text.lines().next().unwrap_or("").trim().to_string()
}

fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
