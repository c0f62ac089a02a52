//! Graphviz DOT exporter
//!
//! Classes become HTML-table nodes. Generalization trees with more than one
//! class are drawn inside a gray cluster, with classes of equal depth on the
//! same rank.

use anyhow::Result;
use std::fmt::Write;

use super::database::{AttributeStyle, ClassNode, DiagramDatabase, NodeGroup, RelationshipEdge};
use crate::core::{Exporter, LinkType};

/// DOT source exporter
pub struct GraphvizExporter {
    font: String,
    node_font_size: u32,
    edge_font_size: u32,
}

impl GraphvizExporter {
    pub fn new() -> Self {
        Self {
            font: "Arial".to_string(),
            node_font_size: 8,
            edge_font_size: 6,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    fn write_node(&self, out: &mut String, class: &ClassNode, indent: &str) -> Result<()> {
        writeln!(out, "{}{} [label=<{}>];", indent, quote(&class.name), node_table(class))?;
        Ok(())
    }

    fn write_edge(&self, out: &mut String, edge: &RelationshipEdge) -> Result<()> {
        let attrs = match edge.link_type {
            LinkType::Generalization => "dir=back, arrowtail=empty".to_string(),
            LinkType::Realization => "arrowhead=empty, style=dotted".to_string(),
            other => {
                let tail = match other {
                    LinkType::Composition => "diamond",
                    LinkType::Aggregation => "odiamond",
                    _ => "none",
                };
                format!(
                    "dir=both, arrowhead=none, arrowtail={}, headlabel={}, taillabel={}",
                    tail,
                    quote(&edge.head_label),
                    quote(&edge.tail_label)
                )
            }
        };
        writeln!(out, "  {} -> {} [{}];", quote(&edge.source), quote(&edge.target), attrs)?;
        Ok(())
    }
}

impl Default for GraphvizExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter<DiagramDatabase> for GraphvizExporter {
    type Output = String;

    fn export(&self, database: &DiagramDatabase) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "digraph {} {{", quote(database.application()))?;
        writeln!(out, "  rankdir=TB;")?;
        writeln!(out, "  splines=false;")?;
        writeln!(out, "  nodesep=0.6;")?;
        writeln!(
            out,
            "  node [shape=plaintext, fontsize={}, fontname={}];",
            self.node_font_size,
            quote(&self.font)
        )?;
        writeln!(
            out,
            "  edge [fontsize={}, fontname={}];",
            self.edge_font_size,
            quote(&self.font)
        )?;

        for group in database.groups() {
            match group {
                NodeGroup::Single(class) => self.write_node(&mut out, class, "  ")?,
                NodeGroup::Cluster { root, ranks } => {
                    writeln!(out, "  subgraph {} {{", quote(&format!("cluster{}", root)))?;
                    writeln!(out, "    color=gray;")?;
                    for (depth, classes) in ranks {
                        writeln!(out, "    subgraph {} {{", quote(&format!("{}({})", root, depth)))?;
                        writeln!(out, "      rank=same;")?;
                        for class in classes {
                            self.write_node(&mut out, class, "      ")?;
                        }
                        writeln!(out, "    }}")?;
                    }
                    writeln!(out, "  }}")?;
                }
            }
        }

        for edge in database.relationships() {
            self.write_edge(&mut out, edge)?;
        }
        writeln!(out, "}}")?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn format(&self) -> &'static str {
        "dot"
    }
}

/// HTML-like label: class name over the attribute compartment
fn node_table(class: &ClassNode) -> String {
    let name = escape_html(&class.name);
    let title = if class.is_virtual {
        format!("&laquo;interface&raquo;<BR/><I>{}</I>", name)
    } else if class.is_abstract {
        format!("<I>{}</I>", name)
    } else {
        name
    };

    let mut rows = format!(
        "<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\"><TR><TD>{}</TD></TR>",
        title
    );
    let lines: Vec<String> = class
        .attributes
        .iter()
        .map(|a| {
            let label = escape_html(&a.label);
            match a.style {
                AttributeStyle::PrimaryKey => format!("<U>{}</U>", label),
                AttributeStyle::ForeignKey => format!("<I>{}</I>", label),
                AttributeStyle::Plain => label,
            }
        })
        .collect();
    rows.push_str(&compartment(&lines));
    if !class.operations.is_empty() {
        let operations: Vec<String> = class.operations.iter().map(|o| escape_html(o)).collect();
        rows.push_str(&compartment(&operations));
    }
    rows.push_str("</TABLE>");
    rows
}

fn compartment(lines: &[String]) -> String {
    if lines.is_empty() {
        return "<TR><TD> </TD></TR>".to_string();
    }
    format!("<TR><TD ALIGN=\"LEFT\" BALIGN=\"LEFT\">{}</TD></TR>", lines.join("<BR/>"))
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    fn library() -> DiagramDatabase {
        let mut db = DiagramDatabase::new("Library");
        db.add_node(
            ClassNode::new("Author")
                .with_attribute("- id : integer", AttributeStyle::PrimaryKey)
                .with_attribute("- name : string", AttributeStyle::Plain),
        )
        .unwrap();
        db.add_node(
            ClassNode::new("Book")
                .with_attribute("- id : integer", AttributeStyle::PrimaryKey)
                .with_attribute("- author_id : integer", AttributeStyle::ForeignKey),
        )
        .unwrap();
        db.add_edge(
            RelationshipEdge::new("Author", "Book", LinkType::Association)
                .with_labels("0..* books", "1 author"),
        )
        .unwrap();
        db
    }

    #[test]
    fn test_export_header_and_nodes() {
        let output = GraphvizExporter::new().export(&library()).unwrap();
        assert!(output.starts_with("digraph \"Library\" {"));
        assert!(output.contains("node [shape=plaintext, fontsize=8, fontname=\"Arial\"]"));
        assert!(output.contains("<U>- id : integer</U><BR/>- name : string"));
        assert!(output.contains("<I>- author_id : integer</I>"));
        assert!(output.trim_end().ends_with('}'));
    }

    #[test]
    fn test_association_edge_labels() {
        let output = GraphvizExporter::new().export(&library()).unwrap();
        assert!(output.contains(
            "\"Author\" -> \"Book\" [dir=both, arrowhead=none, arrowtail=none, headlabel=\"0..* books\", taillabel=\"1 author\"];"
        ));
    }

    #[test]
    fn test_structural_edges() {
        let mut db = DiagramDatabase::new("Shop");
        db.add_node(ClassNode::new("Product")).unwrap();
        db.add_node(ClassNode::new("Book").with_root("Product", 1)).unwrap();
        db.add_edge(RelationshipEdge::new("Product", "Book", LinkType::Generalization))
            .unwrap();
        db.add_edge(RelationshipEdge::new("Book", "Sellable", LinkType::Realization))
            .unwrap();

        let output = GraphvizExporter::new().export(&db).unwrap();
        assert!(output.contains("\"Product\" -> \"Book\" [dir=back, arrowtail=empty];"));
        assert!(output.contains("\"Book\" -> \"Sellable\" [arrowhead=empty, style=dotted];"));
        assert!(output.contains("subgraph \"clusterProduct\" {"));
        assert!(output.contains("subgraph \"Product(1)\" {"));
        assert!(output.contains("rank=same;"));
    }

    #[test]
    fn test_composition_tail() {
        let mut db = DiagramDatabase::new("Library");
        db.add_edge(RelationshipEdge::new("Author", "Book", LinkType::Composition))
            .unwrap();
        let output = GraphvizExporter::new().export(&db).unwrap();
        assert!(output.contains("arrowtail=diamond"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_virtual_and_abstract_titles() {
        let mut node = ClassNode::new("Commentable");
        node.is_virtual = true;
        assert!(node_table(&node).contains("&laquo;interface&raquo;<BR/><I>Commentable</I>"));
        let mut node = ClassNode::new("Base");
        node.is_abstract = true;
        assert!(node_table(&node).contains("<TD><I>Base</I></TD>"));
    }
}
