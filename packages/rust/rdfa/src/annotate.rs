//! Annotation directives and their application to a parsed document.
//!
//! Annotators return a list of [`Annotation`]s — `(target subject, property,
//! value)` — instead of mutating a DOM. Application happens here, by
//! re-serializing the parsed tree and injecting `<link>` metadata nodes as
//! final children of the node that introduced the target subject.

use std::collections::HashMap;
use std::fmt::Write;

use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node};

use besluitpub_rdf::expand_uri;

use crate::flatten::fragment_children;

/// Value side of an annotation directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    /// An IRI-valued annotation (`resource` attribute).
    Resource(String),
    /// A literal annotation (`content` attribute, optionally typed).
    Literal {
        content: String,
        datatype: Option<String>,
    },
}

/// A metadata-only addition to the sub-document owned by `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Subject whose node receives the injected `<link>`.
    pub target: String,
    /// Property IRI of the injected statement.
    pub property: String,
    pub value: AnnotationValue,
}

impl Annotation {
    pub fn resource(
        target: impl Into<String>,
        property: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            value: AnnotationValue::Resource(resource.into()),
        }
    }

    pub fn literal(
        target: impl Into<String>,
        property: impl Into<String>,
        content: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            value: AnnotationValue::Literal {
                content: content.into(),
                datatype: Some(datatype.into()),
            },
        }
    }

    fn render(&self) -> String {
        match &self.value {
            AnnotationValue::Resource(resource) => format!(
                "<link property=\"{}\" resource=\"{}\">",
                escape_attr(&self.property),
                escape_attr(resource)
            ),
            AnnotationValue::Literal { content, datatype } => {
                let mut link = format!(
                    "<link property=\"{}\" content=\"{}\"",
                    escape_attr(&self.property),
                    escape_attr(content)
                );
                if let Some(datatype) = datatype {
                    let _ = write!(link, " datatype=\"{}\"", escape_attr(datatype));
                }
                link.push('>');
                link
            }
        }
    }
}

/// Serialize the fragment back to HTML with annotations injected.
///
/// `subject_nodes` maps expanded subjects to the node that introduced them;
/// a directive whose subject has no node is logged and skipped.
pub(crate) fn serialize_annotated(
    html: &Html,
    subject_nodes: &HashMap<String, NodeId>,
    annotations: &[Annotation],
) -> String {
    let mut per_node: HashMap<NodeId, Vec<&Annotation>> = HashMap::new();
    for annotation in annotations {
        let subject = expand_uri(&annotation.target);
        match subject_nodes.get(&subject) {
            Some(node_id) => per_node.entry(*node_id).or_default().push(annotation),
            None => {
                tracing::warn!(
                    subject = %annotation.target,
                    property = %annotation.property,
                    "no node found for annotation target, skipping"
                );
            }
        }
    }

    let mut out = String::new();
    for child in fragment_children(html) {
        write_node(&mut out, child, &per_node);
    }
    out
}

fn write_node(out: &mut String, node: NodeRef<'_, Node>, per_node: &HashMap<NodeId, Vec<&Annotation>>) {
    match node.value() {
        Node::Element(el) => {
            out.push('<');
            out.push_str(el.name());
            for (name, value) in el.attrs() {
                let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
            }
            out.push('>');

            if is_void_element(el.name()) {
                // Void elements cannot hold children; injected links become
                // following siblings instead.
                write_annotations(out, node.id(), per_node);
                return;
            }

            for child in node.children() {
                write_node(out, child, per_node);
            }
            write_annotations(out, node.id(), per_node);

            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        Node::Text(text) => out.push_str(&escape_text(&text)),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{}-->", &**comment);
        }
        _ => {}
    }
}

fn write_annotations(out: &mut String, id: NodeId, per_node: &HashMap<NodeId, Vec<&Annotation>>) {
    if let Some(annotations) = per_node.get(&id) {
        for annotation in annotations {
            out.push_str(&annotation.render());
        }
    }
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
