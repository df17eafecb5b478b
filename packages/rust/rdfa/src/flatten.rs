//! One-pass RDFa flattening over a parsed HTML tree.
//!
//! Implements the RDFa 1.1 subset used by published municipal documents:
//! `about`, `resource`, `href`, `src`, `typeof`, `property`, `rel`,
//! `content`, `datatype`, and element-level `prefix` declarations. Hanging
//! `rel` chains and deeper RDFa machinery are out of scope.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, node::Element};

use besluitpub_rdf::vocab::{self, RDFS_RESOURCE};
use besluitpub_rdf::{Triple, expand_uri_with, is_uri};

/// Base IRI assigned as the root subject of a fragment. A placeholder origin:
/// snippets are relative documents without a base of their own.
pub const BASE_IRI: &str = "https://besluit-publicatie.lblod.info/";

/// Flattener state accumulated during a single tree walk.
#[derive(Default)]
pub(crate) struct Flattener {
    pub triples: Vec<Triple>,
    /// First node that introduced each (expanded) subject. Used later to
    /// target annotation directives at the right sub-document.
    pub subject_nodes: HashMap<String, NodeId>,
    bnode_counter: usize,
}

impl Flattener {
    /// Walk the fragment root and collect every emitted triple.
    pub fn run(&mut self, html: &Html) {
        let prefixes = HashMap::new();
        for child in fragment_children(html) {
            self.walk(child, BASE_IRI, &prefixes);
        }
    }

    fn walk(
        &mut self,
        node: NodeRef<'_, Node>,
        subject: &str,
        prefixes: &HashMap<String, String>,
    ) {
        let Some(element) = ElementRef::wrap(node) else {
            return;
        };
        let el = element.value();

        // Element-level prefix declarations shadow the fixed table for this
        // subtree.
        let merged;
        let prefixes = match el.attr("prefix") {
            Some(decl) => {
                merged = merge_prefixes(prefixes, decl);
                &merged
            }
            None => prefixes,
        };

        let expand = |term: &str| expand_uri_with(term, prefixes);

        let about = el.attr("about").map(|v| expand(v));
        let resource = el
            .attr("resource")
            .or_else(|| el.attr("href"))
            .or_else(|| el.attr("src"))
            .map(|v| expand(v));

        // The subject a `typeof` attribute declares types for.
        let typed_entity = el.attr("typeof").map(|_| {
            about
                .clone()
                .or_else(|| resource.clone())
                .unwrap_or_else(|| self.fresh_bnode())
        });

        if let (Some(types), Some(entity)) = (el.attr("typeof"), &typed_entity) {
            self.subject_nodes
                .entry(entity.clone())
                .or_insert_with(|| node.id());
            for type_term in types.split_whitespace() {
                self.push_resource_triple(entity.clone(), vocab::RDF_TYPE.into(), expand(type_term));
            }
        }
        if let Some(about_subject) = &about {
            self.subject_nodes
                .entry(about_subject.clone())
                .or_insert_with(|| node.id());
        }

        if let Some(properties) = el.attr("property") {
            let property_subject = about.as_deref().unwrap_or(subject);
            for property in properties.split_whitespace() {
                let predicate = expand(property);
                if let Some(content) = el.attr("content") {
                    self.triples.push(Triple {
                        subject: property_subject.into(),
                        predicate,
                        object: content.into(),
                        datatype: el.attr("datatype").map(|d| expand(d)),
                    });
                } else if let Some(object) = &resource {
                    self.push_resource_triple(property_subject.into(), predicate, object.clone());
                } else if let (None, Some(entity)) = (&about, &typed_entity) {
                    // property + typeof without an explicit object: the typed
                    // entity is the object (resource chaining).
                    self.push_resource_triple(property_subject.into(), predicate, entity.clone());
                } else {
                    let text: String = element.text().collect();
                    self.triples.push(Triple {
                        subject: property_subject.into(),
                        predicate,
                        object: text,
                        datatype: el.attr("datatype").map(|d| expand(d)),
                    });
                }
            }
        }

        if let (Some(rels), Some(object)) = (el.attr("rel"), &resource) {
            let rel_subject = about.as_deref().unwrap_or(subject);
            for rel in rels.split_whitespace() {
                self.push_resource_triple(rel_subject.into(), expand(rel), object.clone());
            }
        }

        // Descendants inherit the innermost established subject.
        let child_subject = about
            .as_deref()
            .or(resource.as_deref())
            .or(typed_entity.as_deref())
            .unwrap_or(subject);

        for child in node.children() {
            self.walk(child, child_subject, prefixes);
        }
    }

    /// Emit a triple whose object sits in IRI position. Objects that do not
    /// expand to a URI are tagged `rdfs:Resource` so preprocessing can spot
    /// blank artifacts.
    fn push_resource_triple(&mut self, subject: String, predicate: String, object: String) {
        let datatype = if is_uri(&object) || object.starts_with("_:") {
            None
        } else {
            Some(RDFS_RESOURCE.into())
        };
        self.triples.push(Triple {
            subject,
            predicate,
            object,
            datatype,
        });
    }

    fn fresh_bnode(&mut self) -> String {
        let label = format!("_:b{}", self.bnode_counter);
        self.bnode_counter += 1;
        label
    }
}

/// The content nodes of a parsed fragment.
///
/// `Html::parse_fragment` wraps the fragment in a synthetic `<html>` element;
/// walk through it when present.
pub(crate) fn fragment_children(
    html: &Html,
) -> Box<dyn Iterator<Item = NodeRef<'_, Node>> + '_> {
    let root = html.tree.root();
    let wrapper = root
        .children()
        .find(|child| child.value().as_element().is_some_and(is_html_wrapper));
    match wrapper {
        Some(wrapper) => Box::new(wrapper.children()),
        None => Box::new(root.children()),
    }
}

fn is_html_wrapper(el: &Element) -> bool {
    el.name() == "html"
}

/// Parse a `prefix="pfx: http://… pfx2: http://…"` declaration and merge it
/// over the inherited map.
fn merge_prefixes(inherited: &HashMap<String, String>, decl: &str) -> HashMap<String, String> {
    let mut merged = inherited.clone();
    let mut tokens = decl.split_whitespace();
    while let Some(token) = tokens.next() {
        if let Some(prefix) = token.strip_suffix(':') {
            if let Some(iri) = tokens.next() {
                merged.insert(prefix.to_string(), iri.to_string());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_prefix_declarations() {
        let base = HashMap::from([("ex".to_string(), "http://old.example/".to_string())]);
        let merged = merge_prefixes(&base, "ex: http://example.org/ns# foo: http://foo.example/");
        assert_eq!(merged["ex"], "http://example.org/ns#");
        assert_eq!(merged["foo"], "http://foo.example/");
    }

    #[test]
    fn ignores_malformed_prefix_tokens() {
        let merged = merge_prefixes(&HashMap::new(), "not-a-prefix");
        assert!(merged.is_empty());
    }
}
