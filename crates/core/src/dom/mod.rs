use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::collections::HashMap;

/// A node in our DOM tree. Minimal — only what field inference needs.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    Element,
    Text,
    Document,
}

/// Tags whose children carry no submittable markup.
const OPAQUE_TAGS: &[&str] = &["script", "style", "svg", "path"];

impl DomNode {
    fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
            node_type: NodeType::Element,
        }
    }

    fn text_node(text: &str) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: text.to_string(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    fn document() -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
            node_type: NodeType::Document,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// The whitespace-normalized text content of this node and all children.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        if self.node_type == NodeType::Text {
            let trimmed = self.text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
            return;
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }
}

/// Parse an HTML string into a DomNode tree.
pub fn parse_html(html: &str) -> DomNode {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .expect("failed to parse HTML");

    convert_node(&dom.document)
}

fn convert_node(handle: &Handle) -> DomNode {
    match &handle.data {
        NodeData::Document => {
            let mut doc = DomNode::document();
            for child in handle.children.borrow().iter() {
                doc.children.push(convert_node(child));
            }
            doc
        }
        NodeData::Element { name, attrs, .. } => {
            let mut node = DomNode::element(&name.local);
            for attr in attrs.borrow().iter() {
                node.attributes
                    .insert(attr.name.local.to_string(), attr.value.to_string());
            }
            // Keep attributes but drop the subtree of script/style/svg content.
            if OPAQUE_TAGS.contains(&node.tag.as_str()) {
                return node;
            }
            for child in handle.children.borrow().iter() {
                let child_node = convert_node(child);
                if child_node.node_type == NodeType::Text && child_node.text.trim().is_empty() {
                    continue;
                }
                node.children.push(child_node);
            }
            node
        }
        NodeData::Text { contents } => DomNode::text_node(&contents.borrow()),
        // Comments, PIs, doctypes — ignored
        _ => DomNode::document(),
    }
}

/// Depth-first walk over element nodes. `visit` also receives the ancestor
/// chain of the visited node, root first.
pub fn walk_elements<'a>(root: &'a DomNode, visit: &mut dyn FnMut(&'a DomNode, &[&'a DomNode])) {
    fn go<'a>(
        node: &'a DomNode,
        ancestors: &mut Vec<&'a DomNode>,
        visit: &mut dyn FnMut(&'a DomNode, &[&'a DomNode]),
    ) {
        if node.node_type == NodeType::Element {
            visit(node, ancestors);
        }
        ancestors.push(node);
        for child in &node.children {
            go(child, ancestors, visit);
        }
        ancestors.pop();
    }

    let mut ancestors = Vec::new();
    go(root, &mut ancestors, visit);
}

/// The first non-empty text node under `node`, in document order.
pub fn first_text(node: &DomNode) -> Option<String> {
    if node.node_type == NodeType::Text {
        let trimmed = node.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(trimmed.to_string());
    }
    node.children.iter().find_map(first_text)
}
