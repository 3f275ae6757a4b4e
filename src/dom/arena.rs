//! Arena-allocated DOM for the corpus files.
//!
//! Nodes live in one contiguous vector and link to each other by index. The
//! tree is built once by the html5ever sink and is never mutated afterwards;
//! every extraction pass reads it through [`ArenaNodeId`]s, so the same
//! document can be scanned by several passes in any order.

use std::collections::{HashMap, HashSet};

use html5ever::QualName;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel for "no node".
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    fn option(self) -> Option<ArenaNodeId> {
        self.is_some().then_some(self)
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// `id` attribute, pulled out at creation time.
        id: Option<String>,
        /// `class` attribute split on whitespace.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
    /// First element carrying each `id` attribute.
    id_map: HashMap<String, ArenaNodeId>,
}

impl ArenaDom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ------------------------------------------------------------------
    // Construction (used by the tree sink)
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let mut id = None;
        let mut classes = Vec::new();
        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => {
                    classes = attr.value.split_whitespace().map(str::to_string).collect();
                }
                _ => {}
            }
        }

        let node_id = self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));
        if let Some(id_str) = id {
            self.id_map.entry(id_str).or_insert(node_id);
        }
        node_id
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last = self.last_child(parent).unwrap_or(ArenaNodeId::NONE);

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = ArenaNodeId::NONE;
        }
        if let Some(last_node) = self.get_mut(last) {
            last_node.next_sibling = child;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let Some((parent, prev)) = self.get(sibling).map(|n| (n.parent, n.prev_sibling)) else {
            return;
        };

        if let Some(node) = self.get_mut(new_node) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = sibling;
        }
        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }
        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to `parent`, merging into a trailing text node if present.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last = self.last_child(parent).unwrap_or(ArenaNodeId::NONE);
        if let Some(node) = self.get_mut(last)
            && let ArenaNodeData::Text(existing) = &mut node.data
        {
            existing.push_str(text);
            return;
        }
        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let Some((parent, prev, next)) = self
            .get(target)
            .map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return;
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Move every child of `node` to the end of `new_parent`.
    pub fn reparent_children(&mut self, node: ArenaNodeId, new_parent: ArenaNodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.detach(child);
            self.append(new_parent, child);
        }
    }

    /// Copy attributes onto an element unless an attribute of that name exists.
    pub fn add_attrs_if_missing(&mut self, target: ArenaNodeId, extra: Vec<Attribute>) {
        if let Some(node) = self.get_mut(target)
            && let ArenaNodeData::Element { attrs, .. } = &mut node.data
        {
            for attr in extra {
                if !attrs.iter().any(|a| a.name == attr.name) {
                    attrs.push(attr);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.parent.option())
    }

    pub fn first_child(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.first_child.option())
    }

    pub fn last_child(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.last_child.option())
    }

    pub fn next_sibling(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.next_sibling.option())
    }

    pub fn prev_sibling(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).and_then(|n| n.prev_sibling.option())
    }

    /// Next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sib) = current {
            if self.is_element(sib) {
                return Some(sib);
            }
            current = self.next_sibling(sib);
        }
        None
    }

    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        ChildrenIter {
            dom: self,
            current: self.first_child(parent).unwrap_or(ArenaNodeId::NONE),
        }
    }

    /// Ancestors from the parent upwards, ending with the document.
    pub fn ancestors(&self, id: ArenaNodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            current: self.parent(id).unwrap_or(ArenaNodeId::NONE),
        }
    }

    /// Nearest ancestor (excluding `id`) accepted by `predicate`.
    pub fn find_ancestor<F>(&self, id: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(ArenaNodeId) -> bool,
    {
        self.ancestors(id).find(|&a| predicate(a))
    }

    /// All nodes below `root` in document order, `root` excluded.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            root,
            next: self.first_child(root).unwrap_or(ArenaNodeId::NONE),
            pruned: None,
        }
    }

    /// Like [`descendants`](Self::descendants), but whole subtrees rooted at
    /// a node in `pruned` are skipped.
    pub fn descendants_pruned<'a>(
        &'a self,
        root: ArenaNodeId,
        pruned: &'a HashSet<ArenaNodeId>,
    ) -> Descendants<'a> {
        Descendants {
            dom: self,
            root,
            next: self.first_child(root).unwrap_or(ArenaNodeId::NONE),
            pruned: Some(pruned),
        }
    }

    /// Every node after the subtree of `id` in document order.
    pub fn following(&self, id: ArenaNodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            root: self.document,
            next: self.advance(id, self.document, false),
            pruned: None,
        }
    }

    /// Pre-order successor of `id` inside `root`. With `enter == false` the
    /// children of `id` are skipped.
    fn advance(&self, id: ArenaNodeId, root: ArenaNodeId, enter: bool) -> ArenaNodeId {
        if enter && let Some(child) = self.first_child(id) {
            return child;
        }
        let mut current = id;
        while current != root {
            if let Some(sib) = self.next_sibling(current) {
                return sib;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => break,
            }
        }
        ArenaNodeId::NONE
    }

    /// True if `id` is `ancestor` or lies inside it.
    pub fn is_inclusive_descendant(&self, id: ArenaNodeId, ancestor: ArenaNodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// First element with the given `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        self.id_map.get(id).copied()
    }

    /// First node (document order) accepted by `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(ArenaNodeId) -> bool,
    {
        self.descendants(self.document).find(|&id| predicate(id))
    }

    /// Every element named `tag` below `root`, in document order.
    pub fn find_all_tags(&self, root: ArenaNodeId, tag: &str) -> Vec<ArenaNodeId> {
        self.descendants(root)
            .filter(|&id| self.is_tag(id, tag))
            .collect()
    }

    // ------------------------------------------------------------------
    // Node inspection
    // ------------------------------------------------------------------

    /// Local tag name of an element.
    pub fn tag_name(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        })
    }

    pub fn is_tag(&self, id: ArenaNodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// The element's `id` attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    pub fn has_class(&self, id: ArenaNodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    pub fn is_text(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Text(_)))
    }

    /// Content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of `root` and everything below it, markup dropped.
    pub fn plain_text(&self, root: ArenaNodeId) -> String {
        if let Some(text) = self.text_content(root) {
            return text.to_string();
        }
        let mut out = String::new();
        for id in self.descendants(root) {
            if let Some(text) = self.text_content(id) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current.option()?;
        self.current = self.dom.next_sibling(id).unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

pub struct Ancestors<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current.option()?;
        self.current = self.dom.parent(id).unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Pre-order walk bounded by a root node.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    root: ArenaNodeId,
    next: ArenaNodeId,
    pruned: Option<&'a HashSet<ArenaNodeId>>,
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next.option()?;
            if self.pruned.is_some_and(|p| p.contains(&current)) {
                self.next = self.dom.advance(current, self.root, false);
                continue;
            }
            self.next = self.dom.advance(current, self.root, true);
            return Some(current);
        }
    }
}
