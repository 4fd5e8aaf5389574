//! An in-memory host for exercising the live backends without a browser.
//!
//! The selector dialects are deliberately small. Elements understand `tag`,
//! `#id` and `.class` (and combinations like `li.item`), the same as the native
//! subset. The wrapper additionally understands a trailing `:first`, the way
//! jQuery extends its selectors.
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use snafu::OptionExt;

use crate::{
    element::{Backend, Handler, Host, HostDocument, HostElement, HostWrapper},
    error::{Error, HostSnafu, InvalidSelectorSnafu},
};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Memory;

impl Host for Memory {
    type Node = MemoryNode;
    type Element = MemoryNode;
    type Wrapped = MemoryWrapper;
    type Event = String;
}

enum Kind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

struct NodeData {
    kind: Kind,
    children: Vec<MemoryNode>,
    parent: Weak<RefCell<NodeData>>,
    listeners: Vec<(String, Handler<Memory>)>,
    native_replace: bool,
}

#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl MemoryNode {
    fn new(kind: Kind) -> Self {
        MemoryNode(Rc::new(RefCell::new(NodeData {
            kind,
            children: vec![],
            parent: Weak::new(),
            listeners: vec![],
            native_replace: true,
        })))
    }

    pub fn element(tag: &str) -> Self {
        Self::new(Kind::Element {
            tag: tag.to_owned(),
            attributes: vec![],
        })
    }

    pub fn text(text: &str) -> Self {
        Self::new(Kind::Text(text.to_owned()))
    }

    /// Pretend to be a host without `replaceWith`.
    pub fn without_native_replace(self) -> Self {
        self.0.borrow_mut().native_replace = false;
        self
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    /// Fire an event, returning how many handlers ran.
    pub fn dispatch(&self, event: &str) -> usize {
        let mut listeners = std::mem::take(&mut self.0.borrow_mut().listeners);
        let mut fired = 0;
        for (name, handler) in listeners.iter_mut() {
            if name == event {
                handler(event.to_owned());
                fired += 1;
            }
        }
        let mut data = self.0.borrow_mut();
        listeners.append(&mut data.listeners);
        data.listeners = listeners;
        fired
    }

    pub fn html(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            Kind::Text(text) => text.clone(),
            Kind::Element { tag, attributes } => {
                let atts = attributes
                    .iter()
                    .map(|(k, v)| format!(r#" {k}="{v}""#))
                    .collect::<String>();
                let kids = data
                    .children
                    .iter()
                    .map(MemoryNode::html)
                    .collect::<String>();
                format!("<{tag}{atts}>{kids}</{tag}>")
            }
        }
    }

    fn index_of(&self, child: &MemoryNode) -> Option<usize> {
        self.0.borrow().children.iter().position(|c| c == child)
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| c != self);
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn insert_at(&self, index: usize, node: &MemoryNode) {
        node.detach();
        node.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.insert(index, node.clone());
    }

    fn descendants(&self) -> Vec<MemoryNode> {
        let mut found = vec![];
        for child in self.0.borrow().children.iter() {
            found.push(child.clone());
            found.extend(child.descendants());
        }
        found
    }

    fn matches(&self, selector: &str) -> bool {
        let data = self.0.borrow();
        let Kind::Element { tag, attributes } = &data.kind else {
            return false;
        };
        let attr = |name: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let start = selector.find(['#', '.']).unwrap_or(selector.len());
        let (tag_part, mut rest) = selector.split_at(start);
        if !tag_part.is_empty() && tag_part != tag {
            return false;
        }
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            let matched = match marker {
                '#' => attr("id") == Some(name),
                _ => attr("class").is_some_and(|class| class.split_whitespace().any(|c| c == name)),
            };
            if !matched {
                return false;
            }
            rest = &body[end..];
        }
        true
    }
}

fn check_selector(backend: Backend, selector: &str) -> Result<(), Error> {
    let valid = !selector.is_empty()
        && selector
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "#.-_".contains(c));
    snafu::ensure!(
        valid,
        InvalidSelectorSnafu {
            backend,
            selector,
            message: "unsupported selector syntax",
        }
    );
    Ok(())
}

impl HostElement<Memory> for MemoryNode {
    fn as_node(&self) -> MemoryNode {
        self.clone()
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            Kind::Text(_) => None,
        }
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        match &mut self.0.borrow_mut().kind {
            Kind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| k == name) {
                    Some((_, prev)) => *prev = value.to_owned(),
                    None => attributes.push((name.to_owned(), value.to_owned())),
                }
                Ok(())
            }
            Kind::Text(_) => HostSnafu {
                operation: "setAttribute",
                message: "text nodes have no attributes",
            }
            .fail(),
        }
    }

    fn add_event_listener(&self, event: &str, handler: Handler<Memory>) -> Result<(), Error> {
        self.0
            .borrow_mut()
            .listeners
            .push((event.to_owned(), handler));
        Ok(())
    }

    fn insert_before(&self, node: &MemoryNode, reference: Option<&MemoryNode>) -> Result<(), Error> {
        let Some(reference) = reference else {
            return self.append_child(node);
        };
        if node == reference {
            return Ok(());
        }
        node.detach();
        let index = self.index_of(reference).context(HostSnafu {
            operation: "insertBefore",
            message: "reference is not a child",
        })?;
        self.insert_at(index, node);
        Ok(())
    }

    fn remove(&self) {
        self.detach();
    }

    fn has_replace_with(&self) -> bool {
        self.0.borrow().native_replace
    }

    fn replace_with(&self, node: &MemoryNode) -> Result<(), Error> {
        match self.parent() {
            Some(parent) => parent.replace_child(node, self),
            None => Ok(()),
        }
    }

    fn replace_child(&self, node: &MemoryNode, old: &MemoryNode) -> Result<(), Error> {
        if node == old {
            return Ok(());
        }
        node.detach();
        let index = self.index_of(old).context(HostSnafu {
            operation: "replaceChild",
            message: "old node is not a child",
        })?;
        old.detach();
        self.insert_at(index, node);
        Ok(())
    }

    fn query_selector(&self, selector: &str) -> Result<Option<MemoryNode>, Error> {
        check_selector(Backend::Dom, selector)?;
        Ok(self.descendants().into_iter().find(|n| n.matches(selector)))
    }

    fn append_child(&self, child: &MemoryNode) -> Result<(), Error> {
        child.detach();
        let len = self.0.borrow().children.len();
        self.insert_at(len, child);
        Ok(())
    }

    fn first_child(&self) -> Option<MemoryNode> {
        self.0.borrow().children.first().cloned()
    }

    fn remove_child(&self, child: &MemoryNode) -> Result<(), Error> {
        self.index_of(child).context(HostSnafu {
            operation: "removeChild",
            message: "not a child",
        })?;
        child.detach();
        Ok(())
    }
}

/// A jQuery-like set of nodes.
#[derive(Clone)]
pub struct MemoryWrapper {
    nodes: Vec<MemoryNode>,
}

impl MemoryWrapper {
    pub fn new(node: MemoryNode) -> Self {
        Self::from_nodes(vec![node])
    }

    pub fn from_nodes(nodes: Vec<MemoryNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[MemoryNode] {
        &self.nodes
    }
}

impl HostWrapper<Memory> for MemoryWrapper {
    fn attr(&self, name: &str) -> Option<String> {
        self.nodes.first()?.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        for node in self.nodes.iter() {
            node.set_attribute(name, value)?;
        }
        Ok(())
    }

    fn on(&self, event: &str, handler: Handler<Memory>) -> Result<(), Error> {
        let handler = Rc::new(RefCell::new(handler));
        for node in self.nodes.iter() {
            let handler = handler.clone();
            node.add_event_listener(
                event,
                Box::new(move |ev: String| (*handler.borrow_mut())(ev)),
            )?;
        }
        Ok(())
    }

    fn insert_before(&self, node: &MemoryNode, reference: Option<&MemoryNode>) -> Result<(), Error> {
        match reference {
            Some(reference) => match reference.parent() {
                Some(parent) => parent.insert_before(node, Some(reference)),
                None => Ok(()),
            },
            None => self.append(node),
        }
    }

    fn remove(&self) {
        for node in self.nodes.iter() {
            node.detach();
        }
    }

    fn replace_with(&self, node: &MemoryNode) -> Result<(), Error> {
        match self.nodes.first() {
            Some(first) => first.replace_with(node),
            None => Ok(()),
        }
    }

    fn find(&self, selector: &str) -> Result<Option<Self>, Error> {
        let (selector, first_only) = match selector.strip_suffix(":first") {
            Some(selector) => (selector, true),
            None => (selector, false),
        };
        check_selector(Backend::Wrapper, selector)?;
        let mut found = self
            .nodes
            .iter()
            .flat_map(MemoryNode::descendants)
            .filter(|n| n.matches(selector))
            .collect::<Vec<_>>();
        if first_only {
            found.truncate(1);
        }
        Ok((!found.is_empty()).then(|| MemoryWrapper::from_nodes(found)))
    }

    fn append(&self, child: &MemoryNode) -> Result<(), Error> {
        match self.nodes.first() {
            Some(first) => first.append_child(child),
            None => Ok(()),
        }
    }

    fn empty(&self) {
        for node in self.nodes.iter() {
            while let Some(child) = node.first_child() {
                child.detach();
            }
        }
    }
}

/// A document whose "parser" only recognizes the leading tag of a fragment.
#[derive(Default)]
pub struct MemoryDocument {
    parsed: RefCell<Vec<String>>,
}

impl MemoryDocument {
    /// Every fragment handed to the parser, in order.
    pub fn parsed(&self) -> Vec<String> {
        self.parsed.borrow().clone()
    }
}

impl HostDocument<Memory> for MemoryDocument {
    fn parse_html(&self, html: &str) -> Result<Option<MemoryNode>, Error> {
        self.parsed.borrow_mut().push(html.to_owned());
        if html.is_empty() {
            return Ok(None);
        }
        Ok(Some(match html.strip_prefix('<') {
            Some(rest) => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                    .unwrap_or(rest.len());
                MemoryNode::element(&rest[..end])
            }
            None => MemoryNode::text(html),
        }))
    }

    fn create_text_node(&self, text: &str) -> MemoryNode {
        MemoryNode::text(text)
    }
}
