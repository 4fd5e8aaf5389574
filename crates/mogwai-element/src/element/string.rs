//! Elements assembled as HTML text.
use std::cell::RefCell;

use crate::{
    element::{Backend, ElementImpl, Host},
    error::{Error, UnsupportedOperationSnafu},
};

/// An element that only exists as a string of HTML.
///
/// There is no tree behind it, so the only thing it can do is store attributes
/// and write them back into its markup. Every live operation fails with
/// [`Error::UnsupportedOperation`].
#[derive(Debug)]
pub struct StringElement {
    base: String,
    attributes: RefCell<Vec<(String, String)>>,
}

impl StringElement {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            attributes: Default::default(),
        }
    }

    /// The markup this element was created from.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn get_attr(&self, name: &str) -> Option<String> {
        self.attributes
            .borrow()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Set an attribute.
    ///
    /// Attributes keep the position of their first insertion.
    pub fn set_attr(&self, name: &str, value: &str) {
        let mut attributes = self.attributes.borrow_mut();
        if let Some((_, prev)) = attributes.iter_mut().find(|(key, _)| key == name) {
            *prev = value.to_owned();
        } else {
            attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    /// Render the base markup with the current attributes written into its
    /// opening tag.
    ///
    /// The opening tag ends at the first `>` outside a quoted attribute value.
    /// A base without one is treated as an unterminated opening tag and the
    /// attributes are appended to it.
    pub fn html(&self) -> String {
        let attributes = self.attributes.borrow();
        if attributes.is_empty() {
            return self.base.clone();
        }
        let atts = attributes
            .iter()
            .map(|(key, value)| format!(r#" {}="{}""#, key, escape(value)))
            .collect::<String>();

        match end_of_opening_tag(&self.base) {
            Some(index) => {
                let (head, tail) = self.base.split_at(index);
                // keep "/>" of a self closing tag together
                let (head, tail) = match head.strip_suffix('/') {
                    Some(head) => (head.trim_end(), &self.base[head.len()..]),
                    None => (head, tail),
                };
                format!("{head}{atts}{tail}")
            }
            None => {
                log::trace!("'{}' has no end of opening tag", self.base);
                format!("{}{atts}", self.base)
            }
        }
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        log::warn!("{operation} called on string element '{}'", self.base);
        UnsupportedOperationSnafu {
            backend: Backend::String,
            operation,
        }
        .build()
    }
}

/// Byte index of the `>` closing the first tag, skipping quoted values.
fn end_of_opening_tag(html: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in html.char_indices() {
        match (quote, c) {
            (None, '>') => return Some(i),
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if q == c => quote = None,
            _ => {}
        }
    }
    None
}

fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl<H: Host> ElementImpl<H> for StringElement {
    type Native = String;

    fn backend(&self) -> Backend {
        Backend::String
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        StringElement::get_attr(self, name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        StringElement::set_attr(self, name, value);
        Ok(())
    }

    fn on(&self, _: &str, _: impl FnMut(H::Event) + 'static) -> Result<(), Error> {
        Err(self.unsupported("on"))
    }

    fn insert_before(&self, _: &H::Node, _: Option<&H::Node>) -> Result<(), Error> {
        Err(self.unsupported("insert_before"))
    }

    fn remove(&self) -> Result<(), Error> {
        Err(self.unsupported("remove"))
    }

    fn replace_with(&self, _: &H::Node, _: Option<&H::Element>) -> Result<(), Error> {
        Err(self.unsupported("replace_with"))
    }

    fn find(&self, _: &str) -> Result<Option<Self>, Error> {
        Err(self.unsupported("find"))
    }

    fn append_child(&self, _: &H::Node) -> Result<(), Error> {
        Err(self.unsupported("append_child"))
    }

    fn empty(&self) -> Result<(), Error> {
        Err(self.unsupported("empty"))
    }

    fn get(&self) -> String {
        self.html()
    }
}
