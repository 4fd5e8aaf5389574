//! Live document elements.
use crate::{
    element::{Backend, ElementImpl, Host, HostElement, replace_in_parent},
    error::Error,
};

/// An element backed by a live host element.
pub struct DomElement<H: Host> {
    element: H::Element,
}

impl<H: Host> DomElement<H> {
    pub fn new(element: H::Element) -> Self {
        Self { element }
    }

    pub fn inner(&self) -> &H::Element {
        &self.element
    }
}

impl<H: Host> ElementImpl<H> for DomElement<H> {
    type Native = H::Element;

    fn backend(&self) -> Backend {
        Backend::Dom
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        log::trace!("set att {name} = {value}");
        self.element.set_attribute(name, value)
    }

    fn on(&self, event: &str, handler: impl FnMut(H::Event) + 'static) -> Result<(), Error> {
        log::trace!("listening for '{event}'");
        self.element.add_event_listener(event, Box::new(handler))
    }

    fn insert_before(&self, other: &H::Node, reference: Option<&H::Node>) -> Result<(), Error> {
        self.element.insert_before(other, reference)
    }

    fn remove(&self) -> Result<(), Error> {
        self.element.remove();
        Ok(())
    }

    fn replace_with(&self, other: &H::Node, parent: Option<&H::Element>) -> Result<(), Error> {
        if self.element.has_replace_with() {
            self.element.replace_with(other)
        } else {
            log::trace!("no native replaceWith, replacing through the parent");
            replace_in_parent::<H>(Backend::Dom, &self.element, other, parent)
        }
    }

    fn find(&self, selector: &str) -> Result<Option<Self>, Error> {
        Ok(self.element.query_selector(selector)?.map(DomElement::new))
    }

    fn append_child(&self, child: &H::Node) -> Result<(), Error> {
        self.element.append_child(child)
    }

    fn empty(&self) -> Result<(), Error> {
        while let Some(child) = self.element.first_child() {
            self.element.remove_child(&child)?;
        }
        Ok(())
    }

    fn get(&self) -> H::Element {
        self.element.clone()
    }
}
