//! Elements wrapped by a third party library.
use crate::{
    element::{Backend, ElementImpl, Host, HostWrapper},
    error::Error,
};

/// An element wrapped by the host's third party library (jQuery in the browser).
pub struct WrapperElement<H: Host> {
    wrapped: H::Wrapped,
}

impl<H: Host> WrapperElement<H> {
    pub fn new(wrapped: H::Wrapped) -> Self {
        Self { wrapped }
    }

    pub fn inner(&self) -> &H::Wrapped {
        &self.wrapped
    }
}

impl<H: Host> ElementImpl<H> for WrapperElement<H> {
    type Native = H::Wrapped;

    fn backend(&self) -> Backend {
        Backend::Wrapper
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        self.wrapped.attr(name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        log::trace!("set att {name} = {value}");
        self.wrapped.set_attr(name, value)
    }

    fn on(&self, event: &str, handler: impl FnMut(H::Event) + 'static) -> Result<(), Error> {
        log::trace!("listening for '{event}'");
        self.wrapped.on(event, Box::new(handler))
    }

    fn insert_before(&self, other: &H::Node, reference: Option<&H::Node>) -> Result<(), Error> {
        self.wrapped.insert_before(other, reference)
    }

    fn remove(&self) -> Result<(), Error> {
        self.wrapped.remove();
        Ok(())
    }

    /// The library always knows the parent, so `_parent` is ignored.
    fn replace_with(&self, other: &H::Node, _parent: Option<&H::Element>) -> Result<(), Error> {
        self.wrapped.replace_with(other)
    }

    fn find(&self, selector: &str) -> Result<Option<Self>, Error> {
        Ok(self.wrapped.find(selector)?.map(WrapperElement::new))
    }

    fn append_child(&self, child: &H::Node) -> Result<(), Error> {
        self.wrapped.append(child)
    }

    fn empty(&self) -> Result<(), Error> {
        self.wrapped.empty();
        Ok(())
    }

    fn get(&self) -> H::Wrapped {
        self.wrapped.clone()
    }
}
