//! Backend-agnostic element handles.
//!
//! An [`Element`] is a handle around exactly one of:
//! * an HTML string under construction ([`StringElement`]),
//! * a live host element ([`DomElement`]),
//! * a host element wrapped by a third party library like jQuery ([`WrapperElement`]).
//!
//! All of them implement [`ElementImpl`], so code that builds views can manipulate
//! "an element" without caring which one it holds. Operations a backend cannot
//! perform return [`Error::UnsupportedOperation`] instead of quietly doing nothing.
//!
//! The platform itself is described by a [`Host`]. Hosts hand their document and
//! wrapper library to the handles explicitly, so nothing here reaches for a global
//! `document` or `$`.
use std::any::Any;

use snafu::OptionExt;

use crate::error::{Error, NoParentSnafu, UnknownElementTypeSnafu};

mod dom;
#[cfg(test)]
pub(crate) mod memory;
mod string;
mod wrapper;

pub use dom::DomElement;
pub use string::StringElement;
pub use wrapper::WrapperElement;

/// Names the backend behind a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// HTML assembled as text.
    String,
    /// A live document node.
    Dom,
    /// A node wrapped by a third party library.
    Wrapper,
}

impl core::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Backend::String => "string",
            Backend::Dom => "DOM",
            Backend::Wrapper => "wrapper",
        })
    }
}

/// A platform that live handles can run on.
///
/// **Node** - any node that can be inserted into an element, including text nodes.
/// **Element** - an element that a [`DomElement`] can wrap.
/// **Wrapped** - an element wrapped by the platform's third party library.
/// **Event** - what event handlers receive.
pub trait Host: Sized + 'static {
    type Node: Clone + 'static;
    type Element: HostElement<Self> + 'static;
    type Wrapped: HostWrapper<Self> + 'static;
    type Event: 'static;
}

/// A boxed event handler.
pub type Handler<H> = Box<dyn FnMut(<H as Host>::Event)>;

/// Native operations of a live host element.
///
/// These are the raw platform calls that [`DomElement`] is written against.
pub trait HostElement<H: Host>: Clone {
    fn as_node(&self) -> H::Node;
    fn get_attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error>;
    fn add_event_listener(&self, event: &str, handler: Handler<H>) -> Result<(), Error>;
    /// Insert `node` before `reference`, or at the end when there is no reference.
    fn insert_before(&self, node: &H::Node, reference: Option<&H::Node>) -> Result<(), Error>;
    fn remove(&self);
    /// Whether the host offers a native `replaceWith`.
    fn has_replace_with(&self) -> bool;
    fn replace_with(&self, node: &H::Node) -> Result<(), Error>;
    /// Replace the child `old` of this element with `node`.
    fn replace_child(&self, node: &H::Node, old: &H::Node) -> Result<(), Error>;
    fn query_selector(&self, selector: &str) -> Result<Option<H::Element>, Error>;
    fn append_child(&self, child: &H::Node) -> Result<(), Error>;
    fn first_child(&self) -> Option<H::Node>;
    fn remove_child(&self, child: &H::Node) -> Result<(), Error>;
}

/// Operations of a node wrapped by a third party library.
///
/// Node arguments are raw host nodes. Implementations wrap them with the library's
/// entry point, which they carry themselves.
pub trait HostWrapper<H: Host>: Clone {
    fn attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error>;
    fn on(&self, event: &str, handler: Handler<H>) -> Result<(), Error>;
    fn insert_before(&self, node: &H::Node, reference: Option<&H::Node>) -> Result<(), Error>;
    fn remove(&self);
    fn replace_with(&self, node: &H::Node) -> Result<(), Error>;
    /// Find descendants, returning `None` when nothing matched.
    fn find(&self, selector: &str) -> Result<Option<Self>, Error>;
    fn append(&self, child: &H::Node) -> Result<(), Error>;
    fn empty(&self);
}

/// A host's document, used to create raw nodes.
pub trait HostDocument<H: Host> {
    /// Parse an HTML fragment, returning its first node.
    fn parse_html(&self, html: &str) -> Result<Option<H::Node>, Error>;
    fn create_text_node(&self, text: &str) -> H::Node;
}

/// Create a raw node from the first node of the given HTML.
///
/// The HTML is trimmed before it is handed to the host's parser, so leading
/// whitespace doesn't become the first (text) node. Returns `None` if the
/// fragment parsed to nothing.
///
/// Wrap the result with [`element`] to get a handle.
pub fn create_html<H: Host>(
    document: &impl HostDocument<H>,
    html: &str,
) -> Result<Option<H::Node>, Error> {
    let html = html.trim();
    log::trace!("creating html from {} bytes", html.len());
    document.parse_html(html)
}

/// Create a raw text node.
pub fn create_text<H: Host>(document: &impl HostDocument<H>, text: &str) -> H::Node {
    document.create_text_node(text)
}

/// The capability contract shared by every backend.
///
/// Operations that a backend cannot support are still implemented by it, as
/// explicit failures.
pub trait ElementImpl<H: Host>: Sized {
    /// The backend's underlying value, as returned by [`ElementImpl::get`].
    type Native;

    fn backend(&self) -> Backend;

    fn get_attr(&self, name: &str) -> Option<String>;

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error>;

    /// Get the attribute when `value` is `None`, otherwise set it.
    ///
    /// `Some("")` sets the attribute to the empty string. Setting returns `Ok(None)`.
    fn attr(&self, name: &str, value: Option<&str>) -> Result<Option<String>, Error> {
        match value {
            Some(value) => {
                self.set_attr(name, value)?;
                Ok(None)
            }
            None => Ok(self.get_attr(name)),
        }
    }

    fn class_name(&self) -> Option<String> {
        self.get_attr("class")
    }

    fn set_class_name(&self, value: &str) -> Result<(), Error> {
        self.set_attr("class", value)
    }

    /// Register `handler` for future firings of `event`.
    fn on(&self, event: &str, handler: impl FnMut(H::Event) + 'static) -> Result<(), Error>;

    /// Insert `other` immediately before `reference` inside this element.
    fn insert_before(&self, other: &H::Node, reference: Option<&H::Node>) -> Result<(), Error>;

    /// Detach this element from its parent. Detached elements are left alone.
    fn remove(&self) -> Result<(), Error>;

    /// Replace this element with `other`.
    ///
    /// `parent` is only consulted by backends without a native replace.
    fn replace_with(&self, other: &H::Node, parent: Option<&H::Element>) -> Result<(), Error>;

    /// Find descendants matching `selector`, or `None` if nothing matches.
    ///
    /// The DOM backend returns the first matching descendant. The wrapper backend
    /// returns its library's whole match set, so `li` finds every `li`; narrow it
    /// in the selector (`li:first` for jQuery) to get only the first.
    ///
    /// Selector dialects differ between backends as well: the DOM backend takes
    /// native query selectors, the wrapper backend its library's dialect. Don't
    /// rely on either one's extensions.
    fn find(&self, selector: &str) -> Result<Option<Self>, Error>;

    fn append_child(&self, child: &H::Node) -> Result<(), Error>;

    /// Remove all children.
    fn empty(&self) -> Result<(), Error>;

    fn get(&self) -> Self::Native;
}

/// The native value underneath a handle.
pub enum Native<H: Host> {
    Html(String),
    Element(H::Element),
    Wrapped(H::Wrapped),
}

impl<H: Host> Native<H> {
    /// The synthesized HTML, if this came from the string backend.
    pub fn as_html(&self) -> Option<&str> {
        match self {
            Native::Html(html) => Some(html),
            _ => None,
        }
    }
}

/// A uniform handle to an element.
pub enum Element<H: Host> {
    String(StringElement),
    Dom(DomElement<H>),
    Wrapper(WrapperElement<H>),
}

impl<H: Host> ElementImpl<H> for Element<H> {
    type Native = Native<H>;

    fn backend(&self) -> Backend {
        match self {
            Element::String(_) => Backend::String,
            Element::Dom(_) => Backend::Dom,
            Element::Wrapper(_) => Backend::Wrapper,
        }
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        match self {
            Element::String(s) => s.get_attr(name),
            Element::Dom(d) => d.get_attr(name),
            Element::Wrapper(w) => w.get_attr(name),
        }
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        match self {
            Element::String(s) => {
                s.set_attr(name, value);
                Ok(())
            }
            Element::Dom(d) => d.set_attr(name, value),
            Element::Wrapper(w) => w.set_attr(name, value),
        }
    }

    fn on(&self, event: &str, handler: impl FnMut(H::Event) + 'static) -> Result<(), Error> {
        match self {
            Element::String(s) => <StringElement as ElementImpl<H>>::on(s, event, handler),
            Element::Dom(d) => d.on(event, handler),
            Element::Wrapper(w) => w.on(event, handler),
        }
    }

    fn insert_before(&self, other: &H::Node, reference: Option<&H::Node>) -> Result<(), Error> {
        match self {
            Element::String(s) => {
                <StringElement as ElementImpl<H>>::insert_before(s, other, reference)
            }
            Element::Dom(d) => d.insert_before(other, reference),
            Element::Wrapper(w) => w.insert_before(other, reference),
        }
    }

    fn remove(&self) -> Result<(), Error> {
        match self {
            Element::String(s) => <StringElement as ElementImpl<H>>::remove(s),
            Element::Dom(d) => d.remove(),
            Element::Wrapper(w) => w.remove(),
        }
    }

    fn replace_with(&self, other: &H::Node, parent: Option<&H::Element>) -> Result<(), Error> {
        match self {
            Element::String(s) => {
                <StringElement as ElementImpl<H>>::replace_with(s, other, parent)
            }
            Element::Dom(d) => d.replace_with(other, parent),
            Element::Wrapper(w) => w.replace_with(other, parent),
        }
    }

    fn find(&self, selector: &str) -> Result<Option<Self>, Error> {
        Ok(match self {
            Element::String(s) => {
                <StringElement as ElementImpl<H>>::find(s, selector)?.map(Element::String)
            }
            Element::Dom(d) => d.find(selector)?.map(Element::Dom),
            Element::Wrapper(w) => w.find(selector)?.map(Element::Wrapper),
        })
    }

    fn append_child(&self, child: &H::Node) -> Result<(), Error> {
        match self {
            Element::String(s) => <StringElement as ElementImpl<H>>::append_child(s, child),
            Element::Dom(d) => d.append_child(child),
            Element::Wrapper(w) => w.append_child(child),
        }
    }

    fn empty(&self) -> Result<(), Error> {
        match self {
            Element::String(s) => <StringElement as ElementImpl<H>>::empty(s),
            Element::Dom(d) => d.empty(),
            Element::Wrapper(w) => w.empty(),
        }
    }

    fn get(&self) -> Native<H> {
        match self {
            Element::String(s) => Native::Html(s.html()),
            Element::Dom(d) => Native::Element(d.get()),
            Element::Wrapper(w) => Native::Wrapped(w.get()),
        }
    }
}

/// Everything [`element`] accepts.
///
/// The kind of input is decided where the value is produced, through the `From`
/// conversions below or the explicit variants.
pub enum ElementInput<H: Host> {
    /// Already a handle. Passed through untouched.
    Handle(Element<H>),
    /// HTML to be assembled as text.
    Html(String),
    /// A live host element.
    Element(H::Element),
    /// A node wrapped by the host's third party library.
    Wrapped(H::Wrapped),
}

impl<H: Host> From<Element<H>> for ElementInput<H> {
    fn from(handle: Element<H>) -> Self {
        ElementInput::Handle(handle)
    }
}

impl<H: Host> From<StringElement> for ElementInput<H> {
    fn from(s: StringElement) -> Self {
        ElementInput::Handle(Element::String(s))
    }
}

impl<H: Host> From<DomElement<H>> for ElementInput<H> {
    fn from(d: DomElement<H>) -> Self {
        ElementInput::Handle(Element::Dom(d))
    }
}

impl<H: Host> From<WrapperElement<H>> for ElementInput<H> {
    fn from(w: WrapperElement<H>) -> Self {
        ElementInput::Handle(Element::Wrapper(w))
    }
}

impl<H: Host> From<String> for ElementInput<H> {
    fn from(html: String) -> Self {
        ElementInput::Html(html)
    }
}

impl<H: Host> From<&String> for ElementInput<H> {
    fn from(html: &String) -> Self {
        ElementInput::Html(html.clone())
    }
}

impl<H: Host> From<&str> for ElementInput<H> {
    fn from(html: &str) -> Self {
        ElementInput::Html(html.to_owned())
    }
}

/// Provide a handle for the given input.
///
/// Handles are returned unchanged, so wrapping is idempotent.
pub fn element<H: Host>(input: impl Into<ElementInput<H>>) -> Element<H> {
    match input.into() {
        ElementInput::Handle(handle) => handle,
        ElementInput::Html(html) => Element::String(StringElement::new(html)),
        ElementInput::Element(el) => Element::Dom(DomElement::new(el)),
        ElementInput::Wrapped(wrapped) => Element::Wrapper(WrapperElement::new(wrapped)),
    }
}

/// Provide a handle for a value whose type is only known at runtime.
///
/// Checks, in order: an existing handle, `String`, `&'static str`, the host's
/// element type, the host's wrapped type. Anything else is an
/// [`Error::UnknownElementType`].
pub fn element_from_any<H: Host>(value: Box<dyn Any>) -> Result<Element<H>, Error> {
    let value = match value.downcast::<Element<H>>() {
        Ok(handle) => return Ok(*handle),
        Err(value) => value,
    };
    let value = match value.downcast::<String>() {
        Ok(html) => return Ok(element(*html)),
        Err(value) => value,
    };
    let value = match value.downcast::<&'static str>() {
        Ok(html) => return Ok(element(*html)),
        Err(value) => value,
    };
    let value = match value.downcast::<H::Element>() {
        Ok(el) => return Ok(element(ElementInput::Element(*el))),
        Err(value) => value,
    };
    match value.downcast::<H::Wrapped>() {
        Ok(wrapped) => Ok(element(ElementInput::Wrapped(*wrapped))),
        Err(_) => UnknownElementTypeSnafu {
            description: format!(
                "from an unrecognized value, expected an element handle, HTML, {} or {}",
                std::any::type_name::<H::Element>(),
                std::any::type_name::<H::Wrapped>(),
            ),
        }
        .fail(),
    }
}

/// Replace `old` using its parent, when the backend has no native replace.
pub(crate) fn replace_in_parent<H: Host>(
    backend: Backend,
    old: &H::Element,
    other: &H::Node,
    parent: Option<&H::Element>,
) -> Result<(), Error> {
    let parent = parent.context(NoParentSnafu { backend })?;
    parent.replace_child(other, &old.as_node())
}
