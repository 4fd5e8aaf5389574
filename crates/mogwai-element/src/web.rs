//! The browser host, through `web_sys`.
//!
//! [`Web`] hands out `web_sys` nodes to the DOM backend and [`JQuery`] objects to
//! the wrapper backend. The document used to create nodes and the jQuery entry
//! point are always passed in explicitly. [`document`] and [`JQueryStatic::global`]
//! look up the usual globals for callers that want them.
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};

use crate::{
    element::{Backend, ElementInput, Handler, Host, HostDocument, HostElement},
    error::{Error, HostSnafu, InvalidSelectorSnafu, UnknownElementTypeSnafu},
    resolvable::DataResolvable,
};

pub mod jquery;

pub use jquery::{JQuery, JQueryObject, JQueryStatic};

/// The browser.
#[derive(Clone, Copy, Debug)]
pub struct Web;

impl Host for Web {
    type Node = web_sys::Node;
    type Element = web_sys::Element;
    type Wrapped = JQuery;
    type Event = web_sys::Event;
}

impl Web {
    /// Classify an untyped Javascript value.
    ///
    /// Strings become HTML, DOM elements stay live and values wrapped by
    /// `jquery` are handed to the wrapper backend, in that order. Anything else
    /// is an [`Error::UnknownElementType`].
    pub fn classify(value: JsValue, jquery: &JQueryStatic) -> Result<ElementInput<Web>, Error> {
        if let Some(html) = value.as_string() {
            return Ok(ElementInput::Html(html));
        }
        let value = match value.dyn_into::<web_sys::Element>() {
            Ok(el) => return Ok(ElementInput::Element(el)),
            Err(value) => value,
        };
        if jquery.is_wrapped(&value) {
            let object: JQueryObject = value.unchecked_into();
            return Ok(ElementInput::Wrapped(JQuery::new(object, jquery.clone())));
        }
        UnknownElementTypeSnafu {
            description: format!("{value:?}"),
        }
        .fail()
    }
}

impl From<web_sys::Element> for ElementInput<Web> {
    fn from(el: web_sys::Element) -> Self {
        ElementInput::Element(el)
    }
}

impl From<web_sys::HtmlElement> for ElementInput<Web> {
    fn from(el: web_sys::HtmlElement) -> Self {
        ElementInput::Element(el.into())
    }
}

impl From<JQuery> for ElementInput<Web> {
    fn from(jquery: JQuery) -> Self {
        ElementInput::Wrapped(jquery)
    }
}

/// Extract a readable message from a thrown Javascript value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        String::from(error.message())
    } else if let Some(s) = value.as_string() {
        s
    } else {
        format!("{value:?}")
    }
}

/// Wrap a handler in a closure that lives as long as the page.
pub(crate) fn event_callback(
    mut handler: Handler<Web>,
    to_event: fn(JsValue) -> web_sys::Event,
) -> Closure<dyn FnMut(JsValue)> {
    Closure::wrap(Box::new(move |val: JsValue| handler(to_event(val))) as Box<dyn FnMut(JsValue)>)
}

impl HostElement<Web> for web_sys::Element {
    fn as_node(&self) -> web_sys::Node {
        let node: &web_sys::Node = self.as_ref();
        node.clone()
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        web_sys::Element::get_attribute(self, name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), Error> {
        web_sys::Element::set_attribute(self, name, value).js_context("setAttribute")
    }

    fn add_event_listener(&self, event: &str, handler: Handler<Web>) -> Result<(), Error> {
        // UNCHECKED: DOM event callbacks are always given an `Event`
        let callback = event_callback(handler, JsValue::unchecked_into);
        web_sys::EventTarget::add_event_listener_with_callback(
            self,
            event,
            callback.as_ref().unchecked_ref(),
        )
        .js_context("addEventListener")?;
        callback.forget();
        Ok(())
    }

    fn insert_before(
        &self,
        node: &web_sys::Node,
        reference: Option<&web_sys::Node>,
    ) -> Result<(), Error> {
        web_sys::Node::insert_before(self, node, reference)
            .map(|_| ())
            .js_context("insertBefore")
    }

    fn remove(&self) {
        web_sys::Element::remove(self);
    }

    fn has_replace_with(&self) -> bool {
        js_sys::Reflect::has(self, &JsValue::from_str("replaceWith")).unwrap_or(false)
    }

    fn replace_with(&self, node: &web_sys::Node) -> Result<(), Error> {
        web_sys::Element::replace_with_with_node_1(self, node).js_context("replaceWith")
    }

    fn replace_child(&self, node: &web_sys::Node, old: &web_sys::Node) -> Result<(), Error> {
        web_sys::Node::replace_child(self, node, old)
            .map(|_| ())
            .js_context("replaceChild")
    }

    fn query_selector(&self, selector: &str) -> Result<Option<web_sys::Element>, Error> {
        web_sys::Element::query_selector(self, selector).map_err(|e| {
            InvalidSelectorSnafu {
                backend: Backend::Dom,
                selector,
                message: js_message(&e),
            }
            .build()
        })
    }

    fn append_child(&self, child: &web_sys::Node) -> Result<(), Error> {
        web_sys::Node::append_child(self, child)
            .map(|_| ())
            .js_context("appendChild")
    }

    fn first_child(&self) -> Option<web_sys::Node> {
        web_sys::Node::first_child(self)
    }

    fn remove_child(&self, child: &web_sys::Node) -> Result<(), Error> {
        web_sys::Node::remove_child(self, child)
            .map(|_| ())
            .js_context("removeChild")
    }
}

impl HostDocument<Web> for web_sys::Document {
    /// Parse with a `<template>` element, so scripts don't run and table
    /// fragments like `<tr>` survive.
    fn parse_html(&self, html: &str) -> Result<Option<web_sys::Node>, Error> {
        let template = self
            .create_element("template")
            .js_context("createElement")?
            .dyn_into::<web_sys::HtmlTemplateElement>()
            .map_err(|el| {
                HostSnafu {
                    operation: "createElement",
                    message: format!("{el:?} is not a template"),
                }
                .build()
            })?;
        template.set_inner_html(html);
        Ok(template.content().first_child())
    }

    fn create_text_node(&self, text: &str) -> web_sys::Node {
        web_sys::Document::create_text_node(self, text).into()
    }
}

/// Return the page's document, if there is one.
pub fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

impl<D> DataResolvable<D, JsValue> {
    /// A Javascript promise. A rejected promise rejects the resolution.
    pub fn promise(promise: js_sys::Promise) -> Self {
        Self::try_future(async move {
            wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .map_err(|e| anyhow::anyhow!("{}", js_message(&e)))
        })
    }
}

/// Turn a thrown `JsValue` into an [`Error::Host`].
pub(crate) trait JsResultExt<T> {
    fn js_context(self, operation: &'static str) -> Result<T, Error>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn js_context(self, operation: &'static str) -> Result<T, Error> {
        self.map_err(|e| {
            HostSnafu {
                operation,
                message: js_message(&e),
            }
            .build()
        })
    }
}
