//! Just enough of jQuery to back [`WrapperElement`](crate::element::WrapperElement).
use wasm_bindgen::{JsCast, JsValue, prelude::*};

use crate::{
    element::{Backend, Handler, HostWrapper},
    error::{Error, InvalidSelectorSnafu},
    web::{JsResultExt, Web, event_callback, js_message},
};

#[wasm_bindgen]
extern "C" {
    /// A jQuery object, the set of nodes matched by `$(...)`.
    #[derive(Clone, Debug)]
    pub type JQueryObject;

    #[wasm_bindgen(method, js_name = attr)]
    fn get_attr(this: &JQueryObject, name: &str) -> Option<String>;

    #[wasm_bindgen(method, catch, js_name = attr)]
    fn set_attr(this: &JQueryObject, name: &str, value: &str) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn on(this: &JQueryObject, events: &str, handler: &js_sys::Function) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method, catch, js_name = insertBefore)]
    fn insert_before(this: &JQueryObject, target: &JQueryObject) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method)]
    fn remove(this: &JQueryObject) -> JQueryObject;

    #[wasm_bindgen(method, catch, js_name = replaceWith)]
    fn replace_with(this: &JQueryObject, content: &JQueryObject) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn find(this: &JQueryObject, selector: &str) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn append(this: &JQueryObject, content: &JQueryObject) -> Result<JQueryObject, JsValue>;

    #[wasm_bindgen(method)]
    fn empty(this: &JQueryObject) -> JQueryObject;

    #[wasm_bindgen(method, getter)]
    fn length(this: &JQueryObject) -> u32;
}

/// The jQuery function itself, usually found at `window.jQuery`.
#[derive(Clone, Debug)]
pub struct JQueryStatic {
    function: js_sys::Function,
}

impl JQueryStatic {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }

    /// Look up `window.jQuery`, if the page loaded it.
    pub fn global() -> Option<Self> {
        let window = web_sys::window()?;
        let function = js_sys::Reflect::get(&window, &JsValue::from_str("jQuery")).ok()?;
        function.dyn_into::<js_sys::Function>().ok().map(Self::new)
    }

    /// `$(value)`
    pub fn wrap(&self, value: &JsValue) -> Result<JQueryObject, Error> {
        self.function
            .call1(&JsValue::NULL, value)
            .map(JsCast::unchecked_into)
            .js_context("jQuery")
    }

    /// `$(value)`, as a [`JQuery`] that can wrap further nodes.
    pub fn select(&self, value: &JsValue) -> Result<JQuery, Error> {
        Ok(JQuery::new(self.wrap(value)?, self.clone()))
    }

    /// Whether `value` is a jQuery object.
    pub fn is_wrapped(&self, value: &JsValue) -> bool {
        value.is_object()
            && js_sys::Reflect::get(value, &JsValue::from_str("jquery"))
                .map(|version| version.is_string())
                .unwrap_or(false)
    }
}

/// A jQuery object along with the jQuery function that made it.
#[derive(Clone, Debug)]
pub struct JQuery {
    object: JQueryObject,
    lib: JQueryStatic,
}

impl JQuery {
    pub fn new(object: JQueryObject, lib: JQueryStatic) -> Self {
        Self { object, lib }
    }

    pub fn object(&self) -> &JQueryObject {
        &self.object
    }

    /// Number of matched nodes.
    pub fn len(&self) -> usize {
        self.object.length() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// jQuery hands handlers its own event object; dig out the DOM one.
fn original_event(val: JsValue) -> web_sys::Event {
    let original = js_sys::Reflect::get(&val, &JsValue::from_str("originalEvent"))
        .ok()
        .filter(|ev| ev.is_instance_of::<web_sys::Event>());
    // UNCHECKED: without an original event, jQuery's event quacks like one
    original.unwrap_or(val).unchecked_into()
}

impl HostWrapper<Web> for JQuery {
    fn attr(&self, name: &str) -> Option<String> {
        self.object.get_attr(name)
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), Error> {
        self.object.set_attr(name, value).js_context("attr")?;
        Ok(())
    }

    fn on(&self, event: &str, handler: Handler<Web>) -> Result<(), Error> {
        let callback = event_callback(handler, original_event);
        self.object
            .on(event, callback.as_ref().unchecked_ref())
            .js_context("on")?;
        callback.forget();
        Ok(())
    }

    fn insert_before(
        &self,
        node: &web_sys::Node,
        reference: Option<&web_sys::Node>,
    ) -> Result<(), Error> {
        let node = self.lib.wrap(node)?;
        match reference {
            Some(reference) => node
                .insert_before(&self.lib.wrap(reference)?)
                .js_context("insertBefore")?,
            None => self.object.append(&node).js_context("append")?,
        };
        Ok(())
    }

    fn remove(&self) {
        self.object.remove();
    }

    fn replace_with(&self, node: &web_sys::Node) -> Result<(), Error> {
        self.object
            .replace_with(&self.lib.wrap(node)?)
            .js_context("replaceWith")?;
        Ok(())
    }

    fn find(&self, selector: &str) -> Result<Option<Self>, Error> {
        let found = self.object.find(selector).map_err(|e| {
            InvalidSelectorSnafu {
                backend: Backend::Wrapper,
                selector,
                message: js_message(&e),
            }
            .build()
        })?;
        let found = JQuery::new(found, self.lib.clone());
        Ok((!found.is_empty()).then_some(found))
    }

    fn append(&self, child: &web_sys::Node) -> Result<(), Error> {
        self.object
            .append(&self.lib.wrap(child)?)
            .js_context("append")?;
        Ok(())
    }

    fn empty(&self) {
        self.object.empty();
    }
}
