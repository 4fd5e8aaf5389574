//! Element handles and data resolution for mogwai components.
//!
//! ## Elements
//!
//! Components that render into more than one kind of target want to say
//! "set this attribute" or "listen for clicks" without caring whether the thing
//! they hold is an HTML string being assembled for the server, a live DOM node,
//! or a node some other library has already wrapped (jQuery, in practice).
//!
//! [`element`] takes any of those and returns an [`Element`] handle. Every
//! handle speaks [`ElementImpl`]:
//!
//! ```rust,ignore
//! use mogwai_element::prelude::*;
//!
//! let el = element::<Web>("<button>");
//! el.set_attr("class", "primary")?;
//! assert_eq!(Some(r#"<button class="primary">"#), el.get().as_html());
//! ```
//!
//! String handles refuse operations that need a live node, returning
//! [`Error::UnsupportedOperation`].
//!
//! ## Data resolution
//!
//! A [`DataResolvable`] is a plain value, a function of some input, or a
//! future, and [`DataResolvable::resolve`] turns any of them into a value.
//! [`PendingTasks`] collects asynchronous tasks that all need to finish before
//! a component is ready, and [`for_each_async`] walks a collection one async
//! step at a time.
//!
//! ## Hosts
//!
//! The live backends are written against a [`Host`](element::Host). With the
//! `web` feature (on by default) [`web::Web`] is the browser.
pub mod element;
pub mod error;
pub mod resolvable;
#[cfg(feature = "web")]
pub mod web;

pub use element::{
    Backend, DomElement, Element, ElementImpl, ElementInput, Native, StringElement,
    WrapperElement, create_html, create_text, element, element_from_any,
};
pub use error::Error;
pub use resolvable::{DataResolvable, PendingTasks, Task, for_each_async, sync_task, task};

pub mod prelude {
    pub use crate::{
        Backend, DataResolvable, Element, ElementImpl, ElementInput, Error, Native,
        PendingTasks, element, element_from_any, for_each_async,
    };
    #[cfg(feature = "web")]
    pub use crate::web::{JQuery, JQueryStatic, Web};
}
