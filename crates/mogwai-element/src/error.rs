//! Errors.
use std::rc::Rc;

use snafu::Snafu;

use crate::element::Backend;

/// Everything that can go wrong while manipulating an element handle or
/// resolving a [`DataResolvable`](crate::resolvable::DataResolvable).
#[derive(Clone, Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("the {backend} backend does not support `{operation}`"))]
    UnsupportedOperation {
        backend: Backend,
        operation: &'static str,
    },

    #[snafu(display("cannot replace {backend} element; no parent defined"))]
    NoParent { backend: Backend },

    #[snafu(display("cannot implement element {description}"))]
    UnknownElementType { description: String },

    /// The selector was rejected by the host's selector dialect.
    ///
    /// The DOM backend speaks native query-selector syntax, the wrapper backend
    /// speaks its library's dialect. Selectors that only one of them accepts end up here.
    #[snafu(display("the {backend} backend rejected selector '{selector}': {message}"))]
    InvalidSelector {
        backend: Backend,
        selector: String,
        message: String,
    },

    #[snafu(display("host rejected `{operation}`: {message}"))]
    Host {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("resolution rejected: {cause}"))]
    Rejected { cause: Rc<anyhow::Error> },
}

impl Error {
    /// Wrap a failed asynchronous computation.
    pub fn rejected(cause: impl Into<anyhow::Error>) -> Self {
        Error::Rejected {
            cause: Rc::new(cause.into()),
        }
    }
}
