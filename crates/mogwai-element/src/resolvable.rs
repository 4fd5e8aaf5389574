//! Resolution of data-bound values and batches of deferred callbacks.
//!
//! Components receive values that may be plain data, functions of some data,
//! or the result of an asynchronous computation. [`DataResolvable`] puts all
//! three behind one `async` call.
//!
//! [`PendingTasks`] collects callbacks registered during a render pass and fires
//! them all at once, while [`for_each_async`] is its sequential counterpart.
use std::{future::Future, rc::Rc};

use anyhow::Context;
use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::error::Error;

enum Inner<D, T> {
    Value(T),
    Function(Rc<dyn Fn(D) -> T>),
    Future(Shared<LocalBoxFuture<'static, Result<T, Error>>>),
}

/// A value, a function of data `D`, or a future, that resolves to a `T`.
///
/// ## One level only
/// A function's return value is handed back as-is. If it returns a future or
/// another `DataResolvable`, that is what [`DataResolvable::resolve`] gives you.
/// Resolving recursively broke iteration over resolved lists in components, so
/// it stays a single level.
pub struct DataResolvable<D, T> {
    inner: Inner<D, T>,
}

impl<D, T: Clone> Clone for DataResolvable<D, T> {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            Inner::Value(value) => Inner::Value(value.clone()),
            Inner::Function(f) => Inner::Function(f.clone()),
            Inner::Future(future) => Inner::Future(future.clone()),
        };
        Self { inner }
    }
}

impl<D, T> From<T> for DataResolvable<D, T> {
    fn from(value: T) -> Self {
        Self::value(value)
    }
}

impl<D, T> DataResolvable<D, T> {
    /// Create a resolvable from anything convertible into one.
    ///
    /// Passing an existing resolvable returns it unchanged, it is never wrapped twice.
    pub fn new(value: impl Into<Self>) -> Self {
        value.into()
    }

    pub fn value(value: T) -> Self {
        Self {
            inner: Inner::Value(value),
        }
    }

    /// A function that is called with the data on every resolution.
    pub fn function(f: impl Fn(D) -> T + 'static) -> Self {
        Self {
            inner: Inner::Function(Rc::new(f)),
        }
    }

    /// Whether resolving may have to wait on a future.
    pub fn is_blocking(&self) -> bool {
        matches!(self.inner, Inner::Future(_))
    }
}

impl<D, T: Clone + 'static> DataResolvable<D, T> {
    /// A future that can't fail.
    pub fn future(future: impl Future<Output = T> + 'static) -> Self {
        Self::try_future(future.map(Ok::<T, std::convert::Infallible>))
    }

    /// A future whose failure rejects every resolution with [`Error::Rejected`].
    ///
    /// The future runs at most once. Every resolution sees its settled result.
    pub fn try_future<E: Into<anyhow::Error>>(
        future: impl Future<Output = Result<T, E>> + 'static,
    ) -> Self {
        let future = async move { future.await.map_err(Error::rejected) };
        Self {
            inner: Inner::Future(future.boxed_local().shared()),
        }
    }

    /// Resolve to a concrete value.
    ///
    /// This is always `async`, even when nothing needs to be awaited.
    pub async fn resolve(&self, data: D) -> Result<T, Error> {
        match &self.inner {
            Inner::Future(future) => {
                log::trace!("resolving a future");
                future.clone().await
            }
            Inner::Function(f) => Ok(f(data)),
            Inner::Value(value) => Ok(value.clone()),
        }
    }
}

/// A deferred callback.
pub type Task<A> = Rc<dyn Fn(A) -> LocalBoxFuture<'static, anyhow::Result<()>>>;

/// Create a task from an async callback.
pub fn task<A, Fut>(f: impl Fn(A) -> Fut + 'static) -> Task<A>
where
    Fut: Future<Output = anyhow::Result<()>> + 'static,
{
    Rc::new(move |args| f(args).boxed_local())
}

/// Create a task from a synchronous callback.
///
/// Like an async callback's body, the callback runs when the returned future is
/// first polled, not when the task is called.
pub fn sync_task<A: 'static>(f: impl Fn(A) -> anyhow::Result<()> + 'static) -> Task<A> {
    let f = Rc::new(f);
    Rc::new(move |args| {
        let f = f.clone();
        async move { f(args) }.boxed_local()
    })
}

/// An ordered set of callbacks to run together at some later point.
///
/// Cloning copies the entries, so pushing to a clone doesn't affect the original.
pub struct PendingTasks<A = ()> {
    tasks: Vec<Task<A>>,
}

impl<A> Default for PendingTasks<A> {
    fn default() -> Self {
        Self { tasks: vec![] }
    }
}

impl<A> Clone for PendingTasks<A> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
        }
    }
}

impl<A> From<Vec<Task<A>>> for PendingTasks<A> {
    fn from(tasks: Vec<Task<A>>) -> Self {
        Self { tasks }
    }
}

impl<A> FromIterator<Task<A>> for PendingTasks<A> {
    fn from_iter<I: IntoIterator<Item = Task<A>>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl<A: Clone + 'static> PendingTasks<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn push_task(&mut self, task: Task<A>) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Add an async callback.
    pub fn push<Fut>(&mut self, f: impl Fn(A) -> Fut + 'static) -> &mut Self
    where
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.push_task(task(f))
    }

    /// Add a synchronous callback.
    pub fn push_sync(&mut self, f: impl Fn(A) -> anyhow::Result<()> + 'static) -> &mut Self {
        self.push_task(sync_task(f))
    }

    /// Call every task with a clone of `args` and wait for all of them.
    ///
    /// Tasks are called in the order they were pushed, but nothing waits for one
    /// task to finish before calling the next: all of them are in flight at the
    /// same time. Use [`for_each_async`] when tasks depend on each other's effects.
    ///
    /// ## Errors
    /// Once every task has settled, errors with the first failure in push order.
    pub async fn call(&self, args: A) -> anyhow::Result<()> {
        log::trace!("calling {} pending tasks", self.tasks.len());
        let running = self
            .tasks
            .iter()
            .map(|task| task(args.clone()))
            .collect::<Vec<_>>();
        let results = futures::future::join_all(running).await;
        for (i, result) in results.into_iter().enumerate() {
            result.with_context(|| format!("pending task {i} failed"))?;
        }
        Ok(())
    }
}

/// Run `f` over each item with its index, one at a time.
///
/// Each call is awaited before the next one starts. Stops at the first error.
pub async fn for_each_async<I, F, Fut, E>(iterable: I, mut f: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    for (i, item) in iterable.into_iter().enumerate() {
        f(item, i).await?;
    }
    Ok(())
}
