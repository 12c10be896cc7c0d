//! Onion-style handler chains.
//!
//! Both preprocessing stages run through the same executor: an ordered list
//! of [`Handler`]s, each receiving the payload and a [`Next`] continuation.
//! Calling `next.run(payload)` hands the payload to the following handler,
//! or to the terminal callback after the last one.
//!
//! # Example
//!
//! ```rust
//! use anyhow::Result;
//! use request_preprocessor::pipeline::{Handler, Next, Pipeline};
//!
//! struct Double;
//!
//! impl Handler<i64> for Double {
//!     fn handle(&self, payload: i64, next: Next<'_, i64>) -> Result<i64> {
//!         next.run(payload * 2)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let handlers: Vec<&dyn Handler<i64>> = vec![&Double, &Double];
//! let result = Pipeline::new(&handlers).run(3, Ok)?;
//! assert_eq!(result, 12);
//! # Ok(())
//! # }
//! ```

use crate::pipeline::item::PipelinedItem;
use anyhow::Result;

/// A single stage of a chain.
///
/// A handler may forward the payload unchanged, mutate or replace it before
/// forwarding, or return without calling `next` at all. The last case
/// short-circuits the chain: later handlers and the terminal never run, and
/// whatever the handler returns is the chain's result.
///
/// Errors are not caught anywhere in the chain. They surface from `run`
/// exactly as the handler produced them.
pub trait Handler<P> {
    /// Name used in log events
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn handle(&self, payload: P, next: Next<'_, P>) -> Result<P>;
}

/// A per-field modifier: receives one leaf wrapped in a [`PipelinedItem`]
pub type Modifier = dyn for<'r> Handler<PipelinedItem<'r>>;

/// A whole-record transformer
pub type Transformer<R> = dyn for<'r> Handler<&'r mut R>;

/// Box a modifier for use in a [`ModifierMap`](crate::ModifierMap)
pub fn modifier<M>(handler: M) -> Box<Modifier>
where
    M: for<'r> Handler<PipelinedItem<'r>> + 'static,
{
    Box::new(handler)
}

/// Box a transformer for use in a transformer list
pub fn transformer<R, T>(handler: T) -> Box<Transformer<R>>
where
    T: for<'r> Handler<&'r mut R> + 'static,
{
    Box::new(handler)
}

/// Continuation handed to each handler.
///
/// `run` consumes the continuation, so it can be invoked at most once.
pub struct Next<'c, P> {
    inner: NextInner<'c, P>,
}

enum NextInner<'c, P> {
    /// More handlers to run
    Chain {
        handler: &'c dyn Handler<P>,
        next: Box<Next<'c, P>>,
    },
    /// End of the chain
    Terminal(Box<dyn FnOnce(P) -> Result<P> + 'c>),
}

impl<'c, P> Next<'c, P> {
    pub(crate) fn new(handler: &'c dyn Handler<P>, next: Next<'c, P>) -> Self {
        Next {
            inner: NextInner::Chain {
                handler,
                next: Box::new(next),
            },
        }
    }

    pub(crate) fn terminal<F>(f: F) -> Self
    where
        F: FnOnce(P) -> Result<P> + 'c,
    {
        Next {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Invoke the next handler, or the terminal callback
    pub fn run(self, payload: P) -> Result<P> {
        match self.inner {
            NextInner::Chain { handler, next } => {
                tracing::trace!(handler = handler.name(), "running handler");
                handler.handle(payload, *next)
            }
            NextInner::Terminal(terminal) => terminal(payload),
        }
    }
}

/// An ordered list of handlers ready to run
pub struct Pipeline<'c, P> {
    handlers: &'c [&'c dyn Handler<P>],
}

impl<'c, P> Pipeline<'c, P> {
    pub fn new(handlers: &'c [&'c dyn Handler<P>]) -> Self {
        Pipeline { handlers }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Send `payload` through every handler, ending in `terminal`.
    ///
    /// With no handlers the terminal runs straight away.
    pub fn run<F>(&self, payload: P, terminal: F) -> Result<P>
    where
        F: FnOnce(P) -> Result<P> + 'c,
    {
        let next = self
            .handlers
            .iter()
            .rev()
            .fold(Next::terminal(terminal), |next, handler| {
                Next::new(*handler, next)
            });
        next.run(payload)
    }
}

/// A handler backed by a closure
pub struct FnHandler<F> {
    name: &'static str,
    func: F,
}

impl<F> FnHandler<F> {
    pub const fn new(name: &'static str, func: F) -> Self {
        FnHandler { name, func }
    }
}

impl<P, F> Handler<P> for FnHandler<F>
where
    F: Fn(P, Next<'_, P>) -> Result<P>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn handle(&self, payload: P, next: Next<'_, P>) -> Result<P> {
        (self.func)(payload, next)
    }
}

/// Build a boxed modifier from a closure
pub fn modifier_fn<F>(name: &'static str, func: F) -> Box<Modifier>
where
    F: for<'r, 'n> Fn(PipelinedItem<'r>, Next<'n, PipelinedItem<'r>>) -> Result<PipelinedItem<'r>>
        + 'static,
{
    Box::new(FnHandler::new(name, func))
}

/// Build a boxed transformer from a closure
pub fn transformer_fn<R, F>(name: &'static str, func: F) -> Box<Transformer<R>>
where
    R: 'static,
    F: for<'r, 'n> Fn(&'r mut R, Next<'n, &'r mut R>) -> Result<&'r mut R> + 'static,
{
    Box::new(FnHandler::new(name, func))
}
