//! Middleware chain of responsibility.
//!
//! A middleware handler receives the host store handle, a [`Next`]
//! continuation and the action. Calling `next.run()` continues the chain and
//! eventually dispatches; returning without calling it drops the action.

use crate::{ActionObject, Dispatch, KindSelector, StatecraftError, StatecraftResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

pub type MiddlewareHandler =
    Arc<dyn Fn(&Dispatch, Next, &ActionObject) -> StatecraftResult<()> + Send + Sync>;

/// Continuation handed to a middleware handler.
#[derive(Clone)]
pub struct Next(Arc<dyn Fn() -> StatecraftResult<()> + Send + Sync>);

impl Next {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> StatecraftResult<()> + Send + Sync + 'static,
    {
        Next(Arc::new(f))
    }

    pub fn run(&self) -> StatecraftResult<()> {
        (self.0)()
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next(<fn>)")
    }
}

/// An interceptor bound to one action name and a kind (or every kind).
#[derive(Clone)]
pub struct Middleware {
    pub action_name: String,
    pub kind: KindSelector,
    handler: MiddlewareHandler,
}

impl Middleware {
    pub fn new<F>(action_name: impl Into<String>, kind: impl Into<KindSelector>, handler: F) -> Self
    where
        F: Fn(&Dispatch, Next, &ActionObject) -> StatecraftResult<()> + Send + Sync + 'static,
    {
        Self {
            action_name: action_name.into(),
            kind: kind.into(),
            handler: Arc::new(handler),
        }
    }

    /// Build a middleware from a textual kind (`"set"`, `"*"`, ...).
    pub fn parse<F>(action_name: impl Into<String>, kind: &str, handler: F) -> StatecraftResult<Self>
    where
        F: Fn(&Dispatch, Next, &ActionObject) -> StatecraftResult<()> + Send + Sync + 'static,
    {
        let action_name = action_name.into();
        let kind = kind.parse::<KindSelector>().map_err(|_| {
            StatecraftError::middleware(&action_name, kind, "kind must be \"*\" or a known action kind")
        })?;
        Ok(Self::new(action_name, kind, handler))
    }

    pub fn handler(&self) -> &MiddlewareHandler {
        &self.handler
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("action_name", &self.action_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Build the chain `middlewares[0] -> middlewares[1] -> ... -> terminal`.
///
/// Nothing runs until the returned continuation is invoked. A run that never
/// reaches `terminal` is a silent cancellation.
pub fn chain(middlewares: &[Middleware], host: &Dispatch, terminal: Next, action: &ActionObject) -> Next {
    let reached = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&reached);
    let terminal = Next::new(move || {
        flag.store(true, Ordering::SeqCst);
        terminal.run()
    });
    let head = link(middlewares, host, terminal, action);

    let action_type = action.action_type.clone();
    Next::new(move || {
        reached.store(false, Ordering::SeqCst);
        head.run()?;
        if !reached.load(Ordering::SeqCst) {
            debug!(action_type = %action_type, "middleware chain cancelled the action");
        }
        Ok(())
    })
}

fn link(middlewares: &[Middleware], host: &Dispatch, terminal: Next, action: &ActionObject) -> Next {
    let Some((first, rest)) = middlewares.split_first() else {
        return terminal;
    };
    let next = link(rest, host, terminal, action);
    let handler = Arc::clone(&first.handler);
    let host = host.clone();
    let action = action.clone();
    let label = format!("{}:{}", first.action_name, first.kind);
    Next::new(move || {
        trace!(middleware = %label, action_type = %action.action_type, "middleware hop");
        handler(&host, next.clone(), &action)
    })
}
