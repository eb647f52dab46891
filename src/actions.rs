//! Maps action names found on clickable elements to their handlers.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::err::Error;
use crate::markup::Element;

/// The clicked element's action name and its `data-*` values, keys in
/// camel case (`data-user-id` becomes `userId`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    action: String,
    data: BTreeMap<String, String>,
}

impl ActionTarget {
    pub fn from_element(element: &Element) -> Option<Self> {
        let action = element.get_attr("data-action")?.to_string();
        let data = element
            .data_attrs()
            .map(|(key, value)| (camel_case(key), value.to_string()))
            .collect();
        Some(Self { action, data })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

type Handler<S> =
    Box<dyn Fn(Arc<S>, ActionTarget) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

pub struct ActionRegistry<S> {
    handlers: HashMap<&'static str, Handler<S>>,
}

impl<S: Send + Sync + 'static> ActionRegistry<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<F, Fut>(&mut self, action: &'static str, handler: F)
    where
        F: Fn(Arc<S>, ActionTarget) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.handlers.insert(
            action,
            Box::new(move |state, target| Box::pin(handler(state, target))),
        );
    }

    /// Runs the handler registered for the target's action. `None` when no
    /// handler is registered, the click is then ignored.
    pub async fn dispatch(
        &self,
        state: Arc<S>,
        target: ActionTarget,
    ) -> Option<Result<(), Error>> {
        let handler = self.handlers.get(target.action())?;
        log::debug!("Dispatching action `{}`", target.action());
        Some(handler(state, target).await)
    }
}

impl<S: Send + Sync + 'static> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
