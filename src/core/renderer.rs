//! Type-keyed object renderers

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type RenderFn = Arc<dyn Fn(&dyn Any) -> String + Send + Sync>;

/// Maps a concrete type to the function that turns its values into message
/// text for [`Logger::log_object`](crate::Logger::log_object).
#[derive(Default, Clone)]
pub struct RendererMap {
    renderers: HashMap<TypeId, RenderFn>,
}

impl RendererMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T, F>(&mut self, render: F)
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let erased: RenderFn = Arc::new(move |value: &dyn Any| {
            value.downcast_ref::<T>().map(&render).unwrap_or_default()
        });
        self.renderers.insert(TypeId::of::<T>(), erased);
    }

    /// Render `value` with the function registered for its concrete type.
    pub fn render(&self, value: &dyn Any) -> Option<String> {
        self.renderers
            .get(&value.type_id())
            .map(|render| render(value))
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    pub fn clear(&mut self) {
        self.renderers.clear();
    }
}

impl std::fmt::Debug for RendererMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererMap")
            .field("renderers", &self.renderers.len())
            .finish()
    }
}
