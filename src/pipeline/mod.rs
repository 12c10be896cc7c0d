//! Middleware chains shared by the transformer and modifier stages

pub mod middleware;
pub mod item;

pub use middleware::{
    modifier, modifier_fn, transformer, transformer_fn, FnHandler, Handler, Modifier, Next,
    Pipeline, Transformer,
};
pub use item::PipelinedItem;
