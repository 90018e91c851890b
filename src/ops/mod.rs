//! Pure arithmetic over segments. Nothing here touches memory.

mod chop;
mod relation;
