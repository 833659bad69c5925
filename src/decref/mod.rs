//! Reference-count lowering.
//!
//! `Int` and `String` values live on the heap and are reference counted by
//! the C runtime. This pass runs on checked code and adds a `DecRef` for
//! every heap value when it's no longer needed:
//!
//! - Local variables when their scope ends, and before every `return`
//! - Temporary values passed to functions or returned from them
//! - The old value of a variable that gets a new value
//!
//! A value copied from one variable to another gets an `IncRef`, so each
//! of them can release it.

pub mod decref;
