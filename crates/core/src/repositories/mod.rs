//! Typed persistence services over the key-value store.

pub mod records;
