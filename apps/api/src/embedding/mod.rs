//! Embedding services — the offline-trained skill vector space and the
//! sentence encoder. Both are constructed once at startup and shared
//! read-only; scorers receive them by reference instead of reaching for
//! globals.

pub mod sentence;
pub mod skill_space;
