//! This module contains various utility functions and helper macros used
//! throughout the methsweep crate.
//!
//! It provides common functionalities that are not specific to a particular
//! module but are required by multiple components, promoting code reuse
//! and maintainability.
//!
//! Key functionalities include:
//!
//! - Statistical functions, such as binomial proportion confidence
//!   intervals and normal quantiles.
//! - The shared rayon thread pool used for per-cell fan-out.
//! - Macros for common struct operations (e.g., getter functions,
//!   builder-style `with_*` methods).

use once_cell::sync::Lazy;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

mod stats;
pub use stats::*;

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var("METHSWEEP_NUM_THREADS")
        .ok()
        .and_then(|str| str.parse::<usize>().ok());
    ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .expect("Failed to create thread pool")
});

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
            self.$field_name = value;
            self
            }
        }
    };
}
