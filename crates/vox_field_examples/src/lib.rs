#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{init_tracing, noise_volume, save_slice_png, sphere_volume};
