#![allow(dead_code)]

pub mod gallery;
pub mod images;

pub use gallery::FakeGallery;
pub use images::{FixedAvatar, solid_png};
