//! Background imagery and frame composition for the EduVid pipeline.
//!
//! This crate provides:
//! - Tiered image sourcing: photo search, AI generation, offline gradient
//! - Cover-and-crop resizing shared by every source
//! - Title and content frame composition with per-job accent palettes
//! - Font discovery with a built-in bitmap fallback

pub mod compose;
pub mod error;
pub mod hash;
pub mod resize;
pub mod sourcing;

pub use compose::{AccentPalette, FontContext, FontSource, FrameCompositor};
pub use error::{ImageryError, ImageryResult};
pub use resize::cover_crop;
pub use sourcing::{
    create_fallback_image, ImageOrigin, ImageRequest, ImageSource, ImageSourcer, SlotImage, SourcingConfig,
};
