//! # echo-types
//!
//! Timeline item and wire format types for tweet-echo.
//!
//! This crate provides the foundational types used across all tweet-echo crates:
//! - [`PostId`], [`MediaHandle`], [`AccountRef`] - Identity types
//! - [`TimelineItem`], [`MediaRef`] - A fetched source post and its attachments
//! - [`ListOptions`], [`NewPost`] - Arguments to the capability surface
//! - [`Status`] - The timeline API's status object, convertible into [`TimelineItem`]
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod item;
mod status;

pub use error::WireError;
pub use ids::{AccountRef, MediaHandle, PostId};
pub use item::{ListOptions, MediaKind, MediaRef, NewPost, TimelineItem, MAX_PAGE_SIZE};
pub use status::{Status, StatusEntities, StatusMedia, UploadedMedia, TIMESTAMP_FORMAT};
