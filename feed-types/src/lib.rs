//! # feed-types
//!
//! Wire and domain types for the photofeed session layer.
//!
//! This crate provides the foundational types used across all photofeed crates:
//! - [`PhotoId`], [`AuthCode`], [`AccessToken`] - Identity and credential types
//! - [`Photo`], [`Profile`], [`PixelSize`] - Immutable domain values
//! - [`PhotoResult`], [`ProfileResult`], [`UserResult`], [`OAuthTokenResponse`] - JSON payloads
//! - [`parse_timestamp`] - Lenient `created_at` parsing

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ids;
mod model;
mod time;
mod wire;

pub use ids::{AccessToken, AuthCode, PhotoId};
pub use model::{Photo, PixelSize, Profile};
pub use time::parse_timestamp;
pub use wire::{OAuthTokenResponse, PhotoResult, ProfileImage, ProfileResult, UrlsResult, UserResult};
