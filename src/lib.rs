// SPDX-License-Identifier: GPL-3.0-only

//! Wayfinder - campus navigation core
//!
//! This library provides the data and services behind the campus navigation
//! app: static per-floor room layouts, locally persisted bookmark/favorite
//! lists, locale catalogs, and a camera-frame fiducial-tag detector used to
//! anchor the user to a known room on a floor plan.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`data`]: Static building and room tables
//! - [`detector`]: Tag detector binding and its worker front-end
//! - [`vision`]: Marker detection pipeline backing the detector module
//! - [`stores`]: Persisted bookmark, favorite and locale stores
//! - [`i18n`]: Embedded locale catalogs and template substitution
//! - [`config`]: User configuration handling

pub mod config;
pub mod constants;
pub mod data;
pub mod detector;
pub mod errors;
pub mod i18n;
pub mod stores;
pub mod vision;

pub use config::Config;
