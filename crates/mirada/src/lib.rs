//! Mirada: coordinate-calibrated visual automation for GPU-rendered UIs
//!
//! Mirada (Spanish: "gaze") drives applications that render everything on the
//! GPU and therefore expose no accessibility tree: no element positions, no
//! text content, nothing to query. The harness instead locates the target
//! window, calibrates device-pixel coordinates against mouse-injection
//! coordinates under display scaling, finds controls by scanning rendered
//! pixels for color signatures, and asserts correctness by statistical
//! comparison of captured regions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     MIRADA Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌─────────────┐    ┌──────────────┐         │
//! │   │ Window +   │    │ Calibration │    │ Coordinate   │         │
//! │   │ DPI query  │───►│ (one scale  │───►│ Mapper       │──click  │
//! │   │            │    │  per run)   │    │              │         │
//! │   └────────────┘    └─────────────┘    └──────────────┘         │
//! │   ┌────────────┐    ┌─────────────┐    ┌──────────────┐         │
//! │   │ Screen     │    │ Signature   │    │ Region       │         │
//! │   │ capture    │───►│ scanner     │    │ diff         │──assert │
//! │   │            │    │ (clusters)  │    │ (mean score) │         │
//! │   └────────────┘    └─────────────┘    └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The library is pure logic over collaborator traits ([`WindowService`],
//! [`ScreenCapture`], [`InputService`], [`DpiContext`]): window management,
//! screen capture, and input injection are supplied by the caller (the
//! `mirador` binary wires real OS services; tests wire fakes).
//!
//! # Coordinate spaces
//!
//! All arithmetic happens in physical pixels. One [`DisplayScale`] is
//! resolved per run from the OS DPI and reconciled against an actual capture,
//! because screenshot APIs and mouse-injection APIs are not guaranteed to
//! agree on pixel space across environments.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod calibration;
mod capture;
mod desktop;
mod diff;
mod geometry;
mod mapper;
mod result;
mod runner;
mod scanner;

pub use calibration::{Calibration, DisplayScale, ScaleResolver, RECONCILE_TOLERANCE_PX};
pub use capture::{ArtifactEntry, ArtifactStore, PixelBuffer, ScreenCapture};
pub use desktop::{connect_window, DpiContext, InputService, KeyAction, WindowQuery, WindowService};
pub use diff::{DiffResult, RegionDiff, DEFAULT_DIFF_THRESHOLD, DIMENSION_MISMATCH_SCORE};
pub use geometry::{Point, Rect};
pub use mapper::{ContentLayout, CoordinateMapper, LogicalTarget, SidebarLayout};
pub use result::{HarnessError, HarnessResult};
pub use runner::{CheckResult, RunLog, RunSummary, Settle};
pub use scanner::{ChannelRule, ColorPredicate, FeatureCluster, SignatureScanner};
