/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The scanner's error vocabulary is the crate wide
//! [`ErrorCode`], so hot paths only ever return a single
//! byte of discriminant; position context is applied once,
//! at the reader boundary.
//!
//! [`ErrorCode`]: crate::error::internal::ErrorCode

pub(crate) use crate::error::internal::ErrorCode as ScanError;

pub(crate) type ScanResult<T> = std::result::Result<T, ScanError>;
