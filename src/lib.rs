// SPDX-License-Identifier: MIT

pub mod conditional;
pub mod error;
pub mod host;
