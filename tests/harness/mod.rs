// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for abuse-scenario tests.

pub mod generators;
