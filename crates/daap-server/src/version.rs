// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build version information.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn format_version_info() -> String {
	format!("daap-server {VERSION}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_info_names_the_binary() {
		assert!(format_version_info().starts_with("daap-server "));
	}
}
