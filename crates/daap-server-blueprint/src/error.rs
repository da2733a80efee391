// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
	#[error("invalid Go template syntax: {0}")]
	InvalidTemplate(String),

	#[error("document {document} is missing required field {field}")]
	MissingField {
		document: usize,
		field: &'static str,
	},

	#[error("failed to render manifests: {0}")]
	Render(String),
}
