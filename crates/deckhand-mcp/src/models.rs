//! MCP prompt arguments and response types.
//!
//! Tool request types live in `deckhand-kernel` so the composite builder can
//! share them; this module holds what only the MCP surface needs.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

// ============================================================================
// Prompt Argument Types
// ============================================================================

/// Arguments for the presentation assistant prompt.
#[derive(Debug, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[schemars(description = "Presentation assistant parameters")]
pub struct PresentationAssistantArgs {
    #[schemars(description = "What the deck is about, if already known")]
    pub topic: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Failure body carried by an error tool result.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolError {
    pub kind: String,
    pub message: String,
}

/// `{"success": false, "error": {...}}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolFailure {
    pub success: bool,
    pub error: ToolError,
}
