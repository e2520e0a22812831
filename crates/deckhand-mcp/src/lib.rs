//! MCP server exposing deckhand's presentation tools.
//!
//! Agents build decks through opaque handles: create a presentation, add
//! slides, add shapes to slides, save. Every tool answers with a JSON object;
//! failures come back as error tool results carrying an error kind and
//! message, never as protocol errors.
//!
//! ## Module Structure
//!
//! - `models`: Prompt arguments and response types
//! - `helpers`: Tool result rendering

mod helpers;
mod models;

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::prompt::PromptRouter, router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, GetPromptRequestParams, GetPromptResult, ListPromptsResult,
        ListResourcesResult,
        PaginatedRequestParams, PromptMessage, PromptMessageRole, RawResource,
        ReadResourceRequestParams, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo,
    },
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router,
    service::RequestContext,
};
use serde_json::json;

use deckhand_kernel::{
    AddBulletListRequest, AddChartRequest, AddHeaderFooterRequest, AddImageRequest,
    AddParagraphRequest, AddShapeRequest, AddSlideRequest, AddTableRequest, AddTextRequest,
    CreateCompletePresentationRequest, CreatePresentationRequest, DeckConfig, DeckError,
    Dispatcher, ErrorKind, PptxBackend, PptxDispatcher, Registry, SavePresentationRequest,
};

pub use models::*;
use helpers::{respond, success};

const PRESENTATIONS_URI: &str = "deckhand://presentations";

const INSTRUCTIONS: &str = "PowerPoint authoring server. Typical workflow: \
create_presentation, then add_slide, then add_text / add_paragraph / add_bullet_list / \
add_image / add_chart / add_table / add_shape on each slide, then save_presentation. \
Every object gets an opaque ID; pass the IDs back exactly as returned. Positions and \
sizes are in inches on a 10 x 7.5 slide, font sizes in points. \
create_complete_presentation builds a whole deck in one call.";

/// MCP server over a deckhand dispatcher.
#[derive(Clone)]
pub struct DeckhandMcp {
    dispatcher: PptxDispatcher,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl std::fmt::Debug for DeckhandMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckhandMcp")
            .field("presentations", &self.dispatcher.list_presentations().len())
            .field("tool_router", &self.tool_router)
            .finish()
    }
}

impl DeckhandMcp {
    /// A server with a fresh registry and the PPTX backend.
    pub fn new(config: DeckConfig) -> Self {
        Self::with_dispatcher(Dispatcher::with_registry(
            Arc::new(Registry::new()),
            Arc::new(PptxBackend::new()),
            Arc::new(config),
        ))
    }

    pub fn with_dispatcher(dispatcher: PptxDispatcher) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn dispatcher(&self) -> &PptxDispatcher {
        &self.dispatcher
    }

    fn presentations_json(&self) -> String {
        let list = self.dispatcher.list_presentations();
        serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string())
    }

    fn outline_json(&self, id: &str) -> Result<String, McpError> {
        let outline = self.dispatcher.outline(id).map_err(|e| resource_error(id, &e))?;
        serde_json::to_string_pretty(&outline)
            .map_err(|e| McpError::internal_error(format!("failed to render outline: {e}"), None))
    }
}

fn resource_error(id: &str, err: &DeckError) -> McpError {
    match err.kind() {
        ErrorKind::NotFound => {
            McpError::resource_not_found(format!("Presentation '{id}' not found"), None)
        }
        _ => McpError::invalid_params(err.to_string(), None),
    }
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl DeckhandMcp {
    // ========================================================================
    // Presentations and Slides
    // ========================================================================

    #[tool(description = "Create a new, empty presentation. Returns its presentation_id.")]
    fn create_presentation(
        &self,
        Parameters(req): Parameters<CreatePresentationRequest>,
    ) -> CallToolResult {
        respond("create_presentation", self.dispatcher.create_presentation(&req), |id| {
            json!({ "presentation_id": id })
        })
    }

    #[tool(description = "Append a slide using one of the nine standard layouts. Returns its slide_id.")]
    fn add_slide(&self, Parameters(req): Parameters<AddSlideRequest>) -> CallToolResult {
        respond("add_slide", self.dispatcher.add_slide(&req), |id| {
            json!({ "slide_id": id })
        })
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    #[tool(description = "Add a text box with a single run of styled text. Returns its shape_id.")]
    fn add_text(&self, Parameters(req): Parameters<AddTextRequest>) -> CallToolResult {
        respond("add_text", self.dispatcher.add_text(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Add a word-wrapped paragraph with line spacing. Returns its shape_id.")]
    fn add_paragraph(&self, Parameters(req): Parameters<AddParagraphRequest>) -> CallToolResult {
        respond("add_paragraph", self.dispatcher.add_paragraph(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Add a bulleted list, one paragraph per item. Returns its shape_id.")]
    fn add_bullet_list(
        &self,
        Parameters(req): Parameters<AddBulletListRequest>,
    ) -> CallToolResult {
        respond("add_bullet_list", self.dispatcher.add_bullet_list(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Place a picture from a local PNG, JPEG, GIF or BMP file. Returns its shape_id.")]
    fn add_image(&self, Parameters(req): Parameters<AddImageRequest>) -> CallToolResult {
        respond("add_image", self.dispatcher.add_image(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Add a chart (bar, column, line, pie, doughnut, area, scatter or radar) with one value per category in each series. Returns its shape_id.")]
    fn add_chart(&self, Parameters(req): Parameters<AddChartRequest>) -> CallToolResult {
        respond("add_chart", self.dispatcher.add_chart(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Add a table from rows of cells. Rows must all have the same length. Returns its shape_id.")]
    fn add_table(&self, Parameters(req): Parameters<AddTableRequest>) -> CallToolResult {
        respond("add_table", self.dispatcher.add_table(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    #[tool(description = "Add an auto shape such as RECTANGLE, OVAL or RIGHT_ARROW. Returns its shape_id.")]
    fn add_shape(&self, Parameters(req): Parameters<AddShapeRequest>) -> CallToolResult {
        respond("add_shape", self.dispatcher.add_shape(&req), |id| {
            json!({ "shape_id": id })
        })
    }

    // ========================================================================
    // Whole Presentation
    // ========================================================================

    #[tool(description = "Add footer text, slide numbers and dates to every existing slide, and header text to all but the first.")]
    fn add_header_footer(
        &self,
        Parameters(req): Parameters<AddHeaderFooterRequest>,
    ) -> CallToolResult {
        respond("add_header_footer", self.dispatcher.add_header_footer(&req), |n| {
            json!({ "slides_updated": n })
        })
    }

    #[tool(description = "Write the presentation to a .pptx file. The presentation stays open, so it can be edited and saved again.")]
    fn save_presentation(
        &self,
        Parameters(req): Parameters<SavePresentationRequest>,
    ) -> CallToolResult {
        respond("save_presentation", self.dispatcher.save_presentation(&req), |path| {
            json!({ "file_path": path.display().to_string() })
        })
    }

    #[tool(description = "Build a whole deck in one call: a title slide, then one slide per entry with text, bullets, image, chart and table stacked top to bottom. Placement is automatic and approximate. Saves when filename is given.")]
    fn create_complete_presentation(
        &self,
        Parameters(req): Parameters<CreateCompletePresentationRequest>,
    ) -> CallToolResult {
        respond(
            "create_complete_presentation",
            self.dispatcher.create_complete_presentation(&req),
            |out| {
                let mut body = json!({
                    "presentation_id": out.presentation_id,
                    "slide_ids": out.slide_ids,
                });
                if let Some(path) = out.path {
                    body["file_path"] = json!(path.display().to_string());
                }
                body
            },
        )
    }

    // ========================================================================
    // Read-back
    // ========================================================================

    #[tool(description = "List open presentations with their slide counts.")]
    fn list_presentations(&self) -> CallToolResult {
        success(json!({ "presentations": self.dispatcher.list_presentations() }))
    }
}

// ============================================================================
// Prompts
// ============================================================================

#[prompt_router]
impl DeckhandMcp {
    /// Instructions for an assistant driving these tools.
    #[prompt(
        name = "presentation_assistant",
        description = "System instructions for building PowerPoint decks with these tools"
    )]
    fn presentation_assistant(
        &self,
        Parameters(args): Parameters<PresentationAssistantArgs>,
    ) -> Result<GetPromptResult, McpError> {
        let mut content = String::from(
            "You are a PowerPoint creation assistant.\n\n\
             You can help users:\n\
             1. Create new presentations from scratch\n\
             2. Add slides with text, bullet points, images, charts, tables and shapes\n\
             3. Format and style slide content\n\
             4. Save presentations to files\n\n\
             Work in this order: create_presentation, add_slide, add content to each slide, \
             save_presentation. Keep every ID a tool returns and pass it back unchanged.\n\n\
             Always respond with clear, step-by-step explanations of what you're doing. \
             When a presentation is created or modified, summarize the changes and current \
             state, including the IDs involved.\n",
        );
        if let Some(topic) = args.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            content.push_str(&format!("\nThe deck is about: {topic}\n"));
        }

        Ok(GetPromptResult::new(vec![PromptMessage::new(
            PromptMessageRole::User,
            rmcp::model::PromptMessageContent::Text { text: content },
        )])
        .with_description("PowerPoint creation assistant"))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
#[prompt_handler]
impl ServerHandler for DeckhandMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
        )
        .with_instructions(INSTRUCTIONS)
    }

    /// Resources exposed:
    /// - `deckhand://presentations` - All open presentations
    /// - `deckhand://presentations/{id}` - Outline of one presentation
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            let mut resources = vec![
                RawResource {
                    uri: PRESENTATIONS_URI.to_string(),
                    name: "presentations".to_string(),
                    title: Some("Open Presentations".to_string()),
                    description: Some("Every open presentation with its slide count".to_string()),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                }
                .no_annotation(),
            ];

            for summary in self.dispatcher.list_presentations() {
                let id = summary.presentation_id.to_string();
                resources.push(
                    RawResource {
                        uri: format!("{PRESENTATIONS_URI}/{id}"),
                        name: id.clone(),
                        title: summary.filename.clone(),
                        description: Some(format!("Presentation with {} slides", summary.slide_count)),
                        mime_type: Some("application/json".to_string()),
                        size: None,
                        icons: None,
                        meta: None,
                    }
                    .no_annotation(),
                );
            }

            Ok(ListResourcesResult {
                meta: None,
                next_cursor: None,
                resources,
            })
        }
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &request.uri;

            if uri == PRESENTATIONS_URI {
                return Ok(ReadResourceResult::new(vec![ResourceContents::text(
                    self.presentations_json(),
                    uri.clone(),
                )]));
            }

            if let Some(id) = uri.strip_prefix(&format!("{PRESENTATIONS_URI}/")) {
                let content = self.outline_json(id)?;
                return Ok(ReadResourceResult::new(vec![ResourceContents::text(
                    content,
                    uri.clone(),
                )]));
            }

            Err(McpError::invalid_params(
                format!("Unknown resource URI: {uri}"),
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn server(dir: &std::path::Path) -> DeckhandMcp {
        DeckhandMcp::new(DeckConfig::default().with_output_dir_override(Some(dir)))
    }

    fn body(result: &CallToolResult) -> Value {
        let text = &result.content[0].as_text().unwrap().text;
        serde_json::from_str(text).unwrap()
    }

    fn params<T: serde::de::DeserializeOwned>(value: Value) -> Parameters<T> {
        Parameters(serde_json::from_value(value).unwrap())
    }

    fn create(mcp: &DeckhandMcp) -> String {
        let result = mcp.create_presentation(params(json!({})));
        body(&result)["presentation_id"].as_str().unwrap().to_string()
    }

    fn slide(mcp: &DeckhandMcp, pid: &str) -> String {
        let result = mcp.add_slide(params(json!({ "presentation_id": pid })));
        body(&result)["slide_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_create_slide_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let pid = create(&mcp);
        let sid = slide(&mcp, &pid);

        let result = mcp.add_text(params(json!({
            "presentation_id": pid,
            "slide_id": sid,
            "text": "Hello",
            "left": 1, "top": 1, "width": 2, "height": 1
        })));
        assert_ne!(result.is_error, Some(true));
        let b = body(&result);
        assert_eq!(b["success"], true);
        let shape = b["shape_id"].as_str().unwrap();
        assert!(shape != pid && shape != sid);
    }

    #[test]
    fn test_errors_are_tool_results() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let pid = create(&mcp);
        let sid = slide(&mcp, &pid);

        let result = mcp.add_image(params(json!({
            "presentation_id": pid,
            "slide_id": sid,
            "image_path": dir.path().join("missing.png").display().to_string()
        })));
        assert_eq!(result.is_error, Some(true));
        let failure: ToolFailure = serde_json::from_value(body(&result)).unwrap();
        assert!(!failure.success);
        assert_eq!(failure.error.kind, "resource_not_found");

        let result = mcp.add_shape(params(json!({
            "presentation_id": pid,
            "slide_id": sid,
            "shape_type": "NOT_A_TYPE"
        })));
        assert_eq!(body(&result)["error"]["kind"], "invalid_argument");

        let result = mcp.add_slide(params(json!({ "presentation_id": "pres-nope-1" })));
        assert_eq!(body(&result)["error"]["kind"], "not_found");

        let outline = mcp.dispatcher().outline(&pid).unwrap();
        assert!(outline.slides[0].shapes.is_empty());
    }

    #[test]
    fn test_save_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let result = mcp.create_presentation(params(json!({ "filename": "talk" })));
        let pid = body(&result)["presentation_id"].as_str().unwrap().to_string();
        slide(&mcp, &pid);

        let first = body(&mcp.save_presentation(params(json!({ "presentation_id": pid }))));
        assert_eq!(
            first["file_path"],
            dir.path().join("talk.pptx").display().to_string()
        );
        slide(&mcp, &pid);
        let second = body(&mcp.save_presentation(params(json!({
            "presentation_id": pid,
            "filename": "talk-v2"
        }))));
        assert_eq!(second["success"], true);
        assert!(dir.path().join("talk.pptx").is_file());
        assert!(dir.path().join("talk-v2.pptx").is_file());
    }

    #[test]
    fn test_chart_table_and_header_footer() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let pid = create(&mcp);
        let sid = slide(&mcp, &pid);

        let chart = mcp.add_chart(params(json!({
            "presentation_id": pid,
            "slide_id": sid,
            "chart_type": "PIE",
            "categories": ["A", "B"],
            "data_series": [["Share", [60, 40]]]
        })));
        assert_eq!(body(&chart)["success"], true);

        let table = mcp.add_table(params(json!({
            "presentation_id": pid,
            "slide_id": sid,
            "data": [["x", "y"], [1, 2]]
        })));
        assert_eq!(body(&table)["success"], true);

        let hf = mcp.add_header_footer(params(json!({
            "presentation_id": pid,
            "footer_text": "ACME"
        })));
        assert_eq!(body(&hf)["slides_updated"], 1);
    }

    #[test]
    fn test_create_complete_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let result = mcp.create_complete_presentation(params(json!({
            "title": "Roadmap",
            "slides_content": [
                {"title": "Goals", "bullets": ["a", "b"]},
                {"title": "Numbers", "table_data": [["k", "v"], ["x", 1]]}
            ],
            "footer": "Internal",
            "filename": "roadmap"
        })));
        let b = body(&result);
        assert_eq!(b["success"], true);
        assert_eq!(b["slide_ids"].as_array().unwrap().len(), 3);
        assert!(dir.path().join("roadmap.pptx").is_file());

        let listed = body(&mcp.list_presentations());
        assert_eq!(listed["presentations"][0]["slide_count"], 3);
    }

    #[test]
    fn test_resource_json() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let pid = create(&mcp);
        slide(&mcp, &pid);

        let list: Value = serde_json::from_str(&mcp.presentations_json()).unwrap();
        assert_eq!(list[0]["presentation_id"], pid.as_str());

        let outline: Value = serde_json::from_str(&mcp.outline_json(&pid).unwrap()).unwrap();
        assert_eq!(outline["slides"].as_array().unwrap().len(), 1);
        assert_eq!(outline["slides"][0]["layout_name"], "Title and Content");

        assert!(mcp.outline_json("pres-unknown-1").is_err());
    }

    #[test]
    fn test_prompt_mentions_topic() {
        let dir = tempfile::tempdir().unwrap();
        let mcp = server(dir.path());
        let result = mcp
            .presentation_assistant(Parameters(PresentationAssistantArgs {
                topic: Some("quarterly sales".into()),
            }))
            .unwrap();
        match &result.messages[0].content {
            rmcp::model::PromptMessageContent::Text { text } => {
                assert!(text.contains("PowerPoint creation assistant"));
                assert!(text.contains("quarterly sales"));
            }
            _ => panic!("expected text prompt"),
        }
    }

    #[test]
    fn test_server_info() {
        let dir = tempfile::tempdir().unwrap();
        let info = server(dir.path()).get_info();
        assert!(info.instructions.unwrap().contains("create_presentation"));
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }
}
