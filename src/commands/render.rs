use std::path::Path;

use serde_json::json;
use tracing::debug;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::services::markdown;

/// Print a Markdown file the way a bot reply would be shown in the chat.
pub async fn render_file(path: &Path, ctx: &AppContext) -> Result<(), PortalError> {
    let source = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), bytes = source.len(), "Rendering markdown");

    let html = markdown::render_markdown(&source);
    if ctx.json {
        return print_json(&json!({ "html": html }));
    }
    println!("{}", html);
    Ok(())
}
