//! Example store commands

use crate::cli::ExampleCommands;
use crate::commands::{OutputOptions, read_input_file};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;
use serde::Deserialize;
use serde_json::{Value, json};
use vertexctl_core::names::qualify;
use vertexctl_core::services::{
    Example, ExampleStoreHandler, FetchExamplesRequest, RemoveExamplesRequest,
    UpsertExamplesRequest,
};

/// Examples file: a bare array or an `{"examples": [...]}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExamplesFile {
    List(Vec<Example>),
    Wrapped { examples: Vec<Example> },
}

impl ExamplesFile {
    fn into_examples(self) -> Vec<Example> {
        match self {
            ExamplesFile::List(examples) | ExamplesFile::Wrapped { examples } => examples,
        }
    }
}

/// Handle example store commands
pub async fn handle_example_command(
    cmd: &ExampleCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let parent = context.parent();
    let handler = ExampleStoreHandler::new(client);

    match cmd {
        ExampleCommands::Upsert {
            store,
            file,
            overwrite,
        } => {
            let examples = read_input_file::<ExamplesFile>(file)?.into_examples();
            let request =
                UpsertExamplesRequest::new(qualify(&parent, "exampleStores", store), examples)
                    .with_overwrite(*overwrite);
            let response = handler.upsert_examples(&request).await?;

            if out.is_structured() || out.query.is_some() {
                return out.print(response, OutputFormat::Json);
            }
            let rows: Vec<Value> = response
                .results
                .iter()
                .map(|result| {
                    json!({
                        "example_id": result.example.as_ref().and_then(|e| e.example_id.clone()),
                        "code": result.status.as_ref().map(|s| s.code).unwrap_or(0),
                        "message": result.status.as_ref().map(|s| s.message.clone()),
                    })
                })
                .collect();
            out.print(rows, OutputFormat::Table)
        }

        ExampleCommands::Fetch {
            store,
            ids,
            page_size,
        } => {
            let mut request = FetchExamplesRequest::new(qualify(&parent, "exampleStores", store))
                .with_example_ids(ids.clone());
            if let Some(size) = page_size {
                request = request.with_page_size(*size);
            }
            let examples = handler.fetch_examples(&request)?.collect().await?;

            if out.is_structured() || out.query.is_some() {
                out.print(examples, OutputFormat::Json)
            } else if examples.is_empty() {
                println!("No examples found");
                Ok(())
            } else {
                let rows: Vec<Value> = examples.iter().map(summary_row).collect();
                out.print(rows, OutputFormat::Table)
            }
        }

        ExampleCommands::Remove { store, ids } => {
            let request = RemoveExamplesRequest {
                example_store: qualify(&parent, "exampleStores", store),
                example_ids: ids.clone(),
                stored_contents_example_filter: None,
            };
            let response = handler.remove_examples(&request).await?;
            if out.is_structured() {
                out.print(response, OutputFormat::Json)
            } else {
                println!("Removed {} example(s)", response.example_ids.len());
                Ok(())
            }
        }
    }
}

fn summary_row(example: &Example) -> Value {
    let contents = example
        .stored_contents_example
        .as_ref()
        .and_then(|stored| stored.contents_example.as_ref());
    let input = contents
        .and_then(|c| c.contents.first())
        .map(|content| content.text());
    json!({
        "example_id": example.example_id,
        "display_name": example.display_name,
        "input": input,
        "created": example.create_time,
    })
}
