use std::{fs, path::PathBuf};

use clap::Parser;
use stockroom_api::openapi::ApiDoc;
use utoipa::OpenApi;

#[derive(Parser)]
#[command(name = "openapi-export", about = "Write the OpenAPI document to disk")]
struct Args {
    /// Output file
    #[arg(long, default_value = "openapi/stockroom-api.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(&args.output, json)?;

    println!("OpenAPI spec written to {}", args.output.display());
    Ok(())
}
