use chrono::{DateTime, Duration, Local};
use dotenv::dotenv;
use std::env;
use std::path::Path;

mod page;
mod pdf;
mod prompts;
mod render;
mod store;

pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

const MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 6000;
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SITE_DIR: &str = "literature-monitor";
const DIGEST_DIR: &str = "literature-monitor/digests";
const MEMORY_FILE: &str = "literature-monitor/digests/reviewed_articles.json";
const MANIFEST_FILE: &str = "literature-monitor/digests/manifest.json";
const DEFAULT_PDF_DIR: &str = "pdf-inbox";

const DIGEST_WINDOW_DAYS: i64 = 14;

// All date-derived strings for one run, computed once from a single clock
// sample and threaded into every component that needs "now".
pub struct RunContext {
    pub today: DateTime<Local>,
    pub start: DateTime<Local>,
    pub date_range: String,
    pub file_date: String,
    pub folder_range: String,
    pub search_month: String,
    pub search_year: String,
    pub today_display: String,
    pub start_display: String,
    pub generated_at: String,
    pub updated_display: String,
}

impl RunContext {
    pub fn new(now: DateTime<Local>) -> Self {
        let start = now - Duration::days(DIGEST_WINDOW_DAYS);
        RunContext {
            date_range: format!("{} - {}", start.format("%B %d"), now.format("%B %d, %Y")),
            file_date: now.format("%Y-%m-%d").to_string(),
            folder_range: format!("{}_to_{}", start.format("%Y-%m-%d"), now.format("%Y-%m-%d")),
            search_month: now.format("%B").to_string(),
            search_year: now.format("%Y").to_string(),
            today_display: now.format("%B %d, %Y").to_string(),
            start_display: start.format("%B %d, %Y").to_string(),
            generated_at: now.to_rfc3339(),
            updated_display: now.format("%B %d, %Y at %I:%M %p").to_string(),
            today: now,
            start,
        }
    }
}

async fn call_claude(
    client: &reqwest::Client,
    system: &str,
    user: &str,
) -> Result<String, GenericError> {
    let api_key = env::var("ANTHROPIC_API_KEY")
        .map_err(|_| "ANTHROPIC_API_KEY must be set")?;

    let body = serde_json::json!({
        "model": MODEL,
        "max_tokens": MAX_TOKENS,
        "tools": [{
            "type": "web_search_20250305",
            "name": "web_search"
        }],
        "system": system,
        "messages": [{
            "role": "user",
            "content": user
        }]
    });

    let resp = client
        .post(ANTHROPIC_API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let err_body = resp.text().await.unwrap_or_default();
        return Err(format!("API error ({}): {}", status, err_body).into());
    }

    let v: serde_json::Value = resp.json().await?;
    let blocks = v["content"]
        .as_array()
        .ok_or("no content blocks in API response")?;

    // Text blocks concatenate in order; tool-use blocks are skipped.
    let mut digest = String::new();
    for block in blocks {
        if block["type"] == "text" {
            if let Some(text) = block["text"].as_str() {
                digest.push_str(text);
            }
        }
    }

    if digest.is_empty() {
        return Err("API response contained no text blocks".into());
    }
    Ok(digest)
}

// Best-effort scrape of the free-form digest for memory entries. Bold lines
// longer than 20 characters are treated as article titles; this is a lossy,
// non-authoritative index, never a reason to fail the run.
fn extract_reviewed_titles(text: &str) -> Vec<String> {
    let mut titles = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("**") {
            if let Some((title, _)) = rest.split_once("**") {
                if title.len() > 20 {
                    titles.push(title.to_string());
                }
            }
        }
    }
    titles
}

fn extract_reviewed_dois(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.to_lowercase().contains("doi.org") || line.contains("DOI:"))
        .map(|line| line.trim().to_string())
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    dotenv().ok();

    let ctx = RunContext::new(Local::now());
    println!("Generating bi-weekly literature digest for {}...", ctx.date_range);
    println!(
        "Date range: {} to {}",
        ctx.start.format("%Y-%m-%d"),
        ctx.today.format("%Y-%m-%d")
    );

    let client = reqwest::Client::new();

    let memory_path = Path::new(MEMORY_FILE);
    let mut memory = store::MemoryRecord::load(memory_path)?;

    let previously_reviewed = prompts::exclusion_list(&memory.reviewed_titles);
    let system = prompts::format_system_prompt(&ctx, &previously_reviewed);
    let user = prompts::format_user_prompt(&ctx);

    let content = call_claude(&client, &system, &user).await?;
    println!("Digest generated successfully!");

    memory.reviewed_titles.extend(extract_reviewed_titles(&content));
    memory.reviewed_dois.extend(extract_reviewed_dois(&content));
    memory.last_run = Some(ctx.generated_at.clone());
    memory.save(memory_path)?;

    let record = store::DigestRecord {
        date: ctx.file_date.clone(),
        date_range: ctx.date_range.clone(),
        generated_at: ctx.generated_at.clone(),
        content,
    };
    store::save_digest(Path::new(DIGEST_DIR), &record)?;

    let manifest = store::append_manifest(
        Path::new(MANIFEST_FILE),
        store::ManifestEntry {
            date: record.date.clone(),
            date_range: record.date_range.clone(),
            generated: ctx.today_display.clone(),
        },
    )?;
    println!("Updated archive manifest");

    let site_dir = Path::new(SITE_DIR);
    std::fs::write(site_dir.join("index.html"), page::build_index_page(&record, &ctx))?;
    println!("Updated {}/index.html", SITE_DIR);
    std::fs::write(site_dir.join("archive.html"), page::build_archive_page(&manifest))?;
    println!("Updated {}/archive.html", SITE_DIR);

    println!("\n{}", "=".repeat(50));
    println!("Downloading open access PDFs...");
    println!("{}", "=".repeat(50));
    let pdf_root = env::var("PDF_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_PDF_DIR.to_string());
    let downloaded = pdf::harvest(&client, &record.content, Path::new(&pdf_root), &ctx).await?;
    println!("\nDownloaded {} PDFs", downloaded.len());

    println!("\n✅ Bi-weekly digest generation complete!");
    Ok(())
}
