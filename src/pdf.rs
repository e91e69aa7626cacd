use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{GenericError, RunContext};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const PAYWALL_SENTINEL: &str = "paywalled";

#[derive(Debug, Clone, PartialEq)]
pub struct PdfCandidate {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadedPdf {
    pub title: String,
    pub url: String,
    pub path: String,
}

// Articles in the digest are delimited by bold title lines; each block may
// carry a line-scoped "**PDF:**" field with the download URL or the
// "Paywalled" sentinel.
pub fn extract_candidates(text: &str) -> Vec<PdfCandidate> {
    let title_re = Regex::new(r"(?m)^\*\*([^*\n]+)\*\*\s*$").unwrap();
    let pdf_re = Regex::new(r"(?i)\*\*PDF:\*\*\s*\[?([^\]\s]+)\]?").unwrap();

    let matches: Vec<_> = title_re.captures_iter(text).collect();
    let mut candidates = Vec::new();

    for (i, caps) in matches.iter().enumerate() {
        let title = caps[1].trim().to_string();
        let block_start = caps.get(0).unwrap().end();
        let block_end = matches
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(text.len());
        let block = &text[block_start..block_end];

        if let Some(pdf_caps) = pdf_re.captures(block) {
            let url = pdf_caps[1].to_string();
            if !url.eq_ignore_ascii_case(PAYWALL_SENTINEL) {
                candidates.push(PdfCandidate { title, url });
            }
        }
    }

    candidates
}

pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .take(80)
        .collect();
    cleaned.trim().replace(' ', "_")
}

// One best-effort GET per URL. An existing file short-circuits before any
// network traffic so re-runs are idempotent.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    folder: &Path,
    title: &str,
) -> Result<PathBuf, GenericError> {
    let filename = format!("{}.pdf", sanitize_title(title));
    let filepath = folder.join(&filename);

    if filepath.exists() {
        println!("  Already exists: {}", filename);
        return Ok(filepath);
    }

    let response = client
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if content_type.contains("pdf") || url.ends_with(".pdf") {
        let bytes = response.bytes().await?;
        fs::write(&filepath, &bytes)?;
        println!("  Downloaded: {}", filename);
        Ok(filepath)
    } else {
        Err(format!("not a PDF (content-type: {}): {}", content_type, url).into())
    }
}

pub async fn harvest(
    client: &reqwest::Client,
    digest_text: &str,
    pdf_root: &Path,
    ctx: &RunContext,
) -> Result<Vec<DownloadedPdf>, GenericError> {
    let folder = pdf_root.join(&ctx.folder_range);
    fs::create_dir_all(&folder)?;
    println!("\nDownloading PDFs to: {}", folder.display());

    let mut downloaded = Vec::new();
    for candidate in extract_candidates(digest_text) {
        let short: String = candidate.title.chars().take(50).collect();
        println!("\nProcessing: {}...", short);

        match fetch(client, &candidate.url, &folder, &candidate.title).await {
            Ok(path) => downloaded.push(DownloadedPdf {
                title: candidate.title,
                url: candidate.url,
                path: path.display().to_string(),
            }),
            Err(e) => println!("  Failed to download {}: {}", candidate.url, e),
        }
    }

    if !downloaded.is_empty() {
        let manifest = serde_json::json!({
            "date_range": ctx.date_range,
            "generated": ctx.generated_at,
            "pdfs": downloaded,
        });
        let manifest_path = folder.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        println!("\nSaved manifest to {}", manifest_path.display());
    }

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIGEST: &str = "\
## Pediatric ID Studies\n\
**Ceftriaxone Dosing in Neonates: A Multicenter Cohort**\n\
*PIDJ, August 2026* | https://doi.org/10.1097/example\n\
**PDF:** [https://journals.example.org/ceftriaxone.pdf]\n\
- **Access:** OPEN ACCESS\n\
\n\
**Short**\n\
**PDF:** https://example.org/short.pdf\n\
\n\
**Paywalled Review of Empiric Antibiotics**\n\
*CID, August 2026* | https://doi.org/10.1093/example\n\
**PDF:** Paywalled\n\
- **Access:** PAYWALLED\n";

    #[test]
    fn extracts_title_url_pairs() {
        let candidates = extract_candidates(DIGEST);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].title,
            "Ceftriaxone Dosing in Neonates: A Multicenter Cohort"
        );
        assert_eq!(
            candidates[0].url,
            "https://journals.example.org/ceftriaxone.pdf"
        );
        assert_eq!(candidates[1].url, "https://example.org/short.pdf");
    }

    #[test]
    fn skips_paywalled_sentinel_any_case() {
        for sentinel in ["Paywalled", "paywalled", "PAYWALLED"] {
            let text = format!("**Some Blocked Article Title**\n**PDF:** {}\n", sentinel);
            assert!(extract_candidates(&text).is_empty());
        }
    }

    #[test]
    fn returns_empty_when_no_pdf_field() {
        let text = "**An Article Without A PDF Line**\n- **Access:** PAYWALLED\n";
        assert!(extract_candidates(text).is_empty());
    }

    #[test]
    fn sanitizes_titles_for_filesystem() {
        assert_eq!(
            sanitize_title("RSV: prophylaxis / outcomes?"),
            "RSV_prophylaxis__outcomes"
        );
        let long = "x".repeat(120);
        assert_eq!(sanitize_title(&long).len(), 80);
    }

    #[tokio::test]
    async fn fetch_skips_existing_file_without_network() {
        let tmp = TempDir::new().unwrap();
        let title = "Cached Article";
        fs::write(tmp.path().join("Cached_Article.pdf"), b"original bytes").unwrap();

        // The URL is unresolvable; the call can only succeed via the
        // already-exists path.
        let client = reqwest::Client::new();
        let path = fetch(
            &client,
            "https://host.invalid/cached.pdf",
            tmp.path(),
            title,
        )
        .await
        .unwrap();

        assert_eq!(path, tmp.path().join("Cached_Article.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"original bytes");
    }
}
