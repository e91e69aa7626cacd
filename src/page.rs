use crate::render::markdown_to_html;
use crate::store::{ArchiveManifest, DigestRecord};
use crate::RunContext;

const SHARED_STYLES: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: 'Outfit', sans-serif;
            background: #fefdfb;
            color: #1a231b;
            line-height: 1.7;
            min-height: 100vh;
        }

        header {
            background: rgba(254, 253, 251, 0.9);
            border-bottom: 1px solid #e3e7e3;
            padding: 1rem 2rem;
            position: sticky;
            top: 0;
        }

        .header-content {
            max-width: 900px;
            margin: 0 auto;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }

        .logo-text { font-size: 1.25rem; font-weight: 600; color: #374839; }

        main { max-width: 900px; margin: 0 auto; padding: 2rem; }

        .page-header { text-align: center; margin-bottom: 2rem; }

        .page-header h1 {
            font-family: 'Source Serif 4', serif;
            font-size: 2.25rem;
            font-weight: 600;
            color: #2d3b2f;
            margin-bottom: 0.5rem;
        }

        .page-header p { color: #748c76; font-size: 1.05rem; }

        .digest-meta {
            display: flex;
            justify-content: center;
            gap: 2rem;
            margin-top: 1rem;
            font-size: 0.9rem;
            color: #748c76;
        }

        .digest-content {
            background: white;
            border: 1px solid #e3e7e3;
            border-radius: 20px;
            padding: 2.5rem;
        }

        .digest-content h1 {
            font-family: 'Source Serif 4', serif;
            font-size: 1.75rem;
            color: #2d3b2f;
            margin-bottom: 1.5rem;
            padding-bottom: 1rem;
            border-bottom: 2px solid #e3e7e3;
        }

        .digest-content h2 {
            font-size: 1.2rem;
            color: #374839;
            margin-top: 2.5rem;
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 1px solid #e3e7e3;
        }

        .digest-content h3 { font-size: 1.05rem; color: #435a46; margin-top: 1.5rem; }
        .digest-content h4 { font-size: 0.95rem; color: #435a46; margin-top: 1.25rem; }
        .digest-content p { margin-bottom: 1rem; }
        .digest-content ul, .digest-content ol { margin-bottom: 1rem; padding-left: 1.5rem; }
        .digest-content li { margin-bottom: 0.5rem; }
        .digest-content a { color: #9d8cb8; text-decoration: none; word-break: break-word; }
        .digest-content a:hover { text-decoration: underline; }
        .digest-content strong { color: #374839; }
        .digest-content em { color: #567159; }

        .digest-content blockquote {
            border-left: 3px solid #9d8cb8;
            padding-left: 1rem;
            margin: 1rem 0;
            color: #567159;
            font-style: italic;
        }

        .digest-content hr { border: none; border-top: 1px solid #e3e7e3; margin: 2rem 0; }

        .paywall-notice {
            color: #c41e3a;
            font-weight: 600;
            font-size: 0.9rem;
            background: rgba(196, 30, 58, 0.08);
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            display: inline-block;
            margin-top: 0.5rem;
        }

        .open-access-badge {
            color: #2e7d32;
            font-weight: 600;
            font-size: 0.85rem;
            background: rgba(46, 125, 50, 0.1);
            padding: 0.2rem 0.5rem;
            border-radius: 4px;
            display: inline-block;
        }

        .archive-link {
            text-align: center;
            margin-top: 2rem;
            padding-top: 1.5rem;
            border-top: 1px solid #e3e7e3;
        }

        .archive-link a { color: #9d8cb8; text-decoration: none; font-weight: 500; }
        .archive-link a:hover { text-decoration: underline; }

        .archive-list { list-style: none; }

        .archive-list li {
            background: white;
            border: 1px solid #e3e7e3;
            border-radius: 12px;
            padding: 1rem 1.5rem;
            margin-bottom: 0.75rem;
            display: flex;
            justify-content: space-between;
        }

        .archive-list .generated { color: #748c76; font-size: 0.9rem; }

        footer {
            max-width: 900px;
            margin: 3rem auto 0;
            padding: 2rem;
            text-align: center;
            color: #748c76;
            font-size: 0.9rem;
            border-top: 1px solid #e3e7e3;
        }
"#;

pub fn build_index_page(record: &DigestRecord, ctx: &RunContext) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Literature Monitor | Sage Project</title>
    <style>{styles}    </style>
</head>
<body>
    <header>
        <div class="header-content">
            <a href="../index.html">← Back to Dashboard</a>
            <span class="logo-text">Sage</span>
        </div>
    </header>

    <main>
        <div class="page-header">
            <h1>Bi-Weekly Literature Digest</h1>
            <p>Critical analysis for pediatric ID specialists</p>
            <div class="digest-meta">
                <span>{date_range}</span>
                <span>Updated {updated}</span>
            </div>
        </div>

        <div class="digest-content" id="digestContent">
            {content}
        </div>

        <div class="archive-link">
            <a href="archive.html">View Past Digests →</a>
        </div>
    </main>

    <footer>
        <p>Sage Project · Literature Monitor · Automated bi-weekly with critical analysis for ID specialists</p>
    </footer>
</body>
</html>"#,
        styles = SHARED_STYLES,
        date_range = record.date_range,
        updated = ctx.updated_display,
        content = markdown_to_html(&record.content),
    )
}

pub fn build_archive_page(manifest: &ArchiveManifest) -> String {
    let mut items = String::new();
    for entry in &manifest.digests {
        items.push_str(&format!(
            "            <li><a href=\"digests/{date}.json\">{range}</a><span class=\"generated\">generated {generated}</span></li>\n",
            date = entry.date,
            range = entry.date_range,
            generated = entry.generated,
        ));
    }
    if items.is_empty() {
        items.push_str("            <li>No digests archived yet.</li>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Digest Archive | Sage Project</title>
    <style>{styles}    </style>
</head>
<body>
    <header>
        <div class="header-content">
            <a href="index.html">← Latest Digest</a>
            <span class="logo-text">Sage</span>
        </div>
    </header>

    <main>
        <div class="page-header">
            <h1>Past Digests</h1>
            <p>Most recent first, up to one year of history</p>
        </div>

        <ul class="archive-list">
{items}        </ul>
    </main>

    <footer>
        <p>Sage Project · Literature Monitor</p>
    </footer>
</body>
</html>"#,
        styles = SHARED_STYLES,
        items = items,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ManifestEntry;
    use chrono::{Local, TimeZone};

    fn ctx() -> RunContext {
        RunContext::new(Local.with_ymd_and_hms(2026, 8, 25, 6, 30, 0).unwrap())
    }

    fn record() -> DigestRecord {
        DigestRecord {
            date: "2026-08-25".into(),
            date_range: "August 11 - August 25, 2026".into(),
            generated_at: "2026-08-25T06:30:00+00:00".into(),
            content: "# 📚 Literature Digest\n\n**Bold** and *italic*".into(),
        }
    }

    #[test]
    fn index_page_embeds_rendered_digest() {
        let page = build_index_page(&record(), &ctx());
        assert!(page.contains("<!DOCTYPE html>"));
        assert!(page.contains("August 11 - August 25, 2026"));
        assert!(page.contains("<strong>Bold</strong> and <em>italic</em>"));
        assert!(page.contains(".paywall-notice"));
        assert!(page.contains(".open-access-badge"));
        assert!(page.contains("archive.html"));
    }

    #[test]
    fn archive_page_lists_entries_in_order() {
        let manifest = ArchiveManifest {
            digests: vec![
                ManifestEntry {
                    date: "2026-08-25".into(),
                    date_range: "August 11 - August 25, 2026".into(),
                    generated: "August 25, 2026".into(),
                },
                ManifestEntry {
                    date: "2026-08-11".into(),
                    date_range: "July 28 - August 11, 2026".into(),
                    generated: "August 11, 2026".into(),
                },
            ],
        };
        let page = build_archive_page(&manifest);
        let newest = page.find("digests/2026-08-25.json").unwrap();
        let older = page.find("digests/2026-08-11.json").unwrap();
        assert!(newest < older);
    }

    #[test]
    fn archive_page_handles_empty_manifest() {
        let page = build_archive_page(&ArchiveManifest::default());
        assert!(page.contains("No digests archived yet."));
    }
}
