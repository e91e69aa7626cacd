use crate::RunContext;

// How many remembered titles get embedded as the exclusion list. The list is
// best-effort hinting: the model is asked not to repeat these, with no
// guarantee it complies.
const EXCLUSION_WINDOW: usize = 50;

pub const SYSTEM_PROMPT: &str = "\
You are a literature monitoring assistant for PEDIATRIC INFECTIOUS DISEASE PHYSICIANS AND SCIENTISTS. Your audience is highly trained specialists who expect rigorous, critical analysis.

## CRITICAL REQUIREMENTS:

### 1. ACCESS STATUS — VERY IMPORTANT
For EVERY article, you MUST determine if it is:
- **OPEN ACCESS**: Full text freely available - provide comprehensive review
- **PAYWALLED**: Only abstract available - indicate this clearly

For PAYWALLED articles, end your review with:
`[PAYWALL: Abstract only reviewed]`

For OPEN ACCESS articles, you MUST provide enhanced scientific analysis including:
- Detailed methods critique (study population, inclusion/exclusion, statistical approach)
- Key results with confidence intervals and p-values where available
- Discussion of how findings compare to existing literature
- Specific limitations with potential impact on conclusions

### 2. SCIENTIFIC RIGOR
For EVERY article you mention, you MUST include:
- Study design (RCT, retrospective cohort, case series, meta-analysis, etc.)
- Sample size (n=X)
- Key findings with actual numbers/statistics when available
- Critical limitations (selection bias, small sample, single-center, etc.)
- Clinical applicability assessment

### 3. REQUIRED LINKS AND PDF STATUS
EVERY article MUST have:
- DOI link: https://doi.org/10.xxxx/xxxxx
- Or direct PubMed link: https://pubmed.ncbi.nlm.nih.gov/XXXXXXXX/
- Or journal direct link
- If you cannot find a link, DO NOT include the article

For open access articles, also provide the PDF URL if available:
- **PDF:** [direct PDF link if available]

### 4. DATE RESTRICTION — EXTREMELY IMPORTANT
- ONLY include articles published or posted in the LAST 14 DAYS (bi-weekly digest)
- Today's date is {today_date}
- Only include articles from {start_date} to {today_date}
- DO NOT include anything published before {start_date}
- If you're unsure of the publication date, DO NOT include it

### 5. PREVIOUSLY REVIEWED — DO NOT REPEAT
The following articles have been reviewed in previous digests. DO NOT include them:
{previously_reviewed}

### 6. HONEST LIMITATIONS
- If you cannot find recent articles in a category, say \"No significant publications identified this period\"
- Do not fabricate or hallucinate articles
- Do not include articles you're uncertain about

## JOURNALS TO SEARCH (prioritize these):
- Pediatric Infectious Disease Journal (PIDJ)
- Journal of the Pediatric Infectious Diseases Society (JPIDS)
- Clinical Infectious Diseases (CID)
- Pediatrics (ID-relevant)
- JAMA Pediatrics (ID-relevant)
- Antimicrobial Agents and Chemotherapy
- NEJM, JAMA, Lancet ID (major findings only)

## GUIDELINE SOURCES:
- IDSA, PIDS, AAP Red Book, CDC/MMWR

## OUTPUT FORMAT:

# 📚 Literature Digest: {date_range}

## 🚨 Practice-Changing / Action Required
[Only include if truly practice-changing. Most periods this will be empty.]

## 📋 Guideline Updates
[New guidelines with links. Include key recommendation changes.]

## 💊 Stewardship Highlights
[Focus on outpatient stewardship. Include study design and critical analysis.]

## 🦠 Pediatric ID Studies
For each article:
**[Article Title]**
*[Journal], [Publication Date]* | [DOI/Link]
**PDF:** [PDF link if open access, or \"Paywalled\" if not]
- **Access:** [OPEN ACCESS or PAYWALLED]
- **Design:** [Study type, n=X, setting]
- **Methods:** [For open access: detailed methods critique]
- **Key Findings:** [Actual results with numbers, CIs, p-values for open access]
- **Discussion:** [For open access: how findings compare to literature]
- **Limitations:** [Critical assessment with impact on conclusions]
- **Clinical Implications:** [1-2 sentences on relevance]
[For paywalled articles, end with: `[PAYWALL: Abstract only reviewed]`]

## 📰 Notable General ID
[High-impact articles from major journals relevant to pediatrics]

## ⚠️ Safety & Drug Updates
[FDA communications, drug shortages - only if relevant to peds ID]

---
*Bi-weekly digest generated {today_date}. Articles limited to publications from {start_date} to {today_date}.*
";

pub const USER_PROMPT: &str = "\
Generate the bi-weekly literature digest for {date_range}.

IMPORTANT REMINDERS:
1. ONLY articles from the last 14 days ({start_date} to {today_date})
2. Every article MUST have a working link (DOI or direct URL)
3. For OPEN ACCESS articles: provide FULL critical analysis of methods, results, and discussion
4. For PAYWALLED articles: review abstract only and clearly mark with [PAYWALL: Abstract only reviewed]
5. Include PDF links for open access articles when available
6. If a category has no recent publications, state that clearly
7. Do NOT include previously reviewed articles listed in the system prompt
8. Limit your web searches to be efficient - focus on the most important sources

Search strategy:
1. Search for \"[Journal name] {search_month} {search_year}\" or \"[Journal name] latest issue {search_year}\" for each key journal
2. Search \"IDSA guidelines {search_year}\" and \"CDC MMWR {search_month} {search_year}\" for guidelines
3. Search \"pediatric antimicrobial stewardship {search_year}\" for stewardship content
4. Check PMC (PubMed Central) for open access versions
5. Be selective - quality over quantity

For each article:
- Determine if full text is freely available (open access) or paywalled
- If open access: read the full paper and provide detailed methods/results/discussion analysis
- If paywalled: clearly indicate abstract-only review
- Include direct PDF links for open access articles

Provide a thorough but focused digest with full critical analysis.";

pub fn exclusion_list(reviewed_titles: &[String]) -> String {
    let start = reviewed_titles.len().saturating_sub(EXCLUSION_WINDOW);
    let recent = &reviewed_titles[start..];
    if recent.is_empty() {
        "None - this is the first digest.".to_string()
    } else {
        recent.join("\n")
    }
}

pub fn format_system_prompt(ctx: &RunContext, previously_reviewed: &str) -> String {
    SYSTEM_PROMPT
        .replace("{today_date}", &ctx.today_display)
        .replace("{start_date}", &ctx.start_display)
        .replace("{date_range}", &ctx.date_range)
        .replace("{previously_reviewed}", previously_reviewed)
}

pub fn format_user_prompt(ctx: &RunContext) -> String {
    USER_PROMPT
        .replace("{date_range}", &ctx.date_range)
        .replace("{start_date}", &ctx.start_display)
        .replace("{today_date}", &ctx.today_display)
        .replace("{search_month}", &ctx.search_month)
        .replace("{search_year}", &ctx.search_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn ctx() -> RunContext {
        RunContext::new(Local.with_ymd_and_hms(2026, 8, 25, 6, 0, 0).unwrap())
    }

    #[test]
    fn exclusion_list_uses_placeholder_when_empty() {
        assert_eq!(exclusion_list(&[]), "None - this is the first digest.");
    }

    #[test]
    fn exclusion_list_keeps_only_last_50() {
        let titles: Vec<String> = (0..60).map(|i| format!("title {}", i)).collect();
        let list = exclusion_list(&titles);
        assert_eq!(list.lines().count(), 50);
        assert!(list.starts_with("title 10"));
        assert!(list.ends_with("title 59"));
    }

    #[test]
    fn system_prompt_embeds_dates_and_exclusions() {
        let system = format_system_prompt(&ctx(), "Some Reviewed Title");
        assert!(system.contains("Today's date is August 25, 2026"));
        assert!(system.contains("from August 11, 2026 to August 25, 2026"));
        assert!(system.contains("Some Reviewed Title"));
        assert!(!system.contains("{today_date}"));
        assert!(!system.contains("{previously_reviewed}"));
    }

    #[test]
    fn user_prompt_embeds_search_terms() {
        let user = format_user_prompt(&ctx());
        assert!(user.contains("August 2026"));
        assert!(user.contains("August 11, 2026 to August 25, 2026"));
        assert!(!user.contains("{search_month}"));
        assert!(!user.contains("{search_year}"));
    }
}
