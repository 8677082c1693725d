//! Prompt assembly for the generation service.
//!
//! Turns a [`SiteBrief`] (and, for round 2, an existing snapshot) into the
//! input contract the generation service expects. The output contract is
//! always the same: a JSON array of `{file_name, file_content}` objects.

use std::fmt::Write;

use crate::ports::generator::SiteBrief;
use crate::snapshot::FileContext;

/// System prompt for fresh generation.
pub const GENERATION_SYSTEM_PROMPT: &str = "\
You are a senior developer producing static websites ready to deploy on \
GitHub Pages. From the task brief and optional attachments, create every \
file needed for deployment, including at least an index.html and a \
README.md (project summary, GitHub Pages setup steps, usage guide, file \
overview, MIT license section; restate the provided brief under a 'main \
goal' heading). Attachments are first-class project assets: embed them as \
data: URIs rather than relative file references. Treat every entry in the \
checks section as a requirement; checks beginning with `js:` are JavaScript \
expressions that must evaluate to true when the finished page runs in a \
browser, so implement whatever DOM structure, computed values, or script \
includes they demand. Return only a JSON array of objects, each with a \
\"file_name\" string and a \"file_content\" string — no explanations, no \
surrounding text.";

/// System prompt for round-2 modification.
pub const MODIFICATION_SYSTEM_PROMPT: &str = "\
You are a developer making targeted modifications to an existing static \
website. Apply the principle of minimal change: alter only what the brief \
requires, never refactor unrelated code, and never add or remove files \
unless the brief explicitly says so. Your output MUST contain the complete \
content of every original file, including the ones you did not touch — the \
project is republished wholesale from your answer, so an omitted file is a \
deleted file. Every check listed must pass; checks beginning with `js:` are \
JavaScript expressions that must evaluate to true in the browser. The \
result must remain deployable as-is on GitHub Pages with no server-side \
logic or build step. Return only a JSON array of objects, each with a \
\"file_name\" string and a \"file_content\" string.";

/// Attachment URLs are long data URIs more often than not; the model only
/// needs enough of each to recognize the asset.
const ATTACHMENT_URL_PREVIEW: usize = 80;

fn attachments_section(brief: &SiteBrief) -> String {
    if brief.attachments.is_empty() {
        return "(no attachments were provided with the request)".to_string();
    }
    let mut section = String::from("Attachments:\n");
    for attachment in &brief.attachments {
        let preview: String = attachment.url.chars().take(ATTACHMENT_URL_PREVIEW).collect();
        let ellipsis = if attachment.url.chars().count() > ATTACHMENT_URL_PREVIEW {
            "..."
        } else {
            ""
        };
        let _ = writeln!(section, "- {}: {preview}{ellipsis}", attachment.name);
    }
    section
}

fn checks_section(brief: &SiteBrief) -> String {
    if brief.checks.is_empty() {
        return "(no explicit checks provided)".to_string();
    }
    brief
        .checks
        .iter()
        .map(|check| format!("- {check}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the round-1 user prompt from the brief, attachments, and checks.
#[must_use]
pub fn generation_prompt(brief: &SiteBrief) -> String {
    format!(
        "Generate a complete static website project deployable on GitHub Pages.\n\n\
         Brief: {}\n\n\
         {}\n\
         Checks to be satisfied:\n{}\n",
        brief.brief,
        attachments_section(brief),
        checks_section(brief),
    )
}

/// Builds the round-2 user prompt embedding every existing file verbatim.
#[must_use]
pub fn modification_prompt(existing: &[FileContext], brief: &SiteBrief) -> String {
    let mut files = String::new();
    for file in existing {
        let _ = write!(
            files,
            "--- START FILE: {name} ---\n{content}\n--- END FILE: {name} ---\n\n",
            name = file.file_name,
            content = file.file_content,
        );
    }
    format!(
        "Modify the following web project so it satisfies the brief and passes \
         every acceptance check.\n\n\
         Brief: {}\n\n\
         {}\n\
         Acceptance checks (all must pass):\n{}\n\n\
         Project files:\n\n{}\
         Return the complete list of all project files in the required format.\n",
        brief.brief,
        attachments_section(brief),
        checks_section(brief),
        files,
    )
}

#[cfg(test)]
mod tests {
    use super::{generation_prompt, modification_prompt};
    use crate::ports::generator::SiteBrief;
    use crate::snapshot::FileContext;
    use crate::task::Attachment;

    fn brief_with(attachments: Vec<Attachment>, checks: Vec<String>) -> SiteBrief {
        SiteBrief { brief: "a bakery landing page".into(), attachments, checks }
    }

    #[test]
    fn generation_prompt_mentions_missing_attachments_and_checks() {
        let prompt = generation_prompt(&brief_with(vec![], vec![]));
        assert!(prompt.contains("a bakery landing page"));
        assert!(prompt.contains("no attachments were provided"));
        assert!(prompt.contains("no explicit checks provided"));
    }

    #[test]
    fn generation_prompt_truncates_long_attachment_urls() {
        let data_uri = format!("data:image/png;base64,{}", "A".repeat(500));
        let attachment = Attachment { name: "logo.png".into(), url: data_uri };
        let prompt = generation_prompt(&brief_with(vec![attachment], vec![]));
        assert!(prompt.contains("logo.png"));
        assert!(prompt.contains("..."));
        assert!(!prompt.contains(&"A".repeat(100)));
    }

    #[test]
    fn generation_prompt_lists_checks() {
        let checks = vec!["js: document.title === 'Bakery'".to_string()];
        let prompt = generation_prompt(&brief_with(vec![], checks));
        assert!(prompt.contains("- js: document.title === 'Bakery'"));
    }

    #[test]
    fn modification_prompt_embeds_every_file() {
        let existing = vec![
            FileContext { file_name: "index.html".into(), file_content: "<html/>".into() },
            FileContext { file_name: "app.js".into(), file_content: "let x = 1;".into() },
        ];
        let prompt = modification_prompt(&existing, &brief_with(vec![], vec![]));
        assert!(prompt.contains("--- START FILE: index.html ---"));
        assert!(prompt.contains("let x = 1;"));
        assert!(prompt.contains("--- END FILE: app.js ---"));
    }
}
