//! HTML preview document generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use quizform_core::model::{FormSelection, Subject};
use quizform_core::render::{html_escape, render_problem_set};

use crate::saved::SavedSet;

fn subject_label(subject: Subject) -> &'static str {
    match subject {
        Subject::Math => "数学",
        Subject::English => "英語",
    }
}

/// Generate a complete preview page for a saved problem set.
pub fn generate_page(saved: &SavedSet) -> String {
    let settings = &saved.settings;
    let title = format!(
        "{} - {} - {}",
        subject_label(settings.subject),
        settings.grade,
        settings.unit
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(&title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} 問 | 生成日時 {}</p>\n",
        saved.problem_set.len(),
        saved.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str(&settings_table(settings));

    // Preview
    html.push_str("<section id=\"preview\" class=\"preview\">\n");
    html.push_str("<h2>プレビュー</h2>\n");
    html.push_str(&render_problem_set(&saved.problem_set));
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn settings_table(settings: &FormSelection) -> String {
    let mut rows: Vec<(&str, String)> = vec![
        ("教科", subject_label(settings.subject).to_string()),
        ("学年", settings.grade.clone()),
        ("単元", settings.unit.clone()),
        ("問題形式", settings.problem_type.clone()),
        ("問題数", settings.count.to_string()),
        ("難易度", settings.difficulty.clone()),
    ];
    if let Some(paragraphs) = settings.paragraph_count {
        rows.push(("段落数", paragraphs.to_string()));
    }
    if settings.options.calculation_only == Some(true) {
        rows.push(("オプション", "計算問題のみ".to_string()));
    }
    if settings.options.word_problems == Some(true) {
        rows.push(("オプション", "文章問題を含める".to_string()));
    }
    if let Some(vocabulary) = &settings.options.vocabulary_list {
        rows.push(("指定単語", vocabulary.clone()));
    }

    let mut html = String::from("<section class=\"settings\">\n<table>\n<tbody>\n");
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            label,
            html_escape(&value)
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");
    html
}

/// Write a preview page to a file, creating parent directories.
pub fn write_page(saved: &SavedSet, path: &Path) -> Result<()> {
    let html = generate_page(saved);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --accent: #1d4ed8; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --accent: #93c5fd; --muted: #9ca3af; }
}
body { font-family: 'Hiragino Sans', 'Noto Sans JP', -apple-system, sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); line-height: 1.7; }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.4rem 1rem; text-align: left; }
th { background: var(--border); }
.reading-passage { border-left: 4px solid var(--accent); padding: 0.5rem 1rem; margin: 1rem 0; }
.problem { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; margin: 1rem 0; }
.problem-number { margin: 0 0 0.5rem; color: var(--accent); }
.choices { list-style: none; padding-left: 1rem; }
.choice-label { font-weight: bold; margin-right: 0.25rem; }
.answer { color: var(--accent); }
.explanation { background: var(--border); border-radius: 6px; padding: 0.5rem 1rem; }
.empty-message { color: var(--muted); font-style: italic; }
"#;
