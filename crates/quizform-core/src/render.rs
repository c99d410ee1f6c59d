//! Markup builders for the preview, the unit selector, and the editor.
//!
//! Everything here is a pure function of its input. Problem text comes from
//! an external generation service, so every text field is escaped before it
//! is inserted; nothing it contains is ever interpreted as markup.

use crate::edit::{EditField, EditSession, PASSAGE_FIELD};
use crate::model::{Problem, ProblemSet};
use crate::units::UnitOptions;

/// Shown instead of an empty container when a set has no problems.
pub const EMPTY_MESSAGE: &str = "問題が生成されませんでした。条件を変えて再度お試しください。";

pub const UNIT_LOADING: &str = "読み込み中...";
pub const UNIT_PLACEHOLDER: &str = "単元を選択してください";
pub const UNIT_FAILED: &str = "単元の取得に失敗しました";
pub const UNIT_IDLE: &str = "先に教科と学年を選択してください";

/// Escape a string for safe HTML insertion (text and attribute values).
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape, then keep the author's line breaks.
fn escape_multiline(s: &str) -> String {
    html_escape(s).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Letter label for a choice position: A, B, ..., Z, AA, AB, ...
pub fn choice_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Render a problem set for preview.
pub fn render_problem_set(set: &ProblemSet) -> String {
    let mut html = String::new();

    if let Some(passage) = set.passage() {
        html.push_str("<section class=\"reading-passage\">\n");
        html.push_str("<h3>長文</h3>\n");
        html.push_str(&format!("<p>{}</p>\n", escape_multiline(passage)));
        html.push_str("</section>\n");
    }

    if set.is_empty() {
        html.push_str(&format!("<p class=\"empty-message\">{}</p>\n", EMPTY_MESSAGE));
        return html;
    }

    html.push_str("<div class=\"problem-set\">\n");
    for (index, problem) in set.problems().iter().enumerate() {
        render_problem(&mut html, index + 1, problem);
    }
    html.push_str("</div>\n");
    html
}

fn render_problem(html: &mut String, number: usize, problem: &Problem) {
    html.push_str(&format!(
        "<div class=\"problem\" data-problem-id=\"{}\">\n",
        problem.id
    ));
    html.push_str(&format!("<h4 class=\"problem-number\">問{number}</h4>\n"));
    html.push_str(&format!(
        "<p class=\"question\">{}</p>\n",
        escape_multiline(&problem.question)
    ));

    if let Some(choices) = problem.choices.as_ref().filter(|c| !c.is_empty()) {
        html.push_str("<ul class=\"choices\">\n");
        for (i, choice) in choices.iter().enumerate() {
            html.push_str(&format!(
                "<li><span class=\"choice-label\">({})</span> {}</li>\n",
                choice_label(i),
                html_escape(choice)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(&format!(
        "<p class=\"answer\"><strong>解答:</strong> {}</p>\n",
        escape_multiline(&problem.answer)
    ));

    if let Some(explanation) = problem.explanation.as_deref().filter(|e| !e.is_empty()) {
        html.push_str(&format!(
            "<div class=\"explanation\"><strong>解説:</strong> {}</div>\n",
            escape_multiline(explanation)
        ));
    }

    html.push_str("</div>\n");
}

/// Render the `<option>` list of the unit selector.
///
/// A populated list always starts with an empty-valued "please select"
/// entry so that no unit is chosen implicitly.
pub fn render_unit_options(options: &UnitOptions) -> String {
    let placeholder = |label: &str| format!("<option value=\"\">{}</option>\n", label);
    match options {
        UnitOptions::Idle => placeholder(UNIT_IDLE),
        UnitOptions::Loading => placeholder(UNIT_LOADING),
        UnitOptions::Failed => placeholder(UNIT_FAILED),
        UnitOptions::Populated(units) => {
            let mut html = placeholder(UNIT_PLACEHOLDER);
            for unit in units {
                let escaped = html_escape(unit);
                html.push_str(&format!("<option value=\"{escaped}\">{escaped}</option>\n"));
            }
            html
        }
    }
}

/// Render the editor modal body: one pre-filled block per problem.
pub fn render_edit_form(session: &EditSession) -> String {
    let mut html = String::from("<form class=\"edit-form\">\n");

    if let Some(passage) = session.passage() {
        html.push_str("<div class=\"edit-passage\">\n");
        html.push_str(&format!("<label for=\"edit-{PASSAGE_FIELD}\">長文</label>\n"));
        html.push_str(&format!(
            "<textarea id=\"edit-{PASSAGE_FIELD}\" name=\"{PASSAGE_FIELD}\" rows=\"8\">{}</textarea>\n",
            html_escape(passage)
        ));
        html.push_str("</div>\n");
    }

    for (index, block) in session.blocks().iter().enumerate() {
        let id = block.id;
        html.push_str(&format!("<div class=\"edit-block\" data-problem-id=\"{id}\">\n"));
        html.push_str(&format!("<h4>問{}</h4>\n", index + 1));

        textarea(&mut html, "問題文", EditField::Question, id, &block.question, 3);
        if let Some(choices) = &block.choices {
            textarea(
                &mut html,
                "選択肢（1行に1つ）",
                EditField::Choices,
                id,
                choices,
                4,
            );
        }

        let name = format!("{}-{id}", EditField::Answer.prefix());
        html.push_str(&format!("<label for=\"edit-{name}\">解答</label>\n"));
        html.push_str(&format!(
            "<input type=\"text\" id=\"edit-{name}\" name=\"{name}\" value=\"{}\">\n",
            html_escape(&block.answer)
        ));

        textarea(
            &mut html,
            "解説",
            EditField::Explanation,
            id,
            &block.explanation,
            3,
        );
        html.push_str("</div>\n");
    }

    html.push_str("</form>\n");
    html
}

fn textarea(html: &mut String, label: &str, field: EditField, id: u32, value: &str, rows: u32) {
    let name = format!("{}-{id}", field.prefix());
    html.push_str(&format!("<label for=\"edit-{name}\">{label}</label>\n"));
    html.push_str(&format!(
        "<textarea id=\"edit-{name}\" name=\"{name}\" rows=\"{rows}\">{}</textarea>\n",
        html_escape(value)
    ));
}
