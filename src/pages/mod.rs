//! Server-rendered HTML for the browser-facing routes.

use crate::questions::Question;

pub const SUMMARY_TEXT: &str = "Here's a summary of your progress so far: You've solved X problems, optimized Y solutions, and practiced Z edge cases.";

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; padding: 0 1rem; }
nav a { margin-right: 1rem; }
textarea { width: 100%; font-family: ui-monospace, monospace; }
.question-item { margin: 0.5rem 0; }
.difficulty { color: #666; font-size: 0.9em; margin-left: 0.5rem; }
pre.output { background: #f4f4f4; padding: 0.75rem; white-space: pre-wrap; }
";

const EDITOR_SCRIPT: &str = r#"
async function postJson(url, body) {
  const res = await fetch(url, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  return res.json();
}

function field(id) { return document.getElementById(id).value; }

async function runCode() {
  const out = document.getElementById("run-output");
  out.textContent = "Running...";
  const data = await postJson("/run_code", {
    code: field("code"),
    test_input: field("test-input"),
    expected_output: field("expected-output"),
  });
  if (data.error !== undefined) {
    out.textContent = "Error:\n" + data.error;
  } else {
    out.textContent = (data.correct ? "Correct!" : "Incorrect.") +
      "\nExpected: " + data.expected_output + "\nActual:   " + data.actual_output;
  }
}

async function askAi(endpoint) {
  const out = document.getElementById("ai-output");
  out.textContent = "Thinking...";
  const data = await postJson(endpoint, {
    query: field("query"),
    code: field("code"),
    problem_context: document.getElementById("problem-context").textContent,
  });
  out.textContent = data.error !== undefined ? "Error: " + data.error : data.response;
}
"#;

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<nav><a href=\"/\">Dashboard</a><a href=\"/about\">About Us</a><a href=\"/get_summary\">Progress</a></nav>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn dashboard(questions: &[Question]) -> String {
    let mut body = String::from("<h1>Dashboard</h1>\n<ul class=\"questions\">\n");
    for question in questions {
        body.push_str(&format!(
            "<li class=\"question-item\"><a href=\"/question/{}\">{}</a>",
            question.id,
            escape_html(&question.title)
        ));
        if let Some(difficulty) = &question.difficulty {
            body.push_str(&format!(
                "<span class=\"difficulty\">{}</span>",
                escape_html(difficulty)
            ));
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>");

    layout("Dashboard", &body)
}

pub fn editor(question: &Question) -> String {
    let (test_input, expected_output) = question
        .test_cases
        .first()
        .map(|case| (case.input.as_str(), case.expected_output.as_str()))
        .unwrap_or(("", ""));

    let mut body = format!(
        "<h1>Question {id}: {title}</h1>\n<div id=\"problem-context\" class=\"prompt\">{prompt}</div>\n",
        id = question.id,
        title = escape_html(&question.title),
        prompt = escape_html(&question.prompt),
    );

    body.push_str(&format!(
        "<h2>Your Code</h2>\n<textarea id=\"code\" rows=\"16\">{}</textarea>\n",
        escape_html(&question.starter_code)
    ));
    body.push_str(&format!(
        "<h2>Test</h2>\n<label>Test input (must set <code>result</code>)</label>\n<textarea id=\"test-input\" rows=\"3\">{}</textarea>\n<label>Expected output</label>\n<input id=\"expected-output\" value=\"{}\">\n",
        escape_html(test_input),
        escape_html(expected_output)
    ));
    body.push_str(
        "<button onclick=\"runCode()\">Run Code</button>\n<pre id=\"run-output\" class=\"output\"></pre>\n",
    );
    body.push_str(
        "<h2>Ask for Feedback</h2>\n<input id=\"query\" placeholder=\"Ask the recruiter or request a hint\">\n<button onclick=\"askAi('/ask_ai')\">Ask Recruiter</button>\n<button onclick=\"askAi('/request_help')\">Request Help</button>\n<pre id=\"ai-output\" class=\"output\"></pre>\n",
    );
    body.push_str("<script>");
    body.push_str(EDITOR_SCRIPT);
    body.push_str("</script>");

    layout(&question.title, &body)
}

pub fn about() -> String {
    layout(
        "About Us",
        "<h1>About Us</h1>\n<p>Practice coding interview problems, run your solution against test cases, and get feedback from an AI recruiter.</p>",
    )
}

pub fn summary() -> String {
    layout(
        "Progress Summary",
        &format!(
            "<h1>Progress Summary</h1>\n<p class=\"summary\">{}</p>",
            escape_html(SUMMARY_TEXT)
        ),
    )
}

pub fn not_found(message: &str) -> String {
    layout(
        "Not Found",
        &format!("<h1>{}</h1>", escape_html(message)),
    )
}
