//! Local previews for markup languages. Nothing is executed; the buffer is
//! wrapped into a standalone HTML document that a browser can open.

use crate::language::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub language: Language,
    pub html: String,
}

pub fn html_preview(code: &str) -> PreviewDocument {
    PreviewDocument {
        language: Language::Html,
        html: code.to_string(),
    }
}

/// Embed a stylesheet into a sample page with a few common elements.
pub fn css_preview(code: &str) -> PreviewDocument {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CSS Preview</title>
    <style>
{}
    </style>
</head>
<body>
    <h1>CSS Preview</h1>
    <p>This is a sample paragraph to demonstrate your CSS styles.</p>
    <div class="sample-div">Sample div element</div>
    <button>Sample button</button>
    <ul>
        <li>List item 1</li>
        <li>List item 2</li>
        <li>List item 3</li>
    </ul>
</body>
</html>
"#,
        code
    );
    PreviewDocument {
        language: Language::Css,
        html,
    }
}
