//! The prompt form page.

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
input[type=text]{width:100%;padding:.4rem}\
.answer{margin-top:1rem;padding:.6rem;background:#f3f6f3}";

/// Render the form, optionally with the previous question and its answer.
pub fn prompt_page(input: Option<&str>, output: Option<&str>) -> String {
    let value = input.map(escape_html).unwrap_or_default();
    let answer = output
        .map(|o| format!("<p class=\"answer\">{}</p>", escape_html(o)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Carbon intensity</title>\
         <style>{STYLE}</style></head><body>\
         <h1>Ask about carbon intensity</h1>\
         <form action=\"/process_prompt/\" method=\"get\">\
         <input type=\"text\" name=\"prompt\" value=\"{value}\" placeholder=\"What was the average in May 2020?\">\
         <button type=\"submit\">Ask</button></form>{answer}</body></html>\n"
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
