//! HTML page returned by the callback to hand the token to the window that opened the popup.

use serde_json::{json, Value};

/// Serialize `value` for embedding inside an inline `<script>` element.
///
/// The characters escaped here only ever occur inside JSON strings, where the `\uXXXX`
/// form is equivalent, so the result still parses to the same value.
fn script_json(value: &Value) -> String {
    let mut escaped = String::new();
    for c in value.to_string().chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the page that posts `{type: 'authorization', token, user}` to `window.opener`
/// on `target_origin` and closes itself.
pub(crate) fn render(token: &str, user: &Value, target_origin: &str) -> String {
    let message = json!({
        "type": "authorization",
        "token": token,
        "user": user,
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Authorization complete</title>
</head>
<body>
<p>Authorization complete. This window will close automatically.</p>
<script>
(function () {{
  var message = {message};
  if (window.opener) {{
    window.opener.postMessage(message, {origin});
  }}
  window.close();
}})();
</script>
</body>
</html>
"#,
        message = script_json(&message),
        origin = script_json(&Value::String(target_origin.to_string())),
    )
}
