//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Render a countdown as `m:ss`, the way the quiz header shows it.
pub fn format_clock(seconds: u32) -> String {
  format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Whole-percent accuracy, rounded. 0 when nothing was asked.
pub fn accuracy_pct(score: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((score as f64 / total as f64) * 100.0).round() as u32
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}
