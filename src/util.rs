//! Small utility helpers used across modules.

/// Option labels for `n` slots: "A", "B", ... Capped at 26.
pub fn option_labels(n: usize) -> Vec<String> {
  (b'A'..=b'Z').take(n).map(|b| char::from(b).to_string()).collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole prompts or model outputs.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_follow_alphabet() {
    assert_eq!(option_labels(5), vec!["A", "B", "C", "D", "E"]);
    assert!(option_labels(0).is_empty());
    assert_eq!(option_labels(40).len(), 26);
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("héllo world", 2);
    assert!(t.starts_with("h…"));
    assert!(t.ends_with("(12 bytes total)"));
  }
}
