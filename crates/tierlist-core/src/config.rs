//! Injected bot configuration and user-facing message templates.

use serde::Deserialize;

use crate::review::MemberId;

/// Access rules, throttling, and texts shared by every command.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Role that marks a verified server member.
  pub verification_role_id:   u64,
  /// Roles that may not add or remove reviews.
  #[serde(default)]
  pub review_forbidden_roles: Vec<u64>,
  /// The privileged operator.
  pub admin_id:               MemberId,
  #[serde(default)]
  pub cooldown:               Cooldown,
  #[serde(default)]
  pub messages:               Messages,
}

/// Command quota per actor: `rate` commands per `per_secs` seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Cooldown {
  pub rate:     u32,
  pub per_secs: u64,
}

impl Default for Cooldown {
  fn default() -> Self { Self { rate: 5, per_secs: 20 } }
}

/// Every text shown to users. Templates may contain `{user}`, `{command}`,
/// or `{subjects}` placeholders, filled by [`fill`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Messages {
  pub review_format:              String,
  pub review_add_format:          String,
  pub review_tier:                String,
  pub review_wrong_subject:       String,
  pub review_added:               String,
  pub review_remove_format:       String,
  pub review_remove_format_admin: String,
  pub review_remove_id_format:    String,
  pub review_remove_success:      String,
  pub review_remove_error:        String,
  pub review_not_found:           String,
  pub review_not_on_server:       String,
  pub review_add_denied:          String,
  pub insufficient_rights:        String,
  pub reviews_page_e:             String,
  pub reviews_reaction_help:      String,
  pub reviews_none:               String,
  pub anonymous:                  String,
  pub subject_format:             String,
  pub subjects_added:             String,
  pub subjects_removed:           String,
  pub subject_update_error:       String,
  pub subject_update_success:     String,
  pub shortcut_format:            String,
  pub tierboard_help:             String,
  pub tierboard_missing_year:     String,
  pub rate_limited:               String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      review_format:              "`reviews <subject>`".into(),
      review_add_format:          "`reviews add <subject> <tier 0-4> [text]`".into(),
      review_tier:                "Tier must be between 0 and 4.".into(),
      review_wrong_subject:       "Unknown subject.".into(),
      review_added:               "Review saved.".into(),
      review_remove_format:       "`reviews remove <subject>`".into(),
      review_remove_format_admin: "`reviews remove <subject | id <id>>`".into(),
      review_remove_id_format:    "`reviews remove id <id>`".into(),
      review_remove_success:      "Review removed.".into(),
      review_remove_error:        "You have no review for this subject.".into(),
      review_not_found:           "Review not found.".into(),
      review_not_on_server:       "<@{user}> you are not a member of the server.".into(),
      review_add_denied:          "<@{user}> you are not allowed to manage reviews.".into(),
      insufficient_rights:        "<@{user}> you do not have rights for this command.".into(),
      reviews_page_e:             "Could not read the review page, browse the subject again.".into(),
      reviews_reaction_help:      "⏪ first ◀ previous ▶ next · 👍 like 🛑 withdraw 👎 dislike · 🔼 🔽 text".into(),
      reviews_none:               "*No reviews*".into(),
      anonymous:                  "Anonym".into(),
      subject_format:             "`subject <add|remove|update>`".into(),
      subjects_added:             "Shortcuts `{subjects}` were added.".into(),
      subjects_removed:           "Shortcuts `{subjects}` were removed.".into(),
      subject_update_error:       "Subject update failed.".into(),
      subject_update_success:     "Subjects updated.".into(),
      shortcut_format:            "`{command} <shortcut>`".into(),
      tierboard_help:             "`tierboard [type] [semester] [year]`, e.g. `tierboard P L 2BIT`".into(),
      tierboard_missing_year:     "Cannot infer your programme, pass a year explicitly.".into(),
      rate_limited:               "Slow down, try again in a few seconds.".into(),
    }
  }
}

/// Substitute `{key}` placeholders in `template`.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
  vars.iter().fold(template.to_owned(), |text, (key, value)| {
    text.replace(&format!("{{{key}}}"), value)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_replaces_every_placeholder() {
    let text = fill("{user} and {user} ran {command}", &[
      ("user", "<@1>"),
      ("command", "wtf"),
    ]);
    assert_eq!(text, "<@1> and <@1> ran wtf");
  }

  #[test]
  fn partial_messages_keep_defaults() {
    let messages: Messages = serde_json::from_str(r#"{"review_added":"Done."}"#).unwrap();
    assert_eq!(messages.review_added, "Done.");
    assert_eq!(messages.anonymous, "Anonym");
  }
}
