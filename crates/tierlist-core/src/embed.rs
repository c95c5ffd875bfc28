//! The rendered artifact: a chat embed as the transport displays it.
//!
//! The transport owns delivery; this crate only reads and writes the title,
//! description, named fields, footer, color, and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named value slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
  pub name:   String,
  pub value:  String,
  #[serde(default = "default_inline")]
  pub inline: bool,
}

fn default_inline() -> bool { true }

impl EmbedField {
  pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self { name: name.into(), value: value.into(), inline: true }
  }

  pub fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self { name: name.into(), value: value.into(), inline: false }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub fields:      Vec<EmbedField>,
  #[serde(default)]
  pub footer:      Option<String>,
  #[serde(default)]
  pub color:       u32,
  #[serde(default)]
  pub timestamp:   Option<DateTime<Utc>>,
}

impl Embed {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      title: Some(title.into()),
      description: Some(description.into()),
      ..Self::default()
    }
  }

  pub fn push(&mut self, field: EmbedField) -> &mut Self {
    self.fields.push(field);
    self
  }

  /// The first field called `name`.
  pub fn field(&self, name: &str) -> Option<&EmbedField> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn field_mut(&mut self, name: &str) -> Option<&mut EmbedField> {
    self.fields.iter_mut().find(|f| f.name == name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fields_default_to_inline_when_deserialized() {
    let embed: Embed = serde_json::from_str(
      r#"{"title":"IJC reviews","fields":[{"name":"Tier","value":"2"}]}"#,
    )
    .unwrap();
    assert!(embed.fields[0].inline);
    assert_eq!(embed.field("Tier").map(|f| f.value.as_str()), Some("2"));
    assert!(embed.field("Text page").is_none());
  }
}
