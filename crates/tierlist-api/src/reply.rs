//! What the transport is told to post, edit, or leave alone.

use serde::Serialize;
use tierlist_core::{dispatch::Reaction, embed::Embed};

/// Response to a command: a text message, a card, or both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reply {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub embed:    Option<Embed>,
  /// Reactions to attach to the posted card.
  pub controls: Vec<Reaction>,
}

impl Reply {
  pub fn text(content: impl Into<String>) -> Self {
    Self { content: Some(content.into()), ..Self::default() }
  }

  pub fn card(embed: Embed, controls: Vec<Reaction>) -> Self {
    Self { embed: Some(embed), controls, ..Self::default() }
  }
}

/// How the artifact a reaction was placed on should change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ArtifactUpdate {
  /// Replace the embed; `controls` is the full reaction set it should carry.
  Edit { embed: Embed, controls: Vec<Reaction> },
  /// Drop the embed and show `content` instead.
  Replace { content: String },
  Ignore,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionReply {
  #[serde(flatten)]
  pub update:  ArtifactUpdate,
  /// Remove the actor's reaction afterwards.
  pub retract: bool,
}
