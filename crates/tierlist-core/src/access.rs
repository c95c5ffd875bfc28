//! Who is acting, and what they may do.
//!
//! The transport resolves the actor against the community server before
//! calling in; these checks only read the typed result.

use serde::{Deserialize, Serialize};

use crate::{config::BotConfig, review::MemberId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub id:   u64,
  pub name: String,
}

/// The member behind a command or reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:             MemberId,
  /// Display name, used in card footers.
  #[serde(default)]
  pub name:           String,
  /// Roles held on the community server.
  #[serde(default)]
  pub roles:          Vec<Role>,
  /// Whether the actor is a member of the community server at all.
  #[serde(default)]
  pub member:         bool,
  /// The event came from a direct message rather than a server channel.
  #[serde(default)]
  pub direct_message: bool,
}

/// Why a review-managing command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
  NotOnServer,
  Forbidden,
}

impl Actor {
  pub fn has_role(&self, id: u64) -> bool { self.roles.iter().any(|r| r.id == id) }

  pub fn is_admin(&self, config: &BotConfig) -> bool { self.id == config.admin_id }

  /// Members may add or remove reviews when verified and not holding a
  /// forbidden role.
  pub fn check_member(&self, config: &BotConfig) -> Result<(), Denial> {
    if !self.member {
      return Err(Denial::NotOnServer);
    }
    let forbidden = self
      .roles
      .iter()
      .any(|r| config.review_forbidden_roles.contains(&r.id));
    if forbidden || !self.has_role(config.verification_role_id) {
      return Err(Denial::Forbidden);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Cooldown, Messages};

  fn config() -> BotConfig {
    BotConfig {
      verification_role_id:   10,
      review_forbidden_roles: vec![66],
      admin_id:               MemberId(1),
      cooldown:               Cooldown::default(),
      messages:               Messages::default(),
    }
  }

  fn actor(member: bool, roles: &[u64]) -> Actor {
    Actor {
      id:             MemberId(5),
      name:           "student".into(),
      roles:          roles.iter().map(|id| Role { id: *id, name: format!("r{id}") }).collect(),
      member,
      direct_message: false,
    }
  }

  #[test]
  fn verified_member_passes() {
    assert_eq!(actor(true, &[10, 11]).check_member(&config()), Ok(()));
  }

  #[test]
  fn non_member_is_not_on_server() {
    assert_eq!(actor(false, &[10]).check_member(&config()), Err(Denial::NotOnServer));
  }

  #[test]
  fn unverified_or_forbidden_is_refused() {
    assert_eq!(actor(true, &[11]).check_member(&config()), Err(Denial::Forbidden));
    assert_eq!(actor(true, &[10, 66]).check_member(&config()), Err(Denial::Forbidden));
  }

  #[test]
  fn admin_is_matched_by_id() {
    let mut a = actor(true, &[]);
    assert!(!a.is_admin(&config()));
    a.id = MemberId(1);
    assert!(a.is_admin(&config()));
  }
}
