//! Member profile summary
//!
//! Read-only view over the attribute and game roles a member holds.

use crate::templates::GAME_ROLES;
use guildsmith_core::Message;
use serde::Serialize;

const NOT_SELECTED: &str = "Não selecionado";
const NO_GAMES: &str = "Nenhum";

/// Attribute and game picks derived from a member's role names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    /// Gender role, if any
    pub gender: Option<String>,
    /// Age role, if any
    pub age: Option<String>,
    /// Relationship status role, if any
    pub status: Option<String>,
    /// Game-interest roles, in the member's role order
    pub games: Vec<String>,
}

impl ProfileSummary {
    /// Summarize a member's role names
    #[must_use]
    pub fn from_role_names<S: AsRef<str>>(names: &[S]) -> Self {
        let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let pick = |options: &[&str]| {
            names
                .iter()
                .find(|n| options.contains(n))
                .map(|n| (*n).to_string())
        };

        Self {
            gender: pick(&["Homem", "Mulher"]),
            age: pick(&["+18", "-18"]),
            status: pick(&["Solteiro(a)", "Namorando"]),
            games: names
                .iter()
                .filter(|n| GAME_ROLES.contains(n))
                .map(|n| (*n).to_string())
                .collect(),
        }
    }

    /// Render as an ephemeral reply
    #[must_use]
    pub fn render(&self, username: &str) -> Message {
        let games = if self.games.is_empty() {
            NO_GAMES.to_string()
        } else {
            self.games.join(", ")
        };
        Message::text(format!(
            "**Perfil de {username}**\n**Gênero:** {}\n**Idade:** {}\n**Status:** {}\n**Jogos:** {}",
            self.gender.as_deref().unwrap_or(NOT_SELECTED),
            self.age.as_deref().unwrap_or(NOT_SELECTED),
            self.status.as_deref().unwrap_or(NOT_SELECTED),
            games,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile() {
        let summary = ProfileSummary::from_role_names::<&str>(&[]);
        assert_eq!(summary, ProfileSummary::default());

        let text = summary.render("ana").content;
        assert!(text.contains("**Gênero:** Não selecionado"));
        assert!(text.contains("**Jogos:** Nenhum"));
    }

    #[test]
    fn full_profile() {
        let summary = ProfileSummary::from_role_names(&[
            "Verificado",
            "Mulher",
            "+18",
            "Namorando",
            "LoL",
            "Free Fire",
        ]);

        assert_eq!(summary.gender.as_deref(), Some("Mulher"));
        assert_eq!(summary.age.as_deref(), Some("+18"));
        assert_eq!(summary.status.as_deref(), Some("Namorando"));
        assert_eq!(summary.games, vec!["LoL", "Free Fire"]);
        assert!(summary.render("ana").content.contains("LoL, Free Fire"));
    }
}
