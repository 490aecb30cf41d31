//! Template registry
//!
//! Static mapping from a theme key to the roles and category/channel layout
//! provisioned for it, plus the two fixed role lists every run resolves.

use guildsmith_core::{ChannelKind, ValidationError};
use serde::Serialize;
use std::str::FromStr;

/// Roles describing member attributes, resolved on every run
pub const FIXED_ROLES: &[&str] = &[
    "Verificado",
    "Homem",
    "Mulher",
    "+18",
    "-18",
    "Solteiro(a)",
    "Namorando",
];

/// Game-interest roles, resolved on every run
pub const GAME_ROLES: &[&str] = &[
    "Fortnite",
    "Minecraft",
    "Roblox",
    "CS2",
    "LoL",
    "PUBG",
    "Free Fire",
    "Warzone",
    "FIFA",
];

/// Provisioning theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Theme {
    /// Music community
    Musica,
    /// Anime community
    Animes,
    /// Gaming community
    Games,
}

impl Theme {
    /// All themes, in registry order
    pub const ALL: [Theme; 3] = [Theme::Musica, Theme::Animes, Theme::Games];

    /// Canonical key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Theme::Musica => "musica",
            Theme::Animes => "animes",
            Theme::Games => "games",
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "musica" | "music" => Ok(Theme::Musica),
            "animes" | "anime" => Ok(Theme::Animes),
            "games" => Ok(Theme::Games),
            _ => Err(ValidationError::UnknownTheme(s.to_string())),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Origin of a role name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoleKind {
    /// Listed by the theme template
    Theme,
    /// Fixed member attribute
    Attribute,
    /// Game interest
    GameInterest,
}

/// A role the builder must resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RoleSpec {
    /// Display name, also the role's identity
    pub name: &'static str,
    /// Where the name comes from
    pub kind: RoleKind,
}

/// A channel inside a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelSpec {
    /// Display name
    pub name: &'static str,
    /// Declared kind
    pub kind: ChannelKind,
}

impl ChannelSpec {
    /// Text channel spec
    #[inline]
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ChannelKind::Text,
        }
    }

    /// Voice channel spec
    #[inline]
    #[must_use]
    pub const fn voice(name: &'static str) -> Self {
        Self {
            name,
            kind: ChannelKind::Voice,
        }
    }
}

/// A category and its ordered channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySpec {
    /// Display name
    pub name: &'static str,
    /// Channels created under the category, in order
    pub channels: &'static [ChannelSpec],
}

/// Everything provisioned for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Theme this template belongs to
    pub theme: Theme,
    /// Theme role names
    pub roles: &'static [&'static str],
    /// Ordered categories
    pub categories: &'static [CategorySpec],
    /// Also create one category per game-interest role
    pub game_categories: bool,
}

impl Template {
    /// Every role a run resolves for this template, duplicates removed
    ///
    /// Theme roles come first, then fixed attributes, then game interests.
    #[must_use]
    pub fn role_specs(&self) -> Vec<RoleSpec> {
        let theme = self.roles.iter().map(|name| RoleSpec {
            name,
            kind: RoleKind::Theme,
        });
        let fixed = FIXED_ROLES.iter().map(|name| RoleSpec {
            name,
            kind: RoleKind::Attribute,
        });
        let games = GAME_ROLES.iter().map(|name| RoleSpec {
            name,
            kind: RoleKind::GameInterest,
        });

        let mut specs: Vec<RoleSpec> = Vec::new();
        for spec in theme.chain(fixed).chain(games) {
            if !specs.iter().any(|s| s.name == spec.name) {
                specs.push(spec);
            }
        }
        specs
    }

    /// Number of channels declared by the template's categories
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.categories.iter().map(|c| c.channels.len()).sum()
    }
}

static MUSICA: Template = Template {
    theme: Theme::Musica,
    roles: &["DJ", "Cantor", "Ouvinte"],
    categories: &[CategorySpec {
        name: "🎵 Música",
        channels: &[
            ChannelSpec::text("🎧-geral"),
            ChannelSpec::text("🎤-karaoke"),
            ChannelSpec::text("📀-lançamentos"),
        ],
    }],
    game_categories: false,
};

static ANIMES: Template = Template {
    theme: Theme::Animes,
    roles: &["Otaku", "Fã de Mangá", "Assistente"],
    categories: &[CategorySpec {
        name: "🍙 Animes",
        channels: &[
            ChannelSpec::text("💬-bate-papo"),
            ChannelSpec::text("📺-episodios"),
            ChannelSpec::text("🎨-fanart"),
        ],
    }],
    game_categories: false,
};

static GAMES: Template = Template {
    theme: Theme::Games,
    roles: &["Jogador", "Streamer", "Moderador"],
    categories: &[CategorySpec {
        name: "🎮 Games",
        channels: &[
            ChannelSpec::text("📣-anuncios"),
            ChannelSpec::voice("🔊-voz-gamers"),
        ],
    }],
    game_categories: true,
};

/// Registry of built-in templates
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Create registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Template for a theme
    #[must_use]
    pub fn get(&self, theme: Theme) -> &'static Template {
        match theme {
            Theme::Musica => &MUSICA,
            Theme::Animes => &ANIMES,
            Theme::Games => &GAMES,
        }
    }

    /// Look a template up by key
    ///
    /// # Errors
    /// - `ValidationError::UnknownTheme` if the key names no theme
    pub fn lookup(&self, key: &str) -> Result<&'static Template, ValidationError> {
        key.parse::<Theme>().map(|theme| self.get(theme))
    }

    /// Check if a key resolves to a template
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key.parse::<Theme>().is_ok()
    }

    /// Canonical keys of all templates
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        Theme::ALL.iter().map(Theme::key).collect()
    }
}

/// Channel-name fragment for a game: lowercase, whitespace runs become `-`
#[must_use]
pub fn game_slug(game: &str) -> String {
    game.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Category, text and voice channel names for a game
#[must_use]
pub fn game_layout(game: &str) -> (String, ChannelSpecOwned, ChannelSpecOwned) {
    let slug = game_slug(game);
    (
        format!("🎮 {game}"),
        ChannelSpecOwned {
            name: format!("💬-{slug}-chat"),
            kind: ChannelKind::Text,
        },
        ChannelSpecOwned {
            name: format!("🎙️-{slug}-voz"),
            kind: ChannelKind::Voice,
        },
    )
}

/// Channel spec with a computed name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSpecOwned {
    /// Display name
    pub name: String,
    /// Declared kind
    pub kind: ChannelKind,
}

impl From<&ChannelSpec> for ChannelSpecOwned {
    fn from(spec: &ChannelSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            kind: spec.kind,
        }
    }
}
