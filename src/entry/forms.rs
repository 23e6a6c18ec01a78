//! Player and episode admin forms.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::{Episode, EpisodeType, Player};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every rejected field in a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_fields(.0))]
pub struct FormErrors(pub Vec<FieldError>);

fn result_of(errors: Vec<FieldError>) -> Result<(), FormErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FormErrors(errors))
    }
}

/// Blank strings count as absent.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn check_url(field: &'static str, value: &Option<String>, errors: &mut Vec<FieldError>) {
    if let Some(v) = non_blank(value) {
        if Url::parse(&v).is_err() {
            errors.push(FieldError::new(field, "Must be a valid URL"));
        }
    }
}

fn check_length(field: &'static str, value: &str, max: usize, errors: &mut Vec<FieldError>) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(FieldError::new(field, "Required"));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("Must be at most {} characters", max),
        ));
    }
}

/// URL-safe handle from a display name ("Shayne Topp!" -> "shayne-topp").
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A slug for `name` not already in `taken`, suffixed `-2`, `-3`, ... when
/// needed. Names with no usable characters fall back to "player".
pub fn unique_slug<'a, I>(name: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let base = match slugify(name) {
        s if s.is_empty() => "player".to_string(),
        s => s,
    };
    let taken: std::collections::HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(base.as_str()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Create or edit a player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerForm {
    pub name: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl PlayerForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();
        check_length("name", &self.name, MAX_NAME_LEN, &mut errors);
        check_url("image_url", &self.image_url, &mut errors);
        result_of(errors)
    }

    /// A new player with a slug that does not collide with `taken`.
    pub fn to_player<'a, I>(&self, taken: I) -> Result<Player, FormErrors>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.validate()?;
        let name = self.name.trim().to_string();
        let slug = unique_slug(&name, taken);
        let mut player = Player::new(name, slug);
        player.image_url = non_blank(&self.image_url);
        Ok(player)
    }

    /// Apply an edit. The slug is kept so existing links keep working.
    pub fn apply_to(&self, player: &mut Player) -> Result<(), FormErrors> {
        self.validate()?;
        player.name = self.name.trim().to_string();
        player.image_url = non_blank(&self.image_url);
        player.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Create or edit an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeForm {
    pub title: String,

    pub episode_number: u32,

    #[serde(default)]
    pub season: Option<u32>,

    /// `YYYY-MM-DD`
    pub air_date: String,

    #[serde(default)]
    pub youtube_url: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub episode_type: EpisodeType,
}

impl EpisodeForm {
    /// Validate every field, returning the parsed air date.
    pub fn validate(&self) -> Result<NaiveDate, FormErrors> {
        let mut errors = Vec::new();
        check_length("title", &self.title, MAX_TITLE_LEN, &mut errors);
        if self.episode_number == 0 {
            errors.push(FieldError::new("episode_number", "Must be a positive number"));
        }
        if self.season == Some(0) {
            errors.push(FieldError::new("season", "Must be a positive number"));
        }
        let air_date = NaiveDate::parse_from_str(self.air_date.trim(), "%Y-%m-%d");
        if air_date.is_err() {
            errors.push(FieldError::new("air_date", "Must be a date (YYYY-MM-DD)"));
        }
        check_url("youtube_url", &self.youtube_url, &mut errors);
        check_url("thumbnail_url", &self.thumbnail_url, &mut errors);
        if let Some(d) = &self.description {
            if d.chars().count() > MAX_DESCRIPTION_LEN {
                errors.push(FieldError::new(
                    "description",
                    format!("Must be at most {} characters", MAX_DESCRIPTION_LEN),
                ));
            }
        }

        match (air_date, errors.is_empty()) {
            (Ok(date), true) => Ok(date),
            _ => Err(FormErrors(errors)),
        }
    }

    pub fn to_episode(&self) -> Result<Episode, FormErrors> {
        let air_date = self.validate()?;
        let mut episode = Episode::new(self.title.trim().to_string(), self.episode_number, air_date)
            .with_type(self.episode_type);
        self.copy_optional(&mut episode);
        Ok(episode)
    }

    /// Apply an edit. Results already recorded are not touched here.
    pub fn apply_to(&self, episode: &mut Episode) -> Result<(), FormErrors> {
        let air_date = self.validate()?;
        episode.title = self.title.trim().to_string();
        episode.episode_number = self.episode_number;
        episode.air_date = air_date;
        episode.episode_type = self.episode_type;
        self.copy_optional(episode);
        episode.updated_at = Some(Utc::now());
        Ok(())
    }

    fn copy_optional(&self, episode: &mut Episode) {
        episode.season = self.season;
        episode.youtube_url = non_blank(&self.youtube_url);
        episode.thumbnail_url = non_blank(&self.thumbnail_url);
        episode.description = non_blank(&self.description);
    }
}
