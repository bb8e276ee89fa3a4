//! Role domain model.
//!
//! # Responsibility
//! - Define the closed set of role kinds a replica can be assigned to.
//! - Keep rate/duration parameters inside their allowed ranges.
//!
//! # Invariants
//! - Speaker `words_per_minute` is always within `[50, 500]`.
//! - Sound effect `duration_secs` is always finite and `>= 0`.
//! - Role names created through `Role::speaker`/`Role::sound_effect` or
//!   renamed through `set_name` are trimmed, non-empty and at most 50 chars.

use crate::model::entity::{generate_id, Entity, EntityId, Timestamps};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_WORDS_PER_MINUTE: u32 = 50;
pub const MAX_WORDS_PER_MINUTE: u32 = 500;
pub const MAX_ROLE_NAME_CHARS: usize = 50;

/// Wire value of the `type` field for speakers.
pub const ROLE_TYPE_SPEAKER: &str = "speaker";
/// Wire value of the `type` field for sound effects.
pub const ROLE_TYPE_SOUND: &str = "sound";

/// Name validation failure for role creation or rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Name exceeds the allowed length after trim.
    NameTooLong { chars: usize, max: usize },
}

impl Display for RoleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "role name must not be blank"),
            Self::NameTooLong { chars, max } => {
                write!(f, "role name has {chars} characters, at most {max} allowed")
            }
        }
    }
}

impl Error for RoleValidationError {}

/// Kind-specific role parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleKind {
    /// A voice reading replica text at a fixed rate.
    Speaker {
        words_per_minute: u32,
        /// Display hint only.
        color: Option<String>,
    },
    /// A cue with a fixed playback length, independent of replica text.
    SoundEffect { duration_secs: f64 },
    /// Role read from data with an unrecognized `type`.
    ///
    /// Produces neither words nor duration.
    Unknown { type_name: String },
}

impl RoleKind {
    /// Speaker kind with a clamped rate and no color.
    pub fn speaker(words_per_minute: i64) -> Self {
        Self::Speaker {
            words_per_minute: clamp_words_per_minute(words_per_minute),
            color: None,
        }
    }

    /// Sound effect kind with a clamped duration.
    pub fn sound_effect(duration_secs: f64) -> Self {
        Self::SoundEffect {
            duration_secs: clamp_duration(duration_secs),
        }
    }

    /// Value written to the wire `type` field.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Speaker { .. } => ROLE_TYPE_SPEAKER,
            Self::SoundEffect { .. } => ROLE_TYPE_SOUND,
            Self::Unknown { type_name } => type_name.as_str(),
        }
    }

    fn clamped(self) -> Self {
        match self {
            Self::Speaker {
                words_per_minute,
                color,
            } => Self::Speaker {
                words_per_minute: clamp_words_per_minute(i64::from(words_per_minute)),
                color,
            },
            Self::SoundEffect { duration_secs } => Self::sound_effect(duration_secs),
            other => other,
        }
    }
}

/// Named participant in a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    id: EntityId,
    name: String,
    kind: RoleKind,
    timestamps: Timestamps,
}

impl Role {
    /// Creates a speaker with a generated id.
    pub fn speaker(name: &str, words_per_minute: i64) -> Result<Self, RoleValidationError> {
        Self::new(name, RoleKind::speaker(words_per_minute))
    }

    /// Creates a sound effect with a generated id.
    pub fn sound_effect(name: &str, duration_secs: f64) -> Result<Self, RoleValidationError> {
        Self::new(name, RoleKind::sound_effect(duration_secs))
    }

    /// Creates a role of any kind with a generated id and validated name.
    pub fn new(name: &str, kind: RoleKind) -> Result<Self, RoleValidationError> {
        let name = normalize_role_name(name)?;
        Ok(Self {
            id: generate_id(),
            name,
            kind: kind.clamped(),
            timestamps: Timestamps::now(),
        })
    }

    /// Rebuilds a role whose identity already exists externally.
    ///
    /// Used by import paths. The name is kept as provided; kind parameters
    /// are still clamped.
    pub fn restore(id: EntityId, name: String, kind: RoleKind, timestamps: Timestamps) -> Self {
        Self {
            id,
            name,
            kind: kind.clamped(),
            timestamps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RoleKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn is_speaker(&self) -> bool {
        matches!(self.kind, RoleKind::Speaker { .. })
    }

    pub fn is_sound_effect(&self) -> bool {
        matches!(self.kind, RoleKind::SoundEffect { .. })
    }

    /// Speaking rate, for speakers only.
    pub fn words_per_minute(&self) -> Option<u32> {
        match self.kind {
            RoleKind::Speaker {
                words_per_minute, ..
            } => Some(words_per_minute),
            _ => None,
        }
    }

    /// Cue length in seconds, for sound effects only.
    pub fn duration_secs(&self) -> Option<f64> {
        match self.kind {
            RoleKind::SoundEffect { duration_secs } => Some(duration_secs),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match &self.kind {
            RoleKind::Speaker { color, .. } => color.as_deref(),
            _ => None,
        }
    }

    /// Renames the role after trim/length validation.
    pub fn set_name(&mut self, name: &str) -> Result<(), RoleValidationError> {
        self.name = normalize_role_name(name)?;
        self.timestamps.touch();
        Ok(())
    }

    /// Sets the speaking rate, clamped to the allowed range.
    ///
    /// Returns `false` without mutation when the role is not a speaker.
    pub fn set_words_per_minute(&mut self, value: i64) -> bool {
        match &mut self.kind {
            RoleKind::Speaker {
                words_per_minute, ..
            } => {
                *words_per_minute = clamp_words_per_minute(value);
                self.timestamps.touch();
                true
            }
            _ => false,
        }
    }

    /// Returns `false` without mutation when the role is not a speaker.
    pub fn set_color(&mut self, value: Option<String>) -> bool {
        match &mut self.kind {
            RoleKind::Speaker { color, .. } => {
                *color = value;
                self.timestamps.touch();
                true
            }
            _ => false,
        }
    }

    /// Sets the cue length, clamped to `>= 0`.
    ///
    /// Returns `false` without mutation when the role is not a sound effect.
    pub fn set_duration(&mut self, value: f64) -> bool {
        match &mut self.kind {
            RoleKind::SoundEffect { duration_secs } => {
                *duration_secs = clamp_duration(value);
                self.timestamps.touch();
                true
            }
            _ => false,
        }
    }

    /// Case-insensitive name comparison used for uniqueness checks.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

impl Entity for Role {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Clamps a speaking rate into `[MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE]`.
pub fn clamp_words_per_minute(value: i64) -> u32 {
    let clamped = value.clamp(
        i64::from(MIN_WORDS_PER_MINUTE),
        i64::from(MAX_WORDS_PER_MINUTE),
    );
    u32::try_from(clamped).unwrap_or(MIN_WORDS_PER_MINUTE)
}

/// Clamps a duration to a finite value `>= 0`.
pub fn clamp_duration(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Trims and validates a role name.
pub fn normalize_role_name(name: &str) -> Result<String, RoleValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoleValidationError::EmptyName);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_ROLE_NAME_CHARS {
        return Err(RoleValidationError::NameTooLong {
            chars,
            max: MAX_ROLE_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
