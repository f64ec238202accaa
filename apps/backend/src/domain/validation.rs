//! Input validation for names, scores and player stats.

use lazy_regex::regex_is_match;
use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_NAME_CHARS: usize = 4;
pub const MAX_NAME_CHARS: usize = 40;
pub const TEAM_NUM_RANGE: std::ops::RangeInclusive<u32> = 2..=64;
pub const MATCH_NUM_RANGE: std::ops::RangeInclusive<u32> = 1..=4;
pub const MAX_RATING: u8 = 10;
pub const MAX_PLAYER_TALLY: u32 = 99;

/// NFC-normalize and trim a club or league name, then check its length.
pub fn normalize_name(raw: &str) -> Result<String, DomainError> {
    let name: String = raw.nfc().collect::<String>().trim().to_string();
    let len = name.chars().count();

    if len == 0 {
        return Err(DomainError::validation(
            ValidationKind::Name,
            "Name cannot be empty",
        ));
    }
    if len < MIN_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::Name,
            format!("Name must be at least {MIN_NAME_CHARS} characters"),
        ));
    }
    if len > MAX_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::Name,
            format!("Name must be at most {MAX_NAME_CHARS} characters"),
        ));
    }
    Ok(name)
}

/// Parse a submitted score: digits only, no sign, no blanks.
pub fn parse_score(field: &str, raw: &str) -> Result<u32, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Score,
            format!("{field} is required"),
        ));
    }
    if !regex_is_match!(r"^[0-9]+$", raw) {
        return Err(DomainError::validation(
            ValidationKind::Score,
            format!("{field} must be a non-negative whole number"),
        ));
    }
    raw.parse::<u32>().map_err(|_| {
        DomainError::validation(ValidationKind::Score, format!("{field} is out of range"))
    })
}

pub fn check_league_settings(team_num: u32, match_num: u32) -> Result<(), DomainError> {
    if !TEAM_NUM_RANGE.contains(&team_num) {
        return Err(DomainError::validation(
            ValidationKind::LeagueSettings,
            format!(
                "teamNum must be between {} and {}",
                TEAM_NUM_RANGE.start(),
                TEAM_NUM_RANGE.end()
            ),
        ));
    }
    if !MATCH_NUM_RANGE.contains(&match_num) {
        return Err(DomainError::validation(
            ValidationKind::LeagueSettings,
            format!(
                "matchNum must be between {} and {}",
                MATCH_NUM_RANGE.start(),
                MATCH_NUM_RANGE.end()
            ),
        ));
    }
    Ok(())
}

pub fn check_player_stats(rating: u8, goals: u32, assists: u32) -> Result<(), DomainError> {
    if rating > MAX_RATING {
        return Err(DomainError::validation(
            ValidationKind::PlayerStats,
            format!("rating must be between 0 and {MAX_RATING}"),
        ));
    }
    if goals > MAX_PLAYER_TALLY || assists > MAX_PLAYER_TALLY {
        return Err(DomainError::validation(
            ValidationKind::PlayerStats,
            format!("goals and assists must be at most {MAX_PLAYER_TALLY}"),
        ));
    }
    Ok(())
}
