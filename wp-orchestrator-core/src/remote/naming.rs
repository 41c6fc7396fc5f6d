//! Generated names, passwords and dates

use chrono::{Duration, NaiveDateTime};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::types::MAX_POST_STEP_DAYS;

/// Length of generated database and admin passwords.
pub const PASSWORD_LENGTH: usize = 24;

const NICK_FIRST: &[&str] = &[
    "star", "dark", "light", "quick", "silent", "brave", "shadow", "fire", "ice", "wind",
];
const NICK_SECOND: &[&str] = &[
    "runner", "hunter", "walker", "rider", "warrior", "seeker", "caster", "keeper", "blade",
    "frost",
];
const NICK_THIRD: &[&str] = &[
    "x", "zero", "nova", "flare", "spark", "void", "strike", "edge", "storm", "wolf",
];

/// Database name and user for a domain: every non-alphanumeric character becomes `_`.
///
/// `my-site.com` -> `my_site_com`
pub fn db_identifier(domain: &str) -> String {
    domain
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Alphanumeric password.
pub fn random_password<R: Rng>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.random_range(0..words.len())]
}

/// Admin login such as `quickhunternova`.
pub fn random_nickname<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}{}{}",
        pick(rng, NICK_FIRST),
        pick(rng, NICK_SECOND),
        pick(rng, NICK_THIRD)
    )
}

/// US-style phone number for the about page.
pub fn random_phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "+1 ({}) {}-{}",
        rng.random_range(200..=999),
        rng.random_range(200..=999),
        rng.random_range(1000..=9999)
    )
}

/// Strictly decreasing publication dates, 1 to `max_step_days` days apart.
///
/// `max_step_days` is clamped to `1..=MAX_POST_STEP_DAYS`.
#[derive(Debug, Clone)]
pub struct PostTimeline {
    current: NaiveDateTime,
    max_step_days: u32,
}

impl PostTimeline {
    pub fn new(start: NaiveDateTime, max_step_days: u32) -> Self {
        Self {
            current: start,
            max_step_days: max_step_days.clamp(1, MAX_POST_STEP_DAYS),
        }
    }

    /// Step back and return the new date.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> NaiveDateTime {
        let days = rng.random_range(1..=self.max_step_days);
        self.current -= Duration::days(i64::from(days));
        self.current
    }
}

/// `wp post create --post_date` format.
pub fn format_post_date(date: NaiveDateTime) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}
