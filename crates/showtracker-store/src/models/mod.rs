mod movie;
mod series;
mod user;

pub use movie::{Movie, MoviePatch, MovieStats, MovieStatus};
pub use series::{Series, SeriesPatch, SeriesStats, WatchStatus};
pub use user::{NewUser, User};

use serde::{Deserialize, Serialize};

use crate::FieldErrors;

/// Catalog genre copied into a library entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

const RATING_MESSAGE: &str = "La valutazione deve essere tra 0 e 10";

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_owned();
    }
}

fn trim_optional(value: &mut Option<String>) {
    if let Some(v) = value {
        trim_in_place(v);
    }
}

fn check_max_chars(errors: &mut FieldErrors, path: &str, value: Option<&str>, max: usize, message: &str) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(path, message);
    }
}

fn check_rating(errors: &mut FieldErrors, rating: Option<f64>) {
    if rating.is_some_and(|r| !(0.0..=10.0).contains(&r)) {
        errors.add("userRating", RATING_MESSAGE);
    }
}

/// Mean of the present ratings, `None` when there are none
fn average_rating(ratings: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = ratings.flatten().fold((0.0, 0_u32), |(sum, count), r| (sum + r, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}
