use serde::{Deserialize, Serialize};

/// A backend list response.
///
/// Some endpoints answer with a bare array, others with the paginated
/// `{count, next, previous, results}` envelope. Both decode to this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawListing<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Listing<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Listing<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawListing<T> {
    Page {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> From<RawListing<T>> for Listing<T> {
    fn from(raw: RawListing<T>) -> Self {
        match raw {
            RawListing::Page {
                count,
                next,
                previous,
                results,
            } => Self {
                count: count.unwrap_or(results.len() as u64),
                next,
                previous,
                results,
            },
            RawListing::Bare(results) => results.into(),
        }
    }
}
