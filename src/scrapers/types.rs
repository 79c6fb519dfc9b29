use std::fmt;

/// Marker for a field the page did not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absent;

impl fmt::Display for Absent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("field absent")
    }
}

impl std::error::Error for Absent {}

/// Outcome of extracting one field from the page
pub type Extracted<T> = Result<T, Absent>;

/// One entry of a catalog listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub name: Extracted<String>,
    /// Detail page URL, already made absolute
    pub link: Extracted<String>,
    pub score: Extracted<String>,
    pub adjective: Extracted<String>,
}

/// Pros and cons from a shoe's review page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailReview {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}
