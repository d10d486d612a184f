use chrono::{Days, NaiveDate};

/// Publication window, counted back from the day the query is built.
pub const WINDOW_DAYS: u64 = 3 * 365;
/// Topical filter terms, OR-ed together.
pub const TOPICAL_FILTER: [&str; 2] = ["microbiome", "HPA"];
const DATE_FORMAT: &str = "%Y/%m/%d";

/// A PubMed search expression for two keywords within the rolling window.
///
/// Keywords are embedded verbatim; search-syntax metacharacters pass through
/// to PubMed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keywords: [String; 2],
    start: NaiveDate,
    end: NaiveDate,
}

impl SearchQuery {
    pub fn new(keyword_1: &str, keyword_2: &str, today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self {
            keywords: [keyword_1.to_string(), keyword_2.to_string()],
            start,
            end: today,
        }
    }

    pub fn keywords(&self) -> (&str, &str) {
        (&self.keywords[0], &self.keywords[1])
    }

    #[cfg(test)]
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// The `term` parameter for `esearch`.
    pub fn to_term(&self) -> String {
        let [k1, k2] = &self.keywords;
        let filter = TOPICAL_FILTER
            .iter()
            .map(|t| format!("{t}[Title/Abstract]"))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!(
            "({k1}[Title/Abstract]) AND ({k2}[Title/Abstract]) AND ({filter}) AND ({}[PDAT] : {}[PDAT])",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
        )
    }
}
