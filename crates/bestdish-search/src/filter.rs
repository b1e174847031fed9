//! Pure name filtering over a business list.

use bestdish_core::Business;

/// Businesses whose name contains `query`, ignoring case, in input order.
///
/// An empty query returns the whole list.
#[must_use]
pub fn filter_businesses(query: &str, businesses: &[Business]) -> Vec<Business> {
    if query.is_empty() {
        return businesses.to_vec();
    }
    let needle = query.to_lowercase();
    businesses
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<Business> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Business {
                id: i.to_string(),
                name: (*name).to_owned(),
                address: None,
                city: "Oakland".to_owned(),
            })
            .collect()
    }

    fn names(list: &[Business]) -> Vec<&str> {
        list.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything() {
        let list = named(&["Burma Superstar", "Zachary's", "Burger Joint"]);
        assert_eq!(filter_businesses("", &list), list);
    }

    #[test]
    fn matches_substring_case_insensitively() {
        let list = named(&["Burma Superstar", "Zachary's", "BURGER Joint"]);
        assert_eq!(
            names(&filter_businesses("bur", &list)),
            vec!["Burma Superstar", "BURGER Joint"]
        );
        assert_eq!(names(&filter_businesses("STAR", &list)), vec!["Burma Superstar"]);
    }

    #[test]
    fn preserves_input_order() {
        let list = named(&["Taco C", "Taco A", "Taco B"]);
        assert_eq!(
            names(&filter_businesses("taco", &list)),
            vec!["Taco C", "Taco A", "Taco B"]
        );
    }

    #[test]
    fn no_match_is_empty() {
        let list = named(&["Pho Ha Noi"]);
        assert!(filter_businesses("sushi", &list).is_empty());
    }

    #[test]
    fn handles_non_ascii_names() {
        let list = named(&["Café Réveille", "Crêperie"]);
        assert_eq!(names(&filter_businesses("CAFÉ", &list)), vec!["Café Réveille"]);
    }

    #[test]
    fn whitespace_query_is_matched_literally() {
        let list = named(&["Blue Bottle", "Ritual"]);
        assert_eq!(names(&filter_businesses(" ", &list)), vec!["Blue Bottle"]);
    }
}
