/// Build one search query per negative phrase.
///
/// Queries are `"{brand} {keyword} {phrase}"`; the keyword is left out when
/// absent or blank. The phrase list is used as given, duplicates included.
///
/// ```
/// use tarnish_search::expand_queries;
///
/// let phrases = vec!["Scam".to_string(), "Complaints".to_string()];
/// assert_eq!(
///     expand_queries("Acme", None, &phrases),
///     vec!["Acme Scam", "Acme Complaints"]
/// );
/// assert_eq!(
///     expand_queries("Acme", Some("refund"), &phrases)[0],
///     "Acme refund Scam"
/// );
/// ```
pub fn expand_queries(brand: &str, keyword: Option<&str>, phrases: &[String]) -> Vec<String> {
    let brand = brand.trim();
    let prefix = match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(k) => format!("{brand} {k}"),
        None => brand.to_string(),
    };
    phrases.iter().map(|p| format!("{prefix} {p}")).collect()
}
