//! XPath builders for role/name and title lookups.
//!
//! WebDriver has no accessible-name locator, so the common cases are
//! expressed in XPath 1.0 and evaluated by the browser in one round trip.

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Quote `s` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so strings holding both quote kinds are
/// assembled with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Elements with role `link` whose accessible name equals `name`.
///
/// Role `link` covers `<a href>` and explicit `role="link"`. The accessible
/// name is `aria-label` when present, else the whitespace-normalised text.
pub fn link_by_name(name: &str) -> String {
    let lit = xpath_literal(name.split_whitespace().collect::<Vec<_>>().join(" ").as_str());
    format!(
        "//*[(self::a[@href] or @role='link') and \
         ((@aria-label and normalize-space(@aria-label)={lit}) or \
         (not(@aria-label) and normalize-space(.)={lit}))]"
    )
}

/// Elements whose `title` attribute contains `fragment`, ignoring ASCII case
/// and runs of whitespace.
pub fn title_contains(fragment: &str) -> String {
    let folded = fragment
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    let lit = xpath_literal(&folded);
    format!(
        "//*[@title and contains(translate(normalize-space(@title), '{UPPER}', '{LOWER}'), {lit})]"
    )
}
