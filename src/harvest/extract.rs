//! Turning listing tiles into `ListingItem`s.

use tracing::{debug, warn};

use crate::automation::{AutomationResult, PageAutomation};
use crate::config::SiteProfile;
use crate::models::ListingItem;

/// Badges such as "SALE" or "NEW" share the product-name link class; the
/// real name is the first candidate containing a lowercase letter.
pub fn is_product_name(text: &str) -> bool {
    text.chars().any(|c| c.is_lowercase())
}

/// Index of the first candidate that looks like a product name.
pub fn select_product_name<S: AsRef<str>>(candidates: &[S]) -> Option<usize> {
    candidates
        .iter()
        .position(|candidate| is_product_name(candidate.as_ref()))
}

/// The product name among `candidates`, or `""` when every one is a badge.
pub fn product_name<S: AsRef<str>>(candidates: &[S]) -> String {
    select_product_name(candidates)
        .map(|i| candidates[i].as_ref().to_string())
        .unwrap_or_default()
}

/// Join a product link with the site's domain prefix.
///
/// Links that are already absolute under the prefix are kept unchanged; a
/// missing or blank href yields an empty URL.
pub fn build_product_url(prefix: &str, href: Option<&str>) -> String {
    match href.map(str::trim) {
        None | Some("") => String::new(),
        Some(href) if href.starts_with(prefix) => href.to_string(),
        Some(href) => format!("{}{}", prefix, href),
    }
}

async fn trimmed_text<P>(page: &P, element: Option<&P::Element>) -> AutomationResult<String>
where
    P: PageAutomation + ?Sized,
{
    match element {
        Some(element) => Ok(page.inner_text(element).await?.trim().to_string()),
        None => Ok(String::new()),
    }
}

/// Extract one tile.
pub async fn extract_tile<P>(
    page: &P,
    tile: &P::Element,
    site: &SiteProfile,
) -> AutomationResult<ListingItem>
where
    P: PageAutomation + ?Sized,
{
    let selectors = &site.listing;
    let Some(body) = page.query_within(tile, &selectors.tile_body).await? else {
        return Ok(ListingItem::default());
    };

    let links = page.query_all_within(&body, &selectors.name_link).await?;
    let mut names = Vec::with_capacity(links.len());
    for link in &links {
        names.push(page.inner_text(link).await?.trim().to_string());
    }

    let (name, href) = match select_product_name(&names) {
        Some(i) => (names[i].clone(), page.attribute(&links[i], "href").await?),
        None => (String::new(), None),
    };

    let price = page.query_within(&body, &selectors.price).await?;
    let price = trimmed_text(page, price.as_ref()).await?;

    Ok(ListingItem {
        name,
        price,
        product_url: build_product_url(&site.domain_prefix, href.as_deref()),
    })
}

/// Extract every tile currently on the page, skipping tiles that fail.
pub async fn extract_all<P>(page: &P, site: &SiteProfile) -> AutomationResult<Vec<ListingItem>>
where
    P: PageAutomation + ?Sized,
{
    let tiles = page.query_all(&site.listing.tile).await?;
    debug!("Extracting {} tiles", tiles.len());

    let mut items = Vec::with_capacity(tiles.len());
    for (index, tile) in tiles.iter().enumerate() {
        match extract_tile(page, tile, site).await {
            Ok(item) => items.push(item),
            Err(e) => warn!("Skipping tile {}: {}", index + 1, e),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badges_are_not_product_names() {
        assert!(!is_product_name("SALE"));
        assert!(!is_product_name("NEW"));
        assert!(!is_product_name("30% OFF"));
        assert!(is_product_name("Gold Hoop Earrings"));
    }

    #[test]
    fn first_mixed_case_candidate_wins() {
        assert_eq!(
            product_name(&["SALE", "Gold Hoop Earrings", "NEW"]),
            "Gold Hoop Earrings"
        );
        assert_eq!(select_product_name(&["SALE", "a", "b"]), Some(1));
        assert_eq!(product_name(&["SALE", "NEW"]), "");
        assert_eq!(product_name::<&str>(&[]), "");
    }

    #[test]
    fn product_urls_join_prefix_and_href() {
        let prefix = "https://www.michaelkors.com";
        assert_eq!(
            build_product_url(prefix, Some("/tote/123.html")),
            "https://www.michaelkors.com/tote/123.html"
        );
        assert_eq!(
            build_product_url(prefix, Some("https://www.michaelkors.com/a.html")),
            "https://www.michaelkors.com/a.html"
        );
        assert_eq!(build_product_url(prefix, None), "");
        assert_eq!(build_product_url(prefix, Some("  ")), "");
    }
}
