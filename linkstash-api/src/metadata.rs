/// Page metadata scraper
///
/// When a link is saved without a title or description, the server fetches
/// the page and pulls them out of its markup. Best-effort only: an
/// unreachable page yields placeholder text, never an error, and
/// client-supplied fields always take precedence over scraped ones.

use scraper::{Html, Selector};
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const UNREACHABLE_TITLE: &str = "Unreachable website";
const UNREACHABLE_DESCRIPTION: &str = "The linkstash crawler could not reach this URL.";

/// Scraped page metadata
#[derive(Debug, Clone)]
pub struct PageMetadata {
    /// Best-effort page title; falls back to the URL itself
    pub title: String,

    /// Best-effort page description; may be empty
    pub description: String,

    /// Raw page body when the fetch succeeded; indexed for fuzzy search
    pub html: Option<String>,
}

/// Fetches a page and extracts its title and description
pub async fn scrape(url: &str) -> PageMetadata {
    let body = match fetch(url).await {
        Some(body) if !body.is_empty() => body,
        _ => {
            return PageMetadata {
                title: UNREACHABLE_TITLE.to_string(),
                description: UNREACHABLE_DESCRIPTION.to_string(),
                html: None,
            }
        }
    };

    let (title, description) = extract_metadata(&body);

    PageMetadata {
        // A page without any usable title is labeled by its URL
        title: if title.is_empty() {
            url.to_string()
        } else {
            title
        },
        description,
        html: Some(body),
    }
}

async fn fetch(url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .ok()?;

    let response = client.get(url).send().await.ok()?;
    response.text().await.ok()
}

/// Pulls title and description out of page markup
///
/// Precedence: `og:title` over `<title>`; `og:description` over
/// `<meta name="description">`.
fn extract_metadata(body: &str) -> (String, String) {
    let document = Html::parse_document(body);

    let mut title = select_content(&document, "meta[property=\"og:title\"]");
    let mut description = select_content(&document, "meta[property=\"og:description\"]");

    if description.is_empty() {
        description = select_content(&document, "meta[name=\"description\"]");
    }

    if title.is_empty() {
        if let Ok(selector) = Selector::parse("title") {
            if let Some(element) = document.select(&selector).next() {
                title = element.text().collect::<String>().trim().to_string();
            }
        }
    }

    (title, description)
}

fn select_content(document: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("content"))
                .map(|content| content.trim().to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_tags_win() {
        let body = r#"<html><head>
            <title>Plain title</title>
            <meta property="og:title" content="OG title">
            <meta name="description" content="Plain description">
            <meta property="og:description" content="OG description">
        </head><body></body></html>"#;

        let (title, description) = extract_metadata(body);
        assert_eq!(title, "OG title");
        assert_eq!(description, "OG description");
    }

    #[test]
    fn test_fallback_to_plain_tags() {
        let body = r#"<html><head>
            <title>Plain title</title>
            <meta name="description" content="Plain description">
        </head><body></body></html>"#;

        let (title, description) = extract_metadata(body);
        assert_eq!(title, "Plain title");
        assert_eq!(description, "Plain description");
    }

    #[test]
    fn test_empty_page() {
        let (title, description) = extract_metadata("<html><body>hello</body></html>");
        assert!(title.is_empty());
        assert!(description.is_empty());
    }

    #[test]
    fn test_entities_decoded() {
        let body = r#"<meta property="og:description" content="Q&amp;A site">"#;
        let (_, description) = extract_metadata(body);
        assert_eq!(description, "Q&A site");
    }
}
