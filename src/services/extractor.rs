//! Post extraction from listing markup.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{ExtractionConfig, Post, parse_selector};
use crate::utils::normalize_whitespace;

/// Extracts posts using selectors compiled once from [`ExtractionConfig`].
pub struct PostExtractor {
    item_selectors: Vec<Selector>,
    title_selector: Selector,
    description_selector: Selector,
}

impl PostExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let item_selectors = config
            .item_selectors()
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            item_selectors,
            title_selector: parse_selector(&config.title_selector)?,
            description_selector: parse_selector(&config.description_selector)?,
        })
    }

    /// Extract posts, containers in configured order, items in document order.
    pub fn extract(&self, html: &str) -> Vec<Post> {
        let document = Html::parse_document(html);

        self.item_selectors
            .iter()
            .flat_map(|selector| document.select(selector))
            .map(|item| Post {
                title: Self::text_of(&item, &self.title_selector),
                description: Self::text_of(&item, &self.description_selector),
            })
            .collect()
    }

    /// Normalized text of the first match, empty when nothing matches.
    fn text_of(item: &ElementRef, selector: &Selector) -> String {
        item.select(selector)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <ul class="type06_headline">
            <li>
                <dl>
                    <dt class="photo"><a href="/1"><img src="x.jpg"></a></dt>
                    <dt><a href="/1">
                        속보: 금리 인상
                    </a></dt>
                    <dd><span class="lede">한국은행이   기준금리를 올렸다</span></dd>
                </dl>
            </li>
            <li>
                <dl>
                    <dt><a href="/2">환율 급등</a></dt>
                </dl>
            </li>
        </ul>
        <ul class="type06">
            <li><dl><dd>제목 없는 기사</dd></dl></li>
        </ul>
        <ul class="unrelated">
            <li><dl><dt><a>무시됨</a></dt></dl></li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_extracts_posts_in_order() {
        let extractor = PostExtractor::new(&ExtractionConfig::default()).unwrap();
        let posts = extractor.extract(LISTING);

        assert_eq!(
            posts,
            vec![
                Post::new("속보: 금리 인상", "한국은행이 기준금리를 올렸다"),
                Post::new("환율 급등", ""),
                Post::new("", "제목 없는 기사"),
            ]
        );
    }

    #[test]
    fn test_containers_scanned_in_configured_order() {
        let config = ExtractionConfig {
            container_classes: vec!["type06".into(), "type06_headline".into()],
            ..ExtractionConfig::default()
        };
        let posts = PostExtractor::new(&config).unwrap().extract(LISTING);

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].description, "제목 없는 기사");
        assert_eq!(posts[1].title, "속보: 금리 인상");
    }

    #[test]
    fn test_no_containers_yields_no_posts() {
        let extractor = PostExtractor::new(&ExtractionConfig::default()).unwrap();
        assert!(extractor.extract("<html><body><p>maintenance</p></body></html>").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let config = ExtractionConfig {
            description_selector: "[[invalid".into(),
            ..ExtractionConfig::default()
        };
        assert!(PostExtractor::new(&config).is_err());
    }
}
