//! Post and match data structures.

/// A single entry extracted from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Post {
    /// Headline text
    pub title: String,

    /// Summary text shown under the headline
    pub description: String,
}

impl Post {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Case-sensitive substring search over title and description.
    pub fn contains(&self, keyword: &str) -> bool {
        self.title.contains(keyword) || self.description.contains(keyword)
    }
}

/// The first post/condition pair that matched during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub condition: String,
    pub tag: String,
    pub post: Post,
}

impl MatchResult {
    /// Format the match using a template.
    ///
    /// Supported placeholders: `{condition}`, `{tag}`, `{title}`, `{description}`.
    /// Substituted text is never scanned again; unknown placeholders are kept.
    pub fn format(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            let field = candidate
                .find('}')
                .and_then(|end| self.field(&candidate[1..end]).map(|value| (value, end)));
            match field {
                Some((value, end)) => {
                    out.push_str(value);
                    rest = &candidate[end + 1..];
                }
                None => {
                    out.push('{');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "condition" => Some(&self.condition),
            "tag" => Some(&self.tag),
            "title" => Some(&self.post.title),
            "description" => Some(&self.post.description),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_checks_both_fields() {
        let post = Post::new("속보: 금리 인상", "한국은행 발표");
        assert!(post.contains("금리"));
        assert!(post.contains("한국은행"));
        assert!(!post.contains("환율"));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let post = Post::new("Apple earnings", "");
        assert!(post.contains("Apple"));
        assert!(!post.contains("apple"));
    }

    #[test]
    fn test_format() {
        let result = MatchResult {
            condition: "금리 AND 인상".to_string(),
            tag: "economy".to_string(),
            post: Post::new("Title", "Desc"),
        };
        assert_eq!(
            result.format("[{tag}] {title} / {description} ({condition})"),
            "[economy] Title / Desc (금리 AND 인상)"
        );
    }

    #[test]
    fn test_format_does_not_expand_inserted_text() {
        let result = MatchResult {
            condition: "{tag}".to_string(),
            tag: "T1".to_string(),
            post: Post::new("Use {description} here", "secret"),
        };
        assert_eq!(
            result.format("{title} | {condition} | {tag}"),
            "Use {description} here | {tag} | T1"
        );
    }

    #[test]
    fn test_format_keeps_unknown_placeholders() {
        let result = MatchResult {
            condition: "c".to_string(),
            tag: "t".to_string(),
            post: Post::default(),
        };
        assert_eq!(result.format("{unknown} {{tag} {"), "{unknown} {t {");
    }
}
