use std::fmt;

use regex::Regex;

use paperboy_core::models::Article;
use paperboy_core::{PaperboyError, PaperboyResult};

/// 文章被过滤的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyBody,
    Excluded { pattern: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyBody => write!(f, "正文为空"),
            Rejection::Excluded { pattern } => write!(f, "匹配排除规则 {pattern}"),
        }
    }
}

/// 进入转换前的过滤规则
///
/// 正文为空的文章总是被丢弃；标题或URL匹配任一排除正则的文章也会被丢弃。
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    exclusions: Vec<Regex>,
}

impl ItemFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> PaperboyResult<Self> {
        let exclusions = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    PaperboyError::Configuration(format!("无效的排除规则 '{}': {}", p.as_ref(), e))
                })
            })
            .collect::<PaperboyResult<Vec<_>>>()?;

        Ok(Self { exclusions })
    }

    pub fn check(&self, article: &Article) -> Result<(), Rejection> {
        if article.fields.body_text.trim().is_empty() {
            return Err(Rejection::EmptyBody);
        }

        if let Some(re) = self
            .exclusions
            .iter()
            .find(|re| re.is_match(&article.title) || re.is_match(&article.url))
        {
            return Err(Rejection::Excluded {
                pattern: re.as_str().to_string(),
            });
        }

        Ok(())
    }

    pub fn accepts(&self, article: &Article) -> bool {
        self.check(article).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperboy_testing_utils::ArticleBuilder;

    #[test]
    fn test_default_filter_only_drops_empty_bodies() {
        let filter = ItemFilter::default();

        assert!(filter.accepts(&ArticleBuilder::new("world/1").build()));
        assert_eq!(
            filter.check(&ArticleBuilder::new("world/2").with_body("   ").build()),
            Err(Rejection::EmptyBody)
        );
    }

    #[test]
    fn test_exclusions_match_title_or_url() {
        let filter = ItemFilter::new(&["(?i)as it happened", "/live/"]).unwrap();

        let by_title = ArticleBuilder::new("world/1")
            .with_title("Election night - as it happened")
            .build();
        let by_url = ArticleBuilder::new("world/2")
            .with_url("https://www.theguardian.com/world/live/2024/mar/01/updates")
            .build();
        let kept = ArticleBuilder::new("world/3").build();

        assert!(matches!(
            filter.check(&by_title),
            Err(Rejection::Excluded { pattern }) if pattern == "(?i)as it happened"
        ));
        assert!(!filter.accepts(&by_url));
        assert!(filter.accepts(&kept));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let result = ItemFilter::new(&["(unclosed"]);
        assert!(matches!(result, Err(PaperboyError::Configuration(_))));
    }
}
