//! 패턴 매칭 모듈
//!
//! MP3 후보를 파일 이름 glob 패턴으로 한 번 더 좁힐 때 사용합니다.
//! 대소문자는 구분하지 않습니다.

use glob::{MatchOptions, Pattern};

use crate::error::{CoverError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// 컴파일된 파일 이름 필터
#[derive(Debug, Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 패턴 문자열을 컴파일
    ///
    /// # Examples
    /// ```
    /// use coverbatch::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("live_*".to_string())).unwrap();
    /// assert!(matcher.matches("LIVE_01.mp3"));
    /// assert!(!matcher.matches("studio_01.mp3"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Pattern::new(&p).map_err(|_| CoverError::InvalidPattern { pattern: p }))
            .transpose()?;

        Ok(Self { pattern })
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (패턴이 없으면 항상 true)
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |p| p.matches_with(file_name, MATCH_OPTIONS))
    }

    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// 원본 패턴 문자열
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }
}
