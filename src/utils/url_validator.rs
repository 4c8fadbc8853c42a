//! URL 验证模块
//!
//! 规范化用户输入的 URL，并只接受 http / https / ftp 协议。

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    ContainsWhitespace,
    InvalidProtocol(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::ContainsWhitespace => write!(f, "URL must not contain whitespace"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http://, https:// and ftp:// are allowed",
                proto
            ),
            Self::MissingHost => write!(f, "URL has no host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// 规范化 URL：去除首尾空白，没有 `://` 的输入补上 `https://`
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// 验证 URL
///
/// 检查项目：
/// 1. URL 不为空
/// 2. 不含空白字符
/// 3. 协议为 http / https / ftp
/// 4. 主机部分非空且格式有效
pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    if url.trim().is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    if url.chars().any(char::is_whitespace) {
        return Err(UrlValidationError::ContainsWhitespace);
    }

    let scheme = url
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| UrlValidationError::InvalidFormat("missing scheme".to_string()))?;

    if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
        return Err(UrlValidationError::InvalidProtocol(format!("{}:", scheme)));
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
