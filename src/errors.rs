use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkshelfError {
    InvalidUrl(String),
    NotFound(String),
    AccessDenied(String),
    Expired(String),
    LimitExceeded(String),
    GenerationExhausted(String),
    InvalidClickLimit(String),
    Config(String),
    FileOperation(String),
    Notification(String),
}

impl LinkshelfError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkshelfError::InvalidUrl(_) => "E001",
            LinkshelfError::NotFound(_) => "E002",
            LinkshelfError::AccessDenied(_) => "E003",
            LinkshelfError::Expired(_) => "E004",
            LinkshelfError::LimitExceeded(_) => "E005",
            LinkshelfError::GenerationExhausted(_) => "E006",
            LinkshelfError::InvalidClickLimit(_) => "E007",
            LinkshelfError::Config(_) => "E008",
            LinkshelfError::FileOperation(_) => "E009",
            LinkshelfError::Notification(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkshelfError::InvalidUrl(_) => "Invalid URL",
            LinkshelfError::NotFound(_) => "Link Not Found",
            LinkshelfError::AccessDenied(_) => "Access Denied",
            LinkshelfError::Expired(_) => "Link Expired",
            LinkshelfError::LimitExceeded(_) => "Click Limit Exceeded",
            LinkshelfError::GenerationExhausted(_) => "Code Generation Exhausted",
            LinkshelfError::InvalidClickLimit(_) => "Invalid Click Limit",
            LinkshelfError::Config(_) => "Configuration Error",
            LinkshelfError::FileOperation(_) => "File Operation Error",
            LinkshelfError::Notification(_) => "Notification Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkshelfError::InvalidUrl(msg)
            | LinkshelfError::NotFound(msg)
            | LinkshelfError::AccessDenied(msg)
            | LinkshelfError::Expired(msg)
            | LinkshelfError::LimitExceeded(msg)
            | LinkshelfError::GenerationExhausted(msg)
            | LinkshelfError::InvalidClickLimit(msg)
            | LinkshelfError::Config(msg)
            | LinkshelfError::FileOperation(msg)
            | LinkshelfError::Notification(msg) => msg,
        }
    }

    /// Whether the caller can fix the request and try again.
    ///
    /// `LimitExceeded` counts: the owner can raise the limit.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            LinkshelfError::InvalidUrl(_)
                | LinkshelfError::NotFound(_)
                | LinkshelfError::LimitExceeded(_)
                | LinkshelfError::InvalidClickLimit(_)
        )
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkshelfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkshelfError {}

// 便捷的构造函数
impl LinkshelfError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::InvalidUrl(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::NotFound(msg.into())
    }

    pub fn access_denied<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::AccessDenied(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::Expired(msg.into())
    }

    pub fn limit_exceeded<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::LimitExceeded(msg.into())
    }

    pub fn generation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::GenerationExhausted(msg.into())
    }

    pub fn invalid_click_limit<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::InvalidClickLimit(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::FileOperation(msg.into())
    }

    pub fn notification<T: Into<String>>(msg: T) -> Self {
        LinkshelfError::Notification(msg.into())
    }
}

impl From<std::io::Error> for LinkshelfError {
    fn from(err: std::io::Error) -> Self {
        LinkshelfError::FileOperation(err.to_string())
    }
}

impl From<config::ConfigError> for LinkshelfError {
    fn from(err: config::ConfigError) -> Self {
        LinkshelfError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkshelfError>;
