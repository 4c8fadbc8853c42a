use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::errors::{LinkshelfError, Result};

/// 短链接状态（由记录字段和当前时间推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkState {
    Active,
    Expired,
    LimitExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: String,
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_limit: u32,
    pub clicks_count: u32,
    pub active: bool,
}

impl ShortLink {
    /// 创建新记录，`now + ttl` 超出时间范围时返回错误
    pub fn new(
        original_url: String,
        short_code: String,
        owner_id: Uuid,
        click_limit: u32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            LinkshelfError::config(format!(
                "Link TTL of {} hours is out of range",
                ttl.num_hours()
            ))
        })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            original_url,
            short_code,
            owner_id,
            created_at: now,
            expires_at,
            click_limit,
            clicks_count: 0,
            active: true,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if self.is_expired_at(now) {
            LinkState::Expired
        } else if !self.active {
            LinkState::LimitExceeded
        } else {
            LinkState::Active
        }
    }

    /// 记录一次访问
    ///
    /// 达到上限的那一次访问仍然成功，记录保持 active；
    /// 下一次访问才会被拒绝并把记录置为 inactive，计数不变。
    pub(crate) fn register_click(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.active {
            return Err(self.inactive_error(now));
        }

        if self.is_expired_at(now) {
            self.active = false;
            return Err(self.expired_error());
        }

        if self.clicks_count >= self.click_limit {
            self.active = false;
            return Err(self.limit_error());
        }

        self.clicks_count += 1;
        Ok(())
    }

    /// 修改点击上限，必要时停用或重新激活
    pub(crate) fn apply_click_limit(&mut self, new_limit: u32, now: DateTime<Utc>) {
        self.click_limit = new_limit;
        if self.clicks_count >= new_limit {
            self.active = false;
        } else if !self.active && !self.is_expired_at(now) {
            self.active = true;
        }
    }

    fn inactive_error(&self, now: DateTime<Utc>) -> LinkshelfError {
        if self.is_expired_at(now) {
            self.expired_error()
        } else {
            self.limit_error()
        }
    }

    fn expired_error(&self) -> LinkshelfError {
        LinkshelfError::expired(format!(
            "Link '{}' expired at {}",
            self.short_code,
            self.expires_at.to_rfc3339()
        ))
    }

    fn limit_error(&self) -> LinkshelfError {
        LinkshelfError::limit_exceeded(format!(
            "Link '{}' reached its click limit ({})",
            self.short_code, self.click_limit
        ))
    }
}
