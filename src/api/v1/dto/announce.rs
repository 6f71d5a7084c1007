/*
 * Responsibility
 * - Announce の request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::announce_repo::{AnnounceRow, page_offset};

pub const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListAnnounceQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListAnnounceQuery {
    /// (page, page_size) with defaults applied. The row offset must fit in an i64.
    pub fn paging(&self) -> Result<(i64, i64), &'static str> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(10);

        if page < 1 {
            return Err("page must be >= 1");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err("page_size must be between 1 and 50");
        }
        if page_offset(page, page_size).is_none() {
            return Err("page out of range");
        }

        Ok((page, page_size))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnounceRequest {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
}

impl CreateAnnounceRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.chars().count() > 50 {
            return Err("title must be <= 50 chars");
        }
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        if let Some(url) = &self.url
            && url.len() > 255
        {
            return Err("url must be <= 255 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AnnounceResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AnnounceRow> for AnnounceResponse {
    fn from(row: AnnounceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            url: row.url,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, page_size: Option<i64>) -> ListAnnounceQuery {
        ListAnnounceQuery { page, page_size }
    }

    #[test]
    fn paging_defaults() {
        assert_eq!(query(None, None).paging(), Ok((1, 10)));
        assert_eq!(query(Some(3), Some(50)).paging(), Ok((3, 50)));
    }

    #[test]
    fn paging_bounds() {
        assert!(query(Some(0), None).paging().is_err());
        assert!(query(None, Some(0)).paging().is_err());
        assert!(query(None, Some(51)).paging().is_err());
    }

    #[test]
    fn paging_rejects_offsets_past_i64() {
        assert_eq!(
            query(Some(i64::MAX), Some(50)).paging(),
            Err("page out of range")
        );
        assert_eq!(query(Some(i64::MAX), Some(1)).paging(), Ok((i64::MAX, 1)));
    }

    #[test]
    fn create_requires_title_and_content() {
        let req = CreateAnnounceRequest {
            title: " ".into(),
            content: "body".into(),
            url: None,
        };
        assert_eq!(req.validate(), Err("title is required"));

        let req = CreateAnnounceRequest {
            title: "maintenance".into(),
            content: "".into(),
            url: None,
        };
        assert_eq!(req.validate(), Err("content is required"));

        let req = CreateAnnounceRequest {
            title: "maintenance".into(),
            content: "tonight".into(),
            url: Some("https://leaf.example/notice".into()),
        };
        assert_eq!(req.validate(), Ok(()));
    }
}
