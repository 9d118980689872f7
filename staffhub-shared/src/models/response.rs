use serde::{Deserialize, Serialize};

/// The `{success, data, message}` wrapper every backend response uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// Whether the backend considers the call successful.
    #[serde(default)]
    pub success: bool,
    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome, usually set on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-level validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Alternative failure text some endpoints emit instead of `message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            error: None,
        }
    }

    /// Failed envelope carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: None,
            error: None,
        }
    }

    /// Best description of why the call failed, if the backend gave one.
    ///
    /// Preference order is `message`, then `error`, then the joined `errors` list.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        non_blank(self.message.as_deref())
            .or_else(|| non_blank(self.error.as_deref()))
            .or_else(|| {
                self.errors
                    .as_ref()
                    .filter(|errors| !errors.is_empty())
                    .map(|errors| errors.join("; "))
            })
    }

    /// Split the envelope into its payload or a failure description.
    ///
    /// # Errors
    /// Returns the failure message (or `fallback`) when `success` is false.
    pub fn into_result(self, fallback: &str) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.failure_message().unwrap_or_else(|| fallback.to_string()))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

/// Paging metadata attached to list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total matching records.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

/// A list payload, accepting both a bare array and the paginated object shape.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "PageRepr<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Paging metadata, when the endpoint paginates.
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Number of records on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the page holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Paged {
        #[serde(alias = "items")]
        data: Vec<T>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Plain(Vec<T>),
}

impl<T> From<PageRepr<T>> for Page<T> {
    fn from(value: PageRepr<T>) -> Self {
        match value {
            PageRepr::Paged { data, pagination } => Self {
                items: data,
                pagination,
            },
            PageRepr::Plain(items) => Self {
                items,
                pagination: None,
            },
        }
    }
}
