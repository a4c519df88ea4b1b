//! Protocol messages for the rating endpoint.
//!
//! Plain structs shaped like the generated RPC types: enum fields travel as
//! their raw `i32` wire value and every field has a zero default.

use crate::domain::RatingSummary;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire enum for a rating value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Rate {
    Unspecified = 0,
    Rate1 = 1,
    Rate2 = 2,
    Rate3 = 3,
    Rate4 = 4,
    Rate5 = 5,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown Rate value {0}")]
pub struct UnknownEnumValue(pub i32);

impl TryFrom<i32> for Rate {
    type Error = UnknownEnumValue;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rate::Unspecified),
            1 => Ok(Rate::Rate1),
            2 => Ok(Rate::Rate2),
            3 => Ok(Rate::Rate3),
            4 => Ok(Rate::Rate4),
            5 => Ok(Rate::Rate5),
            other => Err(UnknownEnumValue(other)),
        }
    }
}

impl Rate {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Rate::Unspecified => "RATE_UNSPECIFIED",
            Rate::Rate1 => "RATE_1",
            Rate::Rate2 => "RATE_2",
            Rate::Rate3 => "RATE_3",
            Rate::Rate4 => "RATE_4",
            Rate::Rate5 => "RATE_5",
        }
    }

    /// Numeric rating, or `None` for `RATE_UNSPECIFIED`.
    pub fn value(self) -> Option<i32> {
        match self {
            Rate::Unspecified => None,
            other => Some(other as i32),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitRatingRequest {
    pub item_id: i64,
    pub author_id: i64,
    /// Raw [`Rate`] wire value.
    pub rate: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRatingResponse {
    pub rating_id: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetSummaryRequest {
    pub item_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSummaryResponse {
    pub total: i64,
    pub count1: i64,
    pub count2: i64,
    pub count3: i64,
    pub count4: i64,
    pub count5: i64,
}

impl From<RatingSummary> for GetSummaryResponse {
    fn from(summary: RatingSummary) -> Self {
        let [count1, count2, count3, count4, count5] = summary.counts();
        Self {
            total: summary.total(),
            count1,
            count2,
            count3,
            count4,
            count5,
        }
    }
}
