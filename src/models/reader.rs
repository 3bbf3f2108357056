//! Reader (borrower) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::loan::LoanDetails;

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reader {
    pub id: String,
    pub name: String,
}

impl Reader {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Reader with their open loans attached, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderDetails {
    pub id: String,
    pub name: String,
    pub loans: Vec<LoanDetails>,
}
